//! Watermark resolution
//!
//! One read of the destination's high-water mark per run, before any
//! network call. "Table absent" and "table empty" both resolve to no
//! watermark (every fetched record passes the incremental filter); they
//! are logged distinctly so the two cold paths are tellable apart.

use tracing::info;

use crate::error::Result;
use crate::types::{Destination, Watermark};
use crate::warehouse::Warehouse;

/// Resolve the watermark for the destination's timestamp column.
///
/// Only called for incremental topics; any warehouse failure aborts the
/// run rather than falling back to a stale or absent watermark.
pub fn resolve(
    warehouse: &dyn Warehouse,
    destination: &Destination,
    column: &str,
) -> Result<Watermark> {
    if !warehouse.table_exists(&destination.dataset_id, &destination.table_id)? {
        info!(table = %destination, "destination table absent (cold start), no watermark");
        return Ok(None);
    }

    let watermark =
        warehouse.max_timestamp(&destination.dataset_id, &destination.table_id, column)?;
    match watermark {
        Some(value) => info!(watermark = value, column, table = %destination, "resolved watermark"),
        None => info!(table = %destination, "destination table empty, no watermark"),
    }
    Ok(watermark)
}
