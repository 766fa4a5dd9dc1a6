//! Warehouse backend
//!
//! The pipeline talks to the destination through the [`Warehouse`] trait:
//! dataset creation, table existence, the max-aggregate watermark query,
//! and the load job itself. The shipped backend is an embedded DuckDB
//! database; a dataset maps to a DuckDB schema and a table to a DuckDB
//! table, while project and location ride along as job metadata.

mod engine;

pub use engine::DuckDbWarehouse;

use crate::error::Result;
use crate::load::LoadPlan;
use crate::types::{JsonValue, Watermark};

/// Destination-side capabilities the pipeline needs.
///
/// All calls are blocking; the warehouse owns atomicity of the load job.
pub trait Warehouse {
    /// Create the dataset if it does not exist yet.
    fn ensure_dataset(&self, dataset: &str) -> Result<()>;

    /// Whether the destination table exists.
    fn table_exists(&self, dataset: &str, table: &str) -> Result<bool>;

    /// Maximum value of the timestamp column, as epoch seconds.
    ///
    /// `None` when the table is empty or the column is all-NULL.
    fn max_timestamp(&self, dataset: &str, table: &str, column: &str) -> Result<Watermark>;

    /// Run one create-or-append load job and return the row count written.
    fn load(&self, plan: &LoadPlan, records: &[JsonValue]) -> Result<usize>;
}
