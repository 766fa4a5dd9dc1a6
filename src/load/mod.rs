//! Load planning and submission
//!
//! The planner resolves the destination (staging override), loads the
//! topic's schema descriptor, and bundles the write disposition and the
//! partitioning spec into a [`LoadPlan`] — no network or warehouse call
//! happens here. The [`Loader`] then either skips (no new data) or submits
//! the batch as one load job and reports the row count.

mod types;

pub use types::{LoadPlan, LoadReport};

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::schema::SchemaDescriptor;
use crate::types::RecordBatch;
use crate::warehouse::Warehouse;

/// Dataset every staging load is redirected into
pub const STAGING_DATASET: &str = "TEMP";

/// Suffix appended to staging table names
pub const STAGING_SUFFIX: &str = "_STG";

/// Build the load plan for this run.
pub fn plan(config: &PipelineConfig, has_new_data: bool) -> Result<LoadPlan> {
    let mut destination = config.destination.clone();
    if config.staging {
        destination.dataset_id = STAGING_DATASET.to_string();
        destination.table_id = format!("{}{STAGING_SUFFIX}", destination.table_id);
        info!(table = %destination, "staging requested, destination overridden");
    }

    let schema = SchemaDescriptor::load(&config.schema_dir, &config.topic)?;

    Ok(LoadPlan {
        destination,
        schema,
        write_mode: config.write_mode,
        partitioning: config.partitioning.clone(),
        has_new_data,
    })
}

/// Submits a prepared plan against the warehouse
pub struct Loader<'a> {
    warehouse: &'a dyn Warehouse,
}

impl<'a> Loader<'a> {
    /// Create a loader over the warehouse backend
    pub fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self { warehouse }
    }

    /// Run the load job, or skip it when the plan carries no new data.
    ///
    /// The skip path never touches the warehouse and reports zero records;
    /// it is a normal outcome, not an error.
    pub fn load(&self, plan: &LoadPlan, records: &RecordBatch) -> Result<LoadReport> {
        if !plan.has_new_data {
            info!(table = %plan.destination, "no new records, load job skipped");
            return Ok(LoadReport::skipped(plan));
        }

        self.warehouse.ensure_dataset(&plan.destination.dataset_id)?;
        let records_loaded = self.warehouse.load(plan, records)?;
        info!(
            records = records_loaded,
            table = %plan.destination,
            mode = %plan.write_mode,
            "load job complete"
        );

        Ok(LoadReport {
            records_loaded,
            destination: plan.destination.clone(),
            write_mode: plan.write_mode,
        })
    }
}
