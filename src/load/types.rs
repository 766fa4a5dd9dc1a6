//! Load plan and report types

use crate::config::TimePartitioning;
use crate::schema::SchemaDescriptor;
use crate::types::{Destination, WriteMode};

/// Everything the loader needs to submit one load job.
///
/// Built once by the planner, consumed once by the loader; carries the
/// staging-resolved destination, never the raw configured one.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Resolved destination (staging override already applied)
    pub destination: Destination,
    /// Schema for the topic, as loaded from its descriptor file
    pub schema: SchemaDescriptor,
    /// Write disposition
    pub write_mode: WriteMode,
    /// Optional partitioning spec, attached verbatim
    pub partitioning: Option<TimePartitioning>,
    /// False when the transformed batch came out empty; the loader then
    /// skips the job entirely
    pub has_new_data: bool,
}

/// Outcome of one load job (or of the skip path)
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Rows written by the job; zero on the skip path
    pub records_loaded: usize,
    /// Where the rows went
    pub destination: Destination,
    /// Disposition the job ran with
    pub write_mode: WriteMode,
}

impl LoadReport {
    /// Report for the no-new-data skip path
    pub fn skipped(plan: &LoadPlan) -> Self {
        Self {
            records_loaded: 0,
            destination: plan.destination.clone(),
            write_mode: plan.write_mode,
        }
    }
}
