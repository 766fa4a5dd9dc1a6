//! Pipeline orchestration
//!
//! One [`Pipeline::run`] is one full pull/transform/load cycle: ensure the
//! destination dataset, resolve the watermark (incremental topics only),
//! build the filtered URL, fetch, transform, plan, load. Every stage either
//! succeeds or aborts the run; the only non-error empty outcomes are "zero
//! records fetched" and "zero records past the watermark", both of which
//! reach the loader with the no-new-data flag set.

mod types;

pub use types::RunSummary;

use std::time::Instant;

use reqwest::Client;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::load::{self, Loader};
use crate::source::{apply_filters, Source};
use crate::transform::Transformer;
use crate::warehouse::Warehouse;
use crate::watermark;

/// One pipeline run over a validated config and a warehouse backend
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    warehouse: &'a dyn Warehouse,
    client: Client,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline; the HTTP client is owned for the run's lifetime
    pub fn new(config: &'a PipelineConfig, warehouse: &'a dyn Warehouse) -> Self {
        Self {
            config,
            warehouse,
            client: Client::new(),
        }
    }

    /// Execute the full cycle and report what happened.
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        info!(
            topic = %self.config.topic,
            destination = %self.config.destination,
            "pipeline run starting"
        );

        self.warehouse
            .ensure_dataset(&self.config.destination.dataset_id)?;

        let watermark = if self.config.topic.is_incremental() {
            watermark::resolve(
                self.warehouse,
                &self.config.destination,
                &self.config.timestamp_column,
            )?
        } else {
            debug!(topic = %self.config.topic, "topic is full-overwrite, watermark skipped");
            None
        };

        let url = apply_filters(self.config);
        let fetched = Source::new(&self.client, self.config).fetch(&url).await?;
        let records_fetched = fetched.len();

        let transformed = if fetched.is_empty() {
            info!("source returned no records");
            Vec::new()
        } else {
            Transformer::new(self.config, watermark).transform(fetched)?
        };

        let plan = load::plan(self.config, !transformed.is_empty())?;
        let report = Loader::new(self.warehouse).load(&plan, &transformed)?;

        let summary = RunSummary {
            records_fetched,
            records_transformed: transformed.len(),
            records_loaded: report.records_loaded,
            destination: report.destination.path(),
            watermark,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            fetched = summary.records_fetched,
            transformed = summary.records_transformed,
            loaded = summary.records_loaded,
            duration_ms = summary.duration_ms,
            "pipeline run complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests;
