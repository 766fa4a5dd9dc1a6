//! CLI runner
//!
//! Bridges the parsed flags into a validated [`PipelineConfig`], opens the
//! warehouse, and drives one pipeline run. The final outcome line goes to
//! stdout; everything else is tracing.

use crate::cli::commands::Cli;
use crate::config::{AuthMode, PipelineConfig, RawPipelineConfig};
use crate::engine::Pipeline;
use crate::error::Result;
use crate::warehouse::DuckDbWarehouse;

/// Executes one pipeline run from the parsed CLI
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner over the parsed flags
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the config, run the pipeline, print the outcome.
    pub async fn run(&self) -> Result<()> {
        let config = self.build_config()?;
        let warehouse = DuckDbWarehouse::open(&self.cli.database)?;

        let summary = Pipeline::new(&config, &warehouse).run().await?;

        if summary.is_no_new_records() {
            println!("No new records for {}", summary.destination);
        } else {
            println!(
                "Loaded {} records into {} ({})",
                summary.records_loaded, summary.destination, config.write_mode
            );
        }
        Ok(())
    }

    /// Validate the raw flag bundle into a pipeline config.
    fn build_config(&self) -> Result<PipelineConfig> {
        let auth = AuthMode::from_credentials_file(self.cli.credentials.as_deref())?;
        let raw = RawPipelineConfig {
            url: self.cli.url.clone(),
            method: self.cli.method.clone(),
            headers: self.cli.headers.clone(),
            body: self.cli.body.clone(),
            url_type: self.cli.url_type.clone(),
            filter_params: self.cli.filter_params.clone(),
            paginations: self.cli.paginations.clone(),
            topic: self.cli.topic.clone(),
            timestamp_column: self.cli.timestamp_column.clone(),
            date_columns: self.cli.date_columns.clone(),
            project_id: self.cli.project_id.clone(),
            dataset_id: self.cli.dataset_id.clone(),
            table_id: self.cli.table_id.clone(),
            location: self.cli.location.clone(),
            temp_table: self.cli.temp_table.clone(),
            write_disposition: self.cli.write_disposition.clone(),
            time_partitioning: self.cli.time_partitioning.clone(),
            schema_dir: self.cli.schema_dir.clone(),
        };
        PipelineConfig::from_raw(raw, auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_build_config_bridges_all_flags() {
        let cli = Cli::try_parse_from([
            "siphon",
            "--url",
            "https://api.example.com/data",
            "--topic",
            "topic1",
            "--project-id",
            "proj",
            "--dataset-id",
            "ds",
            "--table-id",
            "tbl",
            "--location",
            "US",
            "--filter-params",
            "{\"since\": \"2023-01-01\"}",
            "--date-columns",
            "[\"date\"]",
            "--paginations",
            "true",
        ])
        .unwrap();

        let config = Runner::new(cli).build_config().unwrap();
        assert_eq!(config.topic.name(), "topic1");
        assert!(config.paginated);
        assert_eq!(config.filter_params.get("since").unwrap(), "2023-01-01");
        assert_eq!(config.date_columns, vec!["date".to_string()]);
        assert_eq!(config.destination.path(), "proj.ds.tbl");
        assert_eq!(config.auth, AuthMode::None);
    }

    #[test]
    fn test_build_config_rejects_bad_flag_values() {
        let cli = Cli::try_parse_from([
            "siphon",
            "--url",
            "https://api.example.com/data",
            "--topic",
            "topic1",
            "--project-id",
            "proj",
            "--dataset-id",
            "ds",
            "--table-id",
            "tbl",
            "--location",
            "US",
            "--write-disposition",
            "WRITE_FOO",
        ])
        .unwrap();

        let err = Runner::new(cli).build_config().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
