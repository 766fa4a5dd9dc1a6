//! CLI argument parsing
//!
//! The flag surface mirrors the inbound configuration contract: JSON-bearing
//! flags arrive as plain strings and boolean-ish flags as the literal
//! strings `"true"`/`"false"`; everything is validated in one pass when the
//! runner builds the [`crate::config::PipelineConfig`].

use clap::Parser;
use std::path::PathBuf;

/// Incremental HTTPS-to-warehouse ETL pipeline
#[derive(Parser, Debug, Clone)]
#[command(name = "siphon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source endpoint; may contain the PAGE_NUMBER placeholder
    #[arg(long)]
    pub url: String,

    /// HTTP method (GET or POST)
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Request headers as a JSON object
    #[arg(long, default_value = "{}")]
    pub headers: String,

    /// Request body (POST only)
    #[arg(long)]
    pub body: Option<String>,

    /// Credentials JSON file carrying the API key; absent file means no key
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// URL encoding strategy (dict_based or equal_based)
    #[arg(long, default_value = "equal_based")]
    pub url_type: String,

    /// Filter parameters as a JSON object
    #[arg(long, default_value = "{}")]
    pub filter_params: String,

    /// Paginate until an empty page ("true"/"false")
    #[arg(long, default_value = "false")]
    pub paginations: String,

    /// Topic identifier (selects schema and watermark policy)
    #[arg(long)]
    pub topic: String,

    /// Watermark column name
    #[arg(long, default_value = "stamp")]
    pub timestamp_column: String,

    /// Date column names as a JSON array
    #[arg(long, default_value = "[]")]
    pub date_columns: String,

    /// Destination project
    #[arg(long)]
    pub project_id: String,

    /// Destination dataset
    #[arg(long)]
    pub dataset_id: String,

    /// Destination table
    #[arg(long)]
    pub table_id: String,

    /// Destination region
    #[arg(long)]
    pub location: String,

    /// Load into the staging dataset instead ("true"/"false")
    #[arg(long, default_value = "false")]
    pub temp_table: String,

    /// Write disposition (WRITE_APPEND or WRITE_TRUNCATE)
    #[arg(long, default_value = "WRITE_APPEND")]
    pub write_disposition: String,

    /// Time-partitioning spec as a JSON object; {} means none
    #[arg(long, default_value = "{}")]
    pub time_partitioning: String,

    /// Directory holding <topic>.json schema descriptors
    #[arg(long, default_value = "schema")]
    pub schema_dir: PathBuf,

    /// DuckDB database file backing the warehouse
    #[arg(long, default_value = "warehouse.duckdb")]
    pub database: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_args() -> Vec<&'static str> {
        vec![
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
        ]
    }

    #[test]
    fn test_minimal_invocation_and_defaults() {
        let cli = Cli::try_parse_from(minimal_args()).unwrap();
        assert_eq!(cli.method, "GET");
        assert_eq!(cli.headers, "{}");
        assert_eq!(cli.url_type, "equal_based");
        assert_eq!(cli.paginations, "false");
        assert_eq!(cli.timestamp_column, "stamp");
        assert_eq!(cli.write_disposition, "WRITE_APPEND");
        assert_eq!(cli.schema_dir, PathBuf::from("schema"));
        assert_eq!(cli.database, PathBuf::from("warehouse.duckdb"));
        assert!(cli.credentials.is_none());
    }

    #[test]
    fn test_required_flags_enforced() {
        assert!(Cli::try_parse_from(["siphon", "--topic", "topic1"]).is_err());

        let mut args = minimal_args();
        args.extend(["--write-disposition", "WRITE_TRUNCATE", "--temp-table", "true"]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.write_disposition, "WRITE_TRUNCATE");
        assert_eq!(cli.temp_table, "true");
    }
}
