//! Pipeline configuration
//!
//! The CLI hands over a bundle of raw strings ([`RawPipelineConfig`]); this
//! module turns it into an immutable, fully-validated [`PipelineConfig`].
//! Every JSON-bearing field is parsed by its own function with a typed
//! error, so a malformed bundle aborts the run before any network call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Destination, FilterMap, Method, Topic, UrlStyle, WriteMode};

// ============================================================================
// Raw Config
// ============================================================================

/// The unvalidated configuration bundle as it arrives from the CLI.
/// JSON-bearing fields are still plain strings here.
#[derive(Debug, Clone)]
pub struct RawPipelineConfig {
    /// Source endpoint, may contain the `PAGE_NUMBER` placeholder
    pub url: String,
    /// HTTP method string (`GET`/`POST`)
    pub method: String,
    /// Header map as a JSON object string
    pub headers: String,
    /// Request body (POST only)
    pub body: Option<String>,
    /// URL encoding strategy name
    pub url_type: String,
    /// Filter parameters as a JSON object string
    pub filter_params: String,
    /// Pagination flag string (`"true"`/`"false"`)
    pub paginations: String,
    /// Topic identifier
    pub topic: String,
    /// Watermark column name
    pub timestamp_column: String,
    /// Date column names as a JSON array string
    pub date_columns: String,
    /// Destination project
    pub project_id: String,
    /// Destination dataset
    pub dataset_id: String,
    /// Destination table
    pub table_id: String,
    /// Destination region
    pub location: String,
    /// Staging flag string (`"true"`/`"false"`)
    pub temp_table: String,
    /// Write disposition string
    pub write_disposition: String,
    /// Time-partitioning spec as a JSON object string (`{}` = none)
    pub time_partitioning: String,
    /// Directory holding `<topic>.json` schema descriptors
    pub schema_dir: PathBuf,
}

// ============================================================================
// Auth Mode
// ============================================================================

/// How the source authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials mounted; the source needs no key
    None,
    /// API key supplied by the credentials file
    Key(String),
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    api_key: Option<String>,
}

impl AuthMode {
    /// Build the auth mode from the optional credentials file.
    ///
    /// An absent file means the source requires no key. A present file must
    /// carry `api_key`, otherwise the run is rejected at construction.
    pub fn from_credentials_file(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(AuthMode::None);
        };
        if !path.exists() {
            return Ok(AuthMode::None);
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_value("credentials", e.to_string()))?;
        let creds: CredentialsFile = serde_json::from_str(&text)
            .map_err(|e| Error::json_field("credentials", e.to_string()))?;
        match creds.api_key {
            Some(key) => Ok(AuthMode::Key(key)),
            None => Err(Error::MissingApiKey),
        }
    }

    /// The key value injected into URLs; empty when no key is required
    pub fn api_key(&self) -> &str {
        match self {
            AuthMode::None => "",
            AuthMode::Key(key) => key,
        }
    }
}

// ============================================================================
// Time Partitioning
// ============================================================================

/// Partition granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    #[default]
    Day,
    Hour,
    Month,
    Year,
}

impl Granularity {
    /// The wire-format name for logs and job metadata
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "DAY",
            Granularity::Hour => "HOUR",
            Granularity::Month => "MONTH",
            Granularity::Year => "YEAR",
        }
    }
}

/// Time-partitioning spec, attached verbatim to the load plan.
///
/// Wire format keeps the upstream field names: `type_` for the granularity
/// (defaults to `DAY`) and `field` for the partition column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePartitioning {
    /// Partition granularity
    #[serde(rename = "type_", default)]
    pub granularity: Granularity,
    /// Column the table is partitioned on
    #[serde(default)]
    pub field: Option<String>,
}

// ============================================================================
// Pipeline Config
// ============================================================================

/// Immutable pipeline configuration, validated at construction
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source endpoint (pre-filter), may contain `PAGE_NUMBER`
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (POST only)
    pub body: Option<String>,
    /// Authentication mode
    pub auth: AuthMode,
    /// URL encoding strategy
    pub url_style: UrlStyle,
    /// Filter parameters, insertion-ordered
    pub filter_params: FilterMap,
    /// Whether the fetch loop paginates until an empty page
    pub paginated: bool,
    /// Topic identifier (policy bundle)
    pub topic: Topic,
    /// Watermark column name
    pub timestamp_column: String,
    /// Columns normalized to the canonical date format
    pub date_columns: Vec<String>,
    /// Destination identity
    pub destination: Destination,
    /// Load into the staging dataset instead of the final destination
    pub staging: bool,
    /// Write disposition for the load job
    pub write_mode: WriteMode,
    /// Optional time-partitioning spec
    pub partitioning: Option<TimePartitioning>,
    /// Directory holding `<topic>.json` schema descriptors
    pub schema_dir: PathBuf,
}

impl PipelineConfig {
    /// Validate the raw bundle into a usable configuration.
    pub fn from_raw(raw: RawPipelineConfig, auth: AuthMode) -> Result<Self> {
        // Validity check only; the raw string is kept so the PAGE_NUMBER
        // placeholder survives untouched.
        url::Url::parse(&raw.url)?;

        let method = Method::parse(&raw.method)?;
        let body = match (method, raw.body) {
            (Method::POST, Some(body)) => Some(body),
            (Method::POST, None) => return Err(Error::missing_field("body")),
            (Method::GET, Some(_)) => {
                return Err(Error::invalid_value(
                    "body",
                    "a request body is only valid for POST",
                ))
            }
            (Method::GET, None) => None,
        };

        if raw.topic.is_empty() {
            return Err(Error::missing_field("topic"));
        }
        if raw.timestamp_column.is_empty() {
            return Err(Error::missing_field("timestamp_column"));
        }

        Ok(Self {
            url: raw.url,
            method,
            headers: parse_headers(&raw.headers)?,
            body,
            auth,
            url_style: UrlStyle::parse(&raw.url_type)?,
            filter_params: parse_filter_params(&raw.filter_params)?,
            paginated: parse_flag("paginations", &raw.paginations)?,
            topic: Topic::new(raw.topic),
            timestamp_column: raw.timestamp_column,
            date_columns: parse_date_columns(&raw.date_columns)?,
            destination: Destination {
                project_id: raw.project_id,
                dataset_id: raw.dataset_id,
                table_id: raw.table_id,
                location: raw.location,
            },
            staging: parse_flag("temp_table", &raw.temp_table)?,
            write_mode: WriteMode::parse(&raw.write_disposition)?,
            partitioning: parse_partitioning(&raw.time_partitioning)?,
            schema_dir: raw.schema_dir,
        })
    }
}

// ============================================================================
// Field Parsers
// ============================================================================

fn parse_headers(raw: &str) -> Result<HashMap<String, String>> {
    serde_json::from_str(raw).map_err(|e| Error::json_field("headers", e.to_string()))
}

fn parse_filter_params(raw: &str) -> Result<FilterMap> {
    serde_json::from_str(raw).map_err(|e| Error::json_field("filter_params", e.to_string()))
}

fn parse_date_columns(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| Error::json_field("date_columns", e.to_string()))
}

/// Parse the partitioning spec; an empty object means "not partitioned".
fn parse_partitioning(raw: &str) -> Result<Option<TimePartitioning>> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| Error::json_field("time_partitioning", e.to_string()))?;
    match value.as_object() {
        Some(map) if map.is_empty() => Ok(None),
        Some(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::json_field("time_partitioning", e.to_string())),
        None => Err(Error::json_field(
            "time_partitioning",
            "expected a JSON object",
        )),
    }
}

/// Parse a `"true"`/`"false"` flag string; anything else is rejected.
fn parse_flag(field: &'static str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::invalid_value(
            field,
            format!("expected \"true\" or \"false\", got '{other}'"),
        )),
    }
}
