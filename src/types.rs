//! Common types used throughout the siphon pipeline
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Filter-parameter map; insertion-ordered so URL building is deterministic
pub type FilterMap = indexmap::IndexMap<String, String>;

/// Ordered sequence of raw records accumulated across pagination pages
pub type RecordBatch = Vec<JsonValue>;

/// Maximum previously-loaded timestamp (epoch seconds), absent on cold start
pub type Watermark = Option<i64>;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP method for the source request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl Method {
    /// Parse the CLI method string; anything but GET/POST is rejected
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            other => Err(Error::invalid_value(
                "method",
                format!("'{other}' is not a supported HTTPS method"),
            )),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

// ============================================================================
// URL Encoding Strategy
// ============================================================================

/// How filter parameters are encoded onto the source URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStyle {
    /// Compact `key=value` pairs, values quoted only when needed
    DictBased,
    /// Plain `?k1=v1&k2=v2` query string, with API-key injection
    #[default]
    EqualBased,
}

impl UrlStyle {
    /// Parse the CLI url-type string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "dict_based" => Ok(UrlStyle::DictBased),
            "equal_based" => Ok(UrlStyle::EqualBased),
            other => Err(Error::invalid_value(
                "url_type",
                format!("'{other}' is not a known URL encoding strategy"),
            )),
        }
    }
}

// ============================================================================
// Write Mode
// ============================================================================

/// How the load job writes into the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    /// Append rows to the existing table
    #[default]
    #[serde(rename = "WRITE_APPEND")]
    Append,
    /// Replace the table contents
    #[serde(rename = "WRITE_TRUNCATE")]
    Truncate,
}

impl WriteMode {
    /// Parse the CLI write-disposition string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "WRITE_APPEND" => Ok(WriteMode::Append),
            "WRITE_TRUNCATE" => Ok(WriteMode::Truncate),
            other => Err(Error::invalid_value(
                "write_disposition",
                format!("'{other}' is not a supported write disposition"),
            )),
        }
    }

    /// The wire-format name for logs and job metadata
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Append => "WRITE_APPEND",
            WriteMode::Truncate => "WRITE_TRUNCATE",
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Topic
// ============================================================================

/// Per-topic behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicPolicy {
    /// Filter fetched records against the destination watermark
    pub incremental: bool,
    /// Inject the API key into the filter map during URL building
    pub inject_api_key: bool,
}

/// A named policy bundle selecting schema, watermark usage, and key-injection
/// behavior for a class of sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Create a topic from its identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The topic identifier (also the schema descriptor file stem)
    pub fn name(&self) -> &str {
        &self.0
    }

    fn policy(&self) -> TopicPolicy {
        match self.0.as_str() {
            "topic1" => TopicPolicy {
                incremental: true,
                inject_api_key: true,
            },
            _ => TopicPolicy {
                incremental: false,
                inject_api_key: false,
            },
        }
    }

    /// Whether loads for this topic filter on the destination watermark
    pub fn is_incremental(&self) -> bool {
        self.policy().incremental
    }

    /// Whether URL building injects the API key for this topic
    pub fn requires_api_key(&self) -> bool {
        self.policy().inject_api_key
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Destination
// ============================================================================

/// Warehouse destination identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Project the destination belongs to (job metadata)
    pub project_id: String,
    /// Dataset (maps to a warehouse schema)
    pub dataset_id: String,
    /// Table name
    pub table_id: String,
    /// Region the destination lives in (job metadata)
    pub location: String,
}

impl Destination {
    /// Dotted `project.dataset.table` path for logs and reports
    pub fn path(&self) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
