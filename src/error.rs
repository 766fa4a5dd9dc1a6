//! Error types for the siphon pipeline
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the siphon pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Field '{field}' is not valid JSON: {message}")]
    JsonField { field: String, message: String },

    #[error("No API key is provided")]
    MissingApiKey,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Unexpected response shape: {message}")]
    ResponseShape { message: String },

    // ============================================================================
    // Transform Errors
    // ============================================================================
    #[error("Cannot parse date value {value} in column '{column}'")]
    DateParse { column: String, value: String },

    // ============================================================================
    // Load Errors
    // ============================================================================
    #[error("Schema descriptor for topic '{topic}': {message}")]
    SchemaDescriptor { topic: String, message: String },

    #[error("Load job failed: {message}")]
    Load { message: String },

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], one kind per pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing configuration, rejected before any network call
    Config,
    /// HTTP failure or an unusable response body
    Source,
    /// Record-level normalization failure
    Transform,
    /// Schema descriptor or warehouse load-job failure
    Load,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a malformed JSON field error
    pub fn json_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a response shape error
    pub fn response_shape(message: impl Into<String>) -> Self {
        Self::ResponseShape {
            message: message.into(),
        }
    }

    /// Create a date parse error
    pub fn date_parse(column: impl Into<String>, value: impl ToString) -> Self {
        Self::DateParse {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Create a schema descriptor error
    pub fn schema(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaDescriptor {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create a load error
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    /// Classify this error by the pipeline stage it belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::JsonField { .. }
            | Error::MissingApiKey
            | Error::InvalidUrl(_) => ErrorKind::Config,
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::JsonParse(_)
            | Error::ResponseShape { .. } => ErrorKind::Source,
            Error::DateParse { .. } => ErrorKind::Transform,
            Error::SchemaDescriptor { .. }
            | Error::Load { .. }
            | Error::Warehouse(_)
            | Error::Io(_) => ErrorKind::Load,
        }
    }
}

/// Result type alias for the siphon pipeline
pub type Result<T> = std::result::Result<T, Error>;
