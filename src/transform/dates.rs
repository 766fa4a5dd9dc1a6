//! Date normalization
//!
//! Every configured date column is rendered in one canonical textual form,
//! `YYYY-MM-DD HH:MM:SS`, regardless of how the source spelled it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::types::JsonValue;

/// Canonical output format for date columns
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Datetime input formats tried after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Bare-date input formats; midnight is assumed
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Render a date-column value in the canonical format.
///
/// Accepts RFC 3339 strings (converted to UTC), the common dash/slash
/// date and datetime spellings, and integer epoch seconds. Anything else
/// is a fatal transform error naming the column and the offending value.
pub fn normalize(column: &str, value: &JsonValue) -> Result<String> {
    let parsed = match value {
        JsonValue::String(text) => parse_text(text),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    };
    parsed
        .map(|dt| dt.format(CANONICAL_FORMAT).to_string())
        .ok_or_else(|| Error::date_parse(column, value))
}

fn parse_text(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_utc().naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
