//! Record transformation
//!
//! Three passes over the fetched batch, in order: exact-duplicate removal
//! (keep-last), watermark filtering for incremental topics, and date-column
//! normalization. Each pass replaces the batch; record order is preserved
//! throughout, field order within a record is not guaranteed.

mod dates;

pub use dates::{normalize, CANONICAL_FORMAT};

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{JsonValue, RecordBatch, Watermark};

/// Applies the transformation passes for one run
pub struct Transformer<'a> {
    config: &'a PipelineConfig,
    watermark: Watermark,
}

impl<'a> Transformer<'a> {
    /// Create a transformer over the run's config and resolved watermark
    pub fn new(config: &'a PipelineConfig, watermark: Watermark) -> Self {
        Self { config, watermark }
    }

    /// Run all passes, returning the replacement batch.
    pub fn transform(&self, records: RecordBatch) -> Result<RecordBatch> {
        let fetched = records.len();
        let records = dedup_keep_last(records);
        if records.len() < fetched {
            debug!(dropped = fetched - records.len(), "removed exact duplicates");
        }

        let records = if self.config.topic.is_incremental() {
            let before = records.len();
            let records =
                filter_watermark(records, &self.config.timestamp_column, self.watermark);
            if records.len() < before {
                info!(
                    dropped = before - records.len(),
                    remaining = records.len(),
                    "watermark filter applied"
                );
            }
            records
        } else {
            records
        };

        normalize_dates(records, &self.config.date_columns)
    }
}

/// Remove exact-duplicate records, keeping the last occurrence of each.
///
/// Records are keyed by their canonical JSON text (object keys sort on
/// serialization), so structural equality is what counts. If any record
/// cannot be serialized the batch is returned untouched rather than
/// partially deduplicated.
pub fn dedup_keep_last(records: RecordBatch) -> RecordBatch {
    let keys: Option<Vec<String>> = records
        .iter()
        .map(|record| serde_json::to_string(record).ok())
        .collect();
    let Some(keys) = keys else {
        return records;
    };

    let mut last_seen = std::collections::HashMap::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        last_seen.insert(key.as_str(), index);
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(index, _)| last_seen[keys[*index].as_str()] == *index)
        .map(|(_, record)| record)
        .collect()
}

/// Keep only records strictly newer than the watermark.
///
/// With no watermark every record passes (cold start). A record missing
/// the timestamp column, or holding a non-numeric value there, does not
/// pass the filter.
pub fn filter_watermark(records: RecordBatch, column: &str, watermark: Watermark) -> RecordBatch {
    let Some(watermark) = watermark else {
        return records;
    };
    records
        .into_iter()
        .filter(|record| timestamp_value(record, column).is_some_and(|v| v > watermark))
        .collect()
}

/// Rewrite every configured date column in the canonical format.
///
/// Records missing the column, or holding JSON `null` there, are left
/// untouched; an unparseable value aborts the run.
pub fn normalize_dates(mut records: RecordBatch, columns: &[String]) -> Result<RecordBatch> {
    for record in &mut records {
        let Some(map) = record.as_object_mut() else {
            continue;
        };
        for column in columns {
            let Some(value) = map.get(column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let canonical = normalize(column, value)?;
            map.insert(column.clone(), JsonValue::String(canonical));
        }
    }
    Ok(records)
}

/// Epoch-seconds reading of a record's timestamp column, if present and
/// numeric (JSON numbers and numeric strings both count).
fn timestamp_value(record: &JsonValue, column: &str) -> Option<i64> {
    match record.get(column)? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        JsonValue::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
        _ => None,
    }
}
