//! Run summary types

use crate::types::Watermark;

/// What one pipeline run did, for logging and the final stdout line
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Records accumulated by the fetch loop
    pub records_fetched: usize,
    /// Records remaining after dedup, watermark filter, and normalization
    pub records_transformed: usize,
    /// Records written by the load job
    pub records_loaded: usize,
    /// Resolved destination path (staging override applied)
    pub destination: String,
    /// Watermark the filter ran against, if any
    pub watermark: Watermark,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl RunSummary {
    /// Whether the run ended on the "no new records" path
    pub fn is_no_new_records(&self) -> bool {
        self.records_loaded == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_new_records_flag() {
        let summary = RunSummary::default();
        assert!(summary.is_no_new_records());

        let summary = RunSummary {
            records_fetched: 3,
            records_transformed: 2,
            records_loaded: 2,
            ..RunSummary::default()
        };
        assert!(!summary.is_no_new_records());
    }
}
