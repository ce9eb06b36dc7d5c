use std::fmt::Display;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Complete,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub error: String,
}

/// Outcome of a sequence of independent single-document writes.
/// Writes that succeeded before a failure stay durable; nothing is rolled back.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub attempted: usize,
    pub succeeded: Vec<Uuid>,
    pub failures: Vec<ItemFailure>,
    /// Set when the writes went through but reloading the ledger afterwards
    /// failed; the returned view is then the last one successfully loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self {
            status: BatchStatus::Complete,
            attempted: 0,
            succeeded: Vec::new(),
            failures: Vec::new(),
            refresh_error: None,
        }
    }
}

impl BatchReport {
    pub fn record_success(&mut self, id: Uuid) {
        self.attempted += 1;
        self.succeeded.push(id);
    }

    pub fn record_failure(&mut self, item: impl Into<String>, error: impl Display) {
        self.attempted += 1;
        self.status = BatchStatus::Partial;
        self.failures.push(ItemFailure {
            item: item.into(),
            error: error.to_string(),
        });
    }

    pub fn record_refresh_failure(&mut self, error: impl Display) {
        self.refresh_error = Some(error.to_string());
    }

    pub fn is_complete(&self) -> bool {
        self.status == BatchStatus::Complete
    }

    /// Every item succeeded and the view reflects the store.
    pub fn is_clean(&self) -> bool {
        self.is_complete() && self.refresh_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_is_complete() {
        let report = BatchReport::default();
        assert!(report.is_complete());
        assert_eq!(report.attempted, 0);
    }

    #[test]
    fn test_single_failure_marks_partial() {
        let mut report = BatchReport::default();
        report.record_success(Uuid::new_v4());
        report.record_failure("b.pdf", "connection reset");
        report.record_success(Uuid::new_v4());

        assert_eq!(report.status, BatchStatus::Partial);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failures[0].item, "b.pdf");
        assert_eq!(report.failures[0].error, "connection reset");
    }

    #[test]
    fn test_refresh_failure_keeps_item_status_but_is_not_clean() {
        let mut report = BatchReport::default();
        report.record_success(Uuid::new_v4());
        report.record_refresh_failure("pool timed out");

        assert!(report.is_complete());
        assert!(!report.is_clean());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["refresh_error"], "pool timed out");
        assert_eq!(json["status"], "complete");
    }

    #[test]
    fn test_refresh_error_omitted_when_absent() {
        let json = serde_json::to_value(BatchReport::default()).unwrap();
        assert!(json.get("refresh_error").is_none());
    }
}
