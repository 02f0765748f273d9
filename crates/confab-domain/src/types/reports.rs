//! Availability results and batch-job reports
//!
//! These are ephemeral values returned to callers; none of them is persisted
//! as a first-class entity.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One failed availability rule, with a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum Conflict {
    /// Another pending/approved booking by the same user overlaps the window.
    UserOverlap(String),
    /// The department's weekly quota is already exhausted.
    QuotaExceeded(String),
    /// The date falls inside an active blackout period.
    Blackout(String),
    /// The selected resource account is committed in that window.
    AccountBusy(String),
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserOverlap(d)
            | Self::QuotaExceeded(d)
            | Self::Blackout(d)
            | Self::AccountBusy(d) => f.write_str(d),
        }
    }
}

/// An alternative free window of the same duration as the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedWindow {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Result of an availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    pub conflicts: Vec<Conflict>,
    pub suggestions: Vec<SuggestedWindow>,
}

impl Availability {
    pub fn free() -> Self {
        Self { available: true, conflicts: Vec::new(), suggestions: Vec::new() }
    }
}

/// Per-booking outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Updated,
    Unchanged,
    Error,
}

/// One reconciled booking with its outcome and optional diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileItem {
    pub booking_id: String,
    pub outcome: ReconcileOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReconcileItem {
    pub fn updated(booking_id: impl Into<String>) -> Self {
        Self { booking_id: booking_id.into(), outcome: ReconcileOutcome::Updated, detail: None }
    }

    pub fn unchanged(booking_id: impl Into<String>) -> Self {
        Self { booking_id: booking_id.into(), outcome: ReconcileOutcome::Unchanged, detail: None }
    }

    pub fn error(booking_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            booking_id: booking_id.into(),
            outcome: ReconcileOutcome::Error,
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub results: Vec<ReconcileItem>,
}

impl ReconcileSummary {
    /// Build a summary from per-item results; `Updated` and `Unchanged`
    /// both count as success.
    pub fn from_items(results: Vec<ReconcileItem>) -> Self {
        let error_count =
            results.iter().filter(|r| r.outcome == ReconcileOutcome::Error).count();
        Self {
            total_processed: results.len(),
            success_count: results.len() - error_count,
            error_count,
            results,
        }
    }

    pub fn updated_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome == ReconcileOutcome::Updated).count()
    }
}

/// Result of importing a recurring external meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported_count: usize,
    pub total_occurrences: usize,
    pub errors: Vec<String>,
}

/// Aggregate classification of a bulk approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    Success,
    Partial,
    Failed,
}

/// Per-booking outcome within a bulk approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemOutcome {
    pub booking_id: String,
    pub success: bool,
    pub message: String,
}

/// Summary of a bulk approval run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkApproveSummary {
    pub outcome: BulkOutcome,
    pub results: Vec<BulkItemOutcome>,
}

impl BulkApproveSummary {
    pub fn from_items(results: Vec<BulkItemOutcome>) -> Self {
        let successes = results.iter().filter(|r| r.success).count();
        let outcome = if results.is_empty() || successes == results.len() {
            BulkOutcome::Success
        } else if successes == 0 {
            BulkOutcome::Failed
        } else {
            BulkOutcome::Partial
        };
        Self { outcome, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_summary_counts_outcomes() {
        let summary = ReconcileSummary::from_items(vec![
            ReconcileItem::updated("a"),
            ReconcileItem::unchanged("b"),
            ReconcileItem::error("c", "provider timeout"),
        ]);
        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.updated_count(), 1);
    }

    #[test]
    fn bulk_summary_classification() {
        let all_ok = BulkApproveSummary::from_items(vec![BulkItemOutcome {
            booking_id: "a".into(),
            success: true,
            message: "approved".into(),
        }]);
        assert_eq!(all_ok.outcome, BulkOutcome::Success);

        let mixed = BulkApproveSummary::from_items(vec![
            BulkItemOutcome { booking_id: "a".into(), success: true, message: "approved".into() },
            BulkItemOutcome { booking_id: "b".into(), success: false, message: "busy".into() },
        ]);
        assert_eq!(mixed.outcome, BulkOutcome::Partial);

        let none = BulkApproveSummary::from_items(vec![BulkItemOutcome {
            booking_id: "a".into(),
            success: false,
            message: "invalid state".into(),
        }]);
        assert_eq!(none.outcome, BulkOutcome::Failed);
    }
}
