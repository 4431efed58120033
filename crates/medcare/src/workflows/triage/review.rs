use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ReportId, ReportStatus, SymptomReport};

/// Human decision on a triaged report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn target_status(self) -> ReportStatus {
        match self {
            ReviewDecision::Approve => ReportStatus::Approved,
            ReviewDecision::Reject => ReportStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("cannot {decision:?} report {report_id} while it is {from}")]
    InvalidTransition {
        report_id: ReportId,
        from: ReportStatus,
        decision: ReviewDecision,
    },
}

/// Move a report to its reviewed state.
///
/// Approval requires a suggestion to exist (`AUTO_SUGGESTED`). Rejection is also allowed
/// straight from `SUBMITTED`. Decided reports are never reopened.
pub fn apply_review(
    report: &mut SymptomReport,
    decision: ReviewDecision,
    notes: Option<String>,
    at: DateTime<Utc>,
) -> Result<(), ReviewError> {
    let allowed = match decision {
        ReviewDecision::Approve => report.status == ReportStatus::AutoSuggested,
        ReviewDecision::Reject => matches!(
            report.status,
            ReportStatus::Submitted | ReportStatus::AutoSuggested
        ),
    };

    if !allowed {
        return Err(ReviewError::InvalidTransition {
            report_id: report.id.clone(),
            from: report.status,
            decision,
        });
    }

    report.status = decision.target_status();
    report.admin_notes = notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty());
    if decision == ReviewDecision::Approve {
        report.approved_at = Some(at);
    }

    Ok(())
}
