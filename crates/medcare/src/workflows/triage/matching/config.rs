use serde::{Deserialize, Serialize};

use super::super::domain::DepartmentId;

/// Confidence recorded for fallback suggestions unless configured otherwise.
pub const DEFAULT_FALLBACK_CONFIDENCE: f64 = 0.5;

/// What the engine does when no rule matches a report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Return no suggestion; the report stays `SUBMITTED`.
    #[default]
    LeaveSubmitted,
    /// Suggest a default department with a fixed confidence.
    DefaultDepartment {
        department_id: DepartmentId,
        confidence: f64,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub fallback: FallbackPolicy,
}
