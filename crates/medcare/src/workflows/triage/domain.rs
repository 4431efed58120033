use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier wrapper for hospital departments.
    DepartmentId
);
string_id!(
    /// Identifier wrapper for doctors on the roster.
    DoctorId
);
string_id!(
    /// Identifier wrapper for keyword matching rules.
    RuleId
);
string_id!(
    /// Identifier wrapper for patient symptom reports.
    ReportId
);

/// Hospital department a rule can route patients to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
}

/// Roster entry; availability gates whether the doctor can be suggested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub email: String,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub specialization: Option<String>,
    pub is_available: bool,
}

/// Keyword rule associating symptom vocabulary with a target department.
///
/// `priority` follows the console convention where `1` is the highest precedence.
/// `confidence_weight` scales the keyword coverage into a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRule {
    pub id: RuleId,
    pub keywords: Vec<String>,
    pub department_id: DepartmentId,
    pub priority: u32,
    pub confidence_weight: f64,
}

impl MatchingRule {
    /// Build a rule with normalized keywords.
    pub fn new<I, S>(
        id: impl Into<RuleId>,
        keywords: I,
        department_id: impl Into<DepartmentId>,
        priority: u32,
        confidence_weight: f64,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            keywords: normalize_keywords(keywords),
            department_id: department_id.into(),
            priority,
            confidence_weight,
        }
    }
}

/// Trim, lower-case, drop blanks and duplicates while keeping first-seen order.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim().to_lowercase();
        if keyword.is_empty() || normalized.contains(&keyword) {
            continue;
        }
        normalized.push(keyword);
    }
    normalized
}

/// Patient-reported severity captured at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

/// Canonical lifecycle of a symptom report. Only the upper-case names are accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Submitted,
    AutoSuggested,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Submitted => "SUBMITTED",
            ReportStatus::AutoSuggested => "AUTO_SUGGESTED",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inbound patient form before it has been validated and assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSubmission {
    pub patient_name: String,
    pub patient_email: String,
    pub symptoms: String,
    pub severity: Severity,
    pub duration: String,
}

/// Stored symptom report together with its routing and review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub id: ReportId,
    pub patient_name: String,
    pub patient_email: String,
    pub symptoms: String,
    pub severity: Severity,
    pub duration: String,
    pub status: ReportStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_department_id: Option<DepartmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_doctor_id: Option<DoctorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl SymptomReport {
    /// Merge a matching suggestion into the report, the way a repository applies it.
    pub fn apply_suggestion(&mut self, update: &SuggestionUpdate) {
        self.status = update.status;
        self.suggested_department_id = Some(update.suggested_department_id.clone());
        self.suggested_doctor_id = update.suggested_doctor_id.clone();
        self.confidence_score = Some(update.confidence_score);
    }
}

/// Partial update produced by the matching engine for the caller to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionUpdate {
    pub status: ReportStatus,
    pub suggested_department_id: DepartmentId,
    pub suggested_doctor_id: Option<DoctorId>,
    pub confidence_score: f64,
    /// Absent when the suggestion came from the configured no-match fallback.
    pub matched_rule_id: Option<RuleId>,
}
