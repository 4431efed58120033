//! Symptom report triage: intake, rule-based department matching, review and the
//! reference catalog (departments, doctors, matching rules) the matcher reads.
//!
//! The matching engine in [`matching`] is a pure function over snapshots. Everything that
//! touches storage goes through [`TriageRepository`] so the service can run against any
//! backing store.

pub mod catalog;
pub mod dashboard;
pub mod domain;
pub(crate) mod intake;
pub mod matching;
pub mod memory;
pub mod repository;
pub mod review;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, DepartmentDraft, DoctorDraft, KeywordInput, RuleDraft};
pub use dashboard::{DashboardSummary, RecentSubmissionView, StatusCounts};
pub use domain::{
    Department, DepartmentId, Doctor, DoctorId, MatchingRule, ReportId, ReportStatus, RuleId,
    Severity, SuggestionUpdate, SymptomReport, SymptomSubmission,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use matching::{
    compute_suggestion, FallbackPolicy, MalformedRule, MatchOutcome, MatchingConfig,
    MatchingEngine, MatchingError, RuleScore, DEFAULT_FALLBACK_CONFIDENCE,
};
pub use memory::{InMemoryNotifier, InMemoryTriageRepository};
pub use repository::{
    NotificationError, NotificationPublisher, PatientNotification, RepositoryError,
    TriageRepository,
};
pub use review::{apply_review, ReviewDecision, ReviewError};
pub use router::triage_router;
pub use service::{BatchMatchEntry, BatchMatchResult, TriageService, TriageServiceError};
