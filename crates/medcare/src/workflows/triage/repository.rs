use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Department, DepartmentId, Doctor, DoctorId, MatchingRule, ReportId, RuleId,
    SuggestionUpdate, SymptomReport,
};

/// Storage abstraction the service reads snapshots from and writes outcomes to.
///
/// Rule and roster order is significant: the engine breaks full ties by rule order and
/// picks the first available doctor in roster order.
pub trait TriageRepository: Send + Sync {
    fn load_rules(&self) -> Result<Vec<MatchingRule>, RepositoryError>;
    fn load_doctors(&self) -> Result<Vec<Doctor>, RepositoryError>;
    fn load_departments(&self) -> Result<Vec<Department>, RepositoryError>;

    fn load_report(&self, id: &ReportId) -> Result<Option<SymptomReport>, RepositoryError>;
    fn list_reports(&self) -> Result<Vec<SymptomReport>, RepositoryError>;
    fn insert_report(&self, report: SymptomReport) -> Result<SymptomReport, RepositoryError>;
    /// Persist a matching suggestion onto an existing report.
    ///
    /// The stored report must still be `SUBMITTED` at write time; otherwise `Conflict`.
    fn apply_update(
        &self,
        id: &ReportId,
        update: &SuggestionUpdate,
    ) -> Result<SymptomReport, RepositoryError>;
    fn update_report(&self, report: SymptomReport) -> Result<(), RepositoryError>;

    /// Insert or replace in place, keeping the rule's position when it already exists.
    fn save_rule(&self, rule: MatchingRule) -> Result<(), RepositoryError>;
    fn remove_rule(&self, id: &RuleId) -> Result<(), RepositoryError>;
    fn save_doctor(&self, doctor: Doctor) -> Result<(), RepositoryError>;
    fn remove_doctor(&self, id: &DoctorId) -> Result<(), RepositoryError>;
    fn save_department(&self, department: Department) -> Result<(), RepositoryError>;
    fn remove_department(&self, id: &DepartmentId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound patient notification hook (e-mail or SMS adapters).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: PatientNotification) -> Result<(), NotificationError>;
}

/// Notification payload so routes and tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientNotification {
    pub template: String,
    pub report_id: ReportId,
    pub recipient: String,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
