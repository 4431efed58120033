use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::triage::domain::{
    Department, DepartmentId, Doctor, DoctorId, MatchingRule, ReportId, ReportStatus, RuleId,
    Severity, SuggestionUpdate, SymptomReport, SymptomSubmission,
};
use crate::workflows::triage::memory::{InMemoryNotifier, InMemoryTriageRepository};
use crate::workflows::triage::repository::{
    NotificationError, NotificationPublisher, PatientNotification, RepositoryError,
    TriageRepository,
};
use crate::workflows::triage::{MatchingConfig, TriageService};

pub(super) fn departments() -> Vec<Department> {
    [
        ("1", "General Medicine"),
        ("2", "Cardiology"),
        ("3", "Orthopedics"),
        ("4", "Neurology"),
        ("5", "Dermatology"),
    ]
    .into_iter()
    .map(|(id, name)| Department {
        id: DepartmentId::from(id),
        name: name.to_string(),
        description: None,
        is_active: true,
    })
    .collect()
}

pub(super) fn doctor(id: &str, department: &str, available: bool) -> Doctor {
    Doctor {
        id: DoctorId::from(id),
        name: format!("Doctor {id}"),
        email: format!("doctor{id}@medcare.com"),
        department_id: DepartmentId::from(department),
        specialization: None,
        is_available: available,
    }
}

pub(super) fn doctors() -> Vec<Doctor> {
    vec![
        doctor("1", "1", true),
        doctor("2", "2", true),
        doctor("3", "3", true),
        doctor("4", "4", false),
        doctor("5", "5", true),
    ]
}

pub(super) fn rules() -> Vec<MatchingRule> {
    vec![
        MatchingRule::new(
            "1",
            ["chest pain", "heart", "palpitations", "shortness of breath"],
            "2",
            1,
            0.9,
        ),
        MatchingRule::new("2", ["headache", "migraine", "dizziness", "numbness"], "4", 1, 0.85),
        MatchingRule::new("3", ["back pain", "joint pain", "fracture", "sprain"], "3", 2, 0.8),
        MatchingRule::new("4", ["rash", "itching", "acne", "skin"], "5", 2, 0.85),
        MatchingRule::new("5", ["fever", "cold", "flu", "cough", "fatigue"], "1", 3, 0.7),
    ]
}

pub(super) fn rule(
    id: &str,
    keywords: &[&str],
    department: &str,
    priority: u32,
    weight: f64,
) -> MatchingRule {
    MatchingRule {
        id: RuleId::from(id),
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        department_id: DepartmentId::from(department),
        priority,
        confidence_weight: weight,
    }
}

pub(super) fn report(symptoms: &str) -> SymptomReport {
    report_with_status(symptoms, ReportStatus::Submitted)
}

pub(super) fn report_with_status(symptoms: &str, status: ReportStatus) -> SymptomReport {
    SymptomReport {
        id: ReportId::from("sym-test"),
        patient_name: "John Smith".to_string(),
        patient_email: "john@email.com".to_string(),
        symptoms: symptoms.to_string(),
        severity: Severity::Severe,
        duration: "2 days".to_string(),
        status,
        submitted_at: Utc.with_ymd_and_hms(2025, 9, 24, 8, 0, 0).unwrap(),
        suggested_department_id: None,
        suggested_doctor_id: None,
        confidence_score: None,
        admin_notes: None,
        approved_at: None,
    }
}

pub(super) fn submission(symptoms: &str) -> SymptomSubmission {
    SymptomSubmission {
        patient_name: "Mary Johnson".to_string(),
        patient_email: "mary@email.com".to_string(),
        symptoms: symptoms.to_string(),
        severity: Severity::Moderate,
        duration: "1 week".to_string(),
    }
}

pub(super) type MemoryService = TriageService<InMemoryTriageRepository, InMemoryNotifier>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryTriageRepository>,
    Arc<InMemoryNotifier>,
) {
    build_service_with(MatchingConfig::default())
}

pub(super) fn build_service_with(
    config: MatchingConfig,
) -> (
    MemoryService,
    Arc<InMemoryTriageRepository>,
    Arc<InMemoryNotifier>,
) {
    let repository = Arc::new(InMemoryTriageRepository::with_catalog(
        departments(),
        doctors(),
        rules(),
    ));
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = TriageService::new(repository.clone(), notifier.clone(), config);
    (service, repository, notifier)
}

/// Repository whose every call fails, for error-path assertions.
pub(super) struct UnavailableRepository;

fn unavailable<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl TriageRepository for UnavailableRepository {
    fn load_rules(&self) -> Result<Vec<MatchingRule>, RepositoryError> {
        unavailable()
    }

    fn load_doctors(&self) -> Result<Vec<Doctor>, RepositoryError> {
        unavailable()
    }

    fn load_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        unavailable()
    }

    fn load_report(&self, _id: &ReportId) -> Result<Option<SymptomReport>, RepositoryError> {
        unavailable()
    }

    fn list_reports(&self) -> Result<Vec<SymptomReport>, RepositoryError> {
        unavailable()
    }

    fn insert_report(&self, _report: SymptomReport) -> Result<SymptomReport, RepositoryError> {
        unavailable()
    }

    fn apply_update(
        &self,
        _id: &ReportId,
        _update: &SuggestionUpdate,
    ) -> Result<SymptomReport, RepositoryError> {
        unavailable()
    }

    fn update_report(&self, _report: SymptomReport) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn save_rule(&self, _rule: MatchingRule) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn remove_rule(&self, _id: &RuleId) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn save_doctor(&self, _doctor: Doctor) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn remove_doctor(&self, _id: &DoctorId) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn save_department(&self, _department: Department) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn remove_department(&self, _id: &DepartmentId) -> Result<(), RepositoryError> {
        unavailable()
    }
}

/// Notifier whose transport is always down.
pub(super) struct OfflineNotifier;

impl NotificationPublisher for OfflineNotifier {
    fn publish(&self, _notification: PatientNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}

/// Wraps the in-memory repository and rejects `target` while the doctor roster is read,
/// the window between the service's status check and its write.
pub(super) struct ReviewDuringMatchRepository {
    pub(super) inner: InMemoryTriageRepository,
    pub(super) target: ReportId,
}

impl TriageRepository for ReviewDuringMatchRepository {
    fn load_rules(&self) -> Result<Vec<MatchingRule>, RepositoryError> {
        self.inner.load_rules()
    }

    fn load_doctors(&self) -> Result<Vec<Doctor>, RepositoryError> {
        if let Some(mut report) = self.inner.load_report(&self.target)? {
            report.status = ReportStatus::Rejected;
            report.admin_notes = Some("Duplicate submission".to_string());
            self.inner.update_report(report)?;
        }
        self.inner.load_doctors()
    }

    fn load_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        self.inner.load_departments()
    }

    fn load_report(&self, id: &ReportId) -> Result<Option<SymptomReport>, RepositoryError> {
        self.inner.load_report(id)
    }

    fn list_reports(&self) -> Result<Vec<SymptomReport>, RepositoryError> {
        self.inner.list_reports()
    }

    fn insert_report(&self, report: SymptomReport) -> Result<SymptomReport, RepositoryError> {
        self.inner.insert_report(report)
    }

    fn apply_update(
        &self,
        id: &ReportId,
        update: &SuggestionUpdate,
    ) -> Result<SymptomReport, RepositoryError> {
        self.inner.apply_update(id, update)
    }

    fn update_report(&self, report: SymptomReport) -> Result<(), RepositoryError> {
        self.inner.update_report(report)
    }

    fn save_rule(&self, rule: MatchingRule) -> Result<(), RepositoryError> {
        self.inner.save_rule(rule)
    }

    fn remove_rule(&self, id: &RuleId) -> Result<(), RepositoryError> {
        self.inner.remove_rule(id)
    }

    fn save_doctor(&self, doctor: Doctor) -> Result<(), RepositoryError> {
        self.inner.save_doctor(doctor)
    }

    fn remove_doctor(&self, id: &DoctorId) -> Result<(), RepositoryError> {
        self.inner.remove_doctor(id)
    }

    fn save_department(&self, department: Department) -> Result<(), RepositoryError> {
        self.inner.save_department(department)
    }

    fn remove_department(&self, id: &DepartmentId) -> Result<(), RepositoryError> {
        self.inner.remove_department(id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json body")
}
