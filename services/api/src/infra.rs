use metrics_exporter_prometheus::PrometheusHandle;
use medcare::error::AppError;
use medcare::workflows::rules_import::RuleImporter;
use medcare::workflows::triage::{
    Department, DepartmentId, Doctor, DoctorId, InMemoryTriageRepository, MatchingRule,
    NotificationError, NotificationPublisher, PatientNotification, Severity, SymptomSubmission,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes patient notifications to the log.
#[derive(Debug, Default, Clone)]
pub(crate) struct TracingNotifier;

impl NotificationPublisher for TracingNotifier {
    fn publish(&self, notification: PatientNotification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template,
            report_id = %notification.report_id,
            recipient = %notification.recipient,
            details = ?notification.details,
            "patient notification queued"
        );
        Ok(())
    }
}

pub(crate) fn seed_departments() -> Vec<Department> {
    [
        ("1", "General Medicine", "Primary care and general health concerns"),
        ("2", "Cardiology", "Heart and cardiovascular system"),
        ("3", "Orthopedics", "Bones, joints, and muscles"),
        ("4", "Neurology", "Brain and nervous system"),
        ("5", "Dermatology", "Skin conditions and disorders"),
    ]
    .into_iter()
    .map(|(id, name, description)| Department {
        id: DepartmentId::from(id),
        name: name.to_string(),
        description: Some(description.to_string()),
        is_active: true,
    })
    .collect()
}

pub(crate) fn seed_doctors() -> Vec<Doctor> {
    [
        ("1", "Emily Chen", "emily", "1", "Internal Medicine", true),
        ("2", "Michael Ross", "michael", "2", "Interventional Cardiology", true),
        ("3", "Lisa Park", "lisa", "3", "Sports Medicine", true),
        ("4", "James Wright", "james", "4", "Clinical Neurology", false),
        ("5", "Anna Miller", "anna", "5", "Clinical Dermatology", true),
    ]
    .into_iter()
    .map(|(id, name, mailbox, department, specialization, available)| Doctor {
        id: DoctorId::from(id),
        name: name.to_string(),
        email: format!("{mailbox}@medcare.com"),
        department_id: DepartmentId::from(department),
        specialization: Some(specialization.to_string()),
        is_available: available,
    })
    .collect()
}

pub(crate) fn seed_rules() -> Vec<MatchingRule> {
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

pub(crate) fn sample_submissions() -> Vec<SymptomSubmission> {
    [
        (
            "John Smith",
            "john@email.com",
            "Experiencing chest pain and shortness of breath for 2 days",
            Severity::Severe,
            "2 days",
        ),
        (
            "Mary Johnson",
            "mary@email.com",
            "Persistent headache and occasional dizziness",
            Severity::Moderate,
            "1 week",
        ),
        (
            "Robert Davis",
            "robert@email.com",
            "Lower back pain after lifting heavy objects",
            Severity::Moderate,
            "3 days",
        ),
        (
            "Sarah Wilson",
            "sarah@email.com",
            "Skin rash with itching on arms",
            Severity::Mild,
            "5 days",
        ),
        (
            "Tom Baker",
            "tom@email.com",
            "Blurred vision in the left eye",
            Severity::Mild,
            "1 day",
        ),
    ]
    .into_iter()
    .map(
        |(patient_name, patient_email, symptoms, severity, duration)| SymptomSubmission {
            patient_name: patient_name.to_string(),
            patient_email: patient_email.to_string(),
            symptoms: symptoms.to_string(),
            severity,
            duration: duration.to_string(),
        },
    )
    .collect()
}

/// Seed rules, or the rules imported from `path` when one is given.
pub(crate) fn load_rules(path: Option<&Path>) -> Result<Vec<MatchingRule>, AppError> {
    let Some(path) = path else {
        return Ok(seed_rules());
    };

    let import = RuleImporter::from_path(path)?;
    if !import.rejected.is_empty() {
        warn!(
            path = %path.display(),
            rejected = import.rejected.len(),
            "some rule rows were skipped"
        );
    }
    info!(path = %path.display(), rules = import.rules.len(), "matching rules imported");
    Ok(import.rules)
}

pub(crate) fn seeded_repository(rules: Vec<MatchingRule>) -> InMemoryTriageRepository {
    InMemoryTriageRepository::with_catalog(seed_departments(), seed_doctors(), rules)
}
