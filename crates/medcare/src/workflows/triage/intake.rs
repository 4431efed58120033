use chrono::{DateTime, Utc};

use super::domain::{ReportId, ReportStatus, SymptomReport, SymptomSubmission};

/// Validation errors raised by the intake guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("patient name is required")]
    MissingPatientName,
    #[error("patient email '{0}' is not a valid address")]
    InvalidPatientEmail(String),
    #[error("symptom description is required")]
    MissingSymptoms,
    #[error("symptom duration is required")]
    MissingDuration,
}

/// Guard responsible for producing `SymptomReport` instances from patient submissions.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Convert an inbound submission into a report awaiting triage.
    pub fn report_from_submission(
        &self,
        submission: SymptomSubmission,
        id: ReportId,
        submitted_at: DateTime<Utc>,
    ) -> Result<SymptomReport, IntakeViolation> {
        let patient_name = submission.patient_name.trim().to_string();
        if patient_name.is_empty() {
            return Err(IntakeViolation::MissingPatientName);
        }

        let patient_email = submission.patient_email.trim().to_string();
        if !looks_like_email(&patient_email) {
            return Err(IntakeViolation::InvalidPatientEmail(patient_email));
        }

        let symptoms = submission.symptoms.trim().to_string();
        if symptoms.is_empty() {
            return Err(IntakeViolation::MissingSymptoms);
        }

        let duration = submission.duration.trim().to_string();
        if duration.is_empty() {
            return Err(IntakeViolation::MissingDuration);
        }

        Ok(SymptomReport {
            id,
            patient_name,
            patient_email,
            symptoms,
            severity: submission.severity,
            duration,
            status: ReportStatus::Submitted,
            submitted_at,
            suggested_department_id: None,
            suggested_doctor_id: None,
            confidence_score: None,
            admin_notes: None,
            approved_at: None,
        })
    }
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
