use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::{CatalogError, DepartmentDraft, DoctorDraft, RuleDraft};
use super::dashboard::DashboardSummary;
use super::domain::{
    Department, DepartmentId, Doctor, DoctorId, MatchingRule, ReportId, ReportStatus, RuleId,
    SuggestionUpdate, SymptomReport, SymptomSubmission,
};
use super::intake::{IntakeGuard, IntakeViolation};
use super::matching::{MatchOutcome, MatchingConfig, MatchingEngine, MatchingError};
use super::repository::{
    NotificationError, NotificationPublisher, PatientNotification, RepositoryError,
    TriageRepository,
};
use super::review::{apply_review, ReviewDecision, ReviewError};

/// Service composing the intake guard, repository, matching engine and review workflow.
pub struct TriageService<R, N> {
    intake: Arc<IntakeGuard>,
    repository: Arc<R>,
    notifier: Arc<N>,
    engine: Arc<MatchingEngine>,
}

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CATALOG_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("sym-{id:06}"))
}

fn next_catalog_id(prefix: &str) -> String {
    let id = CATALOG_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Per-report result of a batch matching run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BatchMatchResult {
    Suggested { suggestion: SuggestionUpdate },
    NoMatch,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMatchEntry {
    pub report_id: ReportId,
    #[serde(flatten)]
    pub result: BatchMatchResult,
}

impl<R, N> TriageService<R, N>
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: MatchingConfig) -> Self {
        Self {
            intake: Arc::new(IntakeGuard),
            repository,
            notifier,
            engine: Arc::new(MatchingEngine::new(config)),
        }
    }

    /// Submit a new symptom report, returning the stored `SUBMITTED` record.
    pub fn submit(
        &self,
        submission: SymptomSubmission,
    ) -> Result<SymptomReport, TriageServiceError> {
        let report = self
            .intake
            .report_from_submission(submission, next_report_id(), Utc::now())?;
        let stored = self.repository.insert_report(report)?;
        info!(report_id = %stored.id, severity = stored.severity.label(), "symptom report submitted");
        Ok(stored)
    }

    pub fn get(&self, report_id: &ReportId) -> Result<SymptomReport, TriageServiceError> {
        let report = self
            .repository
            .load_report(report_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(report)
    }

    pub fn list(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<SymptomReport>, TriageServiceError> {
        let reports = self.repository.list_reports()?;
        Ok(match status {
            Some(status) => reports
                .into_iter()
                .filter(|report| report.status == status)
                .collect(),
            None => reports,
        })
    }

    /// Score a submitted report and persist the suggestion when one is produced.
    pub fn run_matching(&self, report_id: &ReportId) -> Result<MatchOutcome, TriageServiceError> {
        let report = self.get(report_id)?;
        let rules = self.repository.load_rules()?;
        let doctors = self.repository.load_doctors()?;

        let outcome = self.engine.suggest(&report, &rules, &doctors)?;

        if let Some(update) = &outcome.suggestion {
            self.repository.apply_update(report_id, update)?;
            info!(
                %report_id,
                department_id = %update.suggested_department_id,
                confidence = update.confidence_score,
                doctor_assigned = update.suggested_doctor_id.is_some(),
                "symptom report auto-suggested"
            );
        } else {
            info!(%report_id, "no matching rule; report left as submitted");
        }

        Ok(outcome)
    }

    /// Match every `SUBMITTED` report. A failing report is recorded and the run continues.
    pub fn run_matching_batch(&self) -> Result<Vec<BatchMatchEntry>, TriageServiceError> {
        let pending = self.list(Some(ReportStatus::Submitted))?;
        let mut entries = Vec::with_capacity(pending.len());

        for report in pending {
            let result = match self.run_matching(&report.id) {
                Ok(MatchOutcome {
                    suggestion: Some(suggestion),
                    ..
                }) => BatchMatchResult::Suggested { suggestion },
                Ok(_) => BatchMatchResult::NoMatch,
                Err(error) => {
                    warn!(report_id = %report.id, %error, "matching failed for report");
                    BatchMatchResult::Failed {
                        error: error.to_string(),
                    }
                }
            };
            entries.push(BatchMatchEntry {
                report_id: report.id,
                result,
            });
        }

        Ok(entries)
    }

    /// Approve an auto-suggested report and notify the patient.
    ///
    /// The decision is stored before the notification is sent; a failed notification is
    /// logged and does not undo it.
    pub fn approve(
        &self,
        report_id: &ReportId,
        notes: Option<String>,
    ) -> Result<SymptomReport, TriageServiceError> {
        self.review(report_id, ReviewDecision::Approve, notes)
    }

    /// Reject a submitted or auto-suggested report. Notification failures are logged only.
    pub fn reject(
        &self,
        report_id: &ReportId,
        notes: Option<String>,
    ) -> Result<SymptomReport, TriageServiceError> {
        self.review(report_id, ReviewDecision::Reject, notes)
    }

    fn review(
        &self,
        report_id: &ReportId,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<SymptomReport, TriageServiceError> {
        let mut report = self.get(report_id)?;
        apply_review(&mut report, decision, notes, Utc::now())?;
        self.repository.update_report(report.clone())?;

        let mut details = BTreeMap::new();
        details.insert("status".to_string(), report.status.label().to_string());
        if let Some(department_id) = &report.suggested_department_id {
            details.insert("department_id".to_string(), department_id.to_string());
        }
        if let Some(doctor_id) = &report.suggested_doctor_id {
            details.insert("doctor_id".to_string(), doctor_id.to_string());
        }
        if let Some(notes) = &report.admin_notes {
            details.insert("notes".to_string(), notes.clone());
        }

        let template = match decision {
            ReviewDecision::Approve => "symptom_approved",
            ReviewDecision::Reject => "symptom_rejected",
        };
        if let Err(error) = self.notifier.publish(PatientNotification {
            template: template.to_string(),
            report_id: report.id.clone(),
            recipient: report.patient_email.clone(),
            details,
        }) {
            warn!(%report_id, %error, "review stored but patient notification failed");
        }

        info!(%report_id, status = report.status.label(), "symptom report reviewed");
        Ok(report)
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, TriageServiceError> {
        let reports = self.repository.list_reports()?;
        let doctors = self.repository.load_doctors()?;
        let departments = self.repository.load_departments()?;
        let rules = self.repository.load_rules()?;
        Ok(DashboardSummary::build(
            &reports,
            &doctors,
            &departments,
            rules.len(),
        ))
    }

    pub fn rules(&self) -> Result<Vec<MatchingRule>, TriageServiceError> {
        Ok(self.repository.load_rules()?)
    }

    pub fn create_rule(&self, draft: RuleDraft) -> Result<MatchingRule, TriageServiceError> {
        let rule = draft.into_rule(RuleId(next_catalog_id("rule")))?;
        self.repository.save_rule(rule.clone())?;
        Ok(rule)
    }

    pub fn update_rule(
        &self,
        rule_id: &RuleId,
        draft: RuleDraft,
    ) -> Result<MatchingRule, TriageServiceError> {
        let exists = self
            .repository
            .load_rules()?
            .iter()
            .any(|rule| &rule.id == rule_id);
        if !exists {
            return Err(RepositoryError::NotFound.into());
        }
        let rule = draft.into_rule(rule_id.clone())?;
        self.repository.save_rule(rule.clone())?;
        Ok(rule)
    }

    pub fn delete_rule(&self, rule_id: &RuleId) -> Result<(), TriageServiceError> {
        Ok(self.repository.remove_rule(rule_id)?)
    }

    pub fn doctors(&self) -> Result<Vec<Doctor>, TriageServiceError> {
        Ok(self.repository.load_doctors()?)
    }

    pub fn create_doctor(&self, draft: DoctorDraft) -> Result<Doctor, TriageServiceError> {
        let doctor = draft.into_doctor(DoctorId(next_catalog_id("doc")))?;
        self.repository.save_doctor(doctor.clone())?;
        Ok(doctor)
    }

    pub fn update_doctor(
        &self,
        doctor_id: &DoctorId,
        draft: DoctorDraft,
    ) -> Result<Doctor, TriageServiceError> {
        let exists = self
            .repository
            .load_doctors()?
            .iter()
            .any(|doctor| &doctor.id == doctor_id);
        if !exists {
            return Err(RepositoryError::NotFound.into());
        }
        let doctor = draft.into_doctor(doctor_id.clone())?;
        self.repository.save_doctor(doctor.clone())?;
        Ok(doctor)
    }

    pub fn delete_doctor(&self, doctor_id: &DoctorId) -> Result<(), TriageServiceError> {
        Ok(self.repository.remove_doctor(doctor_id)?)
    }

    pub fn departments(&self) -> Result<Vec<Department>, TriageServiceError> {
        Ok(self.repository.load_departments()?)
    }

    pub fn create_department(
        &self,
        draft: DepartmentDraft,
    ) -> Result<Department, TriageServiceError> {
        let department = draft.into_department(DepartmentId(next_catalog_id("dept")))?;
        self.repository.save_department(department.clone())?;
        Ok(department)
    }

    pub fn update_department(
        &self,
        department_id: &DepartmentId,
        draft: DepartmentDraft,
    ) -> Result<Department, TriageServiceError> {
        let exists = self
            .repository
            .load_departments()?
            .iter()
            .any(|department| &department.id == department_id);
        if !exists {
            return Err(RepositoryError::NotFound.into());
        }
        let department = draft.into_department(department_id.clone())?;
        self.repository.save_department(department.clone())?;
        Ok(department)
    }

    pub fn delete_department(&self, department_id: &DepartmentId) -> Result<(), TriageServiceError> {
        Ok(self.repository.remove_department(department_id)?)
    }
}

/// Error raised by the triage service.
#[derive(Debug, thiserror::Error)]
pub enum TriageServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Matching(#[from] MatchingError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}
