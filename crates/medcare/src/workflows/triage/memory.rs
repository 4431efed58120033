//! Process-local implementations of the storage and notification seams.

use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Department, DepartmentId, Doctor, DoctorId, MatchingRule, ReportId, ReportStatus, RuleId,
    SuggestionUpdate, SymptomReport,
};
use super::repository::{
    NotificationError, NotificationPublisher, PatientNotification, RepositoryError,
    TriageRepository,
};

#[derive(Debug, Default)]
struct TriageState {
    departments: Vec<Department>,
    doctors: Vec<Doctor>,
    rules: Vec<MatchingRule>,
    reports: Vec<SymptomReport>,
}

/// Mutex-guarded repository preserving insertion order for rules, doctors and reports.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTriageRepository {
    state: Arc<Mutex<TriageState>>,
}

impl InMemoryTriageRepository {
    pub fn with_catalog(
        departments: Vec<Department>,
        doctors: Vec<Doctor>,
        rules: Vec<MatchingRule>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TriageState {
                departments,
                doctors,
                rules,
                reports: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, TriageState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }
}

fn upsert<T, K, F>(items: &mut Vec<T>, item: T, key: F)
where
    F: Fn(&T) -> &K,
    K: PartialEq,
{
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

fn remove<T, K, F>(items: &mut Vec<T>, id: &K, key: F) -> Result<(), RepositoryError>
where
    F: Fn(&T) -> &K,
    K: PartialEq,
{
    let before = items.len();
    items.retain(|existing| key(existing) != id);
    if items.len() == before {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

impl TriageRepository for InMemoryTriageRepository {
    fn load_rules(&self) -> Result<Vec<MatchingRule>, RepositoryError> {
        Ok(self.lock()?.rules.clone())
    }

    fn load_doctors(&self) -> Result<Vec<Doctor>, RepositoryError> {
        Ok(self.lock()?.doctors.clone())
    }

    fn load_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        Ok(self.lock()?.departments.clone())
    }

    fn load_report(&self, id: &ReportId) -> Result<Option<SymptomReport>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.reports.iter().find(|report| &report.id == id).cloned())
    }

    fn list_reports(&self) -> Result<Vec<SymptomReport>, RepositoryError> {
        Ok(self.lock()?.reports.clone())
    }

    fn insert_report(&self, report: SymptomReport) -> Result<SymptomReport, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.reports.iter().any(|existing| existing.id == report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.reports.push(report.clone());
        Ok(report)
    }

    fn apply_update(
        &self,
        id: &ReportId,
        update: &SuggestionUpdate,
    ) -> Result<SymptomReport, RepositoryError> {
        let mut guard = self.lock()?;
        let report = guard
            .reports
            .iter_mut()
            .find(|report| &report.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if report.status != ReportStatus::Submitted {
            return Err(RepositoryError::Conflict);
        }
        report.apply_suggestion(update);
        Ok(report.clone())
    }

    fn update_report(&self, report: SymptomReport) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let slot = guard
            .reports
            .iter_mut()
            .find(|existing| existing.id == report.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = report;
        Ok(())
    }

    fn save_rule(&self, rule: MatchingRule) -> Result<(), RepositoryError> {
        upsert(&mut self.lock()?.rules, rule, |rule| &rule.id);
        Ok(())
    }

    fn remove_rule(&self, id: &RuleId) -> Result<(), RepositoryError> {
        remove(&mut self.lock()?.rules, id, |rule| &rule.id)
    }

    fn save_doctor(&self, doctor: Doctor) -> Result<(), RepositoryError> {
        upsert(&mut self.lock()?.doctors, doctor, |doctor| &doctor.id);
        Ok(())
    }

    fn remove_doctor(&self, id: &DoctorId) -> Result<(), RepositoryError> {
        remove(&mut self.lock()?.doctors, id, |doctor| &doctor.id)
    }

    fn save_department(&self, department: Department) -> Result<(), RepositoryError> {
        upsert(&mut self.lock()?.departments, department, |department| {
            &department.id
        });
        Ok(())
    }

    fn remove_department(&self, id: &DepartmentId) -> Result<(), RepositoryError> {
        remove(&mut self.lock()?.departments, id, |department| {
            &department.id
        })
    }
}

/// Publisher that records notifications instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotifier {
    events: Arc<Mutex<Vec<PatientNotification>>>,
}

impl InMemoryNotifier {
    pub fn events(&self) -> Vec<PatientNotification> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl NotificationPublisher for InMemoryNotifier {
    fn publish(&self, notification: PatientNotification) -> Result<(), NotificationError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotificationError::Transport("notifier lock poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}
