use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Department, Doctor, ReportId, ReportStatus, Severity, SymptomReport};

const RECENT_SUBMISSION_LIMIT: usize = 5;

/// Operations overview shown on the admin landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub status_counts: StatusCounts,
    pub total_reports: usize,
    pub available_doctors: usize,
    pub total_doctors: usize,
    pub active_departments: usize,
    pub total_departments: usize,
    pub rule_count: usize,
    pub recent_submissions: Vec<RecentSubmissionView>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub submitted: usize,
    pub auto_suggested: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn record(&mut self, status: ReportStatus) {
        match status {
            ReportStatus::Submitted => self.submitted += 1,
            ReportStatus::AutoSuggested => self.auto_suggested += 1,
            ReportStatus::Approved => self.approved += 1,
            ReportStatus::Rejected => self.rejected += 1,
        }
    }
}

/// Reports still waiting for matching, trimmed to what the landing page lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentSubmissionView {
    pub report_id: ReportId,
    pub patient_name: String,
    pub severity: Severity,
    pub submitted_at: DateTime<Utc>,
}

impl DashboardSummary {
    pub fn build(
        reports: &[SymptomReport],
        doctors: &[Doctor],
        departments: &[Department],
        rule_count: usize,
    ) -> Self {
        let mut status_counts = StatusCounts::default();
        for report in reports {
            status_counts.record(report.status);
        }

        let mut pending: Vec<&SymptomReport> = reports
            .iter()
            .filter(|report| report.status == ReportStatus::Submitted)
            .collect();
        pending.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        let recent_submissions = pending
            .into_iter()
            .take(RECENT_SUBMISSION_LIMIT)
            .map(|report| RecentSubmissionView {
                report_id: report.id.clone(),
                patient_name: report.patient_name.clone(),
                severity: report.severity,
                submitted_at: report.submitted_at,
            })
            .collect();

        Self {
            status_counts,
            total_reports: reports.len(),
            available_doctors: doctors.iter().filter(|doctor| doctor.is_available).count(),
            total_doctors: doctors.len(),
            active_departments: departments
                .iter()
                .filter(|department| department.is_active)
                .count(),
            total_departments: departments.len(),
            rule_count,
            recent_submissions,
        }
    }
}
