//! Symptom-to-department matching.
//!
//! Scores a report's free text against keyword rules and proposes a department, a doctor
//! and a confidence. The engine only reads the slices it is given and returns a
//! [`SuggestionUpdate`] for the caller to persist.

mod config;
mod policy;
mod rules;

pub use config::{FallbackPolicy, MatchingConfig, DEFAULT_FALLBACK_CONFIDENCE};
pub use rules::{MalformedRule, RuleScore};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{
    Doctor, MatchingRule, ReportId, ReportStatus, SuggestionUpdate, SymptomReport,
};

/// Raised when matching is requested for a report that is no longer awaiting triage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchingError {
    #[error("report {report_id} is {status}; only SUBMITTED reports can be matched")]
    InvalidState {
        report_id: ReportId,
        status: ReportStatus,
    },
}

/// Result of one scan. `suggestion` is `None` when nothing matched and no fallback applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub report_id: ReportId,
    pub suggestion: Option<SuggestionUpdate>,
    pub scores: Vec<RuleScore>,
    pub skipped_rules: Vec<MalformedRule>,
}

impl MatchOutcome {
    pub fn is_no_match(&self) -> bool {
        self.suggestion.is_none()
    }
}

/// Stateless matcher applying the configured no-match policy.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn suggest(
        &self,
        report: &SymptomReport,
        rules: &[MatchingRule],
        doctors: &[Doctor],
    ) -> Result<MatchOutcome, MatchingError> {
        let mut outcome = compute_suggestion(report, rules, doctors)?;

        if outcome.suggestion.is_none() {
            if let FallbackPolicy::DefaultDepartment {
                department_id,
                confidence,
            } = &self.config.fallback
            {
                debug!(report_id = %report.id, %department_id, "no rule matched; using fallback department");
                outcome.suggestion = Some(SuggestionUpdate {
                    status: ReportStatus::AutoSuggested,
                    suggested_department_id: department_id.clone(),
                    suggested_doctor_id: policy::select_doctor(doctors, department_id),
                    confidence_score: policy::round_confidence(*confidence),
                    matched_rule_id: None,
                });
            }
        }

        Ok(outcome)
    }
}

/// Score `report` against `rules` and pick a doctor from `doctors`, leaving no-match reports untouched.
pub fn compute_suggestion(
    report: &SymptomReport,
    rules: &[MatchingRule],
    doctors: &[Doctor],
) -> Result<MatchOutcome, MatchingError> {
    if report.status != ReportStatus::Submitted {
        return Err(MatchingError::InvalidState {
            report_id: report.id.clone(),
            status: report.status,
        });
    }

    let haystack = report.symptoms.to_lowercase();
    let mut scores = Vec::new();
    let mut skipped_rules = Vec::new();

    for rule in rules {
        let keywords = match rules::validate_rule(rule) {
            Ok(keywords) => keywords,
            Err(malformed) => {
                warn!(report_id = %report.id, error = %malformed, "skipping malformed matching rule");
                skipped_rules.push(malformed);
                continue;
            }
        };

        if let Some(score) = rules::score_rule(rule, keywords, &haystack) {
            scores.push(score);
        }
    }

    let suggestion = policy::best_score(&scores).map(|best| SuggestionUpdate {
        status: ReportStatus::AutoSuggested,
        suggested_department_id: best.department_id.clone(),
        suggested_doctor_id: policy::select_doctor(doctors, &best.department_id),
        confidence_score: policy::round_confidence(best.confidence),
        matched_rule_id: Some(best.rule_id.clone()),
    });

    match &suggestion {
        Some(update) => debug!(
            report_id = %report.id,
            department_id = %update.suggested_department_id,
            confidence = update.confidence_score,
            "matched symptom report"
        ),
        None => debug!(report_id = %report.id, rules = rules.len(), "no matching rule"),
    }

    Ok(MatchOutcome {
        report_id: report.id.clone(),
        suggestion,
        scores,
        skipped_rules,
    })
}
