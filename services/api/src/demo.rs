use crate::infra::{
    load_rules, sample_submissions, seed_departments, seed_doctors, seeded_repository,
};
use chrono::Utc;
use clap::Args;
use medcare::config::AppConfig;
use medcare::error::AppError;
use medcare::workflows::triage::{
    BatchMatchResult, DashboardSummary, Department, DepartmentId, Doctor, DoctorId,
    InMemoryNotifier, MatchOutcome, MatchingEngine, ReportId, ReportStatus, Severity,
    SymptomReport, TriageService, TriageServiceError,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Free-text symptom description to score
    #[arg(long)]
    pub(crate) symptoms: String,
    /// Optional CSV export of matching rules (defaults to the seeded rules)
    #[arg(long)]
    pub(crate) rules_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional CSV export of matching rules (defaults to the seeded rules)
    #[arg(long)]
    pub(crate) rules_csv: Option<PathBuf>,
    /// Stop after matching; leave suggestions unreviewed.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules_csv = args.rules_csv.or(config.rules_csv);
    let rules = load_rules(rules_csv.as_deref())?;
    let doctors = seed_doctors();
    let departments = seed_departments();

    let report = adhoc_report(&args.symptoms);
    let engine = MatchingEngine::new(config.matching);
    let outcome = engine
        .suggest(&report, &rules, &doctors)
        .map_err(TriageServiceError::from)?;

    render_match(&args.symptoms, &outcome, &departments, &doctors);
    Ok(())
}

fn adhoc_report(symptoms: &str) -> SymptomReport {
    SymptomReport {
        id: ReportId::from("cli-adhoc"),
        patient_name: "Command line".to_string(),
        patient_email: "triage@medcare.com".to_string(),
        symptoms: symptoms.trim().to_string(),
        severity: Severity::Moderate,
        duration: "unspecified".to_string(),
        status: ReportStatus::Submitted,
        submitted_at: Utc::now(),
        suggested_department_id: None,
        suggested_doctor_id: None,
        confidence_score: None,
        admin_notes: None,
        approved_at: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules_csv = args.rules_csv.or(config.rules_csv);
    let rules = load_rules(rules_csv.as_deref())?;
    let departments = seed_departments();
    let doctors = seed_doctors();

    let notifier = Arc::new(InMemoryNotifier::default());
    let service = TriageService::new(
        Arc::new(seeded_repository(rules)),
        notifier.clone(),
        config.matching,
    );

    println!("Symptom triage demo\n");
    println!("Submitting sample reports");
    for submission in sample_submissions() {
        let report = service.submit(submission)?;
        println!(
            "- {} | {} | {} | {}",
            report.id,
            report.patient_name,
            report.severity.label(),
            report.symptoms
        );
    }

    println!("\nBatch matching");
    let entries = service.run_matching_batch()?;
    let mut first_suggested = None;
    for entry in &entries {
        match &entry.result {
            BatchMatchResult::Suggested { suggestion } => {
                first_suggested.get_or_insert_with(|| entry.report_id.clone());
                println!(
                    "- {} -> {} (doctor {}, confidence {:.2})",
                    entry.report_id,
                    department_label(&departments, &suggestion.suggested_department_id),
                    doctor_label(&doctors, suggestion.suggested_doctor_id.as_ref()),
                    suggestion.confidence_score
                );
            }
            BatchMatchResult::NoMatch => {
                println!("- {} -> no match, left for manual triage", entry.report_id);
            }
            BatchMatchResult::Failed { error } => {
                println!("- {} -> failed: {}", entry.report_id, error);
            }
        }
    }

    if args.skip_review {
        println!("\nReview skipped (--skip-review)");
    } else if let Some(report_id) = first_suggested {
        let approved = service.approve(
            &report_id,
            Some("Patient scheduled for consultation".to_string()),
        )?;
        println!(
            "\nApproved {} for {}; {} notification(s) sent",
            approved.id,
            approved.patient_name,
            notifier.events().len()
        );
    } else {
        println!("\nNo suggestions to review");
    }

    render_dashboard(&service.dashboard()?);
    Ok(())
}

fn department_label(departments: &[Department], id: &DepartmentId) -> String {
    departments
        .iter()
        .find(|department| &department.id == id)
        .map(|department| department.name.clone())
        .unwrap_or_else(|| format!("department {id}"))
}

fn doctor_label(doctors: &[Doctor], id: Option<&DoctorId>) -> String {
    match id {
        Some(id) => doctors
            .iter()
            .find(|doctor| &doctor.id == id)
            .map(|doctor| doctor.name.clone())
            .unwrap_or_else(|| id.to_string()),
        None => "unassigned".to_string(),
    }
}

fn render_match(
    symptoms: &str,
    outcome: &MatchOutcome,
    departments: &[Department],
    doctors: &[Doctor],
) {
    println!("Symptoms: {}", symptoms.trim());

    match &outcome.suggestion {
        Some(suggestion) => {
            println!(
                "Suggested department: {}",
                department_label(departments, &suggestion.suggested_department_id)
            );
            println!(
                "Suggested doctor: {}",
                doctor_label(doctors, suggestion.suggested_doctor_id.as_ref())
            );
            println!("Confidence: {:.2}", suggestion.confidence_score);
            match &suggestion.matched_rule_id {
                Some(rule_id) => println!("Matched rule: {rule_id}"),
                None => println!("Matched rule: none (fallback department)"),
            }
        }
        None => println!("No rule matched; the report would stay SUBMITTED"),
    }

    if !outcome.scores.is_empty() {
        println!("\nRule scores");
        for score in &outcome.scores {
            println!(
                "- rule {} | {} | priority {} | {}/{} keywords ({}) | {:.2}",
                score.rule_id,
                department_label(departments, &score.department_id),
                score.priority,
                score.matched_keywords.len(),
                score.total_keywords,
                score.matched_keywords.join(", "),
                score.confidence
            );
        }
    }

    if !outcome.skipped_rules.is_empty() {
        println!("\nSkipped rules");
        for skipped in &outcome.skipped_rules {
            println!("- {skipped}");
        }
    }
}

fn render_dashboard(summary: &DashboardSummary) {
    println!("\nDashboard");
    println!(
        "Reports: {} total | {} submitted | {} auto-suggested | {} approved | {} rejected",
        summary.total_reports,
        summary.status_counts.submitted,
        summary.status_counts.auto_suggested,
        summary.status_counts.approved,
        summary.status_counts.rejected
    );
    println!(
        "Doctors available: {}/{} | Active departments: {}/{} | Rules: {}",
        summary.available_doctors,
        summary.total_doctors,
        summary.active_departments,
        summary.total_departments,
        summary.rule_count
    );

    if summary.recent_submissions.is_empty() {
        println!("Awaiting triage: none");
    } else {
        println!("Awaiting triage");
        for recent in &summary.recent_submissions {
            println!(
                "- {} | {} | {} | submitted {}",
                recent.report_id,
                recent.patient_name,
                recent.severity.label(),
                recent.submitted_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::seed_rules;

    #[test]
    fn adhoc_reports_are_matchable() {
        let report = adhoc_report("  Persistent headache and occasional dizziness ");
        let outcome = MatchingEngine::default()
            .suggest(&report, &seed_rules(), &seed_doctors())
            .expect("submitted report");

        let suggestion = outcome.suggestion.expect("neurology suggested");
        assert_eq!(suggestion.suggested_department_id, DepartmentId::from("4"));
        assert!(suggestion.suggested_doctor_id.is_none());
    }

    #[test]
    fn labels_fall_back_to_ids() {
        let departments = seed_departments();
        assert_eq!(
            department_label(&departments, &DepartmentId::from("2")),
            "Cardiology"
        );
        assert_eq!(
            department_label(&departments, &DepartmentId::from("99")),
            "department 99"
        );
        assert_eq!(doctor_label(&seed_doctors(), None), "unassigned");
    }
}
