use super::common::*;
use crate::workflows::triage::domain::{ReportId, ReportStatus};
use crate::workflows::triage::intake::{IntakeGuard, IntakeViolation};
use chrono::Utc;

#[test]
fn guard_trims_fields_and_starts_in_submitted() {
    let mut raw = submission("  Skin rash with itching on arms\n");
    raw.patient_name = " Sarah Wilson ".to_string();

    let report = IntakeGuard
        .report_from_submission(raw, ReportId::from("sym-9"), Utc::now())
        .expect("valid submission");

    assert_eq!(report.patient_name, "Sarah Wilson");
    assert_eq!(report.symptoms, "Skin rash with itching on arms");
    assert_eq!(report.status, ReportStatus::Submitted);
    assert!(report.suggested_department_id.is_none());
    assert!(report.confidence_score.is_none());
}

#[test]
fn guard_rejects_blank_required_fields() {
    let cases = [
        ("patient_name", IntakeViolation::MissingPatientName),
        ("symptoms", IntakeViolation::MissingSymptoms),
        ("duration", IntakeViolation::MissingDuration),
    ];

    for (field, expected) in cases {
        let mut raw = submission("fever");
        match field {
            "patient_name" => raw.patient_name = "  ".to_string(),
            "symptoms" => raw.symptoms = String::new(),
            _ => raw.duration = "\t".to_string(),
        }

        let err = IntakeGuard
            .report_from_submission(raw, ReportId::from("sym-x"), Utc::now())
            .expect_err("blank field rejected");
        assert_eq!(err, expected, "field {field}");
    }
}

#[test]
fn guard_rejects_malformed_email() {
    for email in ["", "mary", "@email.com", "mary@", "mary smith@email.com"] {
        let mut raw = submission("fever");
        raw.patient_email = email.to_string();

        assert!(
            matches!(
                IntakeGuard.report_from_submission(raw, ReportId::from("sym-x"), Utc::now()),
                Err(IntakeViolation::InvalidPatientEmail(_))
            ),
            "email {email:?} should be rejected"
        );
    }
}
