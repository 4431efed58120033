//! End-to-end triage scenarios driven through the public service facade and HTTP router:
//! intake, matching with imported rules, review and the dashboard.

mod common {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::response::Response;
    use serde_json::Value;

    use medcare::workflows::triage::{
        Department, DepartmentId, Doctor, DoctorId, InMemoryNotifier, InMemoryTriageRepository,
        MatchingConfig, MatchingRule, Severity, SymptomSubmission, TriageService,
    };

    pub(super) type Service = TriageService<InMemoryTriageRepository, InMemoryNotifier>;

    pub(super) fn departments() -> Vec<Department> {
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

    pub(super) fn doctors() -> Vec<Doctor> {
        [
            ("1", "Emily Chen", "1", true),
            ("2", "Michael Ross", "2", true),
            ("3", "Lisa Park", "3", true),
            ("4", "James Wright", "4", false),
            ("5", "Anna Miller", "5", true),
        ]
        .into_iter()
        .map(|(id, name, department, available)| Doctor {
            id: DoctorId::from(id),
            name: name.to_string(),
            email: format!("doctor{id}@medcare.com"),
            department_id: DepartmentId::from(department),
            specialization: None,
            is_available: available,
        })
        .collect()
    }

    pub(super) fn service_with_rules(
        rules: Vec<MatchingRule>,
    ) -> (Arc<Service>, Arc<InMemoryNotifier>) {
        let repository = Arc::new(InMemoryTriageRepository::with_catalog(
            departments(),
            doctors(),
            rules,
        ));
        let notifier = Arc::new(InMemoryNotifier::default());
        let service = TriageService::new(repository, notifier.clone(), MatchingConfig::default());
        (Arc::new(service), notifier)
    }

    pub(super) fn submission(symptoms: &str) -> SymptomSubmission {
        SymptomSubmission {
            patient_name: "John Smith".to_string(),
            patient_email: "john@email.com".to_string(),
            symptoms: symptoms.to_string(),
            severity: Severity::Severe,
            duration: "2 days".to_string(),
        }
    }

    pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serializable body")))
            .expect("valid request")
    }

    pub(super) async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }
}

use std::io::Cursor;

use axum::http::StatusCode;
use medcare::workflows::rules_import::RuleImporter;
use medcare::workflows::triage::{
    triage_router, DepartmentId, DoctorId, ReportStatus, TriageServiceError,
};
use serde_json::json;
use tower::ServiceExt;

use common::*;

const RULES_CSV: &str = "\
id,keywords,department_id,priority,confidence_weight
1,\"chest pain,heart,palpitations,shortness of breath\",2,1,0.9
2,\"headache,migraine,dizziness,numbness\",4,1,0.85
3,\"back pain,joint pain,fracture,sprain\",3,2,0.8
4,\"rash,itching,acne,skin\",5,2,0.85
5,\"fever,cold,flu,cough,fatigue\",1,3,0.7
6,,1,1,0.5
";

fn imported_rules() -> Vec<medcare::workflows::triage::MatchingRule> {
    let import = RuleImporter::from_reader(Cursor::new(RULES_CSV)).expect("rules parse");
    assert_eq!(import.rejected.len(), 1, "keywordless row is rejected");
    import.rules
}

#[test]
fn imported_rules_drive_the_full_review_cycle() {
    let (service, notifier) = service_with_rules(imported_rules());

    let report = service
        .submit(submission(
            "Experiencing chest pain and shortness of breath for 2 days",
        ))
        .expect("submission accepted");
    assert_eq!(report.status, ReportStatus::Submitted);

    let outcome = service.run_matching(&report.id).expect("matching runs");
    let suggestion = outcome.suggestion.expect("cardiology suggested");
    assert_eq!(suggestion.suggested_department_id, DepartmentId::from("2"));
    assert_eq!(suggestion.suggested_doctor_id, Some(DoctorId::from("2")));
    assert_eq!(suggestion.confidence_score, 0.45);

    let approved = service
        .approve(&report.id, Some("Patient scheduled for consultation".to_string()))
        .expect("approval succeeds");
    assert_eq!(approved.status, ReportStatus::Approved);
    assert_eq!(notifier.events().len(), 1);

    match service.reject(&report.id, None) {
        Err(TriageServiceError::Review(_)) => {}
        other => panic!("approved reports are final, got {other:?}"),
    }
}

#[test]
fn unmatched_reports_stay_in_the_queue() {
    let (service, _) = service_with_rules(imported_rules());
    let report = service
        .submit(submission("Blurred vision in the left eye"))
        .expect("submission accepted");

    let outcome = service.run_matching(&report.id).expect("matching runs");

    assert!(outcome.is_no_match());
    let stored = service.get(&report.id).expect("report stored");
    assert_eq!(stored.status, ReportStatus::Submitted);
    let pending = service
        .list(Some(ReportStatus::Submitted))
        .expect("list succeeds");
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn http_workflow_submits_matches_and_summarizes() {
    let (service, _) = service_with_rules(imported_rules());
    let app = triage_router(service);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/symptoms",
            json!({
                "patient_name": "Mary Johnson",
                "patient_email": "mary@email.com",
                "symptoms": "Skin rash with itching on arms",
                "severity": "mild",
                "duration": "1 week"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let report = read_json(response).await;
    let report_id = report["id"].as_str().expect("id assigned").to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/symptoms/{report_id}/match"),
            json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json(response).await;
    assert_eq!(outcome["suggestion"]["suggested_department_id"], json!("5"));
    assert_eq!(outcome["suggestion"]["suggested_doctor_id"], json!("5"));

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/api/v1/dashboard")
                .body(axum::body::Body::empty())
                .expect("valid request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let summary = read_json(response).await;
    assert_eq!(summary["status_counts"]["auto_suggested"], json!(1));
    assert_eq!(summary["rule_count"], json!(5));
}
