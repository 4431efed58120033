use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::{DepartmentDraft, DoctorDraft, RuleDraft};
use super::domain::{DepartmentId, DoctorId, ReportId, ReportStatus, RuleId, SymptomSubmission};
use super::repository::{NotificationPublisher, RepositoryError, TriageRepository};
use super::service::{TriageService, TriageServiceError};

type SharedService<R, N> = State<Arc<TriageService<R, N>>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusFilter {
    #[serde(default)]
    pub(crate) status: Option<ReportStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

/// Router builder exposing intake, matching, review, catalog and dashboard endpoints.
pub fn triage_router<R, N>(service: Arc<TriageService<R, N>>) -> Router
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/symptoms",
            post(submit_handler::<R, N>).get(list_handler::<R, N>),
        )
        .route("/api/v1/symptoms/match", post(batch_match_handler::<R, N>))
        .route("/api/v1/symptoms/:report_id", get(report_handler::<R, N>))
        .route(
            "/api/v1/symptoms/:report_id/match",
            post(match_handler::<R, N>),
        )
        .route(
            "/api/v1/symptoms/:report_id/approve",
            post(approve_handler::<R, N>),
        )
        .route(
            "/api/v1/symptoms/:report_id/reject",
            post(reject_handler::<R, N>),
        )
        .route(
            "/api/v1/rules",
            get(list_rules_handler::<R, N>).post(create_rule_handler::<R, N>),
        )
        .route(
            "/api/v1/rules/:rule_id",
            put(update_rule_handler::<R, N>).delete(delete_rule_handler::<R, N>),
        )
        .route(
            "/api/v1/doctors",
            get(list_doctors_handler::<R, N>).post(create_doctor_handler::<R, N>),
        )
        .route(
            "/api/v1/doctors/:doctor_id",
            put(update_doctor_handler::<R, N>).delete(delete_doctor_handler::<R, N>),
        )
        .route(
            "/api/v1/departments",
            get(list_departments_handler::<R, N>).post(create_department_handler::<R, N>),
        )
        .route(
            "/api/v1/departments/:department_id",
            put(update_department_handler::<R, N>).delete(delete_department_handler::<R, N>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R, N>))
        .with_state(service)
}

pub(crate) fn error_response(error: TriageServiceError) -> Response {
    let status = match &error {
        TriageServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        TriageServiceError::Repository(RepositoryError::Conflict)
        | TriageServiceError::Matching(_)
        | TriageServiceError::Review(_) => StatusCode::CONFLICT,
        TriageServiceError::Intake(_) | TriageServiceError::Catalog(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TriageServiceError::Repository(RepositoryError::Unavailable(_))
        | TriageServiceError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

/// Extractor failures get the same `{"error": ...}` body as service errors.
fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, TriageServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): SharedService<R, N>,
    payload: Result<axum::Json<SymptomSubmission>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(StatusCode::ACCEPTED, service.submit(submission))
}

pub(crate) async fn list_handler<R, N>(
    State(service): SharedService<R, N>,
    filter: Result<Query<StatusFilter>, QueryRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let Query(filter) = match filter {
        Ok(filter) => filter,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(StatusCode::OK, service.list(filter.status))
}

pub(crate) async fn report_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(report_id): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.get(&ReportId(report_id)))
}

pub(crate) async fn match_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(report_id): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.run_matching(&ReportId(report_id)))
}

pub(crate) async fn batch_match_handler<R, N>(State(service): SharedService<R, N>) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.run_matching_batch())
}

pub(crate) async fn approve_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(report_id): Path<String>,
    payload: Result<axum::Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.approve(&ReportId(report_id), request.notes),
    )
}

pub(crate) async fn reject_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(report_id): Path<String>,
    payload: Result<axum::Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.reject(&ReportId(report_id), request.notes),
    )
}

pub(crate) async fn list_rules_handler<R, N>(State(service): SharedService<R, N>) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.rules())
}

pub(crate) async fn create_rule_handler<R, N>(
    State(service): SharedService<R, N>,
    payload: Result<axum::Json<RuleDraft>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(StatusCode::CREATED, service.create_rule(draft))
}

pub(crate) async fn update_rule_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(rule_id): Path<String>,
    payload: Result<axum::Json<RuleDraft>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(StatusCode::OK, service.update_rule(&RuleId(rule_id), draft))
}

pub(crate) async fn delete_rule_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(rule_id): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.delete_rule(&RuleId(rule_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_doctors_handler<R, N>(State(service): SharedService<R, N>) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.doctors())
}

pub(crate) async fn create_doctor_handler<R, N>(
    State(service): SharedService<R, N>,
    payload: Result<axum::Json<DoctorDraft>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(StatusCode::CREATED, service.create_doctor(draft))
}

pub(crate) async fn update_doctor_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(doctor_id): Path<String>,
    payload: Result<axum::Json<DoctorDraft>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.update_doctor(&DoctorId(doctor_id), draft),
    )
}

pub(crate) async fn delete_doctor_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(doctor_id): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.delete_doctor(&DoctorId(doctor_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_departments_handler<R, N>(
    State(service): SharedService<R, N>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.departments())
}

pub(crate) async fn create_department_handler<R, N>(
    State(service): SharedService<R, N>,
    payload: Result<axum::Json<DepartmentDraft>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(StatusCode::CREATED, service.create_department(draft))
}

pub(crate) async fn update_department_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(department_id): Path<String>,
    payload: Result<axum::Json<DepartmentDraft>, JsonRejection>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let axum::Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    respond(
        StatusCode::OK,
        service.update_department(&DepartmentId(department_id), draft),
    )
}

pub(crate) async fn delete_department_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(department_id): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.delete_department(&DepartmentId(department_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<R, N>(State(service): SharedService<R, N>) -> Response
where
    R: TriageRepository + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::OK, service.dashboard())
}
