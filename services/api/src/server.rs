use crate::cli::ServeArgs;
use crate::infra::{load_rules, seeded_repository, AppState, TracingNotifier};
use crate::routes::with_triage_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use medcare::config::AppConfig;
use medcare::error::AppError;
use medcare::telemetry;
use medcare::workflows::triage::TriageService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rules = load_rules(config.rules_csv.as_deref())?;
    let repository = Arc::new(seeded_repository(rules));
    let triage_service = Arc::new(TriageService::new(
        repository,
        Arc::new(TracingNotifier),
        config.matching.clone(),
    ));

    let app = with_triage_routes(triage_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        fallback = ?config.matching.fallback,
        "symptom triage service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
