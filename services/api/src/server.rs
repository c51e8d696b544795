use crate::cli::ServeArgs;
use crate::infra::{build_scoring_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bioscore::config::AppConfig;
use bioscore::credentials::ServiceAccount;
use bioscore::error::AppError;
use bioscore::telemetry;
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

    let credentials = ServiceAccount::discover(&config.credentials)?.map(Arc::new);
    let service = Arc::new(build_scoring_service(&config.scoring)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        credentials,
    };

    let app = with_service_routes(service.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    let window = service.engine().window();
    info!(
        ?config.environment,
        %addr,
        min_year = window.min_year,
        max_year = window.max_year,
        indices = service.catalog().len(),
        "bioscore service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
