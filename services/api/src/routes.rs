use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json};
use bioscore::scoring::{scoring_router, ScoringService};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const APP_JS: &str = include_str!("../assets/app.js");
const STYLE_CSS: &str = include_str!("../assets/style.css");

#[derive(Debug, Serialize)]
pub(crate) struct ReadinessView {
    status: &'static str,
    credentials_loaded: bool,
}

pub(crate) fn with_service_routes(service: Arc<ScoringService>) -> axum::Router {
    scoring_router(service)
        .route("/", get(index_page))
        .route("/assets/:file", get(asset))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn asset(Path(file): Path<String>) -> Response {
    let body = match file.as_str() {
        "app.js" => APP_JS,
        "style.css" => STYLE_CSS,
        _ => {
            return (StatusCode::NOT_FOUND, Json(json!({ "error": "asset not found" })))
                .into_response()
        }
    };
    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.essence_str().to_string())],
        body,
    )
        .into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = ReadinessView {
        status: if ready { "ready" } else { "initializing" },
        credentials_loaded: state.credentials.is_some(),
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
