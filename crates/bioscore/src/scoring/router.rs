use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::catalog::IndexDefinition;
use super::domain::IndexKey;
use super::engine::ScoreError;
use super::service::{ScoreSubmission, ScoringService, TableSubmission};
use super::validation::InvalidInput;
use crate::observations::ObservationImporter;

/// Router builder exposing the scoring form endpoints.
pub fn scoring_router(service: Arc<ScoringService>) -> Router {
    Router::new()
        .route("/api/v1/score", post(score_handler))
        .route("/api/v1/score/table", post(table_handler))
        .route("/api/v1/geometry", post(geometry_handler))
        .route("/api/v1/indices", get(indices_handler))
        .route("/api/v1/observations", post(observations_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TableFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TableQuery {
    #[serde(default)]
    pub(crate) format: TableFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct IndexView {
    key: IndexKey,
    #[serde(flatten)]
    definition: IndexDefinition,
}

#[derive(Debug, Serialize)]
pub(crate) struct IndicesResponse {
    min_year: i32,
    max_year: i32,
    strategy: &'static str,
    indices: Vec<IndexView>,
}

pub(crate) async fn score_handler(
    State(service): State<Arc<ScoringService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let submission: ScoreSubmission = match decode_payload(payload) {
        Ok(submission) => submission,
        Err(response) => return response,
    };

    match service.score(submission) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => score_error_response(err),
    }
}

pub(crate) async fn table_handler(
    State(service): State<Arc<ScoringService>>,
    Query(query): Query<TableQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let submission: TableSubmission = match decode_payload(payload) {
        Ok(submission) => submission,
        Err(response) => return response,
    };

    let table = match service.table(submission) {
        Ok(table) => table,
        Err(err) => return score_error_response(err),
    };

    match query.format {
        TableFormat::Json => (StatusCode::OK, Json(table)).into_response(),
        TableFormat::Csv => match table.to_csv() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(err) => {
                error!(%err, "failed to render score table as csv");
                let payload = json!({ "error": "could not export score table" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        },
    }
}

pub(crate) async fn geometry_handler(
    State(service): State<Arc<ScoringService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(geometry) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.describe_geometry(geometry) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(invalid) => invalid_input_response(invalid),
    }
}

/// Groups a `metric,year,value` CSV export into yearly observations for the table form.
pub(crate) async fn observations_handler(body: String) -> Response {
    match ObservationImporter::from_reader(body.as_bytes()) {
        Ok(observations) => (StatusCode::OK, Json(observations)).into_response(),
        Err(err) => invalid_input_response(InvalidInput::new("observations", err.to_string())),
    }
}

pub(crate) async fn indices_handler(State(service): State<Arc<ScoringService>>) -> Response {
    let engine = service.engine();
    let window = engine.window();
    let indices = engine
        .catalog()
        .iter()
        .map(|(key, definition)| IndexView {
            key: key.clone(),
            definition: definition.clone(),
        })
        .collect();

    let payload = IndicesResponse {
        min_year: window.min_year,
        max_year: window.max_year,
        strategy: engine.strategy_name(),
        indices,
    };
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) fn score_error_response(err: ScoreError) -> Response {
    match err {
        ScoreError::InvalidInput(invalid) => invalid_input_response(invalid),
        ScoreError::Computation(reason) => {
            error!(%reason, "score computation failed");
            let payload = json!({
                "error": "could not compute score",
                "detail": reason,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn invalid_input_response(invalid: InvalidInput) -> Response {
    warn!(field = %invalid.field, constraint = %invalid.constraint, "rejected submission");
    let payload = json!({
        "error": invalid.to_string(),
        "field": invalid.field,
        "constraint": invalid.constraint,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn decode_payload<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, Response> {
    let Json(value) = payload.map_err(rejection_response)?;
    serde_path_to_error::deserialize(value).map_err(|err| {
        let invalid = field_error(&err.path().to_string(), &err.inner().to_string());
        invalid_input_response(invalid)
    })
}

/// Names the offending field of a payload that parsed as JSON but not as the expected shape.
///
/// Missing fields are reported against their parent path, so the name is taken from the message.
pub(crate) fn field_error(path: &str, message: &str) -> InvalidInput {
    let parent = if path == "." { "" } else { path };
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name);

    match (missing, parent.is_empty()) {
        (Some(name), true) => InvalidInput::new(name, "is required"),
        (Some(name), false) => InvalidInput::new(format!("{parent}.{name}"), "is required"),
        (None, true) => InvalidInput::new("body", message),
        (None, false) => InvalidInput::new(parent, message),
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let payload = json!({
        "error": rejection.body_text(),
        "field": Value::Null,
    });
    (status, Json(payload)).into_response()
}
