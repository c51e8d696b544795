use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::scoring::{
    scoring_router, IndexCatalog, IndexKey, InputRecord, ScoreEngine, ScoringService,
    YearObservation, YearWindow,
};

pub(super) fn window() -> YearWindow {
    YearWindow::new(2015, 2022)
}

pub(super) fn engine() -> ScoreEngine {
    ScoreEngine::new(IndexCatalog::builtin(), window())
}

pub(super) fn service() -> Arc<ScoringService> {
    Arc::new(ScoringService::new(engine()))
}

pub(super) fn router() -> axum::Router {
    scoring_router(service())
}

pub(super) fn indices(entries: &[(&str, f64)]) -> BTreeMap<IndexKey, f64> {
    entries
        .iter()
        .map(|(key, value)| (IndexKey::from(*key), *value))
        .collect()
}

pub(super) fn record() -> InputRecord {
    InputRecord {
        project_name: "Test Project".to_string(),
        year: 2020,
        area_m2: 1_256_637_061.44,
        indices: indices(&[("ndvi", 0.62), ("protected", 0.4)]),
    }
}

pub(super) fn observation(year: i32, entries: &[(&str, f64)]) -> YearObservation {
    YearObservation {
        year,
        indices: indices(entries),
    }
}

/// Closed square of `size` degrees with its south-west corner at the given position.
pub(super) fn square(lon: f64, lat: f64, size: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [lon, lat],
            [lon + size, lat],
            [lon + size, lat + size],
            [lon, lat + size],
            [lon, lat]
        ]]
    })
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
