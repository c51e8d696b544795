use bioscore::config::ScoringConfig;
use bioscore::credentials::ServiceAccount;
use bioscore::error::AppError;
use bioscore::scoring::{IndexCatalog, IndexKey, ScoreEngine, ScoringService, YearWindow};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) credentials: Option<Arc<ServiceAccount>>,
}

/// Catalog from `indices_file` when configured, otherwise the built-in indices.
pub(crate) fn load_catalog(indices_file: Option<&Path>) -> Result<IndexCatalog, AppError> {
    match indices_file {
        Some(path) => {
            let catalog = IndexCatalog::load(path)?;
            info!(path = %path.display(), indices = catalog.len(), "loaded index catalog");
            Ok(catalog)
        }
        None => Ok(IndexCatalog::builtin()),
    }
}

pub(crate) fn build_scoring_service(config: &ScoringConfig) -> Result<ScoringService, AppError> {
    let catalog = load_catalog(config.indices_file.as_deref())?;
    let window = YearWindow::new(config.min_year, config.max_year);
    Ok(ScoringService::new(ScoreEngine::new(catalog, window)))
}

/// Parses `key=value` index observations given on the command line.
pub(crate) fn parse_index_pair(raw: &str) -> Result<(IndexKey, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing index key in '{raw}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{value}' as a number ({err})"))?;
    Ok((IndexKey::from(key), value))
}
