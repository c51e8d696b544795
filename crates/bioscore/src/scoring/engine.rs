use std::sync::Arc;

use tracing::debug;

use super::catalog::IndexCatalog;
use super::domain::{
    round2, BiodiversityBand, InputRecord, ScoreComponent, ScorePeriod, ScoreResult,
};
use super::validation::{validate_record, InvalidInput, YearWindow};

/// Failure of a single scoring invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("could not compute score: {0}")]
    Computation(String),
}

impl ScoreError {
    pub fn computation(reason: impl Into<String>) -> Self {
        Self::Computation(reason.into())
    }
}

/// Raw numbers a strategy produces for an already validated record.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub value: f64,
    pub score: f64,
    pub components: Vec<ScoreComponent>,
}

/// Formula turning validated index observations into a bioscore.
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(
        &self,
        record: &InputRecord,
        catalog: &IndexCatalog,
    ) -> Result<StrategyOutput, ScoreError>;
}

/// Mean of the index zonal means, scaled by the region area.
///
/// `value = round2(mean(indices))`, `score = round2(value * area_m2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZonalMeanStrategy;

impl ScoringStrategy for ZonalMeanStrategy {
    fn name(&self) -> &'static str {
        "zonal_mean"
    }

    fn compute(
        &self,
        record: &InputRecord,
        catalog: &IndexCatalog,
    ) -> Result<StrategyOutput, ScoreError> {
        if record.indices.is_empty() {
            return Err(ScoreError::computation("no index observations to average"));
        }

        let mut components = Vec::with_capacity(record.indices.len());
        for (key, value) in &record.indices {
            let definition = catalog.get(key).ok_or_else(|| {
                ScoreError::computation(format!("index `{key}` is not cataloged"))
            })?;
            let span = definition.span();
            if span <= 0.0 {
                return Err(ScoreError::computation(format!(
                    "index `{key}` has a zero-width domain"
                )));
            }
            let normalized = (value - definition.min) / span;
            components.push(ScoreComponent {
                index: key.clone(),
                name: definition.name.clone(),
                value: *value,
                normalized,
                notes: format!(
                    "{} {:.2} within [{}, {}]",
                    definition.name, value, definition.min, definition.max
                ),
            });
        }

        let mean = record.indices.values().sum::<f64>() / record.indices.len() as f64;
        let value = round2(mean);
        let score = round2(value * record.area_m2);
        if !value.is_finite() || !score.is_finite() {
            return Err(ScoreError::computation(format!(
                "score is not finite for area {} m2",
                record.area_m2
            )));
        }

        Ok(StrategyOutput {
            value,
            score,
            components,
        })
    }
}

/// Stateless evaluator: validates a record, then applies the configured strategy.
#[derive(Clone)]
pub struct ScoreEngine {
    catalog: Arc<IndexCatalog>,
    window: YearWindow,
    strategy: Arc<dyn ScoringStrategy>,
}

impl std::fmt::Debug for ScoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreEngine")
            .field("indices", &self.catalog.len())
            .field("window", &self.window)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl ScoreEngine {
    pub fn new(catalog: IndexCatalog, window: YearWindow) -> Self {
        Self::with_strategy(catalog, window, Arc::new(ZonalMeanStrategy))
    }

    pub fn with_strategy(
        catalog: IndexCatalog,
        window: YearWindow,
        strategy: Arc<dyn ScoringStrategy>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            window,
            strategy,
        }
    }

    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }

    pub fn window(&self) -> YearWindow {
        self.window
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn score(&self, record: &InputRecord) -> Result<ScoreResult, ScoreError> {
        validate_record(record, &self.catalog, &self.window)?;

        let output = self.strategy.compute(record, &self.catalog)?;
        let period = ScorePeriod::for_year(record.year).ok_or_else(|| {
            ScoreError::computation(format!("{} is outside the calendar range", record.year))
        })?;

        if output.components.is_empty() {
            return Err(ScoreError::computation(format!(
                "strategy `{}` returned no index components",
                self.strategy.name()
            )));
        }
        let normalized = output
            .components
            .iter()
            .map(|component| component.normalized)
            .sum::<f64>()
            / output.components.len() as f64;
        if !normalized.is_finite() {
            return Err(ScoreError::computation("index normalization is not finite"));
        }

        debug!(
            project = %record.project_name,
            year = record.year,
            value = output.value,
            score = output.score,
            strategy = self.strategy.name(),
            "scored project year"
        );

        Ok(ScoreResult {
            project_name: record.project_name.trim().to_string(),
            year: record.year,
            period,
            value: output.value,
            area_m2: record.area_m2,
            score: output.score,
            category: BiodiversityBand::from_normalized(normalized),
            components: output.components,
            input: record.clone(),
        })
    }
}
