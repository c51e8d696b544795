use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::IndexCatalog;
use super::domain::{IndexKey, InputRecord, ScoreResult};
use super::engine::{ScoreEngine, ScoreError};
use super::table::{ScoreTable, TableRequest, YearObservation};
use super::validation::InvalidInput;
use crate::geometry::{GeometrySummary, ProjectGeometry};

/// Form submission for a single project year. The area may be given directly or derived
/// from the project polygon; an explicit `area_m2` wins when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub project_name: String,
    pub year: i32,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub indices: BTreeMap<IndexKey, f64>,
}

/// Form submission for a range of years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSubmission {
    pub project_name: String,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub observations: Vec<YearObservation>,
}

/// Synchronous handler layer between the form and the engine.
#[derive(Debug, Clone)]
pub struct ScoringService {
    engine: ScoreEngine,
}

impl ScoringService {
    pub fn new(engine: ScoreEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoreEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &IndexCatalog {
        self.engine.catalog()
    }

    pub fn score(&self, submission: ScoreSubmission) -> Result<ScoreResult, ScoreError> {
        let area_m2 = resolve_area(submission.area_m2, submission.geometry)?;
        let record = InputRecord {
            project_name: submission.project_name,
            year: submission.year,
            area_m2,
            indices: submission.indices,
        };
        self.engine.score(&record)
    }

    pub fn table(&self, submission: TableSubmission) -> Result<ScoreTable, ScoreError> {
        let area_m2 = resolve_area(submission.area_m2, submission.geometry)?;
        let request = TableRequest {
            project_name: submission.project_name,
            start_year: submission.start_year,
            end_year: submission.end_year,
            area_m2,
            observations: submission.observations,
        };
        self.engine.score_table(&request)
    }

    pub fn describe_geometry(&self, geometry: Value) -> Result<GeometrySummary, InvalidInput> {
        Ok(ProjectGeometry::from_value(geometry)?.summary())
    }
}

fn resolve_area(area_m2: Option<f64>, geometry: Option<Value>) -> Result<f64, InvalidInput> {
    match (area_m2, geometry) {
        (Some(area), _) => Ok(area),
        (None, Some(geometry)) => Ok(ProjectGeometry::from_value(geometry)?.area_m2()),
        (None, None) => Err(InvalidInput::new(
            "area_m2",
            "is required when geometry is absent",
        )),
    }
}
