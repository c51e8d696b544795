use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{IndexKey, InputRecord};
use super::engine::{ScoreEngine, ScoreError};
use super::validation::{check_area, check_project_name, InvalidInput};

/// Zonal means observed for one year of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearObservation {
    pub year: i32,
    pub indices: BTreeMap<IndexKey, f64>,
}

/// A multi-year scoring request over `[start_year, end_year]`, both inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRequest {
    pub project_name: String,
    pub start_year: i32,
    pub end_year: i32,
    pub area_m2: f64,
    #[serde(default)]
    pub observations: Vec<YearObservation>,
}

/// One line of the per-year score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub year: i32,
    pub project_name: String,
    pub value: f64,
    pub area: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub project_name: String,
    pub start_year: i32,
    pub end_year: i32,
    pub rows: Vec<ScoreRow>,
    /// Years inside the range that had no observations to score.
    pub missing_years: Vec<i32>,
}

impl ScoreTable {
    pub fn total_score(&self) -> f64 {
        self.rows.iter().map(|row| row.score).sum()
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.rows.is_empty() {
            writer.write_record(["year", "project_name", "value", "area", "score"])?;
        }
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl ScoreEngine {
    /// Score every observed year of a project, ordered by year.
    pub fn score_table(&self, request: &TableRequest) -> Result<ScoreTable, ScoreError> {
        check_project_name(&request.project_name)?;
        let window = self.window();
        window.check("start_year", request.start_year)?;
        window.check("end_year", request.end_year)?;
        if request.end_year < request.start_year {
            return Err(InvalidInput::new(
                "end_year",
                format!("must be >= start_year ({})", request.start_year),
            )
            .into());
        }
        check_area("area_m2", request.area_m2)?;

        let mut seen = BTreeSet::new();
        let mut ordered: Vec<(usize, &YearObservation)> = Vec::new();
        for (position, observation) in request.observations.iter().enumerate() {
            let field = format!("observations[{position}].year");
            if observation.year < request.start_year || observation.year > request.end_year {
                return Err(InvalidInput::new(
                    field,
                    format!(
                        "must be between {} and {}",
                        request.start_year, request.end_year
                    ),
                )
                .into());
            }
            if !seen.insert(observation.year) {
                return Err(InvalidInput::new(
                    field,
                    format!(
                        "duplicates an earlier observation for {}",
                        observation.year
                    ),
                )
                .into());
            }
            ordered.push((position, observation));
        }
        ordered.sort_by_key(|(_, observation)| observation.year);

        let mut rows = Vec::with_capacity(ordered.len());
        for (position, observation) in ordered {
            let record = InputRecord {
                project_name: request.project_name.clone(),
                year: observation.year,
                area_m2: request.area_m2,
                indices: observation.indices.clone(),
            };
            let result = self.score(&record).map_err(|err| match err {
                ScoreError::InvalidInput(invalid) => {
                    ScoreError::InvalidInput(invalid.within(&format!("observations[{position}]")))
                }
                other => other,
            })?;
            rows.push(ScoreRow {
                year: result.year,
                project_name: result.project_name,
                value: result.value,
                area: result.area_m2,
                score: result.score,
            });
        }

        let missing_years: Vec<i32> = (request.start_year..=request.end_year)
            .filter(|year| !seen.contains(year))
            .collect();

        info!(
            project = %request.project_name.trim(),
            scored = rows.len(),
            missing = missing_years.len(),
            "built score table"
        );

        Ok(ScoreTable {
            project_name: request.project_name.trim().to_string(),
            start_year: request.start_year,
            end_year: request.end_year,
            rows,
            missing_years,
        })
    }
}
