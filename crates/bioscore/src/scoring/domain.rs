use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog key of an environmental index (e.g. `ndvi`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexKey(pub String);

impl IndexKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One scoring submission: a project region, a year, and the zonal means observed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub project_name: String,
    pub year: i32,
    pub area_m2: f64,
    pub indices: BTreeMap<IndexKey, f64>,
}

/// Calendar window the observations of a year were aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScorePeriod {
    pub fn for_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }
}

/// Qualitative reading of where the observed indices sit inside their domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiodiversityBand {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl BiodiversityBand {
    pub fn from_normalized(normalized: f64) -> Self {
        if normalized < 0.25 {
            Self::Low
        } else if normalized < 0.5 {
            Self::Moderate
        } else if normalized < 0.75 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        }
    }
}

/// Contribution of a single index, kept so a score can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub index: IndexKey,
    pub name: String,
    pub value: f64,
    /// Position of `value` inside the index domain, 0.0 at the minimum and 1.0 at the maximum.
    pub normalized: f64,
    pub notes: String,
}

/// Output of one scoring invocation, paired with the input it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub project_name: String,
    pub year: i32,
    pub period: ScorePeriod,
    pub value: f64,
    pub area_m2: f64,
    pub score: f64,
    pub category: BiodiversityBand,
    pub components: Vec<ScoreComponent>,
    pub input: InputRecord,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
