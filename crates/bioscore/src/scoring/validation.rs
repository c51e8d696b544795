use serde::Serialize;

use super::catalog::IndexCatalog;
use super::domain::InputRecord;

pub const MAX_PROJECT_NAME_LEN: usize = 255;

/// Surface area of the Earth in square metres; no project region can exceed it.
pub const MAX_AREA_M2: f64 = 5.1e14;

/// A submitted field that is missing, malformed, or outside its declared domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid `{field}`: {constraint}")]
pub struct InvalidInput {
    pub field: String,
    pub constraint: String,
}

impl InvalidInput {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Re-anchor the field path under `prefix`, e.g. `indices.ndvi` -> `observations[2].indices.ndvi`.
    pub fn within(self, prefix: &str) -> Self {
        Self {
            field: format!("{prefix}.{}", self.field),
            constraint: self.constraint,
        }
    }
}

/// Inclusive range of years the engine will score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearWindow {
    pub min_year: i32,
    pub max_year: i32,
}

impl YearWindow {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        if min_year <= max_year {
            Self { min_year, max_year }
        } else {
            Self {
                min_year: max_year,
                max_year: min_year,
            }
        }
    }

    pub fn check(&self, field: &str, year: i32) -> Result<(), InvalidInput> {
        if year < self.min_year {
            return Err(InvalidInput::new(
                field,
                format!("must be >= {}", self.min_year),
            ));
        }
        if year > self.max_year {
            return Err(InvalidInput::new(
                field,
                format!("must be <= {}", self.max_year),
            ));
        }
        Ok(())
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.min_year..=self.max_year
    }
}

pub(crate) fn check_project_name(name: &str) -> Result<(), InvalidInput> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::new("project_name", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(InvalidInput::new(
            "project_name",
            format!("must be at most {MAX_PROJECT_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn check_area(field: &str, area_m2: f64) -> Result<(), InvalidInput> {
    if !area_m2.is_finite() {
        return Err(InvalidInput::new(field, "must be a finite number"));
    }
    if area_m2 <= 0.0 {
        return Err(InvalidInput::new(field, "must be > 0"));
    }
    if area_m2 > MAX_AREA_M2 {
        return Err(InvalidInput::new(
            field,
            format!("must be <= {MAX_AREA_M2}"),
        ));
    }
    Ok(())
}

/// Check every field of a record against its domain, reporting the first violation.
///
/// Fields are visited in a fixed order (`project_name`, `year`, `area_m2`, `indices`) and
/// indices in key order, so the same bad record always yields the same error.
pub fn validate_record(
    record: &InputRecord,
    catalog: &IndexCatalog,
    window: &YearWindow,
) -> Result<(), InvalidInput> {
    check_project_name(&record.project_name)?;
    window.check("year", record.year)?;
    check_area("area_m2", record.area_m2)?;

    if record.indices.is_empty() {
        return Err(InvalidInput::new(
            "indices",
            "must contain at least one index",
        ));
    }

    for (key, value) in &record.indices {
        let field = format!("indices.{key}");
        let Some(definition) = catalog.get(key) else {
            return Err(InvalidInput::new(
                field,
                format!("must be one of: {}", catalog.key_list()),
            ));
        };
        if !value.is_finite() {
            return Err(InvalidInput::new(field, "must be a finite number"));
        }
        if *value < definition.min {
            return Err(InvalidInput::new(
                field,
                format!("must be >= {}", definition.min),
            ));
        }
        if *value > definition.max {
            return Err(InvalidInput::new(
                field,
                format!("must be <= {}", definition.max),
            ));
        }
    }

    Ok(())
}
