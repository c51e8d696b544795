use super::common::*;
use crate::scoring::{
    BiodiversityBand, IndexCatalog, IndexKey, InputRecord, ScoreComponent, ScoreEngine,
    ScoreError, ScoringStrategy, StrategyOutput, MAX_AREA_M2,
};
use chrono::NaiveDate;
use std::sync::Arc;

#[test]
fn score_is_deterministic() {
    let engine = engine();
    let first = engine.score(&record()).expect("valid record scores");
    let second = engine.score(&record()).expect("valid record scores");
    assert_eq!(first, second);
}

#[test]
fn score_is_mean_index_value_times_area() {
    let result = engine().score(&record()).expect("valid record scores");

    assert_eq!(result.value, 0.51);
    assert!(
        (result.score - 640_884_901.33).abs() < 1e-3,
        "unexpected score {}",
        result.score
    );
    assert_eq!(result.area_m2, 1_256_637_061.44);
    assert_eq!(result.components.len(), 2);
    assert_eq!(result.category, BiodiversityBand::High);
    assert_eq!(result.input, record());
}

#[test]
fn period_spans_the_scored_year() {
    let result = engine().score(&record()).expect("valid record scores");
    assert_eq!(
        result.period.start,
        NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
    );
    assert_eq!(
        result.period.end,
        NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid date")
    );
}

#[test]
fn year_below_window_names_the_field() {
    let mut input = record();
    input.year = 2014;

    match engine().score(&input) {
        Err(ScoreError::InvalidInput(invalid)) => {
            assert_eq!(invalid.field, "year");
            assert_eq!(invalid.constraint, "must be >= 2015");
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn boundary_values_produce_defined_results() {
    let engine = engine();
    let cases = [
        (2015, "ndvi", -1.0),
        (2022, "ndvi", 1.0),
        (2015, "water", 0.0),
        (2022, "water", 100.0),
        (2018, "protected", 0.0),
        (2018, "protected", 1.0),
        (2018, "tree_cover", 0.0),
        (2018, "tree_cover", 100.0),
    ];

    for (year, key, value) in cases {
        for area_m2 in [f64::MIN_POSITIVE, MAX_AREA_M2] {
            let input = InputRecord {
                project_name: "Edge".to_string(),
                year,
                area_m2,
                indices: indices(&[(key, value)]),
            };
            let result = engine.score(&input).unwrap_or_else(|err| {
                panic!("{key}={value} in {year} over {area_m2} m2 failed: {err}")
            });
            assert!(result.score.is_finite());
        }
    }
}

#[test]
fn band_follows_position_inside_domain() {
    let engine = engine();
    let band_for = |value: f64| {
        let mut input = record();
        input.indices = indices(&[("ndvi", value)]);
        engine.score(&input).expect("valid").category
    };

    assert_eq!(band_for(-1.0), BiodiversityBand::Low);
    assert_eq!(band_for(-0.2), BiodiversityBand::Moderate);
    assert_eq!(band_for(0.2), BiodiversityBand::High);
    assert_eq!(band_for(1.0), BiodiversityBand::VeryHigh);
}

#[test]
fn largest_allowed_area_scores() {
    let mut input = record();
    input.area_m2 = MAX_AREA_M2;

    let result = engine().score(&input).expect("earth-sized region scores");
    assert_eq!(result.value, 0.51);
    let expected = 0.51 * MAX_AREA_M2;
    assert!(
        ((result.score - expected) / expected).abs() < 1e-12,
        "unexpected score {}",
        result.score
    );
}

#[test]
fn area_beyond_the_cap_is_invalid_input() {
    let mut input = record();
    input.area_m2 = f64::MAX;

    match engine().score(&input) {
        Err(ScoreError::InvalidInput(invalid)) => assert_eq!(invalid.field, "area_m2"),
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn project_name_is_trimmed_in_result() {
    let mut input = record();
    input.project_name = "  Test Project  ".to_string();
    let result = engine().score(&input).expect("valid");
    assert_eq!(result.project_name, "Test Project");
    assert_eq!(result.input.project_name, "  Test Project  ");
}

struct FixedStrategy;

impl ScoringStrategy for FixedStrategy {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn compute(
        &self,
        _record: &InputRecord,
        _catalog: &IndexCatalog,
    ) -> Result<StrategyOutput, ScoreError> {
        Ok(StrategyOutput {
            value: 1.0,
            score: 42.0,
            components: vec![ScoreComponent {
                index: IndexKey::from("protected"),
                name: "Protected area coverage".to_string(),
                value: 1.0,
                normalized: 1.0,
                notes: "fixed".to_string(),
            }],
        })
    }
}

struct SilentStrategy;

impl ScoringStrategy for SilentStrategy {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn compute(
        &self,
        _record: &InputRecord,
        _catalog: &IndexCatalog,
    ) -> Result<StrategyOutput, ScoreError> {
        Ok(StrategyOutput {
            value: 1.0,
            score: 42.0,
            components: Vec::new(),
        })
    }
}

#[test]
fn strategies_are_pluggable_behind_validation() {
    let engine =
        ScoreEngine::with_strategy(IndexCatalog::builtin(), window(), Arc::new(FixedStrategy));
    assert_eq!(engine.strategy_name(), "fixed");

    let result = engine.score(&record()).expect("fixed strategy scores");
    assert_eq!(result.score, 42.0);
    assert_eq!(result.category, BiodiversityBand::VeryHigh);

    let mut invalid = record();
    invalid.area_m2 = -5.0;
    assert!(matches!(
        engine.score(&invalid),
        Err(ScoreError::InvalidInput(err)) if err.field == "area_m2"
    ));
}

#[test]
fn strategy_without_components_cannot_be_categorized() {
    let engine =
        ScoreEngine::with_strategy(IndexCatalog::builtin(), window(), Arc::new(SilentStrategy));

    match engine.score(&record()) {
        Err(ScoreError::Computation(reason)) => assert!(reason.contains("no index components")),
        other => panic!("expected computation error, got {other:?}"),
    }
}
