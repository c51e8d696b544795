use super::common::*;
use crate::scoring::{validate_record, IndexCatalog, InvalidInput, YearWindow, MAX_AREA_M2};

fn check(record: &crate::scoring::InputRecord) -> Result<(), InvalidInput> {
    validate_record(record, &IndexCatalog::builtin(), &window())
}

#[test]
fn accepts_valid_record() {
    assert!(check(&record()).is_ok());
}

#[test]
fn blank_project_name_is_rejected() {
    let mut input = record();
    input.project_name = "   ".to_string();
    let err = check(&input).expect_err("blank name");
    assert_eq!(err, InvalidInput::new("project_name", "must not be empty"));
}

#[test]
fn overlong_project_name_is_rejected() {
    let mut input = record();
    input.project_name = "x".repeat(256);
    let err = check(&input).expect_err("long name");
    assert_eq!(err.field, "project_name");
    assert_eq!(err.constraint, "must be at most 255 characters");

    input.project_name = "x".repeat(255);
    assert!(check(&input).is_ok());
}

#[test]
fn year_above_window_is_rejected() {
    let mut input = record();
    input.year = 2023;
    assert_eq!(
        check(&input).expect_err("future year"),
        InvalidInput::new("year", "must be <= 2022")
    );
}

#[test]
fn area_must_be_positive_and_finite() {
    let mut input = record();
    input.area_m2 = 0.0;
    assert_eq!(
        check(&input).expect_err("zero area"),
        InvalidInput::new("area_m2", "must be > 0")
    );

    input.area_m2 = f64::NAN;
    assert_eq!(
        check(&input).expect_err("nan area"),
        InvalidInput::new("area_m2", "must be a finite number")
    );
}

#[test]
fn area_is_capped_at_the_earth_surface() {
    let mut input = record();
    input.area_m2 = MAX_AREA_M2;
    assert!(check(&input).is_ok());

    input.area_m2 = f64::MAX;
    assert_eq!(
        check(&input).expect_err("area larger than the planet"),
        InvalidInput::new("area_m2", "must be <= 510000000000000")
    );
}

#[test]
fn indices_are_required() {
    let mut input = record();
    input.indices.clear();
    assert_eq!(
        check(&input).expect_err("no indices").field,
        "indices"
    );
}

#[test]
fn unknown_index_lists_catalog_members() {
    let mut input = record();
    input.indices = indices(&[("air", 0.2)]);
    let err = check(&input).expect_err("unknown index");
    assert_eq!(err.field, "indices.air");
    assert_eq!(
        err.constraint,
        "must be one of: ndvi, protected, tree_cover, water"
    );
}

#[test]
fn index_values_respect_their_domain() {
    let mut input = record();
    input.indices = indices(&[("ndvi", 1.5)]);
    assert_eq!(
        check(&input).expect_err("ndvi above max"),
        InvalidInput::new("indices.ndvi", "must be <= 1")
    );

    input.indices = indices(&[("water", -0.1)]);
    assert_eq!(
        check(&input).expect_err("water below min"),
        InvalidInput::new("indices.water", "must be >= 0")
    );

    input.indices = indices(&[("tree_cover", f64::INFINITY)]);
    assert_eq!(
        check(&input).expect_err("infinite value"),
        InvalidInput::new("indices.tree_cover", "must be a finite number")
    );
}

#[test]
fn first_violation_in_field_order_is_reported() {
    let mut input = record();
    input.project_name = String::new();
    input.year = 1990;
    input.area_m2 = -1.0;
    assert_eq!(check(&input).expect_err("many errors").field, "project_name");

    input.project_name = "Valid".to_string();
    assert_eq!(check(&input).expect_err("year next").field, "year");
}

#[test]
fn year_window_orders_its_bounds() {
    let window = YearWindow::new(2022, 2015);
    assert_eq!(window.min_year, 2015);
    assert_eq!(window.max_year, 2022);
    assert_eq!(window.years().count(), 8);
}

#[test]
fn display_names_field_and_constraint() {
    let err = InvalidInput::new("year", "must be >= 2015");
    assert_eq!(err.to_string(), "invalid `year`: must be >= 2015");
    assert_eq!(
        err.within("observations[3]").field,
        "observations[3].year"
    );
}
