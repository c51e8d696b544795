use crate::infra::{build_scoring_service, load_catalog, parse_index_pair};
use bioscore::config::{AppConfig, ScoringConfig};
use bioscore::error::AppError;
use bioscore::geometry::ProjectGeometry;
use bioscore::observations::ObservationImporter;
use bioscore::scoring::{
    IndexKey, InvalidInput, ScoreError, ScoreResult, ScoreSubmission, ScoreTable,
    TableSubmission,
};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Project name shown in the result
    #[arg(long)]
    pub(crate) project: String,
    /// Observation year
    #[arg(long)]
    pub(crate) year: i32,
    /// Project area in square metres
    #[arg(long)]
    pub(crate) area_m2: Option<f64>,
    /// GeoJSON polygon used to derive the area when --area-m2 is absent
    #[arg(long)]
    pub(crate) geometry: Option<PathBuf>,
    /// Observed index zonal mean, e.g. --index ndvi=0.62 (repeatable)
    #[arg(long = "index", value_name = "KEY=VALUE", value_parser = parse_index_pair)]
    pub(crate) indices: Vec<(IndexKey, f64)>,
    /// Index catalog YAML overriding the configured one
    #[arg(long)]
    pub(crate) indices_file: Option<PathBuf>,
    /// Print the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TableArgs {
    /// JSON table request (project_name, start_year, end_year, area_m2, observations)
    #[arg(long, conflicts_with = "observations")]
    pub(crate) input: Option<PathBuf>,
    /// CSV export of yearly observations with metric, year and value columns
    #[arg(long)]
    pub(crate) observations: Option<PathBuf>,
    #[arg(long, required_unless_present = "input")]
    pub(crate) project: Option<String>,
    #[arg(long, required_unless_present = "input")]
    pub(crate) start_year: Option<i32>,
    #[arg(long, required_unless_present = "input")]
    pub(crate) end_year: Option<i32>,
    /// Project area in square metres
    #[arg(long)]
    pub(crate) area_m2: Option<f64>,
    /// GeoJSON polygon used to derive the area when --area-m2 is absent
    #[arg(long)]
    pub(crate) geometry: Option<PathBuf>,
    /// Index catalog YAML overriding the configured one
    #[arg(long)]
    pub(crate) indices_file: Option<PathBuf>,
    /// Emit the table as CSV instead of a readable listing
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct IndicesArgs {
    /// Index catalog YAML overriding the configured one
    #[arg(long)]
    pub(crate) indices_file: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        project,
        year,
        area_m2,
        geometry,
        indices,
        indices_file,
        json,
    } = args;

    let service = build_scoring_service(&scoring_config(indices_file)?)?;
    let area_m2 = resolve_area(area_m2, geometry.as_deref())?;
    let submission = ScoreSubmission {
        project_name: project,
        year,
        area_m2,
        geometry: None,
        indices: indices.into_iter().collect(),
    };
    let result = service.score(submission)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_score(&result);
    }
    Ok(())
}

pub(crate) fn run_table(args: TableArgs) -> Result<(), AppError> {
    let service = build_scoring_service(&scoring_config(args.indices_file.clone())?)?;
    let submission = table_submission(args.input.as_deref(), &args)?;
    let table = service.table(submission)?;

    if args.csv {
        print!("{}", table.to_csv()?);
    } else {
        render_table(&table);
    }
    Ok(())
}

pub(crate) fn run_indices(args: IndicesArgs) -> Result<(), AppError> {
    let config = scoring_config(args.indices_file)?;
    let catalog = load_catalog(config.indices_file.as_deref())?;

    println!(
        "Accepted indices (years {}-{})",
        config.min_year, config.max_year
    );
    for (key, definition) in catalog.iter() {
        println!(
            "- {key}: {} [{}, {}] from {}",
            definition.name, definition.min, definition.max, definition.path
        );
    }
    Ok(())
}

fn scoring_config(indices_file: Option<PathBuf>) -> Result<ScoringConfig, AppError> {
    let mut config = AppConfig::load()?.scoring;
    if indices_file.is_some() {
        config.indices_file = indices_file;
    }
    Ok(config)
}

fn resolve_area(area_m2: Option<f64>, geometry: Option<&Path>) -> Result<Option<f64>, AppError> {
    match (area_m2, geometry) {
        (Some(area), _) => Ok(Some(area)),
        (None, Some(path)) => {
            let raw = std::fs::read_to_string(path)?;
            let geometry = ProjectGeometry::from_geojson_str(&raw).map_err(ScoreError::from)?;
            Ok(Some(geometry.area_m2()))
        }
        (None, None) => Ok(None),
    }
}

fn table_submission(input: Option<&Path>, args: &TableArgs) -> Result<TableSubmission, AppError> {
    if let Some(path) = input {
        let raw = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }

    let observations = match &args.observations {
        Some(path) => ObservationImporter::from_path(path)?,
        None => Vec::new(),
    };

    Ok(TableSubmission {
        project_name: required(args.project.clone(), "project_name")?,
        start_year: required(args.start_year, "start_year")?,
        end_year: required(args.end_year, "end_year")?,
        area_m2: resolve_area(args.area_m2, args.geometry.as_deref())?,
        geometry: None,
        observations,
    })
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| ScoreError::from(InvalidInput::new(field, "is required")).into())
}

fn render_score(result: &ScoreResult) {
    println!("{} ({})", result.project_name, result.year);
    println!("- Period: {} to {}", result.period.start, result.period.end);
    println!("- Value: {:.2}", result.value);
    println!("- Area: {:.2} m2", result.area_m2);
    println!("- Score: {:.2}", result.score);
    println!("- Category: {}", result.category.label());
    println!("Components:");
    for component in &result.components {
        println!(
            "  - {} ({}): {} | {:.0}% of domain",
            component.name,
            component.index,
            component.value,
            component.normalized * 100.0
        );
    }
}

fn render_table(table: &ScoreTable) {
    println!(
        "{} score table ({}-{})",
        table.project_name, table.start_year, table.end_year
    );
    println!("{:<6} {:<32} {:>18}", "Year", "Project Name", "Score");
    for row in &table.rows {
        println!("{:<6} {:<32} {:>18.2}", row.year, row.project_name, row.score);
    }
    println!("Total score: {:.2}", table.total_score());
    if !table.missing_years.is_empty() {
        let missing: Vec<String> = table
            .missing_years
            .iter()
            .map(|year| year.to_string())
            .collect();
        println!("No observations for: {}", missing.join(", "));
    }
}
