//! Import of yearly index observations exported as a `metric,year,value` table.

mod parser;

use crate::scoring::{IndexKey, YearObservation};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ObservationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    DuplicateMetric { year: i32, metric: String },
}

impl std::fmt::Display for ObservationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationImportError::Io(err) => write!(f, "failed to read observations: {}", err),
            ObservationImportError::Csv(err) => write!(f, "invalid observation CSV data: {}", err),
            ObservationImportError::DuplicateMetric { year, metric } => {
                write!(f, "metric `{}` appears more than once for {}", metric, year)
            }
        }
    }
}

impl std::error::Error for ObservationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObservationImportError::Io(err) => Some(err),
            ObservationImportError::Csv(err) => Some(err),
            ObservationImportError::DuplicateMetric { .. } => None,
        }
    }
}

impl From<std::io::Error> for ObservationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ObservationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ObservationImporter;

impl ObservationImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<YearObservation>, ObservationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Group rows by year. Rows without a value are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<YearObservation>, ObservationImportError> {
        let mut by_year: BTreeMap<i32, BTreeMap<IndexKey, f64>> = BTreeMap::new();

        for record in parser::parse_records(reader)? {
            let Some(value) = record.value else {
                continue;
            };
            let indices = by_year.entry(record.year).or_default();
            match indices.entry(IndexKey(record.metric)) {
                Entry::Occupied(occupied) => {
                    return Err(ObservationImportError::DuplicateMetric {
                        year: record.year,
                        metric: occupied.key().0.clone(),
                    });
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(value);
                }
            }
        }

        Ok(by_year
            .into_iter()
            .map(|(year, indices)| YearObservation { year, indices })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn groups_rows_by_year() {
        let csv = "metric,year,centroid,project_name,value,area\n\
ndvi,2019,\"(-74.6, 5.8)\",Test Project,0.61,1256637061.44\n\
water,2019,\"(-74.6, 5.8)\",Test Project,12.5,1256637061.44\n\
ndvi,2018,\"(-74.6, 5.8)\",Test Project,0.58,1256637061.44\n";

        let observations =
            ObservationImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].year, 2018);
        assert_eq!(observations[1].year, 2019);
        assert_eq!(observations[1].indices.len(), 2);
        assert_eq!(observations[1].indices[&IndexKey::from("water")], 12.5);
    }

    #[test]
    fn skips_rows_without_values() {
        let csv = "metric,year,value\nndvi,2020,\nwater,2020,40.0\n";
        let observations =
            ObservationImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(observations.len(), 1);
        assert!(!observations[0].indices.contains_key(&IndexKey::from("ndvi")));
    }

    #[test]
    fn normalizes_metric_names() {
        assert_eq!(parser::normalize_metric("\u{feff} Tree   Cover "), "tree_cover");

        let csv = "metric,year,value\nNDVI,2020,0.4\n";
        let observations =
            ObservationImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert!(observations[0].indices.contains_key(&IndexKey::from("ndvi")));
    }

    #[test]
    fn rejects_duplicate_metric_for_year() {
        let csv = "metric,year,value\nndvi,2020,0.4\nNDVI,2020,0.5\n";
        match ObservationImporter::from_reader(Cursor::new(csv)) {
            Err(ObservationImportError::DuplicateMetric { year, metric }) => {
                assert_eq!(year, 2020);
                assert_eq!(metric, "ndvi");
            }
            other => panic!("expected duplicate metric error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_values() {
        let csv = "metric,year,value\nndvi,2020,lush\n";
        assert!(matches!(
            ObservationImporter::from_reader(Cursor::new(csv)),
            Err(ObservationImportError::Csv(_))
        ));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = ObservationImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");
        assert!(matches!(error, ObservationImportError::Io(_)));
    }
}
