use serde::Deserialize;
use std::io::Read;

#[derive(Debug)]
pub(crate) struct ObservationRecord {
    pub(crate) metric: String,
    pub(crate) year: i32,
    pub(crate) value: Option<f64>,
}

/// Reads `metric,year,value` rows; any other columns (area, centroid, geojson) are ignored.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ObservationRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<ObservationRow>() {
        let row = record?;
        records.push(ObservationRecord {
            metric: normalize_metric(&row.metric),
            year: row.year,
            value: row.value,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    metric: String,
    year: i32,
    #[serde(default)]
    value: Option<f64>,
}

/// `" Tree Cover "` -> `"tree_cover"`, matching catalog keys.
pub(crate) fn normalize_metric(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase()
}
