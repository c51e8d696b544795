//! Biodiversity scoring: catalog of indices, validation, the score engine, and its HTTP surface.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod router;
pub mod service;
pub mod table;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, IndexCatalog, IndexDefinition, IndexSource};
pub use domain::{
    BiodiversityBand, IndexKey, InputRecord, ScoreComponent, ScorePeriod, ScoreResult,
};
pub use engine::{ScoreEngine, ScoreError, ScoringStrategy, StrategyOutput, ZonalMeanStrategy};
pub use router::scoring_router;
pub use service::{ScoreSubmission, ScoringService, TableSubmission};
pub use table::{ScoreRow, ScoreTable, TableRequest, YearObservation};
pub use validation::{validate_record, InvalidInput, YearWindow, MAX_AREA_M2};
