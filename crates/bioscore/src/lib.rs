//! Biodiversity score engine for conservation project regions.
//!
//! A project year's bioscore is the mean of its environmental index observations scaled by
//! the surface area of the project region. See [`scoring::ScoreEngine`].

pub mod config;
pub mod credentials;
pub mod error;
pub mod geometry;
pub mod observations;
pub mod scoring;
pub mod telemetry;
