//! Data models for airq
//!
//! This module contains the core domain models organized by concern:
//! - Location: geographic coordinates
//! - Category: AQI values and their severity categories
//! - Pollution: pollutant readings and search reports

pub mod category;
pub mod location;
pub mod pollution;

// Re-export all public types for convenient access
pub use category::{AqiCategory, AqiLevel, AqiValue, SeverityTag, classify};
pub use location::Coordinates;
pub use pollution::{AirQualityReport, PollutantReading, PollutionSample};
