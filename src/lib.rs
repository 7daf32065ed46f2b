//! `airq` - current air quality for any city
//!
//! This library resolves a city name to coordinates, fetches the current
//! pollutant concentrations and AQI there, and classifies the AQI into a
//! human-readable severity category.

pub mod api;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod openweather;
pub mod pipeline;
pub mod pollution;
pub mod web;

use std::time::Duration;

// Re-export core types for public API
pub use api::OpenWeatherClient;
pub use config::AirqConfig;
pub use error::AirQualityError;
pub use location_resolver::GeoResolver;
pub use models::{AirQualityReport, AqiCategory, AqiValue, Coordinates, PollutantReading, classify};
pub use pipeline::{AirQualityPipeline, QueryState, SearchPhase};
pub use pollution::PollutionFetcher;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirQualityError>;

/// Pipeline wired to the live `OpenWeather` endpoints
pub type LivePipeline = AirQualityPipeline<OpenWeatherClient, OpenWeatherClient>;

/// Headroom of each pipeline stage over the HTTP client timeout, so a
/// stalled upstream always surfaces as the client's timeout error
pub const STAGE_TIMEOUT_SLACK: Duration = Duration::from_secs(2);

/// Build the live pipeline from configuration
pub fn live_pipeline(config: &AirqConfig) -> Result<LivePipeline> {
    let client = OpenWeatherClient::new(config)?;
    let stage_timeout =
        Duration::from_secs(config.openweather.timeout_seconds.into()) + STAGE_TIMEOUT_SLACK;
    Ok(AirQualityPipeline::new(client.clone(), client).with_stage_timeout(stage_timeout))
}
