//! Pollutant readings and the report handed back to the UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{AqiCategory, AqiValue};
use super::location::Coordinates;

/// Pollutant concentrations, all in µg/m³
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PollutantReading {
    /// Fine particulate matter
    pub pm2_5: f64,
    /// Coarse particulate matter
    pub pm10: f64,
    /// Carbon monoxide
    pub co: f64,
    /// Nitrogen dioxide
    pub no2: f64,
    /// Ozone
    pub o3: f64,
}

impl PollutantReading {
    /// Concentrations paired with their display names, in display order
    #[must_use]
    pub fn components(&self) -> [(&'static str, f64); 5] {
        [
            ("PM2.5", self.pm2_5),
            ("PM10", self.pm10),
            ("CO", self.co),
            ("NO2", self.no2),
            ("O3", self.o3),
        ]
    }

    #[must_use]
    pub fn format_concentration(value: f64) -> String {
        format!("{value} µg/m³")
    }
}

/// The current entry of an upstream air-pollution series
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollutionSample {
    pub aqi: AqiValue,
    pub components: PollutantReading,
    /// When upstream measured this entry, if it said
    pub observed_at: Option<DateTime<Utc>>,
}

/// Successful outcome of one search
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AirQualityReport {
    /// City exactly as the user typed it
    pub city: String,
    pub coordinates: Coordinates,
    pub aqi: AqiValue,
    pub reading: PollutantReading,
    pub category: AqiCategory,
    pub observed_at: Option<DateTime<Utc>>,
}

impl AirQualityReport {
    #[must_use]
    pub fn new(city: String, coordinates: Coordinates, sample: PollutionSample) -> Self {
        Self {
            city,
            coordinates,
            aqi: sample.aqi,
            reading: sample.components,
            category: sample.aqi.category(),
            observed_at: sample.observed_at,
        }
    }
}

impl fmt::Display for AirQualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Air quality in {} ({})",
            self.city,
            self.coordinates.format_coordinates()
        )?;
        writeln!(
            f,
            "AQI {}: {} - {} [{}]",
            self.aqi, self.category.level, self.category.description, self.category.severity
        )?;
        if let Some(observed_at) = self.observed_at {
            writeln!(f, "Observed at {}", observed_at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        for (name, value) in self.reading.components() {
            writeln!(
                f,
                "  {name:<6} {}",
                PollutantReading::format_concentration(value)
            )?;
        }
        Ok(())
    }
}
