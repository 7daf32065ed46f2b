//! `OpenWeather` API response structures and conversion utilities

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::{AqiValue, Coordinates, PollutantReading, PollutionSample};

/// One match from the direct geocoding endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeocodingMatch {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

impl From<&GeocodingMatch> for Coordinates {
    fn from(geocoding: &GeocodingMatch) -> Self {
        Coordinates::new(geocoding.lat, geocoding.lon)
    }
}

/// Air pollution endpoint response
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AirPollutionResponse {
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AirPollutionEntry {
    /// Unix timestamp, seconds
    pub dt: Option<i64>,
    pub main: AirPollutionMain,
    pub components: Components,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AirPollutionMain {
    pub aqi: i64,
}

/// Concentrations in µg/m³; upstream sends more fields than are kept
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Components {
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
}

impl From<AirPollutionEntry> for PollutionSample {
    fn from(entry: AirPollutionEntry) -> Self {
        PollutionSample {
            aqi: AqiValue(entry.main.aqi),
            components: PollutantReading {
                pm2_5: entry.components.pm2_5,
                pm10: entry.components.pm10,
                co: entry.components.co,
                no2: entry.components.no2,
                o3: entry.components.o3,
            },
            observed_at: entry.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
        }
    }
}
