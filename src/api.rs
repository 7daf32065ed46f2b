//! HTTP client for the `OpenWeather` geocoding and air pollution APIs
//!
//! Every request is a single attempt bounded by the configured timeout.
//! Failures surface immediately as [`AirQualityError::Transport`].

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::AirqConfig;
use crate::location_resolver::{GeoResolver, first_match};
use crate::models::{Coordinates, PollutionSample};
use crate::openweather::{AirPollutionResponse, GeocodingMatch};
use crate::pollution::{PollutionFetcher, current_sample};
use crate::{AirQualityError, Result};

const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Client for the `OpenWeather` endpoints the pipeline needs
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a client from configuration; fails without an API key
    pub fn new(config: &AirqConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let timeout = Duration::from_secs(config.openweather.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("airq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AirQualityError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.openweather.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Raw geocoding matches for a place name, at most one
    #[instrument(skip(self))]
    pub async fn geocode(&self, city: &str) -> Result<Vec<GeocodingMatch>> {
        info!("Geocoding location: '{}'", city);

        let url = format!(
            "{}/geo/1.0/direct?q={}&limit=1&appid={}",
            self.base_url,
            urlencoding::encode(city),
            self.api_key
        );

        let matches: Vec<GeocodingMatch> = self
            .get_json(&url, "Error fetching geocoding data")
            .await?;

        if matches.is_empty() {
            warn!("No results found for location '{}'", city);
        } else {
            debug!("Found {} geocoding results for '{}'", matches.len(), city);
        }

        Ok(matches)
    }

    /// Raw air pollution series for a coordinate pair
    #[instrument(skip(self, coords), fields(lat = coords.latitude, lon = coords.longitude))]
    pub async fn air_pollution(&self, coords: Coordinates) -> Result<AirPollutionResponse> {
        info!(
            "Getting air pollution for coordinates: {}",
            coords.format_coordinates()
        );

        let url = format!(
            "{}/data/2.5/air_pollution?lat={}&lon={}&appid={}",
            self.base_url, coords.latitude, coords.longitude, self.api_key
        );

        self.get_json(&url, "Error fetching air pollution data").await
    }

    /// Issue one GET and decode its JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str, failure: &str) -> Result<T> {
        let start_time = Instant::now();
        let response = self.make_request(url, failure).await?;

        let parsed: T = response.json().await.map_err(|e| {
            error!("Failed to parse response: {}", e);
            let cause = AirQualityError::from(e.without_url());
            AirQualityError::transport(format!("{failure}: {}", cause.user_message()))
        })?;

        let total_duration = start_time.elapsed();
        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(parsed)
    }

    #[instrument(skip(self, url, failure), fields(url = %redact(url)))]
    async fn make_request(&self, url: &str, failure: &str) -> Result<Response> {
        let attempt_start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("HTTP request failed: {}", redact(&e.to_string()));
            let cause = AirQualityError::from(e.without_url());
            AirQualityError::transport(format!("{failure}: {}", cause.user_message()))
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            attempt_start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            warn!("Upstream returned {}", status);
            return Err(AirQualityError::transport(format!(
                "{failure}: HTTP {}",
                status.as_u16()
            )));
        }

        Ok(response)
    }
}

/// Strip the credential from a URL before it is logged
fn redact(url: &str) -> String {
    match url.split_once("appid=") {
        Some((head, _)) => format!("{head}appid=***"),
        None => url.to_string(),
    }
}

#[async_trait]
impl GeoResolver for OpenWeatherClient {
    async fn resolve(&self, city: &str) -> Result<Coordinates> {
        let matches = self.geocode(city).await?;
        first_match(city, &matches)
    }
}

#[async_trait]
impl PollutionFetcher for OpenWeatherClient {
    async fn fetch_pollution(&self, coords: Coordinates) -> Result<PollutionSample> {
        let response = self.air_pollution(coords).await?;
        current_sample(response)
    }
}
