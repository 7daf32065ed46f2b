//! Current air pollution lookup for a coordinate pair

use async_trait::async_trait;

use crate::models::{Coordinates, PollutionSample};
use crate::openweather::AirPollutionResponse;
use crate::{AirQualityError, Result};

/// Maps coordinates to the current pollution reading there
#[async_trait]
pub trait PollutionFetcher: Send + Sync {
    async fn fetch_pollution(&self, coords: Coordinates) -> Result<PollutionSample>;
}

/// Take the current (first) entry of an upstream series.
///
/// An empty series is a malformed payload, not a missing reading.
pub fn current_sample(response: AirPollutionResponse) -> Result<PollutionSample> {
    response
        .list
        .into_iter()
        .next()
        .map(PollutionSample::from)
        .ok_or_else(|| AirQualityError::transport("Air pollution response contained no readings"))
}
