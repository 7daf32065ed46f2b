//! Location Resolution Module
//!
//! Resolves a free-text city name into the coordinates the pollution
//! lookup needs.

use async_trait::async_trait;
use tracing::debug;

use crate::models::Coordinates;
use crate::openweather::GeocodingMatch;
use crate::{AirQualityError, Result};

/// Maps a place name to a single coordinate pair
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolve `city` to the coordinates of its first geocoding match.
    ///
    /// Fails with [`AirQualityError::NotFound`] when there is no match and
    /// [`AirQualityError::Transport`] when the lookup itself fails.
    async fn resolve(&self, city: &str) -> Result<Coordinates>;
}

/// Pick the first upstream match, keeping the upstream ordering as-is
pub fn first_match(city: &str, matches: &[GeocodingMatch]) -> Result<Coordinates> {
    let Some(first) = matches.first() else {
        debug!("No geocoding results for '{}'", city);
        return Err(AirQualityError::not_found(city));
    };

    debug!(
        "Found location: {} ({:.4}, {:.4})",
        first.name, first.lat, first.lon
    );

    Ok(Coordinates::from(first))
}
