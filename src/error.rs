//! Error types and handling for `airq`

use thiserror::Error;

/// Main error type for the air-quality lookup pipeline
#[derive(Error, Debug)]
pub enum AirQualityError {
    /// The geocoding lookup returned zero matches
    #[error("City not found: {city}")]
    NotFound { city: String },

    /// Network failure, timeout, non-success status or unexpected payload
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Missing or invalid configuration, including the API credential
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AirQualityError {
    /// Create a new not-found error for the queried city
    pub fn not_found<S: Into<String>>(city: S) -> Self {
        Self::NotFound { city: city.into() }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirQualityError::NotFound { city } => format!("City not found: {city}"),
            AirQualityError::Transport { message } => message.clone(),
            AirQualityError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for AirQualityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AirQualityError::transport("Request timed out")
        } else if err.is_decode() {
            AirQualityError::transport(format!("Malformed response: {err}"))
        } else {
            AirQualityError::transport(format!("Request failed: {err}"))
        }
    }
}
