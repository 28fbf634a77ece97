//! Error types for the track pipeline.
//!
//! Nothing here is fatal to the page. Fetch failures leave the route set
//! empty, sensor failures leave the location marker hidden.

use thiserror::Error;

/// Failure while retrieving a remote route set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed track response: {0}")]
    Json(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Json(err.to_string())
    }
}

/// Failure reported by the device location sensor.
///
/// All variants are transient; the poller keeps running after any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("location permission denied: {0}")]
    PermissionDenied(String),

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("location request timed out: {0}")]
    Timeout(String),

    #[error("geolocation is not supported here")]
    Unsupported,
}

impl SensorError {
    /// Maps a W3C `GeolocationPositionError.code` to a variant.
    pub fn from_code(code: u16, message: String) -> Self {
        match code {
            1 => SensorError::PermissionDenied(message),
            3 => SensorError::Timeout(message),
            _ => SensorError::PositionUnavailable(message),
        }
    }
}
