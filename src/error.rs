//! Error types for coordinate parsing, provider calls, and configuration.
//!
//! None of these reach the load-creation flow: the orchestrator turns every
//! one of them into a fallback value plus a warning.

use thiserror::Error;

/// A coordinate that could not be turned into a valid [`Coordinate`](crate::coordinate::Coordinate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("unparsable {axis} value {raw:?}")]
    Unparsable { axis: &'static str, raw: String },

    #[error("{axis} is not a finite number")]
    NonFinite { axis: &'static str },

    #[error("{axis} {value} is outside [{min}, {max}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Failure talking to an external geocoding, directions, reference-data, or
/// live-tracking provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider answered {code}: {message}")]
    Rejected { code: String, message: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Failure loading configuration or the rate card.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("cannot read rate card: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed rate card: {0}")]
    RateCard(#[from] serde_json::Error),

    #[error("cannot build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
