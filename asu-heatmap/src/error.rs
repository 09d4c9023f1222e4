//! Error types used by the crate.

use thiserror::Error;

/// Failure of a remote fetch.
///
/// A failed fetch never takes the map down: the caller logs the error and leaves the
/// corresponding layer empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    #[error("server responded with status {0}")]
    Status(u16),
    /// The request could not be completed (DNS, connection, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body is not what was expected.
    #[error("malformed payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) if !status.is_success() => Self::Status(status.as_u16()),
            _ => Self::Transport(value.to_string()),
        }
    }
}

/// Heat-map viewer error type.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// Geographic bounds are inverted or not finite.
    #[error("invalid geographic bounds: {0}")]
    InvalidBounds(String),
    /// Configuration value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Remote resource could not be loaded.
    #[error("failed to load data: {0}")]
    Fetch(#[from] FetchError),
    /// Reading configuration failed.
    #[error("failed to read configuration: {0}")]
    Io(#[from] serde_json::Error),
    /// Image decoding error.
    #[error("image decode error: {0:?}")]
    Decoding(#[from] image::ImageError),
}
