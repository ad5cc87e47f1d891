//! Error types for exportsync-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request did not complete within {timeout:?}")]
    Timeout { timeout: std::time::Duration },

    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("malformed export info: {0}")]
    MalformedInfo(String),

    #[error("export info has no download location")]
    MissingLocation,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
