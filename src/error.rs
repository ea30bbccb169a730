//! Error types for the search facade

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Request parameters that cannot be coerced into any valid shape
    /// (e.g. non-integer pagination). Detected before any I/O is attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The cache store could not be reached or refused the operation.
    /// Callers decide whether to degrade or fail; the wrapper never
    /// swallows this silently.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// The search engine could not be reached, timed out, or rejected the
    /// query. Always fatal to the individual request; never turned into an
    /// empty result set.
    #[error("Search engine error: {0}")]
    EngineUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than a
    /// dependency. Lets the surrounding platform map errors to a
    /// bad-request vs. service-unavailable class of response.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
