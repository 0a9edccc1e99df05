use std::time::Duration;
use thiserror::Error;

/// Error types for machine translation lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Language code rejected before any request was made
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Provider misconfiguration or a 4xx response
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport failure (DNS, connect, TLS, reset)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// No answer within the allotted time
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),
    /// Server error or a payload that could not be understood
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for MtError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MtError::TranslationError(format!("Malformed response body: {}", e))
        } else {
            MtError::NetworkError(e.to_string())
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
