use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore) or while
/// (de)serialising the cache blob.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing a slot
    #[error("I/O error on slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// Slot name that cannot be mapped onto the backing storage
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    /// The persisted blob is not valid JSON for the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Another thread panicked while holding the store lock
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("Language code is empty")]
    Empty,
    #[error("Invalid language code '{code}': {reason}")]
    Invalid { code: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}
