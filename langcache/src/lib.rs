//! Persistent translation cache
//!
//! Translations are stored per target language and exact source text, loaded
//! once from a [`KeyValueStore`] and written back after every change. The
//! network side lives in the `langcache-mt` crate.

pub mod cache;
pub mod config;
pub mod error;
pub mod language;
pub mod store;

// Re-export the main types for convenient access
pub use cache::{CacheStats, CacheStore, LanguageEntries, TranslationCache};
pub use config::Settings;
pub use error::{ConfigError, LanguageError, StoreError, StoreResult};
pub use language::{LanguageCode, load_selected, save_selected};
pub use store::{CACHE_SLOT, FileStore, KeyValueStore, LANGUAGE_SLOT, MemoryStore};
