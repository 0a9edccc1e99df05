//! Translation cache and its durable wrapper
//!
//! [`TranslationCache`] is the plain lookup table from
//! `(target language, source text)` to translated text. It serialises as a
//! nested JSON object, `{"fr": {"hello": "bonjour"}}`.
//!
//! [`CacheStore`] ties a cache to a [`KeyValueStore`] slot: it is loaded once
//! and written back in full after every mutation. Entries never expire; the
//! only invalidation is [`CacheStore::reset`].

use crate::error::StoreResult;
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source text to translated text, for one target language
pub type LanguageEntries = BTreeMap<String, String>;

/// In-memory translation table keyed by language then by exact source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationCache {
    entries: BTreeMap<String, LanguageEntries>,
}

/// Entry counts for a cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub languages: usize,
    pub entries: usize,
    pub per_language: BTreeMap<String, usize>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a translation. Source text matching is exact: case and
    /// whitespace are significant.
    pub fn get(&self, language: &str, text: &str) -> Option<&str> {
        self.entries
            .get(language)
            .and_then(|entries| entries.get(text))
            .map(String::as_str)
    }

    pub fn contains(&self, language: &str, text: &str) -> bool {
        self.get(language, text).is_some()
    }

    /// Insert or overwrite one entry, returning the previous translation
    pub fn insert(&mut self, language: &str, text: &str, translation: &str) -> Option<String> {
        self.entries
            .entry(language.to_string())
            .or_default()
            .insert(text.to_string(), translation.to_string())
    }

    /// Merge several entries for one language, returning how many were given
    pub fn insert_many<I>(&mut self, language: &str, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return 0;
        }

        let bucket = self.entries.entry(language.to_string()).or_default();
        let mut count = 0;
        for (text, translation) in entries {
            bucket.insert(text, translation);
            count += 1;
        }
        count
    }

    /// Total number of cached translations across languages
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let per_language: BTreeMap<String, usize> = self
            .entries
            .iter()
            .map(|(language, entries)| (language.clone(), entries.len()))
            .collect();
        CacheStats {
            languages: per_language.len(),
            entries: per_language.values().sum(),
            per_language,
        }
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A [`TranslationCache`] persisted to one storage slot
pub struct CacheStore {
    cache: TranslationCache,
    store: Arc<dyn KeyValueStore>,
    slot: String,
}

impl CacheStore {
    /// Restore the cache from `slot`
    ///
    /// Loading never fails: an absent slot gives an empty cache, and an
    /// unreadable or corrupt blob is logged and replaced by an empty cache.
    pub fn load(store: Arc<dyn KeyValueStore>, slot: &str) -> Self {
        let cache = match store.get(slot) {
            Ok(Some(blob)) => match TranslationCache::from_json(&blob) {
                Ok(cache) => {
                    info!(
                        "Loaded {} cached translations from '{}'",
                        cache.len(),
                        slot
                    );
                    cache
                }
                Err(e) => {
                    warn!("Discarding corrupt translation cache in '{}': {}", slot, e);
                    TranslationCache::new()
                }
            },
            Ok(None) => TranslationCache::new(),
            Err(e) => {
                warn!("Failed to read translation cache '{}': {}", slot, e);
                TranslationCache::new()
            }
        };

        Self {
            cache,
            store,
            slot: slot.to_string(),
        }
    }

    pub fn get(&self, language: &str, text: &str) -> Option<String> {
        self.cache.get(language, text).map(str::to_string)
    }

    pub fn contains(&self, language: &str, text: &str) -> bool {
        self.cache.contains(language, text)
    }

    /// Insert one entry and persist the whole cache
    pub fn put(&mut self, language: &str, text: &str, translation: &str) {
        self.cache.insert(language, text, translation);
        self.persist_or_warn();
    }

    /// Merge entries for one language with a single persist
    pub fn put_many<I>(&mut self, language: &str, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let count = self.cache.insert_many(language, entries);
        if count > 0 {
            debug!("Merged {} translations for '{}'", count, language);
            self.persist_or_warn();
        }
    }

    /// Drop every entry and delete the persisted blob
    pub fn reset(&mut self) -> StoreResult<()> {
        self.cache.clear();
        self.store.remove(&self.slot)
    }

    /// Write the full cache to its slot
    pub fn persist(&self) -> StoreResult<()> {
        let blob = self.cache.to_json()?;
        self.store.set(&self.slot, &blob)
    }

    fn persist_or_warn(&self) {
        // The in-memory copy stays authoritative for this session
        if let Err(e) = self.persist() {
            warn!("Failed to persist translation cache to '{}': {}", self.slot, e);
        }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("slot", &self.slot)
            .field("entries", &self.cache.len())
            .finish()
    }
}
