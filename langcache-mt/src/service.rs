//! Cached translation service
//!
//! [`TranslationService`] owns the translation cache and the selected
//! language for the whole process. Consumers share it by reference
//! (typically an `Arc`) and never keep their own copy of either.
//!
//! Every public translate operation resolves to a usable string. A failed,
//! timed-out or malformed lookup logs a warning and hands back the original
//! text, and nothing is cached for it so a later call can retry.
//!
//! # Example
//!
//! ```ignore
//! use langcache::{FileStore, Settings};
//! use langcache_mt::{GtxProvider, TranslationService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = TranslationService::new(
//!         Settings::from_env()?,
//!         Arc::new(GtxProvider::from_env()?),
//!         Arc::new(FileStore::new(".langcache")),
//!     );
//!
//!     service.set_language("fr").await?;
//!     let labels = vec!["Events".to_string(), "Contact".to_string()];
//!     println!("{:?}", service.translate_batch_current(&labels).await);
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use futures::stream::{self, StreamExt};
use langcache::{
    CacheStats, CacheStore, KeyValueStore, LanguageCode, LanguageError, Settings, StoreResult,
    load_selected, save_selected,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// What a request for a target language resolves to
enum Target {
    /// Source language or unusable code: hand the input back untouched
    Passthrough,
    Translate(LanguageCode),
}

/// Process-wide translation provider: cache, language selection and lookups
pub struct TranslationService {
    settings: Settings,
    translator: Arc<dyn MachineTranslator>,
    store: Arc<dyn KeyValueStore>,
    cache: RwLock<CacheStore>,
    language: RwLock<LanguageCode>,
}

impl TranslationService {
    /// Build the service, restoring cache and selected language from `store`
    ///
    /// Never fails: missing or corrupt persisted data starts from an empty
    /// cache and the source language.
    pub fn new(
        settings: Settings,
        translator: Arc<dyn MachineTranslator>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let cache = CacheStore::load(Arc::clone(&store), &settings.cache_slot);
        let language = load_selected(
            store.as_ref(),
            &settings.language_slot,
            &settings.source_language,
        );

        info!(
            "Translation service ready: provider={}, language={}, cached={}",
            translator.provider_name(),
            language,
            cache.cache().len()
        );

        Self {
            settings,
            translator,
            store,
            cache: RwLock::new(cache),
            language: RwLock::new(language),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The currently selected target language
    pub async fn language(&self) -> LanguageCode {
        self.language.read().await.clone()
    }

    /// Select and persist a new target language
    ///
    /// An invalid code is rejected and leaves the selection unchanged. A
    /// persistence failure is logged; the selection still applies in memory.
    pub async fn set_language(&self, code: &str) -> Result<LanguageCode, LanguageError> {
        let language = LanguageCode::parse(code)?;

        *self.language.write().await = language.clone();
        if let Err(e) = save_selected(self.store.as_ref(), &self.settings.language_slot, &language)
        {
            warn!("Failed to persist selected language {}: {}", language, e);
        }

        debug!("Selected language {}", language);
        Ok(language)
    }

    /// Translate one text into `target`
    ///
    /// Empty text and the source language are answered without touching the
    /// cache. A cache hit is returned as is; a miss costs one lookup whose
    /// result is stored and persisted.
    pub async fn translate(&self, text: &str, target: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let language = match self.resolve_target(target) {
            Target::Passthrough => return text.to_string(),
            Target::Translate(language) => language,
        };

        if let Some(hit) = self.cache.read().await.get(language.as_str(), text) {
            debug!("Cache hit for {} ({} chars)", language, text.len());
            return hit;
        }

        // Concurrent misses for the same text are not coalesced; both
        // lookups converge on the same cached value.
        match self.lookup(text, &language).await {
            Ok(translated) => {
                // Blocking store write, inline while the write lock is held.
                self.cache
                    .write()
                    .await
                    .put(language.as_str(), text, &translated);
                translated
            }
            Err(e) => {
                warn!("Translation into {} failed: {}", language, e);
                text.to_string()
            }
        }
    }

    /// Translate many texts into `target`, preserving order and length
    ///
    /// Cached texts are answered from the cache. Each distinct missing text is
    /// looked up once, concurrently with the others, and the result is
    /// broadcast to every position holding that text. A failed lookup only
    /// affects its own positions, which keep their original text. All fresh
    /// translations are merged into the cache with a single persist.
    pub async fn translate_batch(&self, texts: &[String], target: &str) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }
        let language = match self.resolve_target(target) {
            Target::Passthrough => return texts.to_vec(),
            Target::Translate(language) => language,
        };

        let mut results: Vec<Option<String>> = vec![None; texts.len()];
        // Distinct missing texts in first-seen order, and where each one goes
        let mut missing: Vec<&str> = Vec::new();
        let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();

        {
            let cache = self.cache.read().await;
            for (index, text) in texts.iter().enumerate() {
                if text.is_empty() {
                    results[index] = Some(String::new());
                } else if let Some(hit) = cache.get(language.as_str(), text) {
                    results[index] = Some(hit);
                } else {
                    positions
                        .entry(text.as_str())
                        .or_insert_with(|| {
                            missing.push(text.as_str());
                            Vec::new()
                        })
                        .push(index);
                }
            }
        }

        debug!(
            "Batch of {} into {}: {} cached, {} distinct lookups",
            texts.len(),
            language,
            texts.len() - positions.values().map(Vec::len).sum::<usize>(),
            missing.len()
        );

        if !missing.is_empty() {
            let language_ref = &language;
            let outcomes: Vec<(&str, MtResult<String>)> = stream::iter(missing)
                .map(move |text| async move { (text, self.lookup(text, language_ref).await) })
                .buffer_unordered(self.settings.max_concurrent_lookups.max(1))
                .collect()
                .await;

            // Outcomes arrive in completion order; positions come from the text
            let mut fresh: Vec<(String, String)> = Vec::new();
            for (text, outcome) in outcomes {
                let value = match outcome {
                    Ok(translated) => {
                        fresh.push((text.to_string(), translated.clone()));
                        translated
                    }
                    Err(e) => {
                        warn!("Batch item translation into {} failed: {}", language, e);
                        text.to_string()
                    }
                };
                if let Some(indices) = positions.get(text) {
                    for &index in indices {
                        results[index] = Some(value.clone());
                    }
                }
            }

            // Single inline store write for the whole batch, under the lock.
            if !fresh.is_empty() {
                self.cache
                    .write()
                    .await
                    .put_many(language.as_str(), fresh);
            }
        }

        results
            .into_iter()
            .zip(texts)
            .map(|(result, text)| result.unwrap_or_else(|| text.clone()))
            .collect()
    }

    /// Translate one text into the selected language
    pub async fn translate_current(&self, text: &str) -> String {
        let language = self.language().await;
        self.translate(text, language.as_str()).await
    }

    /// Translate many texts into the selected language
    pub async fn translate_batch_current(&self, texts: &[String]) -> Vec<String> {
        let language = self.language().await;
        self.translate_batch(texts, language.as_str()).await
    }

    /// Look up a cached translation without any side effect
    pub async fn cached(&self, text: &str, target: &str) -> Option<String> {
        match self.resolve_target(target) {
            Target::Translate(language) => self.cache.read().await.get(language.as_str(), text),
            Target::Passthrough => None,
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Forget every cached translation, in memory and in storage
    pub async fn reset_cache(&self) -> StoreResult<()> {
        info!("Resetting translation cache");
        self.cache.write().await.reset()
    }

    fn resolve_target(&self, target: &str) -> Target {
        match LanguageCode::parse(target) {
            Ok(language) if language.same_language(&self.settings.source_language) => {
                Target::Passthrough
            }
            Ok(language) => Target::Translate(language),
            Err(e) => {
                warn!("Not translating into {:?}: {}", target, e);
                Target::Passthrough
            }
        }
    }

    /// One external lookup, bounded by the configured timeout
    async fn lookup(&self, text: &str, language: &LanguageCode) -> MtResult<String> {
        let request = self.translator.translate(
            text,
            self.settings.source_language.as_str(),
            language.as_str(),
        );

        let translated = tokio::time::timeout(self.settings.lookup_timeout, request)
            .await
            .map_err(|_| MtError::Timeout(self.settings.lookup_timeout))??;

        if translated.is_empty() {
            return Err(MtError::TranslationError(format!(
                "{} returned an empty translation",
                self.translator.provider_name()
            )));
        }
        Ok(translated)
    }
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.translator.provider_name())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockMode, MockTranslator};
    use langcache::MemoryStore;

    fn service_with(mock: &MockTranslator, store: &MemoryStore) -> TranslationService {
        TranslationService::new(
            Settings::default(),
            Arc::new(mock.clone()),
            Arc::new(store.clone()),
        )
    }

    // ========== Language Selection ==========

    #[tokio::test]
    async fn test_language_defaults_to_source() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());
        assert_eq!(service.language().await.as_str(), "en");
    }

    #[tokio::test]
    async fn test_set_language_persists_and_reloads() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let store = MemoryStore::new();

        let service = service_with(&mock, &store);
        let selected = service.set_language("FR").await.unwrap();
        assert_eq!(selected.as_str(), "fr");
        assert_eq!(store.get("app_lang").unwrap().as_deref(), Some("fr"));

        let reloaded = service_with(&mock, &store);
        assert_eq!(reloaded.language().await.as_str(), "fr");
    }

    #[tokio::test]
    async fn test_set_invalid_language_keeps_selection() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());
        service.set_language("ar").await.unwrap();

        assert!(service.set_language("").await.is_err());
        assert!(service.set_language("not a code").await.is_err());
        assert_eq!(service.language().await.as_str(), "ar");
    }

    // ========== Single Text ==========

    #[tokio::test]
    async fn test_translate_empty_text_skips_lookup() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());
        assert_eq!(service.translate("", "fr").await, "");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_source_language_variants_are_noop() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());
        assert_eq!(service.translate("Hello", "en").await, "Hello");
        assert_eq!(service.translate("Hello", "en-GB").await, "Hello");
        assert_eq!(service.translate("Hello", "EN").await, "Hello");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_invalid_target_returns_text() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());
        assert_eq!(service.translate("Hello", "??").await, "Hello");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_batch_invalid_target_returns_texts() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());
        let texts = vec!["x".to_string(), String::new()];

        assert_eq!(service.translate_batch(&texts, "??").await, texts);
        assert_eq!(mock.call_count(), 0);
        assert_eq!(service.cache_stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_translate_other_script_is_not_noop() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let settings = Settings {
            source_language: LanguageCode::parse("zh-Hans").unwrap(),
            ..Settings::default()
        };
        let service = TranslationService::new(
            settings,
            Arc::new(mock.clone()),
            Arc::new(MemoryStore::new()),
        );

        assert_eq!(service.translate("汉字", "zh-Hans").await, "汉字");
        assert_eq!(mock.call_count(), 0);

        assert_eq!(service.translate("汉字", "zh-Hant").await, "汉字_zh-Hant");
        assert_eq!(mock.calls_for("汉字"), 1);
    }

    #[tokio::test]
    async fn test_translate_canonicalises_target_for_cache() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());

        assert_eq!(service.translate("Hello", "FR").await, "Hello_fr");
        assert_eq!(service.translate("Hello", "fr").await, "Hello_fr");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(service.cached("Hello", "fr").await.as_deref(), Some("Hello_fr"));
    }

    #[tokio::test]
    async fn test_translate_current_uses_selection() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service_with(&mock, &MemoryStore::new());

        assert_eq!(service.translate_current("Events").await, "Events");
        service.set_language("ur").await.unwrap();
        assert_eq!(service.translate_current("Events").await, "Events_ur");
        assert_eq!(
            service
                .translate_batch_current(&["Events".to_string(), "Contact".to_string()])
                .await,
            vec!["Events_ur", "Contact_ur"]
        );
        // "Events" was already cached by the single-text call
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_translation_is_not_cached() {
        let mut map = HashMap::new();
        map.insert(("Hello".to_string(), "fr".to_string()), String::new());
        let mock = MockTranslator::new(MockMode::Mappings(map));
        let service = service_with(&mock, &MemoryStore::new());

        assert_eq!(service.translate("Hello", "fr").await, "Hello");
        assert_eq!(service.cached("Hello", "fr").await, None);
    }

    // ========== Stats & Reset ==========

    #[tokio::test]
    async fn test_stats_and_reset() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let store = MemoryStore::new();
        let service = service_with(&mock, &store);

        service.translate("Hello", "fr").await;
        service.translate("Hello", "de").await;
        let stats = service.cache_stats().await;
        assert_eq!(stats.languages, 2);
        assert_eq!(stats.entries, 2);

        service.reset_cache().await.unwrap();
        assert_eq!(service.cache_stats().await.entries, 0);
        assert_eq!(store.get("app_translations").unwrap(), None);

        // After a reset the next call goes back to the provider
        service.translate("Hello", "fr").await;
        assert_eq!(mock.calls_for("Hello"), 3);
    }
}
