//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, network-free translator. Besides
//! canned translation modes it can delay or fail individual texts and keeps a
//! shared log of every lookup, which is what the cache tests assert against.
//!
//! # Example
//!
//! ```ignore
//! use langcache_mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//!     assert_eq!(mock.call_count(), 1);
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation, falling back to suffix mode
    Mappings(HashMap<(String, String), String>),

    /// Every lookup fails with this message
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

#[derive(Debug, Default)]
struct CallLog {
    requested: Vec<String>,
    completed: Vec<String>,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share the call log, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated network delay for every lookup (in milliseconds)
    delay_ms: u64,
    /// Per-text delays, overriding `delay_ms`
    text_delays: HashMap<String, u64>,
    /// Texts whose lookup fails regardless of mode
    failures: HashSet<String>,
    log: Arc<Mutex<CallLog>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            text_delays: HashMap::new(),
            failures: HashSet::new(),
            log: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each translation will have ~50ms delay
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Delay lookups of one specific text
    ///
    /// Lets a test decide the order in which concurrent lookups finish.
    pub fn delay_text(mut self, text: &str, delay_ms: u64) -> Self {
        self.text_delays.insert(text.to_string(), delay_ms);
        self
    }

    /// Make lookups of one specific text fail
    pub fn fail_on(mut self, text: &str) -> Self {
        self.failures.insert(text.to_string());
        self
    }

    /// Number of lookups started so far, across all clones
    pub fn call_count(&self) -> usize {
        self.with_log(|log| log.requested.len())
    }

    /// Number of lookups started for one text
    pub fn calls_for(&self, text: &str) -> usize {
        self.with_log(|log| log.requested.iter().filter(|t| *t == text).count())
    }

    /// Texts in the order their lookups started
    pub fn requested(&self) -> Vec<String> {
        self.with_log(|log| log.requested.clone())
    }

    /// Texts in the order their lookups finished
    pub fn completed(&self) -> Vec<String> {
        self.with_log(|log| log.completed.clone())
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut CallLog) -> R) -> R {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut log)
    }

    /// Internal helper to apply the simulated delay
    async fn apply_delay(&self, text: &str) {
        let delay_ms = self.text_delays.get(text).copied().unwrap_or(self.delay_ms);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        if self.failures.contains(text) {
            return Err(MtError::NetworkError(format!(
                "Simulated failure for {:?}",
                text
            )));
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        self.with_log(|log| log.requested.push(text.to_string()));

        self.apply_delay(text).await;
        let result = self.apply_translation(text, target_locale);

        self.with_log(|log| log.completed.push(text.to_string()));
        result
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
