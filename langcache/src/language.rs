//! Language codes and the persisted language selection
//!
//! Codes are canonicalised through ICU so that `FR`, `fr` and `Fr` land in
//! the same cache bucket, and `zh-hans` becomes `zh-Hans`.

use crate::error::LanguageError;
use crate::store::KeyValueStore;
use icu_locale::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A canonical BCP 47 language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and canonicalise a language code
    ///
    /// # Example
    ///
    /// ```ignore
    /// assert_eq!(LanguageCode::parse("pt-br")?.as_str(), "pt-BR");
    /// ```
    pub fn parse(code: &str) -> Result<Self, LanguageError> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(LanguageError::Empty);
        }

        let locale: Locale = trimmed.parse().map_err(|e| LanguageError::Invalid {
            code: code.to_string(),
            reason: format!("{}", e),
        })?;

        Ok(Self(locale.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag (`zh` for `zh-Hans`)
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// The script subtag, if the code carries one (`Hant` for `zh-Hant-TW`)
    pub fn script(&self) -> Option<&str> {
        self.0
            .split('-')
            .nth(1)
            .filter(|subtag| subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic()))
    }

    /// Whether both codes name the same language in the same script
    ///
    /// Regions are ignored (`en-GB` matches `en`), scripts are not
    /// (`zh-Hant` does not match `zh-Hans`).
    pub fn same_language(&self, other: &LanguageCode) -> bool {
        self.primary() == other.primary() && self.script() == other.script()
    }
}

/// English, the baseline authoring language
impl Default for LanguageCode {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = LanguageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Restore the selected language from its slot
///
/// A missing slot, a storage failure or an unparseable value all resolve to
/// `default`; the selection never blocks start-up.
pub fn load_selected(store: &dyn KeyValueStore, slot: &str, default: &LanguageCode) -> LanguageCode {
    match store.get(slot) {
        Ok(Some(raw)) => match LanguageCode::parse(&raw) {
            Ok(code) => code,
            Err(e) => {
                warn!("Ignoring persisted language in '{}': {}", slot, e);
                default.clone()
            }
        },
        Ok(None) => default.clone(),
        Err(e) => {
            warn!("Failed to read language slot '{}': {}", slot, e);
            default.clone()
        }
    }
}

/// Persist the selected language as its raw code
pub fn save_selected(
    store: &dyn KeyValueStore,
    slot: &str,
    code: &LanguageCode,
) -> crate::error::StoreResult<()> {
    store.set(slot, code.as_str())
}
