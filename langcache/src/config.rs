use crate::error::ConfigError;
use crate::language::LanguageCode;
use crate::store::{CACHE_SLOT, LANGUAGE_SLOT};
use std::time::Duration;

/// Runtime settings for a translation service
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Language the literal texts are authored in; translating into it is a no-op
    pub source_language: LanguageCode,
    /// Storage slot for the selected language
    pub language_slot: String,
    /// Storage slot for the serialised cache
    pub cache_slot: String,
    /// Upper bound for one external lookup before falling back to the source text
    pub lookup_timeout: Duration,
    /// How many batch lookups may be in flight at once
    pub max_concurrent_lookups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_language: LanguageCode::default(),
            language_slot: LANGUAGE_SLOT.to_string(),
            cache_slot: CACHE_SLOT.to_string(),
            lookup_timeout: Duration::from_secs(10),
            max_concurrent_lookups: 8,
        }
    }
}

impl Settings {
    /// Build settings from `LANGCACHE_*` environment variables
    ///
    /// Unset variables keep their defaults:
    ///
    /// * `LANGCACHE_SOURCE_LANGUAGE` - source language code (`en`)
    /// * `LANGCACHE_LANGUAGE_SLOT` - selected language slot (`app_lang`)
    /// * `LANGCACHE_CACHE_SLOT` - cache slot (`app_translations`)
    /// * `LANGCACHE_LOOKUP_TIMEOUT_SECS` - per-lookup timeout in seconds (`10`)
    /// * `LANGCACHE_MAX_CONCURRENT` - concurrent batch lookups (`8`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup("LANGCACHE_SOURCE_LANGUAGE") {
            settings.source_language =
                LanguageCode::parse(&value).map_err(|e| ConfigError::InvalidValue {
                    var: "LANGCACHE_SOURCE_LANGUAGE",
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(value) = lookup("LANGCACHE_LANGUAGE_SLOT") {
            settings.language_slot = non_empty("LANGCACHE_LANGUAGE_SLOT", value)?;
        }
        if let Some(value) = lookup("LANGCACHE_CACHE_SLOT") {
            settings.cache_slot = non_empty("LANGCACHE_CACHE_SLOT", value)?;
        }
        if let Some(value) = lookup("LANGCACHE_LOOKUP_TIMEOUT_SECS") {
            let secs = positive("LANGCACHE_LOOKUP_TIMEOUT_SECS", &value)?;
            settings.lookup_timeout = Duration::from_secs(secs as u64);
        }
        if let Some(value) = lookup("LANGCACHE_MAX_CONCURRENT") {
            settings.max_concurrent_lookups = positive("LANGCACHE_MAX_CONCURRENT", &value)?;
        }

        Ok(settings)
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var,
            value,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn positive(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.source_language.as_str(), "en");
        assert_eq!(settings.language_slot, "app_lang");
        assert_eq!(settings.cache_slot, "app_translations");
        assert_eq!(settings.lookup_timeout, Duration::from_secs(10));
        assert_eq!(settings.max_concurrent_lookups, 8);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("LANGCACHE_SOURCE_LANGUAGE", "EN-gb"),
            ("LANGCACHE_CACHE_SLOT", "site_translations"),
            ("LANGCACHE_LOOKUP_TIMEOUT_SECS", "3"),
            ("LANGCACHE_MAX_CONCURRENT", "2"),
        ]))
        .unwrap();

        assert_eq!(settings.source_language.as_str(), "en-GB");
        assert_eq!(settings.cache_slot, "site_translations");
        assert_eq!(settings.language_slot, "app_lang");
        assert_eq!(settings.lookup_timeout, Duration::from_secs(3));
        assert_eq!(settings.max_concurrent_lookups, 2);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let cases = [
            ("LANGCACHE_SOURCE_LANGUAGE", "??"),
            ("LANGCACHE_CACHE_SLOT", "  "),
            ("LANGCACHE_LOOKUP_TIMEOUT_SECS", "soon"),
            ("LANGCACHE_MAX_CONCURRENT", "0"),
        ];
        for (var, value) in cases {
            match Settings::from_lookup(lookup_from(&[(var, value)])) {
                Err(ConfigError::InvalidValue { var: reported, .. }) => assert_eq!(reported, var),
                other => panic!("Expected InvalidValue for {}, got {:?}", var, other),
            }
        }
    }
}
