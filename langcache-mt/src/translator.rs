//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the translation service can run against the public gtx endpoint, a mock,
//! or any other backend without knowing which.
//!
//! # Example
//!
//! ```ignore
//! use langcache_mt::{GtxProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GtxProvider::new()?;
//!     let result = provider.translate("Prayer times", "en", "fr").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use async_trait::async_trait;
use langcache::LanguageCode;

/// Generic trait for machine translation providers
///
/// One call translates one text; providers are not expected to batch at the
/// transport level. Callers layer caching, batching and fallbacks on top.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en")
    /// * `target_locale` - Target language code (e.g., "fr", "zh-CN")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If the lookup fails for any reason
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a lookup.
    fn provider_name(&self) -> &str;
}

/// Validate that a locale code is acceptable
///
/// # Returns
///
/// * `Ok(LanguageCode)` - The canonical form of the code
/// * `Err(MtError::InvalidLocale)` - If the code is empty or malformed
///
/// # Example
///
/// ```ignore
/// assert_eq!(validate_locale("zh-cn")?.as_str(), "zh-CN");
/// validate_locale("invalid@code").unwrap_err();
/// ```
pub fn validate_locale(locale: &str) -> MtResult<LanguageCode> {
    LanguageCode::parse(locale).map_err(|e| MtError::InvalidLocale(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_locale_valid_codes() {
        assert!(validate_locale("en").is_ok());
        assert!(validate_locale("en-US").is_ok());
        assert!(validate_locale("zh-Hans").is_ok());
        assert_eq!(validate_locale("zh-cn").unwrap().as_str(), "zh-CN");
    }

    #[test]
    fn test_validate_locale_invalid_codes() {
        assert!(validate_locale("").is_err());
        assert!(validate_locale("en@invalid").is_err());
        assert!(validate_locale("fr#bad").is_err());
        assert!(validate_locale("es!error").is_err());
    }

    #[test]
    fn test_validate_locale_error_messages() {
        match validate_locale("") {
            Err(MtError::InvalidLocale(msg)) => {
                assert!(msg.contains("empty"));
            }
            other => panic!("Expected InvalidLocale error, got {:?}", other),
        }
    }
}
