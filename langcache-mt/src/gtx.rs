//! Google Translate "gtx" endpoint provider
//!
//! Uses the keyless `translate_a/single?client=gtx` endpoint that browser
//! front ends call directly. It has no batch form: every text is one GET.
//!
//! The response is a nested array whose first element lists translated
//! segments, `[[["Bonjour", "Hello", ...], ["le monde", "world", ...]], ...]`.
//! Long inputs come back split into several segments, which are joined.
//!
//! # Example
//!
//! ```ignore
//! use langcache_mt::{GtxProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GtxProvider::from_env()?;
//!     let result = provider.translate("Upcoming events", "en", "ar").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{MachineTranslator, validate_locale};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

/// Public endpoint used when no override is configured
pub const DEFAULT_GTX_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Provider for the keyless Google Translate endpoint
#[derive(Clone)]
pub struct GtxProvider {
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Endpoint URL, without query string
    base_url: String,
}

impl GtxProvider {
    /// Maximum characters per text; the whole text travels in the query string
    const MAX_CHARS_PER_STRING: usize = 5_000;

    /// Create a provider for the public endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If the HTTP client cannot be created
    pub fn new() -> MtResult<Self> {
        Self::with_base_url(DEFAULT_GTX_ENDPOINT)
    }

    /// Create a provider that talks to a different endpoint
    ///
    /// Useful for proxies and local test servers.
    pub fn with_base_url(base_url: &str) -> MtResult<Self> {
        Url::parse(base_url)
            .map_err(|e| MtError::ConfigError(format!("Invalid endpoint '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Create a provider, honouring `LANGCACHE_GTX_ENDPOINT` when set
    pub fn from_env() -> MtResult<Self> {
        match std::env::var("LANGCACHE_GTX_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => Self::with_base_url(endpoint.trim()),
            _ => Self::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the GET URL for one lookup
    fn request_url(&self, text: &str, source_locale: &str, target_locale: &str) -> MtResult<Url> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("client", "gtx"),
                ("sl", source_locale),
                ("tl", target_locale),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| MtError::ConfigError(format!("Failed to build request URL: {}", e)))
    }

    /// Extract the translated text from a gtx response body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Concatenation of every translated segment
    /// * `Err(MtError::TranslationError)` - If the payload has no segments
    pub(crate) fn parse_response(json: &Value) -> MtResult<String> {
        let segments = json
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MtError::TranslationError(
                    "Invalid gtx response: missing segment array".to_string(),
                )
            })?;

        // Transliteration rows carry a null first element; they are skipped
        let parts: Vec<&str> = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if parts.is_empty() {
            return Err(MtError::TranslationError(
                "Invalid gtx response: no translated segments".to_string(),
            ));
        }

        Ok(parts.concat())
    }
}

impl std::fmt::Debug for GtxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GtxProvider")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GtxProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        // Validate inputs
        let source = validate_locale(source_locale)?;
        let target = validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        // Check character limit
        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let url = self.request_url(text, source.as_str(), target.as_str())?;
        debug!("gtx lookup {} -> {} ({} chars)", source, target, text.len());

        let response = self.client.get(url).send().await?;

        // Check HTTP status
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("gtx client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("gtx server error ({}): {}", status, error_text))
            });
        }

        // Parse response JSON
        let json: Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse gtx response: {}", e))
        })?;

        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "Google Translate (gtx)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_uses_public_endpoint() {
        let provider = GtxProvider::new().unwrap();
        assert_eq!(provider.base_url(), DEFAULT_GTX_ENDPOINT);
        assert_eq!(provider.provider_name(), "Google Translate (gtx)");
    }

    #[test]
    fn test_with_invalid_base_url() {
        match GtxProvider::with_base_url("not a url") {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("Invalid endpoint")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_output() {
        let provider = GtxProvider::with_base_url("http://127.0.0.1:9/translate").unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("GtxProvider"));
        assert!(debug_str.contains("127.0.0.1:9"));
    }

    // ========== Request Building ==========

    #[test]
    fn test_request_url_encodes_text() {
        let provider = GtxProvider::new().unwrap();
        let url = provider
            .request_url("Fajr & Isha times?", "en", "fr")
            .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("client".to_string(), "gtx".to_string()),
                ("sl".to_string(), "en".to_string()),
                ("tl".to_string(), "fr".to_string()),
                ("dt".to_string(), "t".to_string()),
                ("q".to_string(), "Fajr & Isha times?".to_string()),
            ]
        );
        assert!(!url.as_str().contains("Fajr & Isha"));
    }

    // ========== Response Parsing ==========

    #[test]
    fn test_parse_single_segment() {
        let body = json!([[["Bonjour", "Hello", null, null, 10]], null, "en"]);
        assert_eq!(GtxProvider::parse_response(&body).unwrap(), "Bonjour");
    }

    #[test]
    fn test_parse_joins_segments() {
        let body = json!([
            [
                ["Bonjour. ", "Hello. ", null, null, 10],
                ["Bienvenue.", "Welcome.", null, null, 10],
                [null, null, "Bonjour. Bienvenue."]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            GtxProvider::parse_response(&body).unwrap(),
            "Bonjour. Bienvenue."
        );
    }

    #[test]
    fn test_parse_malformed_payloads() {
        for body in [
            json!({"error": "nope"}),
            json!([]),
            json!([null]),
            json!([[]]),
            json!([[[null, "Hello"]]]),
        ] {
            match GtxProvider::parse_response(&body) {
                Err(MtError::TranslationError(msg)) => assert!(msg.contains("Invalid gtx response")),
                other => panic!("Expected TranslationError for {}, got {:?}", body, other),
            }
        }
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_empty_text() {
        let provider = GtxProvider::new().unwrap();
        let result = provider.translate("", "en", "fr").await.unwrap();
        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_translate_invalid_target_locale() {
        let provider = GtxProvider::new().unwrap();
        let result = provider.translate("hello", "en", "invalid#code").await;
        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
    }

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let provider = GtxProvider::new().unwrap();
        let long_text = "x".repeat(GtxProvider::MAX_CHARS_PER_STRING + 1);
        match provider.translate(&long_text, "en", "fr").await {
            Err(MtError::TranslationError(msg)) => assert!(msg.contains("exceeds maximum")),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_unreachable_endpoint_is_network_error() {
        // Port 9 (discard) is closed on test machines
        let provider = GtxProvider::with_base_url("http://127.0.0.1:9/translate_a/single").unwrap();
        let result = provider.translate("hello", "en", "fr").await;
        assert!(matches!(result, Err(MtError::NetworkError(_))));
    }

    // ========== Integration Tests (require network) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_endpoint_single_translation() {
        let provider = GtxProvider::from_env().unwrap();
        let result = provider.translate("Hello", "en", "fr").await.unwrap();
        println!("Translation: {} → {}", "Hello", result);
        assert!(!result.is_empty());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_endpoint_long_text_is_joined() {
        let provider = GtxProvider::from_env().unwrap();
        let text = "The community centre opens after the dawn prayer. \
                    Friday sermons start at half past one. \
                    Families can register online.";
        let result = provider.translate(text, "en", "de").await.unwrap();
        println!("Translation: {}", result);
        assert!(result.len() > 20);
    }
}
