//! Machine translation lookups for langcache
//!
//! This crate puts a [`TranslationService`] in front of a
//! [`MachineTranslator`]: single texts and whole batches are answered from the
//! persistent `langcache` store where possible, and only the misses go out to
//! the provider.
//!
//! # Workflow Example
//!
//! ```ignore
//! use langcache::{MemoryStore, Settings};
//! use langcache_mt::{GtxProvider, TranslationService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. One service per process, shared by reference
//!     let service = Arc::new(TranslationService::new(
//!         Settings::default(),
//!         Arc::new(GtxProvider::new()?),
//!         Arc::new(MemoryStore::new()),
//!     ));
//!
//!     // 2. Single text: cache first, one lookup on a miss
//!     let title = service.translate("Prayer Times", "fr").await;
//!
//!     // 3. Batch: only distinct misses are looked up, order is preserved
//!     let labels = vec!["Name".to_string(), "Email".to_string(), "Message".to_string()];
//!     let translated = service.translate_batch(&labels, "fr").await;
//!
//!     println!("{} {:?}", title, translated);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gtx;
pub mod mock;
pub mod service;
pub mod translator;


// Re-export main types for convenient access
pub use error::{MtError, MtResult};
pub use gtx::{DEFAULT_GTX_ENDPOINT, GtxProvider};
pub use mock::{MockMode, MockTranslator};
pub use service::TranslationService;
pub use translator::{MachineTranslator, validate_locale};
