/* src/loader/mod.rs */

//!
//! Access to the remote store that holds the authoritative values.

mod error;
pub mod source;

pub use error::FetchError;
pub use source::{FileLoader, MemoryLoader};

use async_trait::async_trait;

/// Fetches raw payloads by top-level key name.
///
/// Must be safe to call concurrently, including for the same key.
/// Retry and backoff policy belongs to the implementation.
#[async_trait]
pub trait Loader: Send + Sync {
	/// Returns the raw payload, or `None` when the store holds nothing under `key`.
	async fn fetch(&self, key: &str) -> Result<Option<String>, FetchError>;
}
