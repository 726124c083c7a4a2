/* src/controller/error.rs */

use crate::extract::KeyPathError;
use crate::loader::FetchError;

/// Errors surfaced to foreground callers of a [`Provider`](super::Provider).
///
/// Malformed payloads and lost commit races never show up here; they leave
/// the cache untouched and the lookup answers from what is already cached.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
	/// The remote store could not serve the key.
	#[error("failed to fetch '{key}': {source}")]
	Fetch { key: String, source: FetchError },

	/// The key path itself is malformed.
	#[error("invalid key path: {0}")]
	InvalidKey(#[from] KeyPathError),
}

/// Errors raised while assembling a provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
	#[error("loader is required")]
	MissingLoader,

	#[error("ttl must be greater than zero")]
	ZeroTtl,

	#[error("poll interval must be greater than zero")]
	ZeroInterval,
}
