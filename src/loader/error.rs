/* src/loader/error.rs */

use std::sync::Arc;

/// Failure talking to the remote store.
///
/// Cloneable so a single failure can be handed to every waiting watcher.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
	/// The store could not be reached or returned a transport-level failure.
	#[error("transport error: {0}")]
	Transport(String),

	/// Credentials were rejected or lack access to the key.
	#[error("access denied: {0}")]
	Denied(String),

	/// IO error from a local source.
	#[error("io error: {0}")]
	Io(Arc<std::io::Error>),

	/// Key resolved outside the source's root directory.
	#[error("sandbox violation")]
	SandboxViolation,
}

impl From<std::io::Error> for FetchError {
	fn from(err: std::io::Error) -> Self {
		Self::Io(Arc::new(err))
	}
}
