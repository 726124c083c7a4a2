/* src/config.rs */

//!
//! Provider settings, loadable from any compiled-in format.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
#[cfg(feature = "validate")]
use validator::{Validate, ValidationError};

use crate::controller::DEFAULT_TTL;
use crate::extract::FormatError;
use crate::extract::format::{AnyFormat, Format};

/// Errors raised while loading [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("format error: {0}")]
	Format(#[from] FormatError),

	#[cfg(feature = "validate")]
	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("no format registered for {0:?}")]
	UnknownFormat(std::path::PathBuf),
}

/// Tuning inputs for a [`Provider`](crate::controller::Provider).
///
/// Field checks run only with the `validate` feature. Without it a zero
/// TTL or interval is still rejected later by the provider builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "validate", derive(Validate))]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	/// Maximum age, in seconds, of a cached key before a lookup refetches it.
	#[cfg_attr(feature = "validate", validate(range(min = 1)))]
	pub ttl_secs: u64,

	/// Background polling period in seconds. Absent disables polling.
	#[cfg_attr(feature = "validate", validate(range(min = 1)))]
	pub poll_interval_secs: Option<u64>,

	/// Keys fetched eagerly and kept fresh by the poller.
	#[cfg_attr(feature = "validate", validate(custom(function = "validate_prefetch")))]
	pub prefetch: Vec<String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			ttl_secs: DEFAULT_TTL.as_secs(),
			poll_interval_secs: None,
			prefetch: Vec::new(),
		}
	}
}

#[cfg(feature = "validate")]
fn validate_prefetch(keys: &[String]) -> Result<(), ValidationError> {
	if keys.iter().any(|key| key.is_empty()) {
		return Err(ValidationError::new("empty_prefetch_key"));
	}
	Ok(())
}

impl Settings {
	/// Parses and validates settings from raw bytes.
	pub fn parse(format: AnyFormat, input: &[u8]) -> Result<Self, ConfigError> {
		let settings: Settings = format.parse(input)?;
		#[cfg(feature = "validate")]
		settings.validate()?;
		Ok(settings)
	}

	/// Reads settings from a file, selecting the parser by extension.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let format = path
			.extension()
			.and_then(|ext| ext.to_str())
			.and_then(AnyFormat::from_extension)
			.ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;

		let bytes = tokio::fs::read(path).await?;
		Self::parse(format, &bytes)
	}

	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}

	pub fn poll_interval(&self) -> Option<Duration> {
		self.poll_interval_secs.map(Duration::from_secs)
	}
}
