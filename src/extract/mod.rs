/* src/extract/mod.rs */

//!
//! Structured payload parsing and nested-path extraction.
//!
//! The cache core only sees these through the [`Extractor`] and [`KeyEncoder`]
//! traits; [`FormatExtractor`] and [`DottedEncoder`] are the stock implementations.

pub mod format;
mod path;

pub use path::{KeyPath, KeyPathError};

use serde_json::Value;

use format::{AnyFormat, Format};

/// Errors raised while turning a raw payload into a value tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
	/// Parsing error from format implementation.
	#[error("parse error: {0}")]
	Parse(String),

	/// No registered format handles the given identifier.
	#[error("unsupported format: {0}")]
	Unsupported(String),
}

/// Parses remote payloads and resolves nested paths inside the resulting tree.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait Extractor: Send + Sync {
	/// Parses a raw payload into a value tree.
	fn parse(&self, raw: &str) -> Result<Value, FormatError>;

	/// Resolves `path` (the components after the top-level name) inside `tree`.
	fn extract(&self, tree: &Value, path: &[String]) -> Option<Value>;
}

/// Renders a key path for diagnostics.
pub trait KeyEncoder: Send + Sync {
	fn encode(&self, path: &KeyPath) -> String;
}

/// Extractor backed by one of the compiled-in [`AnyFormat`] parsers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatExtractor {
	format: AnyFormat,
}

impl FormatExtractor {
	pub fn new(format: AnyFormat) -> Self {
		Self { format }
	}

	pub fn format(&self) -> AnyFormat {
		self.format
	}
}

impl Extractor for FormatExtractor {
	fn parse(&self, raw: &str) -> Result<Value, FormatError> {
		self.format.parse(raw.as_bytes())
	}

	fn extract(&self, tree: &Value, path: &[String]) -> Option<Value> {
		let mut node = tree;
		for component in path {
			node = match node {
				Value::Object(map) => map.get(component)?,
				Value::Array(items) => items.get(component.parse::<usize>().ok()?)?,
				_ => return None,
			};
		}
		Some(node.clone())
	}
}

/// Joins path components with `.`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedEncoder;

impl KeyEncoder for DottedEncoder {
	fn encode(&self, path: &KeyPath) -> String {
		path.components().join(".")
	}
}
