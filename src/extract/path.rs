/* src/extract/path.rs */

use std::fmt;
use std::str::FromStr;

/// Malformed key path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyPathError {
	#[error("key path is empty")]
	Empty,
	#[error("key path '{0}' contains an empty component")]
	EmptyComponent(String),
}

/// A fully-qualified key: the top-level name followed by nested components.
///
/// `db.port` addresses the `port` member of the tree stored under `db`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
	components: Vec<String>,
}

impl KeyPath {
	/// Builds a path from already-split components.
	pub fn new<I, S>(components: I) -> Result<Self, KeyPathError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let components: Vec<String> = components.into_iter().map(Into::into).collect();
		if components.is_empty() {
			return Err(KeyPathError::Empty);
		}
		if components.iter().any(String::is_empty) {
			return Err(KeyPathError::EmptyComponent(components.join(".")));
		}
		Ok(Self { components })
	}

	/// Parses a dotted path such as `db.port`.
	pub fn parse(dotted: &str) -> Result<Self, KeyPathError> {
		if dotted.is_empty() {
			return Err(KeyPathError::Empty);
		}
		Self::new(dotted.split('.'))
	}

	/// The top-level key name, the unit the remote store fetches.
	pub fn name(&self) -> &str {
		&self.components[0]
	}

	/// Components below the top-level name.
	pub fn nested(&self) -> &[String] {
		&self.components[1..]
	}

	pub fn components(&self) -> &[String] {
		&self.components
	}
}

impl FromStr for KeyPath {
	type Err = KeyPathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.components.join("."))
	}
}
