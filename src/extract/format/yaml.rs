/* src/extract/format/yaml.rs */

use serde::de::DeserializeOwned;

use super::super::FormatError;
use super::Format;

/// YAML format parser using `serde_yaml`.
pub struct Yaml;

impl Format for Yaml {
	fn extensions(&self) -> &'static [&'static str] {
		&["yaml", "yml"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, FormatError> {
		serde_yaml::from_slice(input).map_err(|e| FormatError::Parse(e.to_string()))
	}
}
