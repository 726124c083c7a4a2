/* src/extract/format/toml.rs */

use serde::de::DeserializeOwned;

use super::super::FormatError;
use super::Format;

/// TOML format parser using `toml`.
pub struct Toml;

impl Format for Toml {
	fn extensions(&self) -> &'static [&'static str] {
		&["toml"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, FormatError> {
		let s = std::str::from_utf8(input).map_err(|e| FormatError::Parse(e.to_string()))?;
		toml::from_str(s).map_err(|e| FormatError::Parse(e.to_string()))
	}
}
