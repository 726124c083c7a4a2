/* src/extract/format/json.rs */

use serde::de::DeserializeOwned;

use super::super::FormatError;
use super::Format;

/// JSON format parser using `serde_json`.
pub struct Json;

impl Format for Json {
	fn extensions(&self) -> &'static [&'static str] {
		&["json"]
	}

	fn parse<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, FormatError> {
		serde_json::from_slice(input).map_err(|e| FormatError::Parse(e.to_string()))
	}
}
