/* src/holder/snapshot.rs */

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::extract::{Extractor, KeyPath};

/// An immutable, point-in-time mapping from key name to resolved value tree.
///
/// A refresh never edits a snapshot; it builds a successor with
/// [`with_entry`](Self::with_entry) and publishes that instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
	version: u64,
	entries: HashMap<String, Arc<Value>>,
}

impl Snapshot {
	/// Store version that produced this snapshot. `0` for the empty initial one.
	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn get(&self, key: &str) -> Option<&Arc<Value>> {
		self.entries.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Value>)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Resolves a fully-qualified key against this snapshot.
	pub fn resolve(&self, path: &KeyPath, extractor: &dyn Extractor) -> Option<Value> {
		let tree = self.entries.get(path.name())?;
		extractor.extract(tree, path.nested())
	}

	/// Builds the successor snapshot with `key` replaced, or removed when `tree` is `None`.
	pub(crate) fn with_entry(&self, version: u64, key: &str, tree: Option<Arc<Value>>) -> Self {
		let mut entries = self.entries.clone();
		match tree {
			Some(tree) => {
				entries.insert(key.to_string(), tree);
			}
			None => {
				entries.remove(key);
			}
		}
		Self { version, entries }
	}
}
