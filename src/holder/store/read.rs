/* src/holder/store/read.rs */

use std::sync::Arc;

use serde_json::Value;

use super::super::{RefreshRecord, Snapshot};
use super::{CacheState, Store};

impl Store {
	/// Gets the value tree stored under `key`. This is a wait-free operation.
	pub fn get(&self, key: &str) -> Option<Arc<Value>> {
		self.inner.load().snapshot.get(key).cloned()
	}

	/// Returns the current snapshot without copying it.
	pub fn snapshot(&self) -> Arc<Snapshot> {
		Arc::clone(&self.inner.load().snapshot)
	}

	/// Gets the ledger record for `key`, if it was ever fetched successfully.
	pub fn record(&self, key: &str) -> Option<RefreshRecord> {
		self.inner.load().records.get(key).copied()
	}

	/// Returns the snapshot and ledger as one consistent state.
	pub fn state(&self) -> Arc<CacheState> {
		self.inner.load_full()
	}

	/// Returns all keys present in the current snapshot.
	pub fn keys(&self) -> Vec<String> {
		self.inner.load().snapshot.keys().map(str::to_string).collect()
	}

	pub fn len(&self) -> usize {
		self.inner.load().snapshot.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.load().snapshot.is_empty()
	}
}
