/* src/loader/source/memory.rs */

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::super::{FetchError, Loader};

/// An in-process store useful for testing and embedded environments.
///
/// Payloads can be replaced while the loader is shared, which makes it a
/// stand-in for a remote store whose contents change underneath the cache.
#[derive(Default)]
pub struct MemoryLoader {
	data: RwLock<BTreeMap<String, String>>,
	failures: RwLock<BTreeMap<String, FetchError>>,
	fetches: AtomicUsize,
}

impl MemoryLoader {
	/// Creates a new empty MemoryLoader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces the payload stored under `key`.
	pub fn insert(&self, key: impl Into<String>, payload: impl Into<String>) {
		self.data.write().insert(key.into(), payload.into());
	}

	/// Removes the payload stored under `key`.
	pub fn remove(&self, key: &str) -> Option<String> {
		self.data.write().remove(key)
	}

	/// Makes every fetch of `key` fail with `error` until [`heal`](Self::heal) is called.
	pub fn fail(&self, key: impl Into<String>, error: FetchError) {
		self.failures.write().insert(key.into(), error);
	}

	pub fn heal(&self, key: &str) {
		self.failures.write().remove(key);
	}

	/// Total number of fetches served, failed ones included.
	pub fn fetch_count(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Loader for MemoryLoader {
	async fn fetch(&self, key: &str) -> Result<Option<String>, FetchError> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		if let Some(error) = self.failures.read().get(key) {
			return Err(error.clone());
		}
		Ok(self.data.read().get(key).cloned())
	}
}
