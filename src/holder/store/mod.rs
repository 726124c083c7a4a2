/* src/holder/store/mod.rs */

mod read;
mod write;

pub use write::{Commit, Superseded};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use arc_swap::ArcSwap;

use super::{RefreshRecord, Snapshot};

/// Everything a refresh publishes in one step: the snapshot and its ledger.
#[derive(Debug, Clone, Default)]
pub struct CacheState {
	pub snapshot: Arc<Snapshot>,
	pub records: HashMap<String, RefreshRecord>,
}

/// Thread-safe value store with atomic, versioned replacement.
///
/// Uses RCU (Read-Copy-Update) for lock-free reads: readers load the current
/// [`CacheState`] and never wait on a writer. Writers publish whole new states
/// through a compare-and-swap, so a reader sees either the old state or the
/// new one, never a mix.
pub struct Store {
	pub(crate) inner: ArcSwap<CacheState>,
	pub(crate) version: AtomicU64,
}

impl Store {
	/// Creates a new empty store.
	pub fn new() -> Self {
		Self {
			inner: ArcSwap::from_pointee(CacheState::default()),
			version: AtomicU64::new(0),
		}
	}
}

impl Default for Store {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Store {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.load();
		f.debug_struct("Store")
			.field("keys", &state.snapshot.len())
			.field("version", &state.snapshot.version())
			.finish()
	}
}
