/* src/holder/store/write.rs */

use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde_json::Value;
use tokio::time::Instant;

use super::super::{RefreshRecord, Snapshot};
use super::{CacheState, Store};

/// Result of a successful commit: the snapshots on either side of it.
#[derive(Debug, Clone)]
pub struct Commit {
	pub old: Arc<Snapshot>,
	pub new: Arc<Snapshot>,
	pub record: RefreshRecord,
}

impl Commit {
	/// Whether the committed key's tree differs between the two snapshots.
	pub fn changed(&self, key: &str) -> bool {
		self.old.get(key) != self.new.get(key)
	}
}

/// A concurrent commit advanced the key's record after the caller read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a fresher commit already advanced the record")]
pub struct Superseded;

impl Store {
	/// Installs `tree` under `key` if the key's record still carries `witness`.
	///
	/// `witness` is the record version the caller read before fetching (`None`
	/// if the key had never been fetched). If any other commit touched the key
	/// since, the write is abandoned with [`Superseded`] and nothing changes.
	/// Commits of unrelated keys that land in between are retried over, not
	/// treated as conflicts.
	pub fn commit(
		&self,
		key: &str,
		witness: Option<u64>,
		tree: Option<Value>,
		now: Instant,
	) -> Result<Commit, Superseded> {
		let tree = tree.map(Arc::new);
		let mut current = self.inner.load_full();

		loop {
			let previous = current.records.get(key);
			if previous.map(|r| r.version) != witness {
				return Err(Superseded);
			}

			let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
			let record = RefreshRecord {
				refreshed_at: previous.map_or(now, |r| r.refreshed_at.max(now)),
				version,
			};

			let mut records = current.records.clone();
			records.insert(key.to_string(), record);
			let next = Arc::new(CacheState {
				snapshot: Arc::new(current.snapshot.with_entry(version, key, tree.clone())),
				records,
			});

			let swapped = self.inner.compare_and_swap(&current, Arc::clone(&next));
			if Arc::ptr_eq(&*swapped, &current) {
				return Ok(Commit {
					old: Arc::clone(&current.snapshot),
					new: Arc::clone(&next.snapshot),
					record,
				});
			}
			current = arc_swap::Guard::into_inner(swapped);
		}
	}
}
