/* src/watch/registry.rs */

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;

use super::{ValueUpdate, Versioned};
use crate::extract::{Extractor, KeyPath};
use crate::holder::{Commit, Snapshot};

type Slot<T> = Arc<watch::Sender<Versioned<T>>>;

/// Identity of one subscription, unique for the lifetime of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct ValueSubscriber {
	path: KeyPath,
	slot: Slot<ValueUpdate>,
	/// The channel holds a lookup error that no snapshot has answered yet.
	failed: bool,
}

/// Subscriber maps at both granularities.
///
/// Lives inside the coordinator's mutual-exclusion domain: subscribing and
/// computing the diff of a commit are serialized, so a subscriber either
/// captured a commit in its initial value or is part of that commit's diff.
#[derive(Default)]
pub struct WatchRegistry {
	next_id: u64,
	values: HashMap<SubscriptionId, ValueSubscriber>,
	snapshots: HashMap<SubscriptionId, Slot<Arc<Snapshot>>>,
}

impl WatchRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	fn allocate(&mut self) -> SubscriptionId {
		self.next_id += 1;
		SubscriptionId(self.next_id)
	}

	/// Registers a key watcher whose channel starts out holding `initial`.
	pub(crate) fn subscribe_value(
		&mut self,
		path: KeyPath,
		version: u64,
		initial: ValueUpdate,
	) -> (SubscriptionId, watch::Receiver<Versioned<ValueUpdate>>) {
		let id = self.allocate();
		let failed = initial.is_err();
		let (tx, rx) = watch::channel(Versioned {
			version,
			item: initial,
		});
		self.values.insert(
			id,
			ValueSubscriber {
				path,
				slot: Arc::new(tx),
				failed,
			},
		);
		(id, rx)
	}

	/// Registers a snapshot watcher whose channel starts out holding `current`.
	pub(crate) fn subscribe_snapshot(
		&mut self,
		current: Arc<Snapshot>,
	) -> (SubscriptionId, watch::Receiver<Versioned<Arc<Snapshot>>>) {
		let id = self.allocate();
		let (tx, rx) = watch::channel(Versioned {
			version: current.version(),
			item: current,
		});
		self.snapshots.insert(id, Arc::new(tx));
		(id, rx)
	}

	/// Removes a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.values.remove(&id).is_some() || self.snapshots.remove(&id).is_some()
	}

	/// Number of live key watchers.
	pub fn value_watchers(&self) -> usize {
		self.values.len()
	}

	/// Number of live snapshot watchers.
	pub fn snapshot_watchers(&self) -> usize {
		self.snapshots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty() && self.snapshots.is_empty()
	}

	/// Computes what a commit of `key` must deliver.
	///
	/// Only key watchers whose resolved value differs between the two
	/// snapshots are included; "absent before and after" counts as unchanged.
	/// A watcher still showing a lookup error is always included, since the
	/// commit is the first answer it gets for its key.
	/// Snapshot watchers are included whenever the key's tree changed.
	pub fn changes(&mut self, key: &str, commit: &Commit, extractor: &dyn Extractor) -> Deliveries {
		let version = commit.new.version();
		let values = self
			.values
			.values_mut()
			.filter(|sub| sub.path.name() == key)
			.filter_map(|sub| {
				let before = commit.old.resolve(&sub.path, extractor);
				let after = commit.new.resolve(&sub.path, extractor);
				if before == after && !sub.failed {
					return None;
				}
				sub.failed = false;
				Some((Arc::clone(&sub.slot), Ok(after)))
			})
			.collect();

		let snapshots = if commit.changed(key) {
			self.snapshots.values().cloned().collect()
		} else {
			Vec::new()
		};

		Deliveries {
			version,
			snapshot: Arc::clone(&commit.new),
			values,
			snapshots,
		}
	}
}

/// Pending notifications, collected under the lock and pushed after it is released.
pub struct Deliveries {
	version: u64,
	snapshot: Arc<Snapshot>,
	values: Vec<(Slot<ValueUpdate>, ValueUpdate)>,
	snapshots: Vec<Slot<Arc<Snapshot>>>,
}

impl Deliveries {
	pub fn is_empty(&self) -> bool {
		self.values.is_empty() && self.snapshots.is_empty()
	}

	/// Pushes every pending value. Returns how many channels accepted one.
	///
	/// A channel already holding a newer version keeps it, so deliveries that
	/// race each other after the lock is released cannot move a watcher backwards.
	pub fn deliver(self) -> usize {
		let mut delivered = 0;
		for (slot, item) in self.values {
			if offer(&slot, self.version, item) {
				delivered += 1;
			}
		}
		for slot in self.snapshots {
			if offer(&slot, self.version, Arc::clone(&self.snapshot)) {
				delivered += 1;
			}
		}
		delivered
	}
}

fn offer<T>(slot: &watch::Sender<Versioned<T>>, version: u64, item: T) -> bool {
	slot.send_if_modified(|current| {
		if current.version >= version {
			return false;
		}
		*current = Versioned { version, item };
		true
	})
}

/// Scope guard for one subscription; dropping it unsubscribes.
///
/// Holds the registry weakly, so it never keeps a torn-down provider alive.
pub struct Subscription {
	id: SubscriptionId,
	registry: Weak<Mutex<WatchRegistry>>,
}

impl Subscription {
	pub(crate) fn new(id: SubscriptionId, registry: &Arc<Mutex<WatchRegistry>>) -> Self {
		Self {
			id,
			registry: Arc::downgrade(registry),
		}
	}

	pub fn id(&self) -> SubscriptionId {
		self.id
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.lock().unsubscribe(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}
