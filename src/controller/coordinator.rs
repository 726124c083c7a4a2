/* src/controller/coordinator.rs */

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::extract::{Extractor, KeyPath};
use crate::holder::{Snapshot, Store};
use crate::loader::{FetchError, Loader};
use crate::watch::{SnapshotWatch, Subscription, ValueWatch, WatchRegistry};

use super::LookupError;

/// Default maximum age of a cached key before a lookup refetches it.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// What a call to [`ReloadCoordinator::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// The key was refreshed within the TTL; nothing was fetched.
	Fresh,
	/// A new value was installed.
	Committed {
		/// Whether the key's value tree differs from the one it replaced.
		changed: bool,
		/// Number of watcher channels that received an update.
		notified: usize,
	},
	/// A concurrent refresh of the same key committed first; the fetched value was dropped.
	Superseded,
	/// The payload could not be parsed; the cache kept its previous value.
	Malformed,
}

/// Orchestrates refreshes of single keys against one shared cache.
///
/// All mutation of the store and every change to the watch registry happen
/// under one mutex. The remote fetch runs outside it, so a slow key never
/// blocks lookups, TTL checks or commits of other keys.
pub struct ReloadCoordinator {
	store: Store,
	loader: Arc<dyn Loader>,
	extractor: Arc<dyn Extractor>,
	domain: Arc<Mutex<WatchRegistry>>,
	ttl: Duration,
}

impl ReloadCoordinator {
	pub fn new(loader: Arc<dyn Loader>, extractor: Arc<dyn Extractor>, ttl: Duration) -> Self {
		Self {
			store: Store::new(),
			loader,
			extractor,
			domain: Arc::new(Mutex::new(WatchRegistry::new())),
			ttl,
		}
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn extractor(&self) -> &dyn Extractor {
		self.extractor.as_ref()
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Whether `key` was fetched and is still within the TTL.
	pub fn is_fresh(&self, key: &str) -> bool {
		self.store
			.record(key)
			.is_some_and(|record| record.is_fresh(Instant::now(), self.ttl))
	}

	/// Refreshes one top-level key.
	///
	/// Unless `force` is set, a key refreshed within the TTL is left alone.
	/// Fetch errors are returned; every other condition is reported through
	/// the outcome and leaves previously cached data intact.
	pub async fn refresh(&self, key: &str, force: bool) -> Result<RefreshOutcome, FetchError> {
		let witness = {
			let _domain = self.domain.lock();
			let record = self.store.record(key);
			if !force && record.is_some_and(|r| r.is_fresh(Instant::now(), self.ttl)) {
				debug!(key = %key, "within ttl, skipping fetch");
				return Ok(RefreshOutcome::Fresh);
			}
			record.map(|r| r.version)
		};

		debug!(key = %key, force, "fetching");
		let payload = self.loader.fetch(key).await?;

		let tree = match payload {
			Some(raw) => match self.extractor.parse(&raw) {
				Ok(tree) => Some(tree),
				Err(e) => {
					warn!(key = %key, error = %e, "discarding malformed payload");
					return Ok(RefreshOutcome::Malformed);
				}
			},
			None => None,
		};

		let (changed, deliveries) = {
			let mut registry = self.domain.lock();
			let commit = match self.store.commit(key, witness, tree, Instant::now()) {
				Ok(commit) => commit,
				Err(_) => {
					debug!(key = %key, "superseded by a concurrent refresh");
					return Ok(RefreshOutcome::Superseded);
				}
			};
			let deliveries = registry.changes(key, &commit, self.extractor.as_ref());
			(commit.changed(key), deliveries)
		};

		let notified = deliveries.deliver();
		if changed {
			info!(key = %key, notified, "value changed");
		}
		Ok(RefreshOutcome::Committed { changed, notified })
	}

	/// Subscribes to one key, capturing its current value as the first item.
	///
	/// `failure` is the error of the lookup that preceded the subscription;
	/// it becomes the first item only if the key still has no cached value.
	pub fn watch(&self, path: KeyPath, failure: Option<LookupError>) -> ValueWatch {
		let (id, rx) = {
			let mut registry = self.domain.lock();
			let snapshot = self.store.snapshot();
			let initial = match failure {
				Some(error) if !snapshot.contains_key(path.name()) => Err(error),
				_ => Ok(snapshot.resolve(&path, self.extractor.as_ref())),
			};
			registry.subscribe_value(path.clone(), snapshot.version(), initial)
		};
		ValueWatch::new(path, rx, Subscription::new(id, &self.domain))
	}

	/// Subscribes to whole snapshots, starting with the current one.
	pub fn watch_snapshot(&self) -> SnapshotWatch {
		let (id, rx) = {
			let mut registry = self.domain.lock();
			registry.subscribe_snapshot(self.store.snapshot())
		};
		SnapshotWatch::new(rx, Subscription::new(id, &self.domain))
	}

	/// Number of live key and snapshot watchers.
	pub fn watcher_count(&self) -> (usize, usize) {
		let registry = self.domain.lock();
		(registry.value_watchers(), registry.snapshot_watchers())
	}

	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.store.snapshot()
	}
}

impl std::fmt::Debug for ReloadCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ReloadCoordinator")
			.field("store", &self.store)
			.field("ttl", &self.ttl)
			.finish_non_exhaustive()
	}
}
