/* src/controller/provider.rs */

//!
//! Consumer-facing handle: pull-path lookups, watches and background polling.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::Value;

use crate::config::Settings;
use crate::extract::{DottedEncoder, Extractor, FormatExtractor, KeyEncoder, KeyPath};
use crate::holder::Snapshot;
use crate::loader::Loader;
use crate::poller::{Poller, PollerHandle};
use crate::watch::{SnapshotWatch, ValueWatch};

use super::{BuildError, DEFAULT_TTL, LookupError, RefreshOutcome, ReloadCoordinator};

/// A live view of remote key-value data.
///
/// # Clone Semantics
///
/// Clones share the same coordinator, so every clone reads and refreshes one
/// cache and feeds one set of watchers.
#[derive(Clone)]
pub struct Provider {
	coordinator: Arc<ReloadCoordinator>,
	encoder: Arc<dyn KeyEncoder>,
	prefetch: Arc<[String]>,
	poll_interval: Option<Duration>,
}

/// Builder for [`Provider`].
pub struct ProviderBuilder {
	loader: Option<Arc<dyn Loader>>,
	extractor: Arc<dyn Extractor>,
	encoder: Arc<dyn KeyEncoder>,
	ttl: Duration,
	poll_interval: Option<Duration>,
	prefetch: Vec<String>,
}

impl ProviderBuilder {
	pub fn new() -> Self {
		Self {
			loader: None,
			extractor: Arc::new(FormatExtractor::default()),
			encoder: Arc::new(DottedEncoder),
			ttl: DEFAULT_TTL,
			poll_interval: None,
			prefetch: Vec::new(),
		}
	}

	pub fn loader<L: Loader + 'static>(mut self, loader: Arc<L>) -> Self {
		self.loader = Some(loader);
		self
	}

	pub fn extractor(mut self, extractor: impl Extractor + 'static) -> Self {
		self.extractor = Arc::new(extractor);
		self
	}

	pub fn encoder(mut self, encoder: impl KeyEncoder + 'static) -> Self {
		self.encoder = Arc::new(encoder);
		self
	}

	pub fn ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;
		self
	}

	/// Enables background polling. Without it the poller is never spawned.
	pub fn poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = Some(interval);
		self
	}

	/// Keys fetched eagerly by [`Provider::prefetch`] and refreshed by the poller.
	pub fn prefetch<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.prefetch = keys.into_iter().map(Into::into).collect();
		self
	}

	/// Applies TTL, polling interval and prefetch set from loaded settings.
	pub fn settings(mut self, settings: &Settings) -> Self {
		self.ttl = settings.ttl();
		self.poll_interval = settings.poll_interval();
		self.prefetch = settings.prefetch.clone();
		self
	}

	pub fn build(self) -> Result<Provider, BuildError> {
		let loader = self.loader.ok_or(BuildError::MissingLoader)?;
		if self.ttl.is_zero() {
			return Err(BuildError::ZeroTtl);
		}
		if self.poll_interval.is_some_and(|i| i.is_zero()) {
			return Err(BuildError::ZeroInterval);
		}

		Ok(Provider {
			coordinator: Arc::new(ReloadCoordinator::new(loader, self.extractor, self.ttl)),
			encoder: self.encoder,
			prefetch: self.prefetch.into(),
			poll_interval: self.poll_interval,
		})
	}
}

impl Default for ProviderBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl Provider {
	pub fn builder() -> ProviderBuilder {
		ProviderBuilder::new()
	}

	/// Resolves a key, fetching its top-level entry first if it is missing or expired.
	///
	/// Returns `Ok(None)` when the key or nested path does not exist. A
	/// malformed remote payload never fails the lookup; the previously cached
	/// value (if any) is returned instead.
	pub async fn lookup(&self, path: &KeyPath) -> Result<Option<Value>, LookupError> {
		if !self.coordinator.is_fresh(path.name()) {
			self.coordinator
				.refresh(path.name(), false)
				.await
				.map_err(|source| LookupError::Fetch {
					key: self.encoder.encode(path),
					source,
				})?;
		}
		Ok(self
			.coordinator
			.snapshot()
			.resolve(path, self.coordinator.extractor()))
	}

	/// Like [`lookup`](Self::lookup), parsing a dotted key such as `db.port`.
	pub async fn get(&self, dotted: &str) -> Result<Option<Value>, LookupError> {
		let path = KeyPath::parse(dotted)?;
		self.lookup(&path).await
	}

	/// Watches one key.
	///
	/// The key is looked up first, so the stream opens with its current value
	/// (or the lookup error if nothing is cached), followed by every change.
	pub async fn watch(&self, path: KeyPath) -> ValueWatch {
		let failure = self.lookup(&path).await.err();
		self.coordinator.watch(path, failure)
	}

	/// Watches every snapshot that changes a key, starting with the current one.
	pub fn watch_snapshot(&self) -> SnapshotWatch {
		self.coordinator.watch_snapshot()
	}

	/// Returns the current snapshot. Never waits on a fetch.
	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.coordinator.snapshot()
	}

	/// Forces a foreground refresh of one top-level key, bypassing the TTL.
	pub async fn refresh(&self, key: &str) -> Result<RefreshOutcome, LookupError> {
		let path = KeyPath::new([key])?;
		self.coordinator
			.refresh(key, true)
			.await
			.map_err(|source| LookupError::Fetch {
				key: self.encoder.encode(&path),
				source,
			})
	}

	/// Fetches every prefetch key concurrently.
	///
	/// Every key is attempted; the first failure in prefetch order is returned.
	pub async fn prefetch(&self) -> Result<(), LookupError> {
		let results = join_all(self.prefetch.iter().map(|key| self.refresh(key))).await;
		results.into_iter().try_for_each(|result| result.map(drop))
	}

	/// Builds a poller over an explicit key set and interval.
	pub fn poller(&self, keys: Vec<String>, interval: Duration) -> Poller {
		Poller::new(Arc::clone(&self.coordinator), keys, interval)
	}

	/// Spawns the background poller over the prefetch set.
	///
	/// Returns `None` when no polling interval is configured.
	pub fn spawn_poller(&self) -> Option<PollerHandle> {
		let interval = self.poll_interval?;
		Some(self.poller(self.prefetch.to_vec(), interval).spawn())
	}

	pub fn coordinator(&self) -> &Arc<ReloadCoordinator> {
		&self.coordinator
	}

	pub fn prefetch_keys(&self) -> &[String] {
		&self.prefetch
	}
}

impl std::fmt::Debug for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("coordinator", &self.coordinator)
			.field("prefetch", &self.prefetch)
			.field("poll_interval", &self.poll_interval)
			.finish_non_exhaustive()
	}
}
