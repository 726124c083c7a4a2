/* src/poller/mod.rs */

//!
//! Interval-driven background refresh of a fixed key set.

mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::controller::{RefreshOutcome, ReloadCoordinator};
use crate::loader::FetchError;

/// Lifecycle of a [`Poller`]: `Idle -> Running -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
	Idle,
	Running,
	Stopped,
}

/// Result of one polling tick.
#[derive(Debug, Default)]
pub struct TickReport {
	/// Keys whose refresh returned an outcome.
	pub refreshed: Vec<(String, RefreshOutcome)>,
	/// Keys whose fetch failed.
	pub failed: Vec<(String, FetchError)>,
}

impl TickReport {
	pub fn is_clean(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Periodically force-refreshes a fixed set of keys.
///
/// Each tick refreshes all keys concurrently and waits for every one of them;
/// a failing key is logged and never stops its siblings or the loop.
pub struct Poller {
	coordinator: Arc<ReloadCoordinator>,
	keys: Vec<String>,
	interval: Duration,
	state: watch::Sender<PollerState>,
}

impl Poller {
	pub fn new(coordinator: Arc<ReloadCoordinator>, keys: Vec<String>, interval: Duration) -> Self {
		let (state, _) = watch::channel(PollerState::Idle);
		Self {
			coordinator,
			keys,
			interval,
			state,
		}
	}

	pub fn state(&self) -> PollerState {
		*self.state.borrow()
	}

	pub fn keys(&self) -> &[String] {
		&self.keys
	}

	/// Refreshes every key once, bypassing the TTL.
	pub async fn tick(&self) -> TickReport {
		let results = join_all(self.keys.iter().map(|key| async move {
			(key.clone(), self.coordinator.refresh(key, true).await)
		}))
		.await;

		let mut report = TickReport::default();
		for (key, result) in results {
			match result {
				Ok(outcome) => report.refreshed.push((key, outcome)),
				Err(e) => {
					warn!(key = %key, error = %e, "background refresh failed");
					report.failed.push((key, e));
				}
			}
		}
		report
	}

	/// Runs until `signal` fires.
	///
	/// Cancellation is checked between ticks; a tick in progress always runs
	/// to completion, so no refresh is left half-applied.
	pub async fn run(self, mut signal: ShutdownSignal) {
		if signal.is_cancelled() {
			self.state.send_replace(PollerState::Stopped);
			return;
		}

		self.state.send_replace(PollerState::Running);
		info!(keys = self.keys.len(), interval = ?self.interval, "poller started");

		let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				biased;
				_ = signal.cancelled() => break,
				_ = ticker.tick() => {
					self.tick().await;
				}
			}
		}

		self.state.send_replace(PollerState::Stopped);
		info!("poller stopped");
	}

	/// Spawns the loop onto the current runtime.
	pub fn spawn(self) -> PollerHandle {
		let shutdown = Shutdown::new();
		let state = self.state.subscribe();
		let task = tokio::spawn(self.run(shutdown.signal()));
		PollerHandle {
			shutdown,
			state,
			task: Some(task),
		}
	}
}

/// Owner handle of a spawned [`Poller`].
///
/// Dropping the handle signals the poller to stop after its current tick.
pub struct PollerHandle {
	shutdown: Shutdown,
	state: watch::Receiver<PollerState>,
	task: Option<JoinHandle<()>>,
}

impl PollerHandle {
	pub fn state(&self) -> PollerState {
		*self.state.borrow()
	}

	/// Signals the poller and waits for its loop to exit. Returns the final state.
	///
	/// A loop that panicked is reported as stopped.
	pub async fn stop(mut self) -> PollerState {
		self.shutdown.trigger();
		if let Some(task) = self.task.take()
			&& let Err(e) = task.await
		{
			warn!(error = %e, "poller task failed");
			return PollerState::Stopped;
		}
		*self.state.borrow()
	}
}

impl Drop for PollerHandle {
	fn drop(&mut self) {
		self.shutdown.trigger();
	}
}
