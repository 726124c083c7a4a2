/* src/poller/shutdown.rs */

//! Cooperative cancellation for long-running tasks.

use tokio::sync::watch;

/// Owner side of a cancellation signal.
///
/// Triggering is sticky: signals created before or after the trigger all
/// observe it, and dropping the owner counts as a trigger too.
#[derive(Debug)]
pub struct Shutdown {
	tx: watch::Sender<bool>,
}

impl Shutdown {
	/// Create a new, untriggered shutdown coordinator.
	pub fn new() -> Self {
		let (tx, _) = watch::channel(false);
		Self { tx }
	}

	/// Returns a signal that long-running tasks can wait on.
	pub fn signal(&self) -> ShutdownSignal {
		ShutdownSignal {
			rx: self.tx.subscribe(),
		}
	}

	/// Trigger the shutdown signal.
	pub fn trigger(&self) {
		self.tx.send_replace(true);
	}

	pub fn is_triggered(&self) -> bool {
		*self.tx.borrow()
	}
}

impl Default for Shutdown {
	fn default() -> Self {
		Self::new()
	}
}

/// Receiving side of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
	rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
	pub fn is_cancelled(&self) -> bool {
		*self.rx.borrow()
	}

	/// Completes once shutdown is triggered or its owner is dropped.
	pub async fn cancelled(&mut self) {
		let _ = self.rx.wait_for(|triggered| *triggered).await;
	}
}
