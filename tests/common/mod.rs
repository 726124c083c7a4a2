/* tests/common/mod.rs */

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use livekv::loader::{FetchError, Loader};
use tokio::sync::{mpsc, oneshot};

/// One scripted response of a [`ScriptedLoader`].
pub struct Step {
	pub response: Result<Option<String>, FetchError>,
	pub gate: Option<oneshot::Receiver<()>>,
}

/// A loader that replays scripted responses in call order.
///
/// A step with a gate holds its fetch open until the gate's sender fires,
/// which lets a test interleave two refreshes of the same key.
pub struct ScriptedLoader {
	script: Mutex<VecDeque<Step>>,
	started: mpsc::UnboundedSender<String>,
}

impl ScriptedLoader {
	pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
		let (started, started_rx) = mpsc::unbounded_channel();
		(
			Self {
				script: Mutex::new(VecDeque::new()),
				started,
			},
			started_rx,
		)
	}

	pub fn push(&self, payload: &str) {
		self.script.lock().unwrap().push_back(Step {
			response: Ok(Some(payload.to_string())),
			gate: None,
		});
	}

	/// Queues a response that is only returned after the returned sender fires.
	pub fn push_gated(&self, payload: &str) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();
		self.script.lock().unwrap().push_back(Step {
			response: Ok(Some(payload.to_string())),
			gate: Some(rx),
		});
		tx
	}
}

#[async_trait]
impl Loader for ScriptedLoader {
	async fn fetch(&self, key: &str) -> Result<Option<String>, FetchError> {
		let step = self
			.script
			.lock()
			.unwrap()
			.pop_front()
			.expect("loader script exhausted");
		let _ = self.started.send(key.to_string());
		if let Some(gate) = step.gate {
			let _ = gate.await;
		}
		step.response
	}
}

/// A loader whose every fetch returns a payload no other fetch returned.
///
/// The payload is `{"n": <fetch number>}`, so each commit it feeds changes the tree.
#[derive(Default)]
pub struct CountingLoader {
	fetches: AtomicU64,
}

#[async_trait]
impl Loader for CountingLoader {
	async fn fetch(&self, _key: &str) -> Result<Option<String>, FetchError> {
		let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
		tokio::task::yield_now().await;
		Ok(Some(format!(r#"{{"n":{n}}}"#)))
	}
}
