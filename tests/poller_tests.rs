/* tests/poller_tests.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt};
use livekv::KeyPath;
use livekv::controller::{Provider, RefreshOutcome};
use livekv::loader::{FetchError, Loader, MemoryLoader};
use livekv::poller::{PollerState, Shutdown};
use serde_json::json;
use tokio::sync::mpsc;

fn setup() -> (Arc<MemoryLoader>, Provider) {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", r#"{"port":5432}"#);
	loader.insert("cache", r#"{"size":64}"#);
	let provider = Provider::builder()
		.loader(Arc::clone(&loader))
		.prefetch(["db", "cache"])
		.poll_interval(Duration::from_secs(10))
		.build()
		.unwrap();
	(loader, provider)
}

#[tokio::test]
async fn test_tick_isolates_failing_key() {
	let (loader, provider) = setup();
	loader.fail("cache", FetchError::Transport("unreachable".into()));

	let poller = provider.poller(vec!["db".into(), "cache".into()], Duration::from_secs(10));
	let report = poller.tick().await;

	assert!(!report.is_clean());
	assert_eq!(report.failed.len(), 1);
	assert_eq!(report.failed[0].0, "cache");
	assert_eq!(report.refreshed.len(), 1);
	assert!(matches!(
		report.refreshed[0],
		(ref key, RefreshOutcome::Committed { .. }) if key == "db"
	));
	assert!(provider.snapshot().contains_key("db"));
	assert!(!provider.snapshot().contains_key("cache"));
}

#[tokio::test]
async fn test_tick_bypasses_ttl() {
	let (loader, provider) = setup();
	provider.prefetch().await.unwrap();

	let poller = provider.poller(vec!["db".into()], Duration::from_secs(10));
	poller.tick().await;
	poller.tick().await;

	// One prefetch per key, then two forced polls of "db".
	assert_eq!(loader.fetch_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_poller_refreshes_and_notifies() -> Result<(), Box<dyn std::error::Error>> {
	let (loader, provider) = setup();
	provider.prefetch().await?;

	let mut port = provider.watch(KeyPath::parse("db.port")?).await;
	assert_eq!(port.next().await.unwrap()?, Some(json!(5432)));

	let handle = provider.spawn_poller().expect("interval configured");
	loader.insert("db", r#"{"port":5433}"#);

	tokio::time::sleep(Duration::from_secs(11)).await;
	assert_eq!(handle.state(), PollerState::Running);
	assert_eq!(port.next().now_or_never().flatten().unwrap()?, Some(json!(5433)));

	tokio::time::sleep(Duration::from_secs(10)).await;
	// Two prefetches, then two ticks over both keys.
	assert_eq!(loader.fetch_count(), 6);

	assert_eq!(handle.stop().await, PollerState::Stopped);
	Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stopped_poller_does_not_tick() {
	let (loader, provider) = setup();

	let handle = provider.spawn_poller().unwrap();
	assert_eq!(handle.stop().await, PollerState::Stopped);

	tokio::time::sleep(Duration::from_secs(60)).await;
	assert_eq!(loader.fetch_count(), 0);
}

/// Reports each fetch, then panics inside it.
struct PanickingLoader {
	fetched: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Loader for PanickingLoader {
	async fn fetch(&self, key: &str) -> Result<Option<String>, FetchError> {
		let _ = self.fetched.send(key.to_string());
		panic!("loader crashed on {key}");
	}
}

#[tokio::test(start_paused = true)]
async fn test_stop_reports_panicked_poller_as_stopped() {
	let (fetched, mut fetches) = mpsc::unbounded_channel();
	let provider = Provider::builder()
		.loader(Arc::new(PanickingLoader { fetched }))
		.build()
		.unwrap();

	let handle = provider.poller(vec!["db".into()], Duration::from_secs(10)).spawn();
	assert_eq!(fetches.recv().await.as_deref(), Some("db"));
	// The loop died mid-tick and never recorded its own exit.
	assert_eq!(handle.state(), PollerState::Running);

	assert_eq!(handle.stop().await, PollerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_poller() {
	let (loader, provider) = setup();

	drop(provider.spawn_poller().unwrap());
	tokio::time::sleep(Duration::from_secs(60)).await;
	assert_eq!(loader.fetch_count(), 0);
}

#[tokio::test]
async fn test_poller_state_machine() {
	let (_loader, provider) = setup();
	let poller = provider.poller(vec!["db".into()], Duration::from_secs(10));
	assert_eq!(poller.state(), PollerState::Idle);

	let shutdown = Shutdown::new();
	shutdown.trigger();
	assert!(shutdown.is_triggered());
	// An already cancelled signal returns without ticking.
	poller.run(shutdown.signal()).await;
}

#[test]
fn test_no_interval_means_no_poller() {
	let provider = Provider::builder()
		.loader(Arc::new(MemoryLoader::new()))
		.prefetch(["db"])
		.build()
		.unwrap();
	assert!(provider.spawn_poller().is_none());
}
