/* tests/coordinator_tests.rs */

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::ScriptedLoader;
use livekv::controller::{LookupError, Provider, RefreshOutcome};
use livekv::extract::KeyEncoder;
use livekv::holder::RefreshRecord;
use livekv::loader::{FetchError, MemoryLoader};
use livekv::KeyPath;
use serde_json::json;

fn provider(loader: &Arc<MemoryLoader>) -> Provider {
	Provider::builder()
		.loader(Arc::clone(loader))
		.ttl(Duration::from_secs(300))
		.build()
		.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_lookup_within_ttl_fetches_once() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", r#"{"port": 5432}"#);
	let provider = provider(&loader);

	assert_eq!(provider.get("db.port").await?, Some(json!(5432)));
	assert_eq!(provider.get("db.port").await?, Some(json!(5432)));
	assert_eq!(loader.fetch_count(), 1);

	tokio::time::advance(Duration::from_secs(299)).await;
	provider.get("db.port").await?;
	assert_eq!(loader.fetch_count(), 1);

	tokio::time::advance(Duration::from_secs(2)).await;
	provider.get("db.port").await?;
	assert_eq!(loader.fetch_count(), 2);

	Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_refresh_ttl_gate_and_force() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", "{}");
	let provider = provider(&loader);
	let coordinator = provider.coordinator();

	assert!(matches!(
		coordinator.refresh("db", false).await?,
		RefreshOutcome::Committed { changed: true, .. }
	));
	assert_eq!(coordinator.refresh("db", false).await?, RefreshOutcome::Fresh);
	assert!(matches!(
		coordinator.refresh("db", true).await?,
		RefreshOutcome::Committed { changed: false, .. }
	));
	assert_eq!(loader.fetch_count(), 2);

	Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_keeps_previous_value() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("cfg", r#"{"a": 1}"#);
	let provider = provider(&loader);

	assert_eq!(provider.get("cfg.a").await?, Some(json!(1)));

	loader.insert("cfg", "{oops");
	assert_eq!(provider.refresh("cfg").await?, RefreshOutcome::Malformed);
	assert_eq!(provider.get("cfg.a").await?, Some(json!(1)));

	// Once expired, the lookup refetches, hits the bad payload again and
	// still answers from the cached value.
	tokio::time::advance(Duration::from_secs(301)).await;
	assert_eq!(provider.get("cfg.a").await?, Some(json!(1)));
	assert_eq!(loader.fetch_count(), 3);

	Ok(())
}

#[tokio::test]
async fn test_malformed_payload_without_prior_value_is_absent() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("cfg", "[1,");
	let provider = provider(&loader);

	assert_eq!(provider.get("cfg.a").await?, None);
	Ok(())
}

#[tokio::test]
async fn test_fetch_error_propagates_to_lookup() {
	let loader = Arc::new(MemoryLoader::new());
	loader.fail("db", FetchError::Transport("connection reset".into()));
	let provider = provider(&loader);

	let err = provider.get("db.port").await.unwrap_err();
	match err {
		LookupError::Fetch { key, source } => {
			assert_eq!(key, "db.port");
			assert!(matches!(source, FetchError::Transport(_)));
		}
		other => panic!("expected fetch error, got {other:?}"),
	}
}

/// Renders keys the way an operator-facing log would, with a namespace prefix.
struct NamespacedEncoder;

impl KeyEncoder for NamespacedEncoder {
	fn encode(&self, path: &KeyPath) -> String {
		format!("prod/{}", path.components().join("/"))
	}
}

#[tokio::test]
async fn test_fetch_errors_use_key_encoder() {
	let loader = Arc::new(MemoryLoader::new());
	loader.fail("db", FetchError::Denied("no grant".into()));
	let provider = Provider::builder()
		.loader(Arc::clone(&loader))
		.encoder(NamespacedEncoder)
		.build()
		.unwrap();

	match provider.get("db.port").await {
		Err(LookupError::Fetch { key, .. }) => assert_eq!(key, "prod/db/port"),
		other => panic!("expected fetch error, got {other:?}"),
	}
	match provider.refresh("db").await {
		Err(LookupError::Fetch { key, .. }) => assert_eq!(key, "prod/db"),
		other => panic!("expected fetch error, got {other:?}"),
	}
	assert!(matches!(
		provider.refresh("").await,
		Err(LookupError::InvalidKey(_))
	));
}

#[tokio::test]
async fn test_malformed_key_path_is_rejected() {
	let loader = Arc::new(MemoryLoader::new());
	let provider = provider(&loader);

	assert!(matches!(
		provider.get("db..port").await,
		Err(LookupError::InvalidKey(_))
	));
	assert_eq!(loader.fetch_count(), 0);
}

#[tokio::test]
async fn test_absent_key_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", r#"{"port": 5432}"#);
	let provider = provider(&loader);

	assert_eq!(provider.get("missing").await?, None);
	assert_eq!(provider.get("db.user").await?, None);
	Ok(())
}

#[tokio::test]
async fn test_slower_refresh_is_superseded() -> Result<(), Box<dyn std::error::Error>> {
	let (loader, mut started) = ScriptedLoader::new();
	let loader = Arc::new(loader);
	let release_slow = loader.push_gated(r#"{"v": "slow"}"#);
	loader.push(r#"{"v": "fast"}"#);

	let provider = Provider::builder().loader(Arc::clone(&loader)).build()?;

	let slow = tokio::spawn({
		let provider = provider.clone();
		async move { provider.coordinator().refresh("k", true).await }
	});
	// The slow refresh has captured its witness and is parked in the fetch.
	started.recv().await;

	let fast = provider.coordinator().refresh("k", true).await?;
	assert!(matches!(fast, RefreshOutcome::Committed { changed: true, .. }));

	release_slow.send(()).unwrap();
	assert_eq!(slow.await??, RefreshOutcome::Superseded);

	let path = KeyPath::parse("k.v")?;
	assert_eq!(provider.lookup(&path).await?, Some(json!("fast")));
	Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_refresh_records_are_monotonic() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", "1");
	let provider = provider(&loader);
	let store = provider.coordinator().store();

	let mut last: Option<RefreshRecord> = None;
	for step in 0..5 {
		loader.insert("db", step.to_string());
		provider.refresh("db").await?;
		let record = store.record("db").unwrap();
		if let Some(previous) = last.replace(record) {
			assert!(record.refreshed_at >= previous.refreshed_at);
			assert!(record.version > previous.version);
		}
		tokio::time::advance(Duration::from_millis(10)).await;
	}
	Ok(())
}

#[tokio::test]
async fn test_prefetch_populates_snapshot() -> Result<(), Box<dyn std::error::Error>> {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", r#"{"port": 5432}"#);
	loader.insert("cache", r#"{"size": 64}"#);

	let provider = Provider::builder()
		.loader(Arc::clone(&loader))
		.prefetch(["db", "cache"])
		.build()?;
	provider.prefetch().await?;

	let snapshot = provider.snapshot();
	assert_eq!(snapshot.len(), 2);
	assert_eq!(loader.fetch_count(), 2);

	provider.get("cache.size").await?;
	assert_eq!(loader.fetch_count(), 2);
	Ok(())
}

#[tokio::test]
async fn test_prefetch_reports_failure() {
	let loader = Arc::new(MemoryLoader::new());
	loader.insert("db", "{}");
	loader.fail("vault", FetchError::Denied("no".into()));

	let provider = Provider::builder()
		.loader(Arc::clone(&loader))
		.prefetch(["db", "vault"])
		.build()
		.unwrap();

	let err = provider.prefetch().await.unwrap_err();
	assert!(matches!(err, LookupError::Fetch { ref key, .. } if key == "vault"));
	// The healthy key still landed.
	assert!(provider.snapshot().contains_key("db"));
}

#[test]
fn test_builder_requires_loader_and_ttl() {
	use livekv::controller::BuildError;

	assert_eq!(
		Provider::builder().build().unwrap_err(),
		BuildError::MissingLoader
	);
	assert_eq!(
		Provider::builder()
			.loader(Arc::new(MemoryLoader::new()))
			.ttl(Duration::ZERO)
			.build()
			.unwrap_err(),
		BuildError::ZeroTtl
	);
}
