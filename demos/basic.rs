/* demos/basic.rs */

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use livekv::KeyPath;
use livekv::controller::Provider;
use livekv::loader::MemoryLoader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// 1. Stand-in for the remote store
	let store = Arc::new(MemoryLoader::new());
	store.insert("db", r#"{"host": "db.internal", "port": 5432}"#);

	// 2. Provider with a short TTL and background polling
	let provider = Provider::builder()
		.loader(Arc::clone(&store))
		.ttl(Duration::from_secs(30))
		.poll_interval(Duration::from_secs(1))
		.prefetch(["db"])
		.build()?;

	// 3. Eager prefetch
	provider.prefetch().await?;
	println!("db.port = {:?}", provider.get("db.port").await?);

	// 4. Watch a nested key, then start polling
	let mut port = provider.watch(KeyPath::parse("db.port")?).await;
	println!("initial: {:?}", port.next().await);

	let poller = provider.spawn_poller();

	// 5. Change the remote value; the poller picks it up
	store.insert("db", r#"{"host": "db.internal", "port": 5433}"#);
	if let Ok(Some(update)) = tokio::time::timeout(Duration::from_secs(5), port.next()).await {
		println!("changed: {:?}", update);
	}

	if let Some(poller) = poller {
		poller.stop().await;
	}
	println!("Done.");
	Ok(())
}
