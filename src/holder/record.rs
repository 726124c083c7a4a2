/* src/holder/record.rs */

use tokio::time::Instant;

/// Ledger entry for the last successful fetch of a top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRecord {
	/// Timestamp of the last successful fetch. Never decreases for a key.
	pub refreshed_at: Instant,
	/// Store version assigned by the commit that wrote this record.
	///
	/// Unique per commit, so it doubles as the optimistic-concurrency witness.
	pub version: u64,
}

impl RefreshRecord {
	/// Whether the record is still within `ttl` at `now`.
	pub fn is_fresh(&self, now: Instant, ttl: std::time::Duration) -> bool {
		now.saturating_duration_since(self.refreshed_at) < ttl
	}
}
