/* src/watch/mod.rs */

//!
//! Change subscriptions for single keys and for whole snapshots.
//!
//! Every subscriber owns a capacity-1 channel that keeps only the newest
//! pending value, so a stalled subscriber never pushes back on refreshes.

mod registry;
mod stream;

pub use registry::{Deliveries, Subscription, SubscriptionId, WatchRegistry};
pub use stream::{SnapshotWatch, ValueWatch};

use serde_json::Value;

use crate::controller::LookupError;

/// One item of a key watch: the resolved value, absence, or the lookup failure.
pub type ValueUpdate = Result<Option<Value>, LookupError>;

/// A channel payload tagged with the store version that produced it.
#[derive(Debug, Clone)]
pub(crate) struct Versioned<T> {
	pub version: u64,
	pub item: T,
}
