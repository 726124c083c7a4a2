/* src/watch/stream.rs */

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::{Subscription, SubscriptionId, ValueUpdate, Versioned};
use crate::extract::KeyPath;
use crate::holder::Snapshot;

/// Stream of updates for one key.
///
/// Yields the value current at subscription time first, then every change.
/// Intermediate values may be skipped if the consumer falls behind; the
/// newest one is always delivered. Dropping the stream ends the subscription.
pub struct ValueWatch {
	path: KeyPath,
	inner: WatchStream<Versioned<ValueUpdate>>,
	subscription: Subscription,
}

impl ValueWatch {
	pub(crate) fn new(
		path: KeyPath,
		rx: watch::Receiver<Versioned<ValueUpdate>>,
		subscription: Subscription,
	) -> Self {
		Self {
			path,
			inner: WatchStream::new(rx),
			subscription,
		}
	}

	pub fn path(&self) -> &KeyPath {
		&self.path
	}

	pub fn id(&self) -> SubscriptionId {
		self.subscription.id()
	}
}

impl Stream for ValueWatch {
	type Item = ValueUpdate;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner)
			.poll_next(cx)
			.map(|next| next.map(|versioned| versioned.item))
	}
}

impl std::fmt::Debug for ValueWatch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ValueWatch")
			.field("path", &self.path)
			.field("id", &self.id())
			.finish_non_exhaustive()
	}
}

/// Stream of whole snapshots, starting with the current one.
pub struct SnapshotWatch {
	inner: WatchStream<Versioned<Arc<Snapshot>>>,
	subscription: Subscription,
}

impl SnapshotWatch {
	pub(crate) fn new(
		rx: watch::Receiver<Versioned<Arc<Snapshot>>>,
		subscription: Subscription,
	) -> Self {
		Self {
			inner: WatchStream::new(rx),
			subscription,
		}
	}

	pub fn id(&self) -> SubscriptionId {
		self.subscription.id()
	}
}

impl Stream for SnapshotWatch {
	type Item = Arc<Snapshot>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner)
			.poll_next(cx)
			.map(|next| next.map(|versioned| versioned.item))
	}
}

impl std::fmt::Debug for SnapshotWatch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SnapshotWatch")
			.field("id", &self.id())
			.finish_non_exhaustive()
	}
}
