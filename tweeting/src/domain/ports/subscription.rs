//! Live query plumbing shared by every feed store
//!
//! A store owns one [`SnapshotPublisher`]; every [`Subscription`] handed out by
//! it observes the latest full snapshot. Intermediate snapshots may be skipped
//! by a slow reader, which is harmless because each one replaces the last.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::entities::{FeedSnapshot, Post};

/// Write side of a live query
pub struct SnapshotPublisher {
    tx: watch::Sender<Option<FeedSnapshot>>,
}

impl SnapshotPublisher {
    /// A publisher with no snapshot yet; subscribers wait for the first one.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current snapshot and wake every subscriber
    pub fn publish(&self, posts: Vec<Post>) {
        self.tx.send_replace(Some(Arc::new(posts)));
    }

    /// Publish only when `posts` differs from the current snapshot.
    ///
    /// Returns whether subscribers were notified.
    pub fn publish_if_changed(&self, posts: Vec<Post>) -> bool {
        self.tx.send_if_modified(|current| {
            if current.as_deref() == Some(&posts) {
                false
            } else {
                *current = Some(Arc::new(posts));
                true
            }
        })
    }

    /// Latest published snapshot, if any
    pub fn current(&self) -> Option<FeedSnapshot> {
        self.tx.borrow().clone()
    }

    /// Number of open subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.tx.subscribe())
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of a live query: a lazy, unbounded stream of full snapshots.
///
/// Once [`close`](Subscription::close) has been called, or the owning store
/// has gone away, [`next`](Subscription::next) returns `None` forever.
pub struct Subscription {
    rx: Option<watch::Receiver<Option<FeedSnapshot>>>,
    primed: bool,
}

impl Subscription {
    fn new(rx: watch::Receiver<Option<FeedSnapshot>>) -> Self {
        Self {
            rx: Some(rx),
            primed: false,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// The first call yields the current snapshot immediately when the store
    /// already has one. Cancel safe.
    pub async fn next(&mut self) -> Option<FeedSnapshot> {
        loop {
            let rx = self.rx.as_mut()?;

            if !self.primed {
                self.primed = true;
                let current = rx.borrow_and_update().clone();
                if current.is_some() {
                    return current;
                }
            }

            if rx.changed().await.is_err() {
                return None;
            }

            let latest = rx.borrow_and_update().clone();
            if latest.is_some() {
                return latest;
            }
        }
    }

    /// Stop receiving snapshots. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.rx.take().is_some() {
            tracing::debug!("Feed subscription closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }
}
