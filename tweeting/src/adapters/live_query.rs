//! Polled live query
//!
//! Remote stores without a push channel reachable from here get their live
//! query by re-reading the ordered collection on a fixed interval, and
//! immediately after any write made through the same adapter. Subscribers are
//! only woken when the freshly read list differs from the last one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use crate::domain::entities::Post;
use crate::domain::ports::{SnapshotPublisher, Subscription};
use crate::error::DomainError;

/// Something that can read the whole collection in feed order
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn fetch_ordered(&self) -> Result<Vec<Post>, DomainError>;
}

/// Live query driven by polling a [`SnapshotSource`]
pub struct PolledLiveQuery<S: SnapshotSource> {
    source: Arc<S>,
    publisher: Arc<SnapshotPublisher>,
    refresh: Arc<Notify>,
    interval: Duration,
    started: AtomicBool,
}

impl<S: SnapshotSource> PolledLiveQuery<S> {
    pub fn new(source: Arc<S>, interval: Duration) -> Self {
        Self {
            source,
            publisher: Arc::new(SnapshotPublisher::new()),
            refresh: Arc::new(Notify::new()),
            interval,
            started: AtomicBool::new(false),
        }
    }

    /// Open a subscription, starting the poll task on first use.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self) -> Subscription {
        self.ensure_started();
        let subscription = self.publisher.subscribe();
        self.refresh();
        subscription
    }

    /// Re-read the collection as soon as possible
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    fn ensure_started(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "Starting live query poller");
        tokio::spawn(poll_loop(
            self.source.clone(),
            Arc::downgrade(&self.publisher),
            self.refresh.clone(),
            self.interval,
        ));
    }
}

/// Runs until the owning `PolledLiveQuery` is dropped
async fn poll_loop<S: SnapshotSource>(
    source: Arc<S>,
    publisher: Weak<SnapshotPublisher>,
    refresh: Arc<Notify>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
        }

        let Some(publisher) = publisher.upgrade() else {
            tracing::debug!("Live query owner dropped, stopping poller");
            break;
        };

        if publisher.subscriber_count() == 0 {
            continue;
        }

        match source.fetch_ordered().await {
            Ok(posts) => {
                let count = posts.len();
                if publisher.publish_if_changed(posts) {
                    tracing::debug!(count, "Feed changed, snapshot published");
                }
            }
            Err(e) => {
                // The last good snapshot stays visible; the next tick retries.
                tracing::warn!(error = %e, "Failed to refresh live query");
            }
        }
    }
}
