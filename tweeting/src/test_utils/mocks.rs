//! Mock implementations of port traits
//!
//! `RecordingFeedStore` records every write it receives and only changes the
//! feed when a test pushes a snapshot, so tests control exactly what the
//! screen observes and when. `LaggyFeedStore` wraps any store and holds back
//! its first like-count write, the way one slow network round trip would.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::entities::{NewPost, Post, PostId};
use crate::domain::ports::{FeedStore, SnapshotPublisher, Subscription};
use crate::error::DomainError;

/// A write the store received, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWrite {
    Create { author: String, body: String },
    SetLikeCount { id: PostId, like_count: i64 },
    Delete { id: PostId },
}

#[derive(Default)]
pub struct RecordingFeedStore {
    publisher: SnapshotPublisher,
    writes: Arc<RwLock<Vec<RecordedWrite>>>,
    write_done: Notify,
    subscriptions: AtomicUsize,
    fail_writes: AtomicBool,
    fail_subscribe: AtomicBool,
    next_id: AtomicUsize,
}

impl RecordingFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an initial snapshot
    pub fn with_snapshot(self, posts: Vec<Post>) -> Self {
        self.publisher.publish(posts);
        self
    }

    /// Make every write fail with a database error
    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Make `subscribe` fail
    pub fn failing_subscribe(self) -> Self {
        self.fail_subscribe.store(true, Ordering::SeqCst);
        self
    }

    /// Deliver a snapshot to every open subscription
    pub fn push_snapshot(&self, posts: Vec<Post>) {
        self.publisher.publish(posts);
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().unwrap().clone()
    }

    /// Number of times `subscribe` was called
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Number of subscriptions still open
    pub fn open_subscriptions(&self) -> usize {
        self.publisher.subscriber_count()
    }

    /// Wait until at least `count` writes have been recorded
    pub async fn wait_for_writes(&self, count: usize) -> Vec<RecordedWrite> {
        loop {
            let notified = self.write_done.notified();
            let writes = self.writes();
            if writes.len() >= count {
                return writes;
            }
            notified.await;
        }
    }

    fn record(&self, write: RecordedWrite) -> Result<(), DomainError> {
        self.writes.write().unwrap().push(write);
        self.write_done.notify_waiters();
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Database("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedStore for RecordingFeedStore {
    async fn subscribe(&self) -> Result<Subscription, DomainError> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(DomainError::Database("listen rejected".to_string()));
        }
        Ok(self.publisher.subscribe())
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        self.record(RecordedWrite::Create {
            author: post.author.clone(),
            body: post.body.clone(),
        })?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(post.clone().into_post(PostId(format!("created-{}", id))))
    }

    async fn set_like_count(&self, id: &PostId, like_count: i64) -> Result<(), DomainError> {
        self.record(RecordedWrite::SetLikeCount {
            id: id.clone(),
            like_count,
        })
    }

    async fn delete(&self, id: &PostId) -> Result<(), DomainError> {
        self.record(RecordedWrite::Delete { id: id.clone() })
    }
}

/// Store wrapper whose first `set_like_count` takes `lag` longer than the rest
pub struct LaggyFeedStore<S> {
    inner: S,
    lag: Duration,
    lagged: AtomicBool,
}

impl<S: FeedStore> LaggyFeedStore<S> {
    pub fn new(inner: S, lag: Duration) -> Self {
        Self {
            inner,
            lag,
            lagged: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: FeedStore> FeedStore for LaggyFeedStore<S> {
    async fn subscribe(&self) -> Result<Subscription, DomainError> {
        self.inner.subscribe().await
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        self.inner.create(post).await
    }

    async fn set_like_count(&self, id: &PostId, like_count: i64) -> Result<(), DomainError> {
        if !self.lagged.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.lag).await;
        }
        self.inner.set_like_count(id, like_count).await
    }

    async fn delete(&self, id: &PostId) -> Result<(), DomainError> {
        self.inner.delete(id).await
    }
}
