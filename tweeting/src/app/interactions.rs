//! Interaction handlers
//!
//! Turn user gestures into store writes. Only the like toggle changes local
//! state ahead of the store; new and deleted posts show up through the
//! subscription. All clones of a handler set share one write queue, so the
//! store sees writes in the order the user made them.

use std::sync::Arc;

use super::dispatch::{PendingWrite, WriteQueue};
use super::screen_state::{SharedScreen, Theme};
use crate::domain::entities::PostId;
use crate::domain::ports::FeedStore;

pub struct InteractionHandlers<S: FeedStore> {
    store: Arc<S>,
    screen: Arc<SharedScreen>,
    writes: WriteQueue,
}

impl<S: FeedStore> Clone for InteractionHandlers<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            screen: self.screen.clone(),
            writes: self.writes.clone(),
        }
    }
}

impl<S: FeedStore> InteractionHandlers<S> {
    /// Must be called from within a tokio runtime.
    pub fn new(store: Arc<S>, screen: Arc<SharedScreen>) -> Self {
        Self {
            store,
            screen,
            writes: WriteQueue::spawn(),
        }
    }

    pub fn set_author(&self, author: &str) {
        self.screen.update(|s| s.set_author(author));
    }

    pub fn set_body(&self, body: &str) {
        self.screen.update(|s| s.set_body(body));
    }

    pub fn toggle_theme(&self) -> Theme {
        self.screen.update(|s| s.toggle_theme())
    }

    pub fn set_theme(&self, theme: Theme) {
        self.screen.update(|s| s.set_theme(theme));
    }

    /// Post the current inputs.
    ///
    /// Returns `None` without touching anything when author or body is blank.
    pub fn submit(&self) -> Option<PendingWrite> {
        let Some(post) = self.screen.update(|s| s.take_submission()) else {
            tracing::debug!("Ignoring submit with blank author or body");
            return None;
        };

        let store = self.store.clone();
        Some(self.writes.dispatch("create", None, async move {
            let created = store.create(&post).await?;
            tracing::info!(post_id = %created.id, author = %created.author, "Post submitted");
            Ok(())
        }))
    }

    /// Flip the liked flag and write the adjusted count.
    ///
    /// Returns `None` when the post is no longer in the feed.
    pub fn toggle_like(&self, id: &PostId) -> Option<PendingWrite> {
        let Some(like_count) = self.screen.update(|s| s.toggle_like(id)) else {
            tracing::debug!(post_id = %id, "Ignoring like on post not in feed");
            return None;
        };

        let store = self.store.clone();
        let post_id = id.clone();
        Some(self.writes.dispatch("set_like_count", Some(id.clone()), async move {
            store.set_like_count(&post_id, like_count).await
        }))
    }

    pub fn delete(&self, id: &PostId) -> PendingWrite {
        let store = self.store.clone();
        let post_id = id.clone();
        self.writes.dispatch("delete", Some(id.clone()), async move {
            store.delete(&post_id).await
        })
    }
}
