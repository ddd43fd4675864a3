//! Feed store port
//!
//! The whole vocabulary of the backing document database, reduced to the four
//! operations the feed needs.

use async_trait::async_trait;

use crate::domain::entities::{NewPost, Post, PostId};
use crate::domain::ports::Subscription;
use crate::error::DomainError;

/// A single collection of posts in a remote document store
#[async_trait]
pub trait FeedStore: Send + Sync + 'static {
    /// Open a live query over the collection, ordered by `created_at`
    /// descending (ties: most recently inserted first).
    ///
    /// The subscription yields the full ordered list after every change made
    /// by any client, starting with the current contents. An empty collection
    /// yields an empty list.
    async fn subscribe(&self) -> Result<Subscription, DomainError>;

    /// Append a new post with a like count of zero
    async fn create(&self, post: &NewPost) -> Result<Post, DomainError>;

    /// Replace the `likeCount` field of one post.
    ///
    /// This is a blind overwrite: no read-modify-write happens, so concurrent
    /// writers race and the last one wins. Unknown ids fail with `NotFound`
    /// and never create a document.
    async fn set_like_count(&self, id: &PostId, like_count: i64) -> Result<(), DomainError>;

    /// Remove a post. Removing an unknown id succeeds.
    async fn delete(&self, id: &PostId) -> Result<(), DomainError>;
}
