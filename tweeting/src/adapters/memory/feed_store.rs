//! In-memory implementation of FeedStore

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{NewPost, Post, PostId};
use crate::domain::ports::{FeedStore, SnapshotPublisher, Subscription};
use crate::error::DomainError;

struct StoredPost {
    post: Post,
    /// Insertion order, used to break `created_at` ties
    seq: u64,
}

#[derive(Default)]
struct Collection {
    posts: HashMap<PostId, StoredPost>,
    next_seq: u64,
}

impl Collection {
    fn insert(&mut self, post: Post) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.posts.insert(post.id.clone(), StoredPost { post, seq });
    }

    fn ordered(&self) -> Vec<Post> {
        let mut stored: Vec<&StoredPost> = self.posts.values().collect();
        stored.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        stored.into_iter().map(|s| s.post.clone()).collect()
    }
}

/// Authoritative in-process post collection with a live query
pub struct InMemoryFeedStore {
    collection: RwLock<Collection>,
    publisher: SnapshotPublisher,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        let publisher = SnapshotPublisher::new();
        publisher.publish(Vec::new());
        Self {
            collection: RwLock::new(Collection::default()),
            publisher,
        }
    }

    /// Pre-populate with existing posts, inserted in the given order
    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let store = Self::new();
        {
            let mut collection = store.write();
            for post in posts {
                collection.insert(post);
            }
            store.publisher.publish(collection.ordered());
        }
        store
    }

    /// Current contents, in feed order
    pub fn posts(&self) -> Vec<Post> {
        self.collection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ordered()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collection> {
        self.collection
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryFeedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn subscribe(&self) -> Result<Subscription, DomainError> {
        Ok(self.publisher.subscribe())
    }

    async fn create(&self, new_post: &NewPost) -> Result<Post, DomainError> {
        let post = new_post
            .clone()
            .into_post(PostId(Uuid::new_v4().simple().to_string()));

        let mut collection = self.write();
        collection.insert(post.clone());
        self.publisher.publish(collection.ordered());

        tracing::debug!(post_id = %post.id, "Post created");
        Ok(post)
    }

    async fn set_like_count(&self, id: &PostId, like_count: i64) -> Result<(), DomainError> {
        let mut collection = self.write();
        let stored = collection
            .posts
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Post {} not found", id)))?;

        stored.post.like_count = like_count;
        self.publisher.publish(collection.ordered());
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), DomainError> {
        let mut collection = self.write();
        if collection.posts.remove(id).is_some() {
            self.publisher.publish(collection.ordered());
            tracing::debug!(post_id = %id, "Post deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{new_post_at, test_post};

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn subscribe_to_empty_store_yields_empty_list() {
        let store = InMemoryFeedStore::new();

        let mut sub = store.subscribe().await.unwrap();
        let snapshot = sub.next().await.unwrap();

        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_ordered_newest_first() {
        let store = InMemoryFeedStore::with_posts(vec![
            test_post("a", 10, 2),
            test_post("b", 20, 0),
        ]);

        let mut sub = store.subscribe().await.unwrap();
        let snapshot = sub.next().await.unwrap();

        assert_eq!(ids(&snapshot), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn created_at_ties_put_later_insertions_first() {
        let store = InMemoryFeedStore::with_posts(vec![
            test_post("first", 10, 0),
            test_post("second", 10, 0),
        ]);

        assert_eq!(ids(&store.posts()), vec!["second", "first"]);
    }

    #[tokio::test]
    async fn create_assigns_id_and_zero_likes_and_notifies() {
        let store = InMemoryFeedStore::new();
        let mut sub = store.subscribe().await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        let created = store.create(&new_post_at("alice", "hello", 30)).await.unwrap();

        assert!(!created.id.as_str().is_empty());
        assert_eq!(created.like_count, 0);
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.as_slice(), &[created]);
    }

    #[tokio::test]
    async fn set_like_count_overwrites_field() {
        let store = InMemoryFeedStore::with_posts(vec![test_post("a", 10, 2)]);

        store.set_like_count(&PostId::from("a"), 7).await.unwrap();

        assert_eq!(store.posts()[0].like_count, 7);
    }

    #[tokio::test]
    async fn set_like_count_on_missing_post_is_not_found() {
        let store = InMemoryFeedStore::new();

        let result = store.set_like_count(&PostId::from("ghost"), 1).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(store.posts().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_is_a_no_op() {
        let store = InMemoryFeedStore::with_posts(vec![test_post("a", 10, 2)]);

        store.delete(&PostId::from("a")).await.unwrap();
        store.delete(&PostId::from("a")).await.unwrap();

        assert!(store.posts().is_empty());
    }

    #[tokio::test]
    async fn delete_reaches_every_subscriber() {
        let store = InMemoryFeedStore::with_posts(vec![
            test_post("a", 10, 2),
            test_post("b", 20, 0),
        ]);
        let mut first = store.subscribe().await.unwrap();
        let mut second = store.subscribe().await.unwrap();
        first.next().await.unwrap();
        second.next().await.unwrap();

        store.delete(&PostId::from("a")).await.unwrap();

        assert_eq!(ids(&first.next().await.unwrap()), vec!["b"]);
        assert_eq!(ids(&second.next().await.unwrap()), vec!["b"]);
    }
}
