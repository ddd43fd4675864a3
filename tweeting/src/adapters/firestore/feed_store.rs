//! Firestore implementation of FeedStore

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::FirestoreClient;
use crate::adapters::live_query::PolledLiveQuery;
use crate::domain::entities::{NewPost, Post, PostId};
use crate::domain::ports::{FeedStore, Subscription};
use crate::error::DomainError;

/// Feed store backed by one Firestore collection
pub struct FirestoreFeedStore {
    client: Arc<FirestoreClient>,
    live: PolledLiveQuery<FirestoreClient>,
}

impl FirestoreFeedStore {
    pub fn new(client: FirestoreClient, poll_interval: Duration) -> Self {
        tracing::info!(collection = client.collection(), "Using Firestore feed store");
        let client = Arc::new(client);
        Self {
            live: PolledLiveQuery::new(client.clone(), poll_interval),
            client,
        }
    }
}

#[async_trait]
impl FeedStore for FirestoreFeedStore {
    async fn subscribe(&self) -> Result<Subscription, DomainError> {
        Ok(self.live.subscribe())
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        let created = self.client.create_document(post).await?;
        self.live.refresh();
        Ok(created)
    }

    async fn set_like_count(&self, id: &PostId, like_count: i64) -> Result<(), DomainError> {
        self.client.patch_like_count(id, like_count).await?;
        self.live.refresh();
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), DomainError> {
        self.client.delete_document(id).await?;
        self.live.refresh();
        Ok(())
    }
}
