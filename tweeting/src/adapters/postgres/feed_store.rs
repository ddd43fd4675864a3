//! PostgreSQL adapter for FeedStore

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::adapters::live_query::{PolledLiveQuery, SnapshotSource};
use crate::domain::entities::{NewPost, Post, PostId};
use crate::domain::ports::{FeedStore, Subscription};
use crate::entity::posts;
use crate::error::DomainError;

const SCHEMA: &str = include_str!("../../../migrations/001_create_posts.sql");

/// Reads the `posts` table in feed order
pub struct PostgresPostSource {
    db: DatabaseConnection,
}

#[async_trait]
impl SnapshotSource for PostgresPostSource {
    async fn fetch_ordered(&self) -> Result<Vec<Post>, DomainError> {
        let rows = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Seq)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }
}

/// PostgreSQL implementation of FeedStore
pub struct PostgresFeedStore {
    source: Arc<PostgresPostSource>,
    live: PolledLiveQuery<PostgresPostSource>,
}

impl PostgresFeedStore {
    pub fn new(db: DatabaseConnection, poll_interval: Duration) -> Self {
        let source = Arc::new(PostgresPostSource { db });
        Self {
            live: PolledLiveQuery::new(source.clone(), poll_interval),
            source,
        }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.source.db
    }

    /// Create the `posts` table and its feed-order index if missing
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        self.db()
            .execute_unprepared(SCHEMA)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Ids that are not UUIDs cannot name a row
fn row_id(id: &PostId) -> Option<Uuid> {
    Uuid::parse_str(id.as_str()).ok()
}

#[async_trait]
impl FeedStore for PostgresFeedStore {
    async fn subscribe(&self) -> Result<Subscription, DomainError> {
        Ok(self.live.subscribe())
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        let model = posts::ActiveModel {
            id: Set(Uuid::new_v4()),
            author: Set(post.author.clone()),
            body: Set(post.body.clone()),
            created_at: Set(post.created_at.fixed_offset()),
            like_count: Set(0),
            ..Default::default()
        };

        let result = model
            .insert(self.db())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.live.refresh();
        Ok(result.into())
    }

    async fn set_like_count(&self, id: &PostId, like_count: i64) -> Result<(), DomainError> {
        let not_found = || DomainError::NotFound(format!("Post {} not found", id));
        let key = row_id(id).ok_or_else(not_found)?;

        let result = posts::Entity::update_many()
            .col_expr(posts::Column::LikeCount, Expr::value(like_count))
            .filter(posts::Column::Id.eq(key))
            .exec(self.db())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(not_found());
        }

        self.live.refresh();
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), DomainError> {
        let Some(key) = row_id(id) else {
            return Ok(());
        };

        let result = posts::Entity::delete_by_id(key)
            .exec(self.db())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected > 0 {
            self.live.refresh();
        }
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Post {
            id: PostId(model.id.to_string()),
            author: model.author,
            body: model.body,
            created_at: model.created_at.with_timezone(&Utc),
            like_count: model.like_count,
        }
    }
}
