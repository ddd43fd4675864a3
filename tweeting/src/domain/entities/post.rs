//! Post domain entity
//!
//! A post ("tweet") is one user-submitted message in the shared feed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author shown for stored documents that carry no author field.
pub const DEFAULT_AUTHOR: &str = "User";

/// Opaque identifier assigned by the store when a post is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted post, as materialized from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
}

/// Data needed to create a new post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// Build a post stamped with the current time.
    ///
    /// Returns `None` when either field is blank after trimming; the trimmed
    /// values are what gets stored.
    pub fn compose(author: &str, body: &str) -> Option<Self> {
        let author = author.trim();
        let body = body.trim();
        if author.is_empty() || body.is_empty() {
            return None;
        }

        Some(Self {
            author: author.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Materialize into a post once the store has assigned an id
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            author: self.author,
            body: self.body,
            created_at: self.created_at,
            like_count: 0,
        }
    }
}

/// A full, ordered copy of the feed as delivered by one change notification.
///
/// Snapshots are immutable and shared; a newer snapshot replaces an older one
/// wholesale.
pub type FeedSnapshot = Arc<Vec<Post>>;
