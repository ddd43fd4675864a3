//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, Utc};

use crate::domain::entities::{NewPost, Post, PostId};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Create a test post with a fixed creation time (seconds since the epoch)
pub fn test_post(id: &str, created_secs: i64, like_count: i64) -> Post {
    Post {
        id: PostId::from(id),
        author: "alice".to_string(),
        body: format!("post {}", id),
        created_at: at(created_secs),
        like_count,
    }
}

/// Create a new post with a fixed creation time
pub fn new_post_at(author: &str, body: &str, created_secs: i64) -> NewPost {
    NewPost {
        author: author.to_string(),
        body: body.to_string(),
        created_at: at(created_secs),
    }
}
