//! Domain entities
//!
//! Pure domain models. Store-specific row/document shapes live with their
//! adapters and convert into these.

pub mod post;

pub use post::{FeedSnapshot, NewPost, Post, PostId, DEFAULT_AUTHOR};
