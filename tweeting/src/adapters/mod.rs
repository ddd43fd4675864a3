//! Adapters layer
//!
//! Implementations of the feed store port for concrete backends.

pub mod firestore;
pub mod live_query;
pub mod memory;
pub mod postgres;

pub use firestore::{FirestoreClient, FirestoreFeedStore};
pub use memory::InMemoryFeedStore;
pub use postgres::PostgresFeedStore;
