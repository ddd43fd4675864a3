//! In-process adapter
//!
//! A feed store that keeps the collection in memory. Every screen sharing one
//! instance sees the others' writes through the live query, which makes it a
//! stand-in for the remote store during local runs and tests.

pub mod feed_store;

pub use feed_store::InMemoryFeedStore;
