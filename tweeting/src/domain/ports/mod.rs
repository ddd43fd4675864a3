//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod feed_store;
pub mod subscription;

pub use feed_store::FeedStore;
pub use subscription::{SnapshotPublisher, Subscription};
