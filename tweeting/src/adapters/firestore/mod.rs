//! Firestore adapter
//!
//! Implementation of the feed store over the Cloud Firestore REST API.

pub mod client;
pub mod document;
pub mod feed_store;


pub use client::FirestoreClient;
pub use feed_store::FirestoreFeedStore;
