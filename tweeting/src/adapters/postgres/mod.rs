//! PostgreSQL adapter
//!
//! Implementation of the feed store using SeaORM and PostgreSQL.

pub mod feed_store;


pub use feed_store::PostgresFeedStore;
