//! SeaORM entities
//!
//! Table models for the PostgreSQL adapter. Mirrors `migrations/`.

pub mod posts;
