//! Domain layer
//!
//! Contains the feed's data model and the port it needs from a backing store.
//! - `entities`: Post records as the feed sees them
//! - `ports`: Trait definitions for external dependencies

pub mod entities;
pub mod ports;
