//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Manual mocks are used instead of a mocking framework: the feed store
//! hands out live subscriptions, which a recorded-expectation mock cannot
//! model, and tests need to push snapshots at moments they choose.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
