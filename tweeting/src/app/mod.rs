//! Application layer
//!
//! The feed screen: its state, the controller keeping it in sync with the
//! store, and the handlers turning user gestures into store writes.

pub mod command_parser;
pub mod dispatch;
pub mod feed_sync;
pub mod interactions;
pub mod screen;
pub mod screen_state;

pub use command_parser::{help_text, parse_command};
pub use dispatch::PendingWrite;
pub use screen::{CommandOutcome, FeedScreen};
pub use screen_state::{PostCard, ScreenView, SyncPhase, Theme};
