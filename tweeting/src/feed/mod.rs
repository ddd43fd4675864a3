//! Feed rendering
//!
//! Turns screen views into text for the terminal.

pub mod renderer;

pub use renderer::render_screen;
