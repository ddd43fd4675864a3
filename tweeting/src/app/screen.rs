//! Feed screen
//!
//! Wires the sync controller and the interaction handlers to one shared
//! screen state, and maps terminal commands onto them.

use std::sync::Arc;

use tokio::sync::watch;

use super::command_parser::Command;
use super::dispatch::PendingWrite;
use super::feed_sync::FeedSyncController;
use super::interactions::InteractionHandlers;
use super::screen_state::{ScreenState, ScreenView, SharedScreen, Theme};
use crate::domain::ports::FeedStore;
use crate::error::DomainError;

/// What running a command produced
#[must_use]
pub enum CommandOutcome {
    /// Local state changed, nothing written
    Updated,
    /// A store write is in flight
    Dispatched(PendingWrite),
    /// Nothing happened; tell the user why
    Notice(String),
    Help,
    Quit,
}

pub struct FeedScreen<S: FeedStore> {
    screen: Arc<SharedScreen>,
    controller: FeedSyncController<S>,
    handlers: InteractionHandlers<S>,
}

impl<S: FeedStore> FeedScreen<S> {
    pub fn new(store: Arc<S>, author: impl Into<String>, theme: Theme) -> Self {
        let screen = SharedScreen::new(ScreenState::new(author, theme));
        Self {
            controller: FeedSyncController::new(store.clone(), screen.clone()),
            handlers: InteractionHandlers::new(store, screen.clone()),
            screen,
        }
    }

    pub async fn start(&mut self) -> Result<(), DomainError> {
        self.controller.start().await
    }

    pub fn handlers(&self) -> &InteractionHandlers<S> {
        &self.handlers
    }

    pub fn view(&self) -> ScreenView {
        self.screen.view()
    }

    pub fn watch(&self) -> watch::Receiver<ScreenView> {
        self.screen.watch()
    }

    pub fn execute(&self, command: Command) -> CommandOutcome {
        match command {
            Command::Name { author } => {
                self.handlers.set_author(&author);
                CommandOutcome::Updated
            }
            Command::Say { text } => {
                self.handlers.set_body(&text);
                CommandOutcome::Updated
            }
            Command::Post { text } => {
                if let Some(text) = text {
                    self.handlers.set_body(&text);
                }
                match self.handlers.submit() {
                    Some(pending) => CommandOutcome::Dispatched(pending),
                    None => CommandOutcome::Notice(
                        "Both a name and a message are needed to post".to_string(),
                    ),
                }
            }
            Command::Like { index } => {
                let outcome = self
                    .screen
                    .read(|s| s.post_id_at(index))
                    .and_then(|id| self.handlers.toggle_like(&id));
                match outcome {
                    Some(pending) => CommandOutcome::Dispatched(pending),
                    None => self.no_post_at(index),
                }
            }
            Command::Delete { index } => match self.screen.read(|s| s.post_id_at(index)) {
                Some(id) => CommandOutcome::Dispatched(self.handlers.delete(&id)),
                None => self.no_post_at(index),
            },
            Command::Theme { mode: None } => {
                self.handlers.toggle_theme();
                CommandOutcome::Updated
            }
            Command::Theme { mode: Some(theme) } => {
                self.handlers.set_theme(theme);
                CommandOutcome::Updated
            }
            Command::Help => CommandOutcome::Help,
            Command::Quit => CommandOutcome::Quit,
        }
    }

    fn no_post_at(&self, index: usize) -> CommandOutcome {
        let count = self.screen.read(|s| s.post_count());
        CommandOutcome::Notice(format!(
            "No post #{} (the feed has {} posts)",
            index + 1,
            count
        ))
    }

    /// Stop syncing and wait for the subscription to close
    pub async fn shutdown(self) {
        self.controller.shutdown().await;
    }
}
