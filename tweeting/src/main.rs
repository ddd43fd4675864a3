//! Tweeting feed
//!
//! A terminal feed screen over a shared post collection: post short messages,
//! watch the feed update live, like and delete entries.
//! Uses hexagonal (ports & adapters) architecture so the same screen runs
//! over an in-process store, Firestore, or PostgreSQL.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use sea_orm::Database;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod entity;
mod error;
mod feed;

#[cfg(test)]
mod test_utils;

use adapters::{FirestoreClient, FirestoreFeedStore, InMemoryFeedStore, PostgresFeedStore};
use app::{help_text, parse_command, CommandOutcome, FeedScreen, PendingWrite, ScreenView, Theme};
use config::{Config, StoreConfig};
use domain::ports::FeedStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the rendered feed owns stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tweeting=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting tweeting feed...");

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(store = config.store.name(), "Configuration loaded");

    match &config.store {
        StoreConfig::Memory => run(Arc::new(InMemoryFeedStore::new()), &config).await,
        StoreConfig::Firestore(firestore) => {
            let client = FirestoreClient::new(firestore);
            let store = FirestoreFeedStore::new(client, config.poll_interval);
            run(Arc::new(store), &config).await
        }
        StoreConfig::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            let store = PostgresFeedStore::new(db, config.poll_interval);
            store
                .ensure_schema()
                .await
                .context("Failed to prepare posts table")?;
            run(Arc::new(store), &config).await
        }
    }
}

/// Drive the feed screen from stdin until quit, EOF or Ctrl-C
async fn run<S: FeedStore>(store: Arc<S>, config: &Config) -> anyhow::Result<()> {
    let mut screen = FeedScreen::new(
        store,
        config.author.clone(),
        Theme::from_dark_mode(config.dark_mode),
    );
    screen.start().await.context("Failed to subscribe to the feed")?;

    let mut views = screen.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Vec<PendingWrite> = Vec::new();

    draw(&views.borrow_and_update().clone());
    println!("{}", help_text());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                draw(&view);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match parse_command(&line) {
                    Ok(command) => match screen.execute(command) {
                        CommandOutcome::Updated => {}
                        CommandOutcome::Dispatched(write) => pending.push(write),
                        CommandOutcome::Notice(message) => println!("{}", message),
                        CommandOutcome::Help => println!("{}", help_text()),
                        CommandOutcome::Quit => break,
                    },
                    Err(e) => println!("{} (type `help` for commands)", e),
                }

                pending.retain(|write| !write.is_finished());
            }
        }
    }

    screen.shutdown().await;

    if !pending.is_empty() {
        tracing::info!(count = pending.len(), "Waiting for pending writes");
    }
    for write in pending {
        write.finished().await;
    }

    tracing::info!("Goodbye");
    Ok(())
}

fn draw(view: &ScreenView) {
    let mut stdout = std::io::stdout().lock();
    // A closed stdout only loses the picture
    let _ = writeln!(stdout, "\n{}", feed::render_screen(view, Utc::now()));
    let _ = stdout.flush();
}
