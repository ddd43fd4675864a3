//! Feed synchronization controller
//!
//! Keeps the screen's post list in step with the store: one subscription per
//! controller, each snapshot replacing the whole list.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::screen_state::{SharedScreen, SyncPhase};
use crate::domain::ports::{FeedStore, Subscription};
use crate::error::DomainError;

pub struct FeedSyncController<S: FeedStore> {
    store: Arc<S>,
    screen: Arc<SharedScreen>,
    stop: Option<oneshot::Sender<()>>,
    pump: Option<JoinHandle<()>>,
}

impl<S: FeedStore> FeedSyncController<S> {
    pub fn new(store: Arc<S>, screen: Arc<SharedScreen>) -> Self {
        Self {
            store,
            screen,
            stop: None,
            pump: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.screen.read(|s| s.phase())
    }

    /// Open the feed subscription and start applying snapshots.
    ///
    /// A second call while subscribed does nothing. A torn-down controller
    /// cannot be restarted.
    pub async fn start(&mut self) -> Result<(), DomainError> {
        match self.phase() {
            SyncPhase::Uninitialized => {}
            SyncPhase::Subscribed => {
                tracing::debug!("Feed already subscribed, ignoring start");
                return Ok(());
            }
            SyncPhase::Unsubscribed => {
                return Err(DomainError::Conflict(
                    "feed controller has been torn down".to_string(),
                ));
            }
        }

        let subscription = self.store.subscribe().await?;

        let (stop_tx, stop_rx) = oneshot::channel();
        self.screen.update(|s| {
            s.reset_for_subscription();
            s.set_phase(SyncPhase::Subscribed);
        });
        self.stop = Some(stop_tx);
        self.pump = Some(tokio::spawn(pump(
            subscription,
            self.screen.clone(),
            stop_rx,
        )));

        tracing::info!("Feed subscription started");
        Ok(())
    }

    /// Stop applying snapshots and close the subscription. Idempotent.
    pub fn teardown(&mut self) {
        let was = self.screen.update(|s| {
            let was = s.phase();
            s.set_phase(SyncPhase::Unsubscribed);
            was
        });

        if let Some(stop) = self.stop.take() {
            // The pump may already have exited on its own
            let _ = stop.send(());
        }

        if was != SyncPhase::Unsubscribed {
            tracing::info!("Feed subscription torn down");
        }
    }

    /// Tear down and wait for the pump task to exit
    pub async fn shutdown(mut self) {
        self.teardown();
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                tracing::error!(error = %e, "Feed pump task failed");
            }
        }
    }
}

impl<S: FeedStore> Drop for FeedSyncController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drain the subscription into the screen until stopped
async fn pump(
    mut subscription: Subscription,
    screen: Arc<SharedScreen>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            next = subscription.next() => {
                let Some(snapshot) = next else {
                    tracing::debug!("Feed subscription ended by store");
                    break;
                };

                let count = snapshot.len();
                let applied = screen.update(|s| {
                    // Phase checked under the lock so a late snapshot never
                    // lands after teardown
                    if s.phase() != SyncPhase::Subscribed {
                        return false;
                    }
                    s.apply_snapshot(snapshot);
                    true
                });

                if !applied {
                    break;
                }
                tracing::trace!(count, "Feed snapshot applied");
            }
        }
    }

    subscription.close();
}
