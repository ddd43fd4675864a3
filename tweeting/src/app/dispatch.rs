//! Fire-and-forget store writes
//!
//! Handlers never await the store. Writes go through one queue drained by a
//! single writer task, so they reach the store in the order they were
//! issued; a failure is only logged and the feed corrects itself on the next
//! snapshot.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::domain::entities::PostId;
use crate::error::DomainError;

type WriteFuture = Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send>>;

struct QueuedWrite {
    op: &'static str,
    post_id: Option<PostId>,
    write: WriteFuture,
    completed: Arc<AtomicBool>,
    done: oneshot::Sender<()>,
}

/// Handle to a queued write. Dropping it does not cancel the write.
#[must_use = "drop the handle to fire and forget, or await `finished`"]
pub struct PendingWrite {
    op: &'static str,
    completed: Arc<AtomicBool>,
    done: oneshot::Receiver<()>,
}

impl PendingWrite {
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn is_finished(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Wait for the write to complete. Failures were already logged.
    pub async fn finished(self) {
        if self.done.await.is_err() {
            tracing::error!(op = self.op, "Store write dropped before it ran");
        }
    }
}

/// Ordered queue of store writes with its own writer task
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<QueuedWrite>,
}

impl WriteQueue {
    /// Start the writer task. It runs until every clone of the queue is
    /// dropped and the writes already queued have been applied.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(rx));
        Self { tx }
    }

    /// Queue `write` behind every write queued before it
    pub fn dispatch<F>(&self, op: &'static str, post_id: Option<PostId>, write: F) -> PendingWrite
    where
        F: Future<Output = Result<(), DomainError>> + Send + 'static,
    {
        let completed = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = oneshot::channel();

        let queued = QueuedWrite {
            op,
            post_id,
            write: Box::pin(write),
            completed: completed.clone(),
            done: done_tx,
        };

        if let Err(mpsc::error::SendError(queued)) = self.tx.send(queued) {
            tracing::error!(op, post_id = ?queued.post_id.as_ref().map(PostId::as_str), "Write queue closed, dropping write");
            completed.store(true, Ordering::SeqCst);
        }

        PendingWrite {
            op,
            completed,
            done: done_rx,
        }
    }
}

async fn drain(mut rx: mpsc::UnboundedReceiver<QueuedWrite>) {
    while let Some(queued) = rx.recv().await {
        let post_id = queued.post_id.as_ref().map(PostId::as_str);
        match queued.write.await {
            Ok(()) => {
                tracing::debug!(op = queued.op, post_id = ?post_id, "Store write completed");
            }
            Err(e) => {
                tracing::warn!(op = queued.op, post_id = ?post_id, error = %e, "Store write failed");
            }
        }

        queued.completed.store(true, Ordering::SeqCst);
        // Nobody waiting is fine
        let _ = queued.done.send(());
    }

    tracing::debug!("Write queue drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_write_without_being_awaited() {
        let queue = WriteQueue::spawn();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let pending = queue.dispatch("create", None, async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(pending.op(), "create");
        pending.finished().await;

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failure_is_contained() {
        let queue = WriteQueue::spawn();

        let failed = queue.dispatch("delete", Some(PostId::from("a")), async {
            Err(DomainError::Database("offline".to_string()))
        });
        let next = queue.dispatch("delete", Some(PostId::from("b")), async { Ok(()) });

        failed.finished().await;
        next.finished().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_write_does_not_let_later_writes_overtake_it() {
        let queue = WriteQueue::spawn();
        let applied = Arc::new(Mutex::new(Vec::new()));

        let slow_log = applied.clone();
        let slow = queue.dispatch("set_like_count", None, async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            slow_log.lock().unwrap().push(3);
            Ok(())
        });
        let fast_log = applied.clone();
        let fast = queue.dispatch("set_like_count", None, async move {
            fast_log.lock().unwrap().push(2);
            Ok(())
        });

        fast.finished().await;
        assert!(slow.is_finished());
        slow.finished().await;

        assert_eq!(*applied.lock().unwrap(), vec![3, 2]);
    }

    #[tokio::test]
    async fn queued_writes_finish_after_queue_is_dropped() {
        let queue = WriteQueue::spawn();
        let pending = queue.dispatch("create", None, async {
            tokio::task::yield_now().await;
            Ok(())
        });

        drop(queue);

        pending.finished().await;
    }
}
