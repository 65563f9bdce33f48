//! Sends queued transactions to the server once it can be reached again.

use tokio::sync::watch;

use crate::client::{Connectivity, PendingQueue, TransactionApi};

/// What happened during a call to [SyncCoordinator::flush].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// There is no local queue, so there was nothing to do.
    Unavailable,
    /// The queue was empty and no request was made.
    Empty,
    /// The server accepted this many records and they were removed from the queue.
    Flushed(usize),
    /// The bulk request failed and the queue was left as it was.
    Failed,
    /// The queue could not be read, or could not be cleared after the server
    /// accepted its records.
    StorageError,
}

/// Drains the [PendingQueue] into the bulk endpoint.
///
/// A flush sends every queued record in a single request. The server stores
/// all of them or none, so the queue is only cleared once the request
/// succeeds. If clearing fails after a successful request the records are
/// sent again on the next flush.
#[derive(Debug, Clone)]
pub struct SyncCoordinator<A> {
    queue: Option<PendingQueue>,
    api: A,
}

impl<A: TransactionApi> SyncCoordinator<A> {
    /// Create a coordinator for `queue`.
    ///
    /// `queue` is `None` when the local queue could not be opened, in which
    /// case every flush is a no-op.
    pub fn new(queue: Option<PendingQueue>, api: A) -> Self {
        Self { queue, api }
    }

    /// Try to send every queued record to the server.
    pub async fn flush(&self) -> FlushOutcome {
        let Some(queue) = &self.queue else {
            return FlushOutcome::Unavailable;
        };

        let batch = match queue.snapshot() {
            Ok(batch) => batch,
            Err(error) => {
                tracing::error!("could not read pending queue: {error}");
                return FlushOutcome::StorageError;
            }
        };

        if batch.is_empty() {
            tracing::debug!("pending queue is empty, nothing to sync");
            return FlushOutcome::Empty;
        }

        tracing::info!("syncing {} pending transaction(s)", batch.len());

        if let Err(error) = self.api.submit_batch(batch.records()).await {
            tracing::warn!("could not sync pending transactions: {error}");
            return FlushOutcome::Failed;
        }

        match queue.clear_batch(&batch) {
            Ok(removed) => {
                tracing::info!("synced {removed} pending transaction(s)");
                FlushOutcome::Flushed(batch.len())
            }
            Err(error) => {
                tracing::error!("pending transactions were synced but could not be cleared: {error}");
                FlushOutcome::StorageError
            }
        }
    }

    /// Flush now if `connectivity` is online, then again every time it comes
    /// back online.
    ///
    /// Returns once the sending half of the channel is dropped.
    pub async fn run(&self, mut connectivity: watch::Receiver<Connectivity>) {
        if connectivity.borrow_and_update().is_online() {
            self.flush().await;
        }

        self.follow(connectivity).await;
    }

    /// Flush every time `connectivity` comes back online.
    ///
    /// Unlike [SyncCoordinator::run] this does not flush for the value the
    /// receiver has already seen, so it is for callers that flushed at start
    /// up. Returns once the sending half of the channel is dropped.
    pub async fn follow(&self, mut connectivity: watch::Receiver<Connectivity>) {
        while connectivity.changed().await.is_ok() {
            let current = *connectivity.borrow_and_update();

            if current.is_online() {
                self.flush().await;
            }
        }

        tracing::debug!("connectivity channel closed, stopping sync");
    }
}
