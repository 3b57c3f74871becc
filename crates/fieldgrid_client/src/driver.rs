//! Sequential batched save driver.

use crate::{SaveTransport, SyncError};
use fieldgrid_core::constants::{DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE};
use fieldgrid_core::sync::{
    effective_batch_size, plan_batches, SaveBatch, SaveSummary, SyncEntry, SyncProgress,
};
use fieldgrid_core::EditSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Batching knobs for one save run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Posts per request; values below 1 count as 1.
    pub batch_size: usize,
    /// Pause between consecutive requests.
    pub pause: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pause: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
        }
    }
}

/// Result of a completed save run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Sum of the per-batch saved counts.
    pub saved: usize,
    pub batches_sent: usize,
}

/// Sends an edit session to the server in ordered batches.
pub struct SyncDriver<T> {
    transport: T,
    options: SyncOptions,
    cancel: Arc<AtomicBool>,
}

impl<T: SaveTransport> SyncDriver<T> {
    pub fn new(transport: T, options: SyncOptions) -> Self {
        Self {
            transport,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Flag that stops the run before the next batch when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Save every tracked cell of `session`.
    ///
    /// # Errors
    /// See [`SyncDriver::sync_entries`].
    pub async fn sync_session(
        &self,
        session: &EditSession,
        on_progress: impl FnMut(SyncProgress),
    ) -> Result<SyncOutcome, SyncError> {
        self.sync_entries(session.sync_entries(), on_progress).await
    }

    /// Send `entries` in order, one batch at a time.
    ///
    /// Each batch gets a fresh token. `on_progress` runs before each batch
    /// is sent. The cancel flag is checked before every batch; batches sent
    /// before a failure or cancellation are not rolled back.
    ///
    /// # Returns
    /// The total saved count and the number of batches sent.
    ///
    /// # Errors
    /// - [`SyncError::NothingToSave`] when `entries` is empty.
    /// - [`SyncError::Cancelled`] when the cancel flag was raised.
    /// - [`SyncError::Batch`] wrapping the first transport, status, parse or
    ///   rejection error; later batches are not sent.
    pub async fn sync_entries(
        &self,
        entries: Vec<SyncEntry>,
        mut on_progress: impl FnMut(SyncProgress),
    ) -> Result<SyncOutcome, SyncError> {
        if entries.is_empty() {
            return Err(SyncError::NothingToSave);
        }
        let batch_size = effective_batch_size(self.options.batch_size);
        let batches = plan_batches(entries, batch_size);
        let total_batches = batches.len();
        tracing::info!(total_batches, batch_size, "Starting batched save");

        let mut saved = 0usize;
        for (index, batch) in batches.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!(batches_sent = index, saved, "Save cancelled");
                return Err(SyncError::Cancelled {
                    saved,
                    batches_sent: index,
                });
            }
            if index > 0 && !self.options.pause.is_zero() {
                tokio::time::sleep(self.options.pause).await;
            }

            on_progress(SyncProgress::before_batch(index, total_batches));
            let summary = match self.send_one(batch).await {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::error!(batch = index + 1, total_batches, saved, "Batch failed: {}", err);
                    return Err(err.in_batch(index + 1, total_batches, saved));
                }
            };
            saved += summary.saved_count;
            tracing::debug!(
                batch = index + 1,
                posts = batch.post_count(),
                saved_count = summary.saved_count,
                "Batch saved"
            );
        }

        tracing::info!(saved, batches_sent = total_batches, "Batched save finished");
        Ok(SyncOutcome {
            saved,
            batches_sent: total_batches,
        })
    }

    async fn send_one(&self, batch: &SaveBatch) -> Result<SaveSummary, SyncError> {
        let token = self.transport.fetch_token().await?;
        self.transport.send_batch(&token, batch).await
    }
}
