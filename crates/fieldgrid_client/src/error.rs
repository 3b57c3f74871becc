//! Error type for the save client.

use thiserror::Error;

/// Failure of a save run or a single API call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The session has no tracked cells.
    #[error("Nothing to save")]
    NothingToSave,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Parse(String),

    /// The server returned a failure envelope.
    #[error("Save rejected: {0}")]
    Rejected(String),

    /// The cancel flag was raised between batches.
    #[error("Cancelled after {batches_sent} batch(es), {saved} field(s) saved")]
    Cancelled { saved: usize, batches_sent: usize },

    /// A batch failed; earlier batches were committed.
    #[error("Batch {batch} of {total_batches} failed ({saved} field(s) already saved): {source}")]
    Batch {
        /// 1-based number of the failed batch.
        batch: usize,
        total_batches: usize,
        saved: usize,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// Fields saved by earlier batches before this error stopped the run.
    pub fn saved_before_failure(&self) -> usize {
        match self {
            SyncError::Cancelled { saved, .. } | SyncError::Batch { saved, .. } => *saved,
            _ => 0,
        }
    }

    pub(crate) fn in_batch(self, batch: usize, total_batches: usize, saved: usize) -> Self {
        SyncError::Batch {
            batch,
            total_batches,
            saved,
            source: Box::new(self),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Parse(err.to_string())
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}
