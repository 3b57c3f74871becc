//! Save client shared by the CLI and integration tests.
//!
//! Owns the client half of the save protocol: split an edit session into
//! batches, send them one at a time with a fresh token each, and stop at the
//! first failure. Batches already sent stay committed.

mod driver;
mod error;
mod transport;

pub use driver::{SyncDriver, SyncOptions, SyncOutcome};
pub use error::SyncError;
pub use transport::{api_url, HttpTransport, SaveTransport};
