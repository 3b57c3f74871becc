//! Core domain library for FieldGrid (config, storage, grid, edit session, sync planning).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across FieldGrid crates.
pub mod constants;
/// Embedded host store backed by redb.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Grid builder over a [`host::MetaHost`].
pub mod grid;
/// Host collaborator contract.
pub mod host;
/// Data models for grid rows, posts, and field values.
pub mod models;
/// Free-text sanitization applied before values are stored.
pub mod sanitize;
/// Client-side edit session with clear/restore bookkeeping.
pub mod session;
/// Batch planning and wire types for the save protocol.
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_BATCH_SIZE, DEFAULT_CLI_SERVER_URL, DEFAULT_PAGE_SIZE, DEFAULT_PORT};
pub use db::Database;
pub use error::AppError;
pub use host::MetaHost;
pub use models::value::FieldValue;
pub use session::EditSession;
