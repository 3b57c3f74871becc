//! Errors raised by the store, the grid builder and the save path.
use thiserror::Error;

/// Failure of a core operation.
///
/// The server maps each variant onto an HTTP status; storage variants are
/// never shown to clients verbatim.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    /// Store-level failure that did not come from redb itself, such as a
    /// locked or unreadable database file.
    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// A post or other addressed record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Bad token, or a post the caller may not edit.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

macro_rules! from_redb {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(value: $source) -> Self {
                    Self::Database(value.into())
                }
            }
        )+
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
