//! Centralized error types for the bridge indexer

use thiserror::Error;

/// Main indexer error type
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Caller input violates a model constraint (e.g. a swap sub-record on a
    /// non-fungible transaction). The write is rejected, never merged.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique-key violation on an insert where an update was not intended.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("RocksDB error: {0}")]
    RocksDB(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of the stored-amount codec.
///
/// `Format` means the payload was text but not a base-10 integer (and not a
/// recognized nil sentinel); `UnexpectedType` means the payload was not a
/// text representation at all.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid big integer literal: {0:?}")]
    Format(String),

    #[error("cannot decode big integer from {0}")]
    UnexpectedType(&'static str),
}

/// Result type alias for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Helper to convert sqlx errors, routing unique-key violations to `Conflict`
impl From<sqlx::Error> for IndexerError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                return IndexerError::Conflict(db.message().to_string());
            }
        }
        IndexerError::Storage(StorageError::Database(err.to_string()))
    }
}

/// Helper to convert rocksdb errors
impl From<rocksdb::Error> for IndexerError {
    fn from(err: rocksdb::Error) -> Self {
        IndexerError::Storage(StorageError::RocksDB(err.to_string()))
    }
}

/// Helper to convert serialization errors
impl From<bincode::Error> for IndexerError {
    fn from(err: bincode::Error) -> Self {
        IndexerError::Storage(StorageError::Serialization(err.to_string()))
    }
}

impl From<serde_json::Error> for IndexerError {
    fn from(err: serde_json::Error) -> Self {
        IndexerError::Storage(StorageError::Serialization(err.to_string()))
    }
}
