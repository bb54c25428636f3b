//! Cross-chain transaction explorer data model
//!
//! Persistent model for transactions moving from a source chain through the
//! relay layer to a destination chain, with the token/chain registry, fee
//! accounting, and incremental statistics built on top. PostgreSQL holds the
//! relational model; RocksDB holds raw block and snapshot blobs for the
//! chain-tailing utility.
//!
//! Ingestion workers, query APIs, and retry drivers are separate services
//! that call into this crate.

pub mod config;
pub mod core;
pub mod database;
pub mod models;

// Re-export commonly used types
pub use crate::core::error::{CodecError, IndexerError, IndexerResult, StorageError};
pub use crate::core::types::BigInt;
pub use config::IndexerConfig;
pub use database::{
    DatabaseHealth, DatabaseManager, DatabaseOperations, PostgresManager, TxLineage,
    WrapperLineage,
};
pub use models::*;
