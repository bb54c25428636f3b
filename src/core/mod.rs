//! Core types shared across the data model

pub mod error;
pub mod types;

pub use error::{CodecError, IndexerError, IndexerResult, StorageError};
pub use types::BigInt;
