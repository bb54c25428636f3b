//! Auxiliary entities: retry queue, hash ledger, raw block/snapshot records

use serde::{Deserialize, Serialize};

/// A transaction that failed normal processing, queued for an external retry
/// worker. This model only stores and returns these rows; the worker owns
/// the state transitions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ErrorTransaction {
    pub id: i64,
    pub hash: String,
    pub chain_id: i64,
    pub time: i64,
    pub error_msg: Option<String>,
    pub state: i32,
}

impl ErrorTransaction {
    pub fn new(hash: impl Into<String>, chain_id: i64, time: i64, error_msg: impl Into<String>) -> Self {
        Self {
            id: 0,
            hash: hash.into(),
            chain_id,
            time,
            error_msg: Some(error_msg.into()),
            state: super::error_state::PENDING,
        }
    }
}

/// Append-only audit trail of hashes seen per chain.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TxHashHistory {
    pub id: i64,
    pub chain_id: i64,
    pub hash: String,
}

/// Raw block blob kept for the chain-tailing utility, keyed by hash with a
/// `(chain_id, height)` index entry. Opaque to the lineage model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub chain_id: i64,
    pub height: i64,
    pub hash: String,
    pub time: i64,
    pub raw: Vec<u8>,
}

/// Opaque serialized snapshot blob, keyed by hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub chain_id: i64,
    pub height: i64,
    pub hash: String,
    pub raw: Vec<u8>,
}
