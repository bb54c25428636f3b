//! Running statistics accumulators with resumable-scan cursors
//!
//! Each accumulator row stores, next to its totals, the highest contributing
//! row id already folded in (`last_*_check_id`). A statistics pass only reads
//! rows beyond the cursor and advances it in the same transaction that
//! persists the new totals, so every contributing row counts exactly once
//! even across crashes and retries. Inbound and outbound directions keep
//! independent cursors.

use serde::{Deserialize, Serialize};

use crate::core::types::BigInt;

/// Per-chain totals. Inbound scans destination rows landing on the chain,
/// outbound scans source rows leaving it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChainStatistic {
    pub chain_id: i64,
    pub in_count: i64,
    pub out_count: i64,
    /// Distinct senders seen on this chain; recomputed at commit time.
    pub addresses: i64,
    pub last_in_check_id: i64,
    pub last_out_check_id: i64,
}

/// Per `(token hash, chain)` totals over the transfer sub-records.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenStatistic {
    pub hash: String,
    pub chain_id: i64,
    pub in_counter: i64,
    pub in_amount: BigInt,
    pub in_amount_usd: BigInt,
    pub out_counter: i64,
    pub out_amount: BigInt,
    pub out_amount_usd: BigInt,
    pub last_in_check_id: i64,
    pub last_out_check_id: i64,
}

/// Per canonical asset totals, aggregated across all chains.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssetStatistic {
    pub token_basic_name: String,
    pub amount: BigInt,
    pub amount_usd: BigInt,
    pub tx_count: i64,
    /// Distinct sending addresses; recomputed at commit time.
    pub address_count: i64,
    pub latest_update: i64,
    pub last_check_id: i64,
}

/// Outcome of one statistics pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub in_rows: u64,
    pub out_rows: u64,
}
