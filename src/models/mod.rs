//! Data models for the indexed cross-chain state

pub mod chain;
pub mod misc;
pub mod statistic;
pub mod token;
pub mod transaction;

pub use chain::*;
pub use misc::*;
pub use statistic::*;
pub use token::*;
pub use transaction::*;

use serde::{Deserialize, Serialize};

/// USD prices are fixed-point integers scaled by this factor.
pub const PRICE_SCALE: i64 = 100_000_000;

/// Token standard discriminator carried on source transactions and tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum TokenStandard {
    #[default]
    Fungible = 0,
    NonFungible = 1,
}

/// Pool operation tag on swap sub-records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum SwapType {
    #[default]
    Swap = 1,
    AddLiquidity = 2,
    RemoveLiquidity = 3,
}

/// Processing states shared by the transaction stages.
pub mod tx_state {
    pub const PENDING: i32 = 0;
    pub const FINISHED: i32 = 1;
}

/// Wrapper transfer request states.
pub mod wrapper_status {
    pub const PENDING: i32 = 0;
    pub const FINISHED: i32 = 1;
    pub const FAILED: i32 = 2;
}

/// Retry queue states, advanced by the external retry worker.
pub mod error_state {
    pub const PENDING: i32 = 0;
    pub const RETRIED: i32 = 1;
    pub const DISCARDED: i32 = 2;
}
