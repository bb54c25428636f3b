//! Token registry models

use serde::{Deserialize, Serialize};

use crate::core::types::BigInt;

use super::TokenStandard;

/// Canonical asset identity, keyed by a globally unique name.
///
/// Owns the chain-specific [`Token`] rows and the per-market
/// [`PriceMarket`] quotes that feed its canonical price.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenBasic {
    pub name: String,
    pub standard: TokenStandard,
    pub precision: i32,
    /// USD price, fixed-point scaled by [`super::PRICE_SCALE`].
    pub price: i64,
    pub price_update_time: i64,
    pub meta: Option<String>,
    pub description: Option<String>,
    pub official_site: Option<String>,
}

impl TokenBasic {
    pub fn new(name: impl Into<String>, precision: i32) -> Self {
        Self {
            name: name.into(),
            standard: TokenStandard::default(),
            precision,
            price: 0,
            price_update_time: 0,
            meta: None,
            description: None,
            official_site: None,
        }
    }
}

/// A concrete deployment of an asset on one chain, unique per
/// `(hash, chain_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Token {
    pub hash: String,
    pub chain_id: i64,
    pub name: String,
    pub token_basic_name: String,
    pub standard: TokenStandard,
    pub precision: i32,
    pub available_amount: BigInt,
}

/// Directed asset mapping: the source pair is recognized as the destination
/// pair when bridging. Rows can be disabled without being deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenMap {
    pub src_chain_id: i64,
    pub src_token_hash: String,
    pub dst_chain_id: i64,
    pub dst_token_hash: String,
    pub enabled: bool,
}

/// One market's quote for a canonical asset.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceMarket {
    pub token_basic_name: String,
    pub market_name: String,
    /// USD price, fixed-point scaled by [`super::PRICE_SCALE`].
    pub price: i64,
    pub price_update_time: i64,
}
