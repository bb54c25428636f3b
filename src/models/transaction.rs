//! Transaction lineage models: source, relay ("poly"), destination, wrapper

use serde::{Deserialize, Serialize};

use crate::core::error::{IndexerError, IndexerResult};
use crate::core::types::BigInt;

use super::{SwapType, TokenStandard};

/// An on-chain transaction observed on a source chain, keyed by hash.
///
/// `details` is the single sub-record slot: a transaction is either a plain
/// transfer or a pool swap, never both. `id` is assigned by storage and
/// doubles as the scan cursor for the statistics accumulators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrcTransaction {
    pub id: i64,
    pub hash: String,
    pub chain_id: i64,
    pub standard: TokenStandard,
    pub state: i32,
    pub time: i64,
    pub fee: BigInt,
    pub height: i64,
    pub sender: String,
    pub dst_chain_id: i64,
    pub contract: String,
    pub key: Option<String>,
    pub param: Option<String>,
    pub details: Option<TxDetails>,
}

/// The sub-record of a source transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxDetails {
    Transfer(SrcTransfer),
    Swap(SrcSwap),
}

/// Fungible asset move attached to a source transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct SrcTransfer {
    pub id: i64,
    pub tx_hash: String,
    pub chain_id: i64,
    pub asset: String,
    pub from_addr: String,
    pub to_addr: String,
    pub amount: BigInt,
    pub dst_chain_id: i64,
    pub dst_asset: String,
    pub dst_user: String,
}

/// Pool-mediated move attached to a source transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct SrcSwap {
    pub id: i64,
    pub tx_hash: String,
    pub chain_id: i64,
    pub asset: String,
    pub from_addr: String,
    pub to_addr: String,
    pub amount: BigInt,
    pub pool_id: i64,
    pub swap_type: SwapType,
    pub dst_chain_id: i64,
    pub dst_asset: String,
    pub dst_user: String,
}

impl SrcTransaction {
    /// Reject sub-records that disagree with the standard discriminator.
    /// Pool swaps move fungibles only.
    pub fn validate_details(&self) -> IndexerResult<()> {
        if matches!(self.details, Some(TxDetails::Swap(_)))
            && self.standard == TokenStandard::NonFungible
        {
            return Err(IndexerError::Validation(format!(
                "transaction {} is non-fungible but carries a swap sub-record",
                self.hash
            )));
        }
        Ok(())
    }

    pub fn transfer(&self) -> Option<&SrcTransfer> {
        match &self.details {
            Some(TxDetails::Transfer(t)) => Some(t),
            _ => None,
        }
    }

    pub fn swap(&self) -> Option<&SrcSwap> {
        match &self.details {
            Some(TxDetails::Swap(s)) => Some(s),
            _ => None,
        }
    }
}

/// A relay-layer transaction forwarding a source transaction to its
/// destination chain. `src_hash` is a soft reference: the relay row may be
/// observed before (or without) its source counterpart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolyTransaction {
    pub id: i64,
    pub hash: String,
    pub chain_id: i64,
    pub state: i32,
    pub time: i64,
    pub fee: BigInt,
    pub height: i64,
    pub src_chain_id: i64,
    pub src_hash: String,
    pub dst_chain_id: i64,
    pub key: Option<String>,
}

/// The landing transaction on the destination chain. `poly_hash` is a soft
/// reference to the relay leg. Sub-records here omit the routing and
/// discriminator fields: the kind was resolved upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DstTransaction {
    pub id: i64,
    pub hash: String,
    pub chain_id: i64,
    pub state: i32,
    pub time: i64,
    pub fee: BigInt,
    pub height: i64,
    pub src_chain_id: i64,
    pub contract: String,
    pub poly_hash: String,
    pub details: Option<DstDetails>,
}

/// The sub-record of a destination transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DstDetails {
    Transfer(DstTransfer),
    Swap(DstSwap),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct DstTransfer {
    pub id: i64,
    pub tx_hash: String,
    pub chain_id: i64,
    pub asset: String,
    pub from_addr: String,
    pub to_addr: String,
    pub amount: BigInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct DstSwap {
    pub id: i64,
    pub tx_hash: String,
    pub chain_id: i64,
    pub asset: String,
    pub from_addr: String,
    pub to_addr: String,
    pub amount: BigInt,
    pub pool_id: i64,
}

impl DstTransaction {
    pub fn transfer(&self) -> Option<&DstTransfer> {
        match &self.details {
            Some(DstDetails::Transfer(t)) => Some(t),
            _ => None,
        }
    }
}

/// A user-facing transfer request, distinct from the raw on-chain
/// transaction(s) fulfilling it, keyed by its own hash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WrapperTransaction {
    pub id: i64,
    pub hash: String,
    pub sender: String,
    pub src_chain_id: i64,
    pub dst_chain_id: i64,
    pub dst_user: String,
    pub fee_token_hash: String,
    pub fee_amount: BigInt,
    pub status: i32,
    pub time: i64,
    pub block_height: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_tx(standard: TokenStandard, details: Option<TxDetails>) -> SrcTransaction {
        SrcTransaction {
            id: 0,
            hash: "0xabc".to_string(),
            chain_id: 2,
            standard,
            state: super::super::tx_state::PENDING,
            time: 1_700_000_000,
            fee: BigInt::from(10u64),
            height: 100,
            sender: "alice".to_string(),
            dst_chain_id: 5,
            contract: "lockproxy".to_string(),
            key: None,
            param: None,
            details,
        }
    }

    #[test]
    fn swap_on_non_fungible_is_rejected() {
        let tx = base_tx(
            TokenStandard::NonFungible,
            Some(TxDetails::Swap(SrcSwap::default())),
        );
        assert!(matches!(
            tx.validate_details(),
            Err(IndexerError::Validation(_))
        ));
    }

    #[test]
    fn transfer_is_valid_for_both_standards() {
        for standard in [TokenStandard::Fungible, TokenStandard::NonFungible] {
            let tx = base_tx(standard, Some(TxDetails::Transfer(SrcTransfer::default())));
            assert!(tx.validate_details().is_ok());
        }
    }

    #[test]
    fn details_accessors_are_exclusive() {
        let tx = base_tx(
            TokenStandard::Fungible,
            Some(TxDetails::Swap(SrcSwap::default())),
        );
        assert!(tx.swap().is_some());
        assert!(tx.transfer().is_none());
    }
}
