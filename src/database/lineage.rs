//! Read-side lineage resolution
//!
//! The cross-stage relations are not stored anywhere: they are recomputed on
//! every read by composing optional keyed lookups, so they can never drift
//! from the base tables. Every leg is nullable and a missing leg is a normal
//! outcome, not an error.

use serde::{Deserialize, Serialize};

use super::postgres::PostgresManager;
use crate::core::error::IndexerResult;
use crate::models::{
    DstTransaction, PolyTransaction, SrcTransaction, Token, TxDetails, WrapperTransaction,
};

/// The three-stage chain of a cross-chain transaction, as far as it has been
/// observed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxLineage {
    pub src: Option<SrcTransaction>,
    pub poly: Option<PolyTransaction>,
    pub dst: Option<DstTransaction>,
}

/// A wrapper transfer request joined with its on-chain legs and the token
/// registry. Token fields are `None` whenever the registry has no matching
/// `(hash, chain_id)` row; that never blocks the transaction legs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WrapperLineage {
    pub wrapper: Option<WrapperTransaction>,
    pub src: Option<SrcTransaction>,
    pub poly: Option<PolyTransaction>,
    pub dst: Option<DstTransaction>,
    pub src_token: Option<Token>,
    pub dst_token: Option<Token>,
    pub fee_token: Option<Token>,
}

impl PostgresManager {
    /// Resolve the full lineage from any stage's hash.
    ///
    /// The hash is tried as a source, relay, then destination hash; from the
    /// first match the remaining legs are joined by hash equality
    /// (source -> relay via `src_hash`, relay -> destination via
    /// `poly_hash`). Partial lineages resolve to whatever exists.
    pub async fn resolve_lineage(&self, any_hash: &str) -> IndexerResult<TxLineage> {
        if let Some(src) = self.get_src_transaction(any_hash).await? {
            let poly = self.get_poly_transaction_by_src_hash(&src.hash).await?;
            let dst = match &poly {
                Some(poly) => self.get_dst_transaction_by_poly_hash(&poly.hash).await?,
                None => None,
            };
            return Ok(TxLineage {
                src: Some(src),
                poly,
                dst,
            });
        }

        if let Some(poly) = self.get_poly_transaction(any_hash).await? {
            let src = if poly.src_hash.is_empty() {
                None
            } else {
                self.get_src_transaction(&poly.src_hash).await?
            };
            let dst = self.get_dst_transaction_by_poly_hash(&poly.hash).await?;
            return Ok(TxLineage {
                src,
                poly: Some(poly),
                dst,
            });
        }

        if let Some(dst) = self.get_dst_transaction(any_hash).await? {
            let poly = if dst.poly_hash.is_empty() {
                None
            } else {
                self.get_poly_transaction(&dst.poly_hash).await?
            };
            let src = match &poly {
                Some(poly) if !poly.src_hash.is_empty() => {
                    self.get_src_transaction(&poly.src_hash).await?
                }
                _ => None,
            };
            return Ok(TxLineage {
                src,
                poly,
                dst: Some(dst),
            });
        }

        Ok(TxLineage::default())
    }

    /// Resolve a wrapper request and its lineage, with token-registry joins
    /// scoped by `(hash, chain_id)`. Every token join fails soft.
    pub async fn resolve_wrapper_lineage(&self, src_hash: &str) -> IndexerResult<WrapperLineage> {
        let wrapper = self.get_wrapper_transaction(src_hash).await?;
        let lineage = self.resolve_lineage(src_hash).await?;

        let (src_token, dst_token) = match lineage.src.as_ref().and_then(|src| src.details.as_ref())
        {
            Some(TxDetails::Transfer(transfer)) => (
                self.lookup_token(&transfer.asset, transfer.chain_id).await?,
                self.lookup_token(&transfer.dst_asset, transfer.dst_chain_id)
                    .await?,
            ),
            Some(TxDetails::Swap(swap)) => (
                self.lookup_token(&swap.asset, swap.chain_id).await?,
                self.lookup_token(&swap.dst_asset, swap.dst_chain_id).await?,
            ),
            None => (None, None),
        };

        let fee_token = match &wrapper {
            Some(wrapper) => {
                self.lookup_token(&wrapper.fee_token_hash, wrapper.src_chain_id)
                    .await?
            }
            None => None,
        };

        Ok(WrapperLineage {
            wrapper,
            src: lineage.src,
            poly: lineage.poly,
            dst: lineage.dst,
            src_token,
            dst_token,
            fee_token,
        })
    }
}
