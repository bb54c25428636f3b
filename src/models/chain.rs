//! Chain registry models

use serde::{Deserialize, Serialize};

/// A chain known to the indexer, one row per `chain_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chain {
    pub chain_id: i64,
    pub name: String,
    /// Highest block fully indexed for regular transfers.
    pub height: i64,
    /// Separate high-water mark for swap indexing.
    pub height_swap: i64,
    /// Blocks re-scanned behind the tip to absorb shallow reorgs.
    pub backward_block_number: i64,
}

impl Chain {
    pub fn new(chain_id: i64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            height: 0,
            height_swap: 0,
            backward_block_number: 0,
        }
    }

    /// First block the next transfer scan should look at.
    pub fn scan_start(&self) -> i64 {
        (self.height - self.backward_block_number).max(0)
    }

    /// First block the next swap scan should look at.
    pub fn swap_scan_start(&self) -> i64 {
        (self.height_swap - self.backward_block_number).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_start_never_negative() {
        let mut chain = Chain::new(2, "ethereum");
        chain.height = 5;
        chain.backward_block_number = 20;
        assert_eq!(chain.scan_start(), 0);

        chain.height = 1000;
        assert_eq!(chain.scan_start(), 980);
    }
}
