//! Retry queue and hash ledger operations
//!
//! Error transactions are written here and drained by an external retry
//! worker via the state column. The hash history is an append-only audit
//! trail; duplicate `(chain_id, hash)` pairs are ignored.

use super::postgres::PostgresManager;
use crate::core::error::IndexerResult;
use crate::models::{ErrorTransaction, TxHashHistory};

impl PostgresManager {
    /// Insert or refresh a failed transaction, keyed by hash.
    pub async fn upsert_error_transaction(&self, tx: &ErrorTransaction) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO error_transactions (hash, chain_id, time, error_msg, state)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (hash) DO UPDATE SET
                chain_id = EXCLUDED.chain_id,
                time = EXCLUDED.time,
                error_msg = EXCLUDED.error_msg,
                state = EXCLUDED.state
        "#;

        sqlx::query(query)
            .bind(&tx.hash)
            .bind(tx.chain_id)
            .bind(tx.time)
            .bind(&tx.error_msg)
            .bind(tx.state)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_error_transaction(
        &self,
        hash: &str,
    ) -> IndexerResult<Option<ErrorTransaction>> {
        let tx = sqlx::query_as::<_, ErrorTransaction>(
            "SELECT * FROM error_transactions WHERE hash = $1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    /// Oldest entries in a given state, for the retry worker to drain.
    pub async fn list_error_transactions(
        &self,
        state: i32,
        limit: i64,
    ) -> IndexerResult<Vec<ErrorTransaction>> {
        let txs = sqlx::query_as::<_, ErrorTransaction>(
            r#"
            SELECT * FROM error_transactions
            WHERE state = $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(state)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }

    /// Advance a retry entry's state, optionally replacing its message.
    pub async fn update_error_transaction_state(
        &self,
        hash: &str,
        state: i32,
        error_msg: Option<&str>,
    ) -> IndexerResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE error_transactions
            SET state = $2, error_msg = COALESCE($3, error_msg)
            WHERE hash = $1
            "#,
        )
        .bind(hash)
        .bind(state)
        .bind(error_msg)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_error_transaction(&self, hash: &str) -> IndexerResult<bool> {
        let result = sqlx::query("DELETE FROM error_transactions WHERE hash = $1")
            .bind(hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a hash to the per-chain audit trail. Re-observing a hash is a
    /// no-op.
    pub async fn insert_tx_hash_history(&self, chain_id: i64, hash: &str) -> IndexerResult<()> {
        sqlx::query(
            "INSERT INTO tx_hash_histories (chain_id, hash) VALUES ($1, $2) ON CONFLICT (chain_id, hash) DO NOTHING",
        )
        .bind(chain_id)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_tx_hash_histories(
        &self,
        chain_id: i64,
        limit: i64,
        offset: i64,
    ) -> IndexerResult<Vec<TxHashHistory>> {
        let rows = sqlx::query_as::<_, TxHashHistory>(
            r#"
            SELECT * FROM tx_hash_histories
            WHERE chain_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(chain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
