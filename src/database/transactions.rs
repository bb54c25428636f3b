//! Transaction lineage storage operations
//!
//! All writes are insert-or-update keyed by hash. A parent row and its
//! sub-record are applied in one database transaction so a partial write
//! (sub-record without parent, or a stale sub-record of the other kind) is
//! never observable. Cross-stage hash references stay soft: a relay row may
//! be stored before its source counterpart exists.

use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::warn;

use super::postgres::PostgresManager;
use crate::core::error::{IndexerError, IndexerResult};
use crate::models::{
    DstDetails, DstSwap, DstTransaction, DstTransfer, PolyTransaction, SrcSwap, SrcTransaction,
    SrcTransfer, TxDetails, WrapperTransaction,
};

fn map_src_row(row: &PgRow) -> SrcTransaction {
    SrcTransaction {
        id: row.get("id"),
        hash: row.get("hash"),
        chain_id: row.get("chain_id"),
        standard: row.get("standard"),
        state: row.get("state"),
        time: row.get("time"),
        fee: row.get("fee"),
        height: row.get("height"),
        sender: row.get("sender"),
        dst_chain_id: row.get("dst_chain_id"),
        contract: row.get("contract"),
        key: row.get("key"),
        param: row.get("param"),
        details: None,
    }
}

fn map_poly_row(row: &PgRow) -> PolyTransaction {
    PolyTransaction {
        id: row.get("id"),
        hash: row.get("hash"),
        chain_id: row.get("chain_id"),
        state: row.get("state"),
        time: row.get("time"),
        fee: row.get("fee"),
        height: row.get("height"),
        src_chain_id: row.get("src_chain_id"),
        src_hash: row.get("src_hash"),
        dst_chain_id: row.get("dst_chain_id"),
        key: row.get("key"),
    }
}

fn map_dst_row(row: &PgRow) -> DstTransaction {
    DstTransaction {
        id: row.get("id"),
        hash: row.get("hash"),
        chain_id: row.get("chain_id"),
        state: row.get("state"),
        time: row.get("time"),
        fee: row.get("fee"),
        height: row.get("height"),
        src_chain_id: row.get("src_chain_id"),
        contract: row.get("contract"),
        poly_hash: row.get("poly_hash"),
        details: None,
    }
}

impl PostgresManager {
    /// Insert or update a source transaction together with its sub-record.
    ///
    /// The sub-record slot is replaced wholesale: writing a transfer removes
    /// any stale swap row and vice versa, so the two kinds can never be
    /// observed populated at once. Sub-record updates keep their serial id,
    /// which the statistics cursors depend on.
    pub async fn upsert_src_transaction(&self, tx: &SrcTransaction) -> IndexerResult<()> {
        if tx.hash.is_empty() {
            return Err(IndexerError::Validation(
                "source transaction hash is empty".to_string(),
            ));
        }
        if let Err(err) = tx.validate_details() {
            warn!(hash = %tx.hash, "rejecting source transaction: {err}");
            return Err(err);
        }

        let mut dbtx = self.pool.begin().await?;

        let query = r#"
            INSERT INTO src_transactions (
                hash, chain_id, standard, state, time, fee, height, sender,
                dst_chain_id, contract, key, param
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (hash) DO UPDATE SET
                chain_id = EXCLUDED.chain_id,
                standard = EXCLUDED.standard,
                state = EXCLUDED.state,
                time = EXCLUDED.time,
                fee = EXCLUDED.fee,
                height = EXCLUDED.height,
                sender = EXCLUDED.sender,
                dst_chain_id = EXCLUDED.dst_chain_id,
                contract = EXCLUDED.contract,
                key = EXCLUDED.key,
                param = EXCLUDED.param
        "#;

        sqlx::query(query)
            .bind(&tx.hash)
            .bind(tx.chain_id)
            .bind(tx.standard)
            .bind(tx.state)
            .bind(tx.time)
            .bind(&tx.fee)
            .bind(tx.height)
            .bind(&tx.sender)
            .bind(tx.dst_chain_id)
            .bind(&tx.contract)
            .bind(&tx.key)
            .bind(&tx.param)
            .execute(&mut *dbtx)
            .await?;

        match &tx.details {
            Some(TxDetails::Transfer(transfer)) => {
                sqlx::query("DELETE FROM src_swaps WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;

                let query = r#"
                    INSERT INTO src_transfers (
                        tx_hash, chain_id, asset, from_addr, to_addr, amount,
                        dst_chain_id, dst_asset, dst_user
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (tx_hash) DO UPDATE SET
                        chain_id = EXCLUDED.chain_id,
                        asset = EXCLUDED.asset,
                        from_addr = EXCLUDED.from_addr,
                        to_addr = EXCLUDED.to_addr,
                        amount = EXCLUDED.amount,
                        dst_chain_id = EXCLUDED.dst_chain_id,
                        dst_asset = EXCLUDED.dst_asset,
                        dst_user = EXCLUDED.dst_user
                "#;

                sqlx::query(query)
                    .bind(&tx.hash)
                    .bind(tx.chain_id)
                    .bind(&transfer.asset)
                    .bind(&transfer.from_addr)
                    .bind(&transfer.to_addr)
                    .bind(&transfer.amount)
                    .bind(transfer.dst_chain_id)
                    .bind(&transfer.dst_asset)
                    .bind(&transfer.dst_user)
                    .execute(&mut *dbtx)
                    .await?;
            }
            Some(TxDetails::Swap(swap)) => {
                sqlx::query("DELETE FROM src_transfers WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;

                let query = r#"
                    INSERT INTO src_swaps (
                        tx_hash, chain_id, asset, from_addr, to_addr, amount,
                        pool_id, swap_type, dst_chain_id, dst_asset, dst_user
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    ON CONFLICT (tx_hash) DO UPDATE SET
                        chain_id = EXCLUDED.chain_id,
                        asset = EXCLUDED.asset,
                        from_addr = EXCLUDED.from_addr,
                        to_addr = EXCLUDED.to_addr,
                        amount = EXCLUDED.amount,
                        pool_id = EXCLUDED.pool_id,
                        swap_type = EXCLUDED.swap_type,
                        dst_chain_id = EXCLUDED.dst_chain_id,
                        dst_asset = EXCLUDED.dst_asset,
                        dst_user = EXCLUDED.dst_user
                "#;

                sqlx::query(query)
                    .bind(&tx.hash)
                    .bind(tx.chain_id)
                    .bind(&swap.asset)
                    .bind(&swap.from_addr)
                    .bind(&swap.to_addr)
                    .bind(&swap.amount)
                    .bind(swap.pool_id)
                    .bind(swap.swap_type)
                    .bind(swap.dst_chain_id)
                    .bind(&swap.dst_asset)
                    .bind(&swap.dst_user)
                    .execute(&mut *dbtx)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM src_transfers WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;
                sqlx::query("DELETE FROM src_swaps WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;
            }
        }

        dbtx.commit().await?;

        Ok(())
    }

    /// Insert or update a relay transaction, keyed by hash.
    pub async fn upsert_poly_transaction(&self, tx: &PolyTransaction) -> IndexerResult<()> {
        if tx.hash.is_empty() {
            return Err(IndexerError::Validation(
                "relay transaction hash is empty".to_string(),
            ));
        }

        let query = r#"
            INSERT INTO poly_transactions (
                hash, chain_id, state, time, fee, height, src_chain_id,
                src_hash, dst_chain_id, key
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (hash) DO UPDATE SET
                chain_id = EXCLUDED.chain_id,
                state = EXCLUDED.state,
                time = EXCLUDED.time,
                fee = EXCLUDED.fee,
                height = EXCLUDED.height,
                src_chain_id = EXCLUDED.src_chain_id,
                src_hash = EXCLUDED.src_hash,
                dst_chain_id = EXCLUDED.dst_chain_id,
                key = EXCLUDED.key
        "#;

        sqlx::query(query)
            .bind(&tx.hash)
            .bind(tx.chain_id)
            .bind(tx.state)
            .bind(tx.time)
            .bind(&tx.fee)
            .bind(tx.height)
            .bind(tx.src_chain_id)
            .bind(&tx.src_hash)
            .bind(tx.dst_chain_id)
            .bind(&tx.key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert or update a destination transaction together with its
    /// sub-record, mirroring the source-side atomicity.
    pub async fn upsert_dst_transaction(&self, tx: &DstTransaction) -> IndexerResult<()> {
        if tx.hash.is_empty() {
            return Err(IndexerError::Validation(
                "destination transaction hash is empty".to_string(),
            ));
        }

        let mut dbtx = self.pool.begin().await?;

        let query = r#"
            INSERT INTO dst_transactions (
                hash, chain_id, state, time, fee, height, src_chain_id,
                contract, poly_hash
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (hash) DO UPDATE SET
                chain_id = EXCLUDED.chain_id,
                state = EXCLUDED.state,
                time = EXCLUDED.time,
                fee = EXCLUDED.fee,
                height = EXCLUDED.height,
                src_chain_id = EXCLUDED.src_chain_id,
                contract = EXCLUDED.contract,
                poly_hash = EXCLUDED.poly_hash
        "#;

        sqlx::query(query)
            .bind(&tx.hash)
            .bind(tx.chain_id)
            .bind(tx.state)
            .bind(tx.time)
            .bind(&tx.fee)
            .bind(tx.height)
            .bind(tx.src_chain_id)
            .bind(&tx.contract)
            .bind(&tx.poly_hash)
            .execute(&mut *dbtx)
            .await?;

        match &tx.details {
            Some(DstDetails::Transfer(transfer)) => {
                sqlx::query("DELETE FROM dst_swaps WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;

                let query = r#"
                    INSERT INTO dst_transfers (
                        tx_hash, chain_id, asset, from_addr, to_addr, amount
                    ) VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (tx_hash) DO UPDATE SET
                        chain_id = EXCLUDED.chain_id,
                        asset = EXCLUDED.asset,
                        from_addr = EXCLUDED.from_addr,
                        to_addr = EXCLUDED.to_addr,
                        amount = EXCLUDED.amount
                "#;

                sqlx::query(query)
                    .bind(&tx.hash)
                    .bind(tx.chain_id)
                    .bind(&transfer.asset)
                    .bind(&transfer.from_addr)
                    .bind(&transfer.to_addr)
                    .bind(&transfer.amount)
                    .execute(&mut *dbtx)
                    .await?;
            }
            Some(DstDetails::Swap(swap)) => {
                sqlx::query("DELETE FROM dst_transfers WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;

                let query = r#"
                    INSERT INTO dst_swaps (
                        tx_hash, chain_id, asset, from_addr, to_addr, amount, pool_id
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (tx_hash) DO UPDATE SET
                        chain_id = EXCLUDED.chain_id,
                        asset = EXCLUDED.asset,
                        from_addr = EXCLUDED.from_addr,
                        to_addr = EXCLUDED.to_addr,
                        amount = EXCLUDED.amount,
                        pool_id = EXCLUDED.pool_id
                "#;

                sqlx::query(query)
                    .bind(&tx.hash)
                    .bind(tx.chain_id)
                    .bind(&swap.asset)
                    .bind(&swap.from_addr)
                    .bind(&swap.to_addr)
                    .bind(&swap.amount)
                    .bind(swap.pool_id)
                    .execute(&mut *dbtx)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM dst_transfers WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;
                sqlx::query("DELETE FROM dst_swaps WHERE tx_hash = $1")
                    .bind(&tx.hash)
                    .execute(&mut *dbtx)
                    .await?;
            }
        }

        dbtx.commit().await?;

        Ok(())
    }

    /// Insert or update a wrapper transfer request, keyed by hash.
    pub async fn upsert_wrapper_transaction(&self, tx: &WrapperTransaction) -> IndexerResult<()> {
        if tx.hash.is_empty() {
            return Err(IndexerError::Validation(
                "wrapper transaction hash is empty".to_string(),
            ));
        }

        let query = r#"
            INSERT INTO wrapper_transactions (
                hash, sender, src_chain_id, dst_chain_id, dst_user,
                fee_token_hash, fee_amount, status, time, block_height
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (hash) DO UPDATE SET
                sender = EXCLUDED.sender,
                src_chain_id = EXCLUDED.src_chain_id,
                dst_chain_id = EXCLUDED.dst_chain_id,
                dst_user = EXCLUDED.dst_user,
                fee_token_hash = EXCLUDED.fee_token_hash,
                fee_amount = EXCLUDED.fee_amount,
                status = EXCLUDED.status,
                time = EXCLUDED.time,
                block_height = EXCLUDED.block_height
        "#;

        sqlx::query(query)
            .bind(&tx.hash)
            .bind(&tx.sender)
            .bind(tx.src_chain_id)
            .bind(tx.dst_chain_id)
            .bind(&tx.dst_user)
            .bind(&tx.fee_token_hash)
            .bind(&tx.fee_amount)
            .bind(tx.status)
            .bind(tx.time)
            .bind(tx.block_height)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn load_src_details(&self, tx_hash: &str) -> IndexerResult<Option<TxDetails>> {
        let transfer =
            sqlx::query_as::<_, SrcTransfer>("SELECT * FROM src_transfers WHERE tx_hash = $1")
                .bind(tx_hash)
                .fetch_optional(&self.pool)
                .await?;
        if let Some(transfer) = transfer {
            return Ok(Some(TxDetails::Transfer(transfer)));
        }

        let swap = sqlx::query_as::<_, SrcSwap>("SELECT * FROM src_swaps WHERE tx_hash = $1")
            .bind(tx_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(swap.map(TxDetails::Swap))
    }

    async fn load_dst_details(&self, tx_hash: &str) -> IndexerResult<Option<DstDetails>> {
        let transfer =
            sqlx::query_as::<_, DstTransfer>("SELECT * FROM dst_transfers WHERE tx_hash = $1")
                .bind(tx_hash)
                .fetch_optional(&self.pool)
                .await?;
        if let Some(transfer) = transfer {
            return Ok(Some(DstDetails::Transfer(transfer)));
        }

        let swap = sqlx::query_as::<_, DstSwap>("SELECT * FROM dst_swaps WHERE tx_hash = $1")
            .bind(tx_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(swap.map(DstDetails::Swap))
    }

    /// Get a source transaction by hash, sub-record included.
    pub async fn get_src_transaction(&self, hash: &str) -> IndexerResult<Option<SrcTransaction>> {
        let row = sqlx::query("SELECT * FROM src_transactions WHERE hash = $1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut tx = map_src_row(&row);
                tx.details = self.load_src_details(&tx.hash).await?;
                Ok(Some(tx))
            }
            None => Ok(None),
        }
    }

    pub async fn get_poly_transaction(&self, hash: &str) -> IndexerResult<Option<PolyTransaction>> {
        let row = sqlx::query("SELECT * FROM poly_transactions WHERE hash = $1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| map_poly_row(&row)))
    }

    /// Find the relay leg forwarding a given source hash.
    pub async fn get_poly_transaction_by_src_hash(
        &self,
        src_hash: &str,
    ) -> IndexerResult<Option<PolyTransaction>> {
        let row = sqlx::query("SELECT * FROM poly_transactions WHERE src_hash = $1 LIMIT 1")
            .bind(src_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| map_poly_row(&row)))
    }

    /// Get a destination transaction by hash, sub-record included.
    pub async fn get_dst_transaction(&self, hash: &str) -> IndexerResult<Option<DstTransaction>> {
        let row = sqlx::query("SELECT * FROM dst_transactions WHERE hash = $1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut tx = map_dst_row(&row);
                tx.details = self.load_dst_details(&tx.hash).await?;
                Ok(Some(tx))
            }
            None => Ok(None),
        }
    }

    /// Find the destination leg fulfilling a given relay hash.
    pub async fn get_dst_transaction_by_poly_hash(
        &self,
        poly_hash: &str,
    ) -> IndexerResult<Option<DstTransaction>> {
        let row = sqlx::query("SELECT * FROM dst_transactions WHERE poly_hash = $1 LIMIT 1")
            .bind(poly_hash)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut tx = map_dst_row(&row);
                tx.details = self.load_dst_details(&tx.hash).await?;
                Ok(Some(tx))
            }
            None => Ok(None),
        }
    }

    pub async fn get_wrapper_transaction(
        &self,
        hash: &str,
    ) -> IndexerResult<Option<WrapperTransaction>> {
        let tx = sqlx::query_as::<_, WrapperTransaction>(
            "SELECT * FROM wrapper_transactions WHERE hash = $1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    /// Recent source transactions on one chain. Sub-records are not loaded
    /// here; use the keyed read for the full record.
    pub async fn list_src_transactions_by_chain(
        &self,
        chain_id: i64,
        limit: i64,
        offset: i64,
    ) -> IndexerResult<Vec<SrcTransaction>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM src_transactions
            WHERE chain_id = $1
            ORDER BY time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(chain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_src_row).collect())
    }

    pub async fn list_wrapper_transactions_by_sender(
        &self,
        sender: &str,
        limit: i64,
        offset: i64,
    ) -> IndexerResult<Vec<WrapperTransaction>> {
        let txs = sqlx::query_as::<_, WrapperTransaction>(
            r#"
            SELECT * FROM wrapper_transactions
            WHERE sender = $1
            ORDER BY time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(sender)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }

    pub async fn src_transaction_count(&self, chain_id: i64) -> IndexerResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM src_transactions WHERE chain_id = $1")
            .bind(chain_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }

    pub async fn src_transaction_exists(&self, hash: &str) -> IndexerResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM src_transactions WHERE hash = $1) AS present")
            .bind(hash)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }

    /// Remove a source transaction; its sub-record goes with it.
    pub async fn delete_src_transaction(&self, hash: &str) -> IndexerResult<bool> {
        let result = sqlx::query("DELETE FROM src_transactions WHERE hash = $1")
            .bind(hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a destination transaction; its sub-record goes with it.
    /// Upstream legs are untouched: lineage resolution simply stops finding
    /// the destination leg.
    pub async fn delete_dst_transaction(&self, hash: &str) -> IndexerResult<bool> {
        let result = sqlx::query("DELETE FROM dst_transactions WHERE hash = $1")
            .bind(hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
