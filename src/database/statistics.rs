//! Incremental statistics passes
//!
//! Every pass follows the same protocol: open a transaction, lock the
//! accumulator row with `SELECT ... FOR UPDATE` (creating it first if
//! absent), fold the contributing rows beyond the stored cursor in ascending
//! id order, then persist the new totals and the advanced cursor in the same
//! commit. The row lock serializes racing passes: a second scanner blocks,
//! then observes the advanced cursor and folds only the remainder, so each
//! contributing row counts exactly once. A crash before commit leaves the
//! old cursor in place and the window is simply re-read next time.
//!
//! Amounts are codec text, not SQL-summable, so the folds run in Rust.

use sqlx::Row;
use tracing::debug;

use super::postgres::PostgresManager;
use crate::core::error::IndexerResult;
use crate::core::types::BigInt;
use crate::models::{AssetStatistic, ChainStatistic, ScanSummary, TokenStatistic};

impl PostgresManager {
    /// Fold new inbound/outbound rows into one chain's totals.
    ///
    /// Inbound counts destination transactions landing on the chain,
    /// outbound counts source transactions leaving it, each behind its own
    /// cursor.
    pub async fn update_chain_statistic(&self, chain_id: i64) -> IndexerResult<ScanSummary> {
        let mut dbtx = self.pool.begin().await?;

        sqlx::query("INSERT INTO chain_statistics (chain_id) VALUES ($1) ON CONFLICT (chain_id) DO NOTHING")
            .bind(chain_id)
            .execute(&mut *dbtx)
            .await?;

        let stat = sqlx::query("SELECT * FROM chain_statistics WHERE chain_id = $1 FOR UPDATE")
            .bind(chain_id)
            .fetch_one(&mut *dbtx)
            .await?;
        let last_in: i64 = stat.get("last_in_check_id");
        let last_out: i64 = stat.get("last_out_check_id");

        let inbound = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt, COALESCE(MAX(id), $2) AS max_id
            FROM dst_transactions
            WHERE chain_id = $1 AND id > $2
            "#,
        )
        .bind(chain_id)
        .bind(last_in)
        .fetch_one(&mut *dbtx)
        .await?;

        let outbound = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt, COALESCE(MAX(id), $2) AS max_id
            FROM src_transactions
            WHERE chain_id = $1 AND id > $2
            "#,
        )
        .bind(chain_id)
        .bind(last_out)
        .fetch_one(&mut *dbtx)
        .await?;

        let in_rows: i64 = inbound.get("cnt");
        let out_rows: i64 = outbound.get("cnt");

        let addresses = sqlx::query(
            "SELECT COUNT(DISTINCT sender) AS cnt FROM src_transactions WHERE chain_id = $1",
        )
        .bind(chain_id)
        .fetch_one(&mut *dbtx)
        .await?;

        sqlx::query(
            r#"
            UPDATE chain_statistics SET
                in_count = in_count + $2,
                out_count = out_count + $3,
                addresses = $4,
                last_in_check_id = $5,
                last_out_check_id = $6
            WHERE chain_id = $1
            "#,
        )
        .bind(chain_id)
        .bind(in_rows)
        .bind(out_rows)
        .bind(addresses.get::<i64, _>("cnt"))
        .bind(inbound.get::<i64, _>("max_id"))
        .bind(outbound.get::<i64, _>("max_id"))
        .execute(&mut *dbtx)
        .await?;

        dbtx.commit().await?;

        debug!(chain_id, in_rows, out_rows, "chain statistic updated");

        Ok(ScanSummary {
            in_rows: in_rows as u64,
            out_rows: out_rows as u64,
        })
    }

    /// Fold new transfer sub-records into one token's totals, normalizing
    /// amounts to fixed-point USD with the registered price and precision.
    pub async fn update_token_statistic(
        &self,
        hash: &str,
        chain_id: i64,
    ) -> IndexerResult<ScanSummary> {
        let mut dbtx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO token_statistics (hash, chain_id) VALUES ($1, $2) ON CONFLICT (hash, chain_id) DO NOTHING",
        )
        .bind(hash)
        .bind(chain_id)
        .execute(&mut *dbtx)
        .await?;

        let stat = sqlx::query_as::<_, TokenStatistic>(
            "SELECT * FROM token_statistics WHERE hash = $1 AND chain_id = $2 FOR UPDATE",
        )
        .bind(hash)
        .bind(chain_id)
        .fetch_one(&mut *dbtx)
        .await?;

        let pricing = sqlx::query(
            r#"
            SELECT t.precision AS precision, COALESCE(b.price, 0) AS price
            FROM tokens t
            LEFT JOIN token_basics b ON b.name = t.token_basic_name
            WHERE t.hash = $1 AND t.chain_id = $2
            "#,
        )
        .bind(hash)
        .bind(chain_id)
        .fetch_optional(&mut *dbtx)
        .await?;
        let (precision, price) = match &pricing {
            Some(row) => (row.get::<i32, _>("precision"), row.get::<i64, _>("price")),
            None => (0, 0),
        };

        // outbound: transfers leaving via the source stage
        let out_rows = sqlx::query(
            r#"
            SELECT id, amount FROM src_transfers
            WHERE asset = $1 AND chain_id = $2 AND id > $3
            ORDER BY id ASC
            "#,
        )
        .bind(hash)
        .bind(chain_id)
        .bind(stat.last_out_check_id)
        .fetch_all(&mut *dbtx)
        .await?;

        let mut out_amount = stat.out_amount.clone();
        let mut out_amount_usd = stat.out_amount_usd.clone();
        let mut last_out = stat.last_out_check_id;
        for row in &out_rows {
            let amount: BigInt = row.get("amount");
            out_amount_usd += amount.normalized(price, precision);
            out_amount += amount;
            last_out = row.get("id");
        }

        // inbound: transfers landing via the destination stage
        let in_rows = sqlx::query(
            r#"
            SELECT id, amount FROM dst_transfers
            WHERE asset = $1 AND chain_id = $2 AND id > $3
            ORDER BY id ASC
            "#,
        )
        .bind(hash)
        .bind(chain_id)
        .bind(stat.last_in_check_id)
        .fetch_all(&mut *dbtx)
        .await?;

        let mut in_amount = stat.in_amount.clone();
        let mut in_amount_usd = stat.in_amount_usd.clone();
        let mut last_in = stat.last_in_check_id;
        for row in &in_rows {
            let amount: BigInt = row.get("amount");
            in_amount_usd += amount.normalized(price, precision);
            in_amount += amount;
            last_in = row.get("id");
        }

        sqlx::query(
            r#"
            UPDATE token_statistics SET
                in_counter = in_counter + $3,
                in_amount = $4,
                in_amount_usd = $5,
                out_counter = out_counter + $6,
                out_amount = $7,
                out_amount_usd = $8,
                last_in_check_id = $9,
                last_out_check_id = $10
            WHERE hash = $1 AND chain_id = $2
            "#,
        )
        .bind(hash)
        .bind(chain_id)
        .bind(in_rows.len() as i64)
        .bind(&in_amount)
        .bind(&in_amount_usd)
        .bind(out_rows.len() as i64)
        .bind(&out_amount)
        .bind(&out_amount_usd)
        .bind(last_in)
        .bind(last_out)
        .execute(&mut *dbtx)
        .await?;

        dbtx.commit().await?;

        debug!(
            hash,
            chain_id,
            in_rows = in_rows.len(),
            out_rows = out_rows.len(),
            "token statistic updated"
        );

        Ok(ScanSummary {
            in_rows: in_rows.len() as u64,
            out_rows: out_rows.len() as u64,
        })
    }

    /// Fold new source transfers of one canonical asset, across all chains,
    /// into its totals. Distinct senders are recomputed at commit since a
    /// cursor cannot track distinctness incrementally.
    pub async fn update_asset_statistic(&self, token_basic_name: &str) -> IndexerResult<u64> {
        let mut dbtx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO asset_statistics (token_basic_name) VALUES ($1) ON CONFLICT (token_basic_name) DO NOTHING",
        )
        .bind(token_basic_name)
        .execute(&mut *dbtx)
        .await?;

        let stat = sqlx::query_as::<_, AssetStatistic>(
            "SELECT * FROM asset_statistics WHERE token_basic_name = $1 FOR UPDATE",
        )
        .bind(token_basic_name)
        .fetch_one(&mut *dbtx)
        .await?;

        let pricing = sqlx::query(
            "SELECT precision, price FROM token_basics WHERE name = $1",
        )
        .bind(token_basic_name)
        .fetch_optional(&mut *dbtx)
        .await?;
        let (precision, price) = match &pricing {
            Some(row) => (row.get::<i32, _>("precision"), row.get::<i64, _>("price")),
            None => (0, 0),
        };

        let rows = sqlx::query(
            r#"
            SELECT st.id AS id, st.amount AS amount
            FROM src_transfers st
            JOIN tokens t ON t.hash = st.asset AND t.chain_id = st.chain_id
            WHERE t.token_basic_name = $1 AND st.id > $2
            ORDER BY st.id ASC
            "#,
        )
        .bind(token_basic_name)
        .bind(stat.last_check_id)
        .fetch_all(&mut *dbtx)
        .await?;

        let mut amount = stat.amount.clone();
        let mut amount_usd = stat.amount_usd.clone();
        let mut last_check = stat.last_check_id;
        for row in &rows {
            let value: BigInt = row.get("amount");
            amount_usd += value.normalized(price, precision);
            amount += value;
            last_check = row.get("id");
        }

        let addresses = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT st.from_addr) AS cnt
            FROM src_transfers st
            JOIN tokens t ON t.hash = st.asset AND t.chain_id = st.chain_id
            WHERE t.token_basic_name = $1
            "#,
        )
        .bind(token_basic_name)
        .fetch_one(&mut *dbtx)
        .await?;

        sqlx::query(
            r#"
            UPDATE asset_statistics SET
                amount = $2,
                amount_usd = $3,
                tx_count = tx_count + $4,
                address_count = $5,
                latest_update = $6,
                last_check_id = $7
            WHERE token_basic_name = $1
            "#,
        )
        .bind(token_basic_name)
        .bind(&amount)
        .bind(&amount_usd)
        .bind(rows.len() as i64)
        .bind(addresses.get::<i64, _>("cnt"))
        .bind(chrono::Utc::now().timestamp())
        .bind(last_check)
        .execute(&mut *dbtx)
        .await?;

        dbtx.commit().await?;

        debug!(token_basic_name, rows = rows.len(), "asset statistic updated");

        Ok(rows.len() as u64)
    }

    pub async fn get_chain_statistic(&self, chain_id: i64) -> IndexerResult<Option<ChainStatistic>> {
        let stat = sqlx::query_as::<_, ChainStatistic>(
            "SELECT * FROM chain_statistics WHERE chain_id = $1",
        )
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stat)
    }

    pub async fn get_token_statistic(
        &self,
        hash: &str,
        chain_id: i64,
    ) -> IndexerResult<Option<TokenStatistic>> {
        let stat = sqlx::query_as::<_, TokenStatistic>(
            "SELECT * FROM token_statistics WHERE hash = $1 AND chain_id = $2",
        )
        .bind(hash)
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stat)
    }

    pub async fn get_asset_statistic(
        &self,
        token_basic_name: &str,
    ) -> IndexerResult<Option<AssetStatistic>> {
        let stat = sqlx::query_as::<_, AssetStatistic>(
            "SELECT * FROM asset_statistics WHERE token_basic_name = $1",
        )
        .bind(token_basic_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stat)
    }

    pub async fn list_chain_statistics(&self) -> IndexerResult<Vec<ChainStatistic>> {
        let stats = sqlx::query_as::<_, ChainStatistic>(
            "SELECT * FROM chain_statistics ORDER BY chain_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn list_token_statistics(&self, chain_id: i64) -> IndexerResult<Vec<TokenStatistic>> {
        let stats = sqlx::query_as::<_, TokenStatistic>(
            "SELECT * FROM token_statistics WHERE chain_id = $1 ORDER BY hash",
        )
        .bind(chain_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}
