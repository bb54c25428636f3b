//! Token registry operations

use super::postgres::PostgresManager;
use crate::core::error::IndexerResult;
use crate::models::{PriceMarket, Token, TokenBasic, TokenMap};

impl PostgresManager {
    /// Insert or update a canonical asset identity, keyed by name.
    pub async fn register_token_basic(&self, basic: &TokenBasic) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO token_basics (
                name, standard, precision, price, price_update_time,
                meta, description, official_site
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name) DO UPDATE SET
                standard = EXCLUDED.standard,
                precision = EXCLUDED.precision,
                price = EXCLUDED.price,
                price_update_time = EXCLUDED.price_update_time,
                meta = EXCLUDED.meta,
                description = EXCLUDED.description,
                official_site = EXCLUDED.official_site
        "#;

        sqlx::query(query)
            .bind(&basic.name)
            .bind(basic.standard)
            .bind(basic.precision)
            .bind(basic.price)
            .bind(basic.price_update_time)
            .bind(&basic.meta)
            .bind(&basic.description)
            .bind(&basic.official_site)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_token_basic(&self, name: &str) -> IndexerResult<Option<TokenBasic>> {
        let basic = sqlx::query_as::<_, TokenBasic>("SELECT * FROM token_basics WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(basic)
    }

    pub async fn list_token_basics(&self) -> IndexerResult<Vec<TokenBasic>> {
        let basics = sqlx::query_as::<_, TokenBasic>("SELECT * FROM token_basics ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(basics)
    }

    /// Refresh the canonical USD price of an asset.
    pub async fn update_token_basic_price(
        &self,
        name: &str,
        price: i64,
        price_update_time: i64,
    ) -> IndexerResult<()> {
        sqlx::query(
            "UPDATE token_basics SET price = $2, price_update_time = $3 WHERE name = $1",
        )
        .bind(name)
        .bind(price)
        .bind(price_update_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or update a chain-specific token, keyed by `(hash, chain_id)`.
    pub async fn register_token(&self, token: &Token) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO tokens (
                hash, chain_id, name, token_basic_name, standard, precision,
                available_amount
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (hash, chain_id) DO UPDATE SET
                name = EXCLUDED.name,
                token_basic_name = EXCLUDED.token_basic_name,
                standard = EXCLUDED.standard,
                precision = EXCLUDED.precision,
                available_amount = EXCLUDED.available_amount
        "#;

        sqlx::query(query)
            .bind(&token.hash)
            .bind(token.chain_id)
            .bind(&token.name)
            .bind(&token.token_basic_name)
            .bind(token.standard)
            .bind(token.precision)
            .bind(&token.available_amount)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Strict insert of a token. A duplicate `(hash, chain_id)` surfaces as
    /// a `Conflict` error instead of being coerced to an update.
    pub async fn insert_token(&self, token: &Token) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO tokens (
                hash, chain_id, name, token_basic_name, standard, precision,
                available_amount
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;

        sqlx::query(query)
            .bind(&token.hash)
            .bind(token.chain_id)
            .bind(&token.name)
            .bind(&token.token_basic_name)
            .bind(token.standard)
            .bind(token.precision)
            .bind(&token.available_amount)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Keyed token lookup. Absent is a soft `None`, never an error: lineage
    /// joins branch on it explicitly.
    pub async fn lookup_token(&self, hash: &str, chain_id: i64) -> IndexerResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT * FROM tokens WHERE hash = $1 AND chain_id = $2",
        )
        .bind(hash)
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn list_tokens_by_chain(&self, chain_id: i64) -> IndexerResult<Vec<Token>> {
        let tokens =
            sqlx::query_as::<_, Token>("SELECT * FROM tokens WHERE chain_id = $1 ORDER BY hash")
                .bind(chain_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(tokens)
    }

    pub async fn list_tokens_by_basic_name(&self, basic_name: &str) -> IndexerResult<Vec<Token>> {
        let tokens = sqlx::query_as::<_, Token>(
            "SELECT * FROM tokens WHERE token_basic_name = $1 ORDER BY chain_id",
        )
        .bind(basic_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    /// Insert or update a directed token mapping, keyed by the full
    /// source/destination pair.
    pub async fn register_token_map(&self, map: &TokenMap) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO token_maps (
                src_chain_id, src_token_hash, dst_chain_id, dst_token_hash, enabled
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (src_chain_id, src_token_hash, dst_chain_id, dst_token_hash)
            DO UPDATE SET enabled = EXCLUDED.enabled
        "#;

        sqlx::query(query)
            .bind(map.src_chain_id)
            .bind(&map.src_token_hash)
            .bind(map.dst_chain_id)
            .bind(&map.dst_token_hash)
            .bind(map.enabled)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All enabled mappings out of one source token.
    pub async fn list_token_maps_from(
        &self,
        src_chain_id: i64,
        src_token_hash: &str,
    ) -> IndexerResult<Vec<TokenMap>> {
        let maps = sqlx::query_as::<_, TokenMap>(
            r#"
            SELECT * FROM token_maps
            WHERE src_chain_id = $1 AND src_token_hash = $2 AND enabled
            ORDER BY dst_chain_id
            "#,
        )
        .bind(src_chain_id)
        .bind(src_token_hash)
        .fetch_all(&self.pool)
        .await?;

        Ok(maps)
    }

    pub async fn list_token_maps(&self, limit: i64, offset: i64) -> IndexerResult<Vec<TokenMap>> {
        let maps = sqlx::query_as::<_, TokenMap>(
            r#"
            SELECT * FROM token_maps
            ORDER BY src_chain_id, src_token_hash, dst_chain_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(maps)
    }

    /// Insert or update one market's quote for an asset.
    pub async fn upsert_price_market(&self, market: &PriceMarket) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO price_markets (
                token_basic_name, market_name, price, price_update_time
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_basic_name, market_name) DO UPDATE SET
                price = EXCLUDED.price,
                price_update_time = EXCLUDED.price_update_time
        "#;

        sqlx::query(query)
            .bind(&market.token_basic_name)
            .bind(&market.market_name)
            .bind(market.price)
            .bind(market.price_update_time)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_price_markets(&self, basic_name: &str) -> IndexerResult<Vec<PriceMarket>> {
        let markets = sqlx::query_as::<_, PriceMarket>(
            "SELECT * FROM price_markets WHERE token_basic_name = $1 ORDER BY market_name",
        )
        .bind(basic_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(markets)
    }
}
