//! Chain registry operations

use super::postgres::PostgresManager;
use crate::core::error::IndexerResult;
use crate::models::Chain;

impl PostgresManager {
    /// Insert or update a chain, keyed by its id.
    pub async fn register_chain(&self, chain: &Chain) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO chains (
                chain_id, name, height, height_swap, backward_block_number
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (chain_id) DO UPDATE SET
                name = EXCLUDED.name,
                height = EXCLUDED.height,
                height_swap = EXCLUDED.height_swap,
                backward_block_number = EXCLUDED.backward_block_number
        "#;

        sqlx::query(query)
            .bind(chain.chain_id)
            .bind(&chain.name)
            .bind(chain.height)
            .bind(chain.height_swap)
            .bind(chain.backward_block_number)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_chain(&self, chain_id: i64) -> IndexerResult<Option<Chain>> {
        let chain = sqlx::query_as::<_, Chain>("SELECT * FROM chains WHERE chain_id = $1")
            .bind(chain_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(chain)
    }

    pub async fn list_chains(&self) -> IndexerResult<Vec<Chain>> {
        let chains = sqlx::query_as::<_, Chain>("SELECT * FROM chains ORDER BY chain_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(chains)
    }

    /// Advance the fully-indexed height. Never moves backwards: reorg
    /// handling rewinds via `backward_block_number` at scan time instead.
    pub async fn update_chain_height(&self, chain_id: i64, height: i64) -> IndexerResult<()> {
        sqlx::query("UPDATE chains SET height = GREATEST(height, $2) WHERE chain_id = $1")
            .bind(chain_id)
            .bind(height)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Advance the swap-indexing high-water mark.
    pub async fn update_chain_swap_height(&self, chain_id: i64, height: i64) -> IndexerResult<()> {
        sqlx::query("UPDATE chains SET height_swap = GREATEST(height_swap, $2) WHERE chain_id = $1")
            .bind(chain_id)
            .bind(height)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
