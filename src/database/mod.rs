//! Database layer: PostgreSQL for the relational model, RocksDB for raw
//! block blobs

pub mod blockstore;
pub mod chains;
pub mod errors;
pub mod lineage;
pub mod postgres;
pub mod statistics;
pub mod tokens;
pub mod transactions;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use blockstore::{BlockStoreBatch, BlockStoreManager, ColumnFamilies};
pub use lineage::{TxLineage, WrapperLineage};
pub use postgres::PostgresManager;

use crate::config::IndexerConfig;
use crate::core::error::IndexerResult;

/// Database connection manager
pub struct DatabaseManager {
    pub postgres: Arc<PostgresManager>,
    pub blocks: Arc<BlockStoreManager>,
}

impl DatabaseManager {
    /// Connect both stores and apply pending schema migrations.
    pub async fn new(config: &IndexerConfig) -> IndexerResult<Self> {
        let postgres = PostgresManager::new(&config.database).await?;
        postgres.migrate().await?;
        let blocks = BlockStoreManager::new(&config.storage.rocksdb).await?;

        Ok(Self {
            postgres: Arc::new(postgres),
            blocks: Arc::new(blocks),
        })
    }

    pub async fn health_check(&self) -> IndexerResult<DatabaseHealth> {
        let postgres_healthy = self.postgres.health_check().await.is_ok();
        let blocks_healthy = self.blocks.health_check().await.is_ok();

        Ok(DatabaseHealth {
            postgres: postgres_healthy,
            blocks: blocks_healthy,
            overall: postgres_healthy && blocks_healthy,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub postgres: bool,
    pub blocks: bool,
    pub overall: bool,
}

/// Common database operations trait
#[async_trait]
pub trait DatabaseOperations {
    async fn health_check(&self) -> IndexerResult<()>;
}

#[async_trait]
impl DatabaseOperations for PostgresManager {
    async fn health_check(&self) -> IndexerResult<()> {
        PostgresManager::health_check(self).await
    }
}

#[async_trait]
impl DatabaseOperations for BlockStoreManager {
    async fn health_check(&self) -> IndexerResult<()> {
        BlockStoreManager::health_check(self).await
    }
}
