//! RocksDB store for raw block and snapshot blobs
//!
//! The relational model never reads this store; it backs the low-level
//! chain-tailing utility that needs its raw inputs replayable. Blocks are
//! keyed by hash, with a `(chain_id, height)` index entry pointing back at
//! the hash so both access paths work.

use std::collections::HashMap;
use std::sync::Arc;

use rocksdb::{ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RocksDBConfig;
use crate::core::error::{IndexerResult, StorageError};
use crate::models::{BlockRecord, SnapshotRecord};

/// Type alias for the RocksDB instance
pub type RocksDB = DBWithThreadMode<MultiThreaded>;

/// Column family names for the raw-data store
pub struct ColumnFamilies;

impl ColumnFamilies {
    pub const BLOCKS: &'static str = "blocks";
    pub const HEIGHTS: &'static str = "heights";
    pub const SNAPSHOTS: &'static str = "snapshots";
    pub const METADATA: &'static str = "metadata";

    pub fn all() -> Vec<&'static str> {
        vec![Self::BLOCKS, Self::HEIGHTS, Self::SNAPSHOTS, Self::METADATA]
    }
}

/// Index key for the `(chain_id, height)` -> hash entries.
fn height_key(chain_id: i64, height: i64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&chain_id.to_be_bytes());
    key[8..].copy_from_slice(&height.to_be_bytes());
    key
}

/// RocksDB storage manager for opaque chain data
#[derive(Clone)]
pub struct BlockStoreManager {
    db: Arc<RocksDB>,
}

impl BlockStoreManager {
    pub async fn new(config: &RocksDBConfig) -> IndexerResult<Self> {
        info!("initializing block store at {}", config.path.display());

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_write_buffer_size(config.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.max_write_buffer_number);

        if config.enable_compression {
            db_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        }

        let cache = rocksdb::Cache::new_lru_cache(config.block_cache_size_mb * 1024 * 1024);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        db_opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ColumnFamilies::all()
            .into_iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                if config.enable_compression {
                    cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
                }
                ColumnFamilyDescriptor::new(name, cf_opts)
            })
            .collect();

        let db = RocksDB::open_cf_descriptors(&db_opts, &config.path, cf_descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get_cf(&self, name: &str) -> IndexerResult<Arc<rocksdb::BoundColumnFamily<'_>>> {
        self.db.cf_handle(name).ok_or_else(|| {
            StorageError::RocksDB(format!("column family '{name}' not found")).into()
        })
    }

    fn serialize<T: Serialize>(&self, value: &T) -> IndexerResult<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: for<'de> Deserialize<'de>>(&self, data: &[u8]) -> IndexerResult<T> {
        Ok(bincode::deserialize(data)?)
    }

    /// Store a block blob under its hash and index it by height.
    pub fn put_block(&self, block: &BlockRecord) -> IndexerResult<()> {
        let blocks = self.get_cf(ColumnFamilies::BLOCKS)?;
        let heights = self.get_cf(ColumnFamilies::HEIGHTS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&blocks, block.hash.as_bytes(), self.serialize(block)?);
        batch.put_cf(
            &heights,
            height_key(block.chain_id, block.height),
            block.hash.as_bytes(),
        );
        self.db.write(batch)?;

        Ok(())
    }

    pub fn get_block_by_hash(&self, hash: &str) -> IndexerResult<Option<BlockRecord>> {
        let cf = self.get_cf(ColumnFamilies::BLOCKS)?;
        match self.db.get_cf(&cf, hash.as_bytes())? {
            Some(data) => Ok(Some(self.deserialize(&data)?)),
            None => Ok(None),
        }
    }

    pub fn get_block_by_height(
        &self,
        chain_id: i64,
        height: i64,
    ) -> IndexerResult<Option<BlockRecord>> {
        let cf = self.get_cf(ColumnFamilies::HEIGHTS)?;
        let Some(hash) = self.db.get_cf(&cf, height_key(chain_id, height))? else {
            return Ok(None);
        };
        let hash = String::from_utf8(hash)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.get_block_by_hash(&hash)
    }

    pub fn block_exists(&self, hash: &str) -> IndexerResult<bool> {
        let cf = self.get_cf(ColumnFamilies::BLOCKS)?;
        Ok(self.db.get_cf(&cf, hash.as_bytes())?.is_some())
    }

    pub fn put_snapshot(&self, snapshot: &SnapshotRecord) -> IndexerResult<()> {
        let cf = self.get_cf(ColumnFamilies::SNAPSHOTS)?;
        self.db
            .put_cf(&cf, snapshot.hash.as_bytes(), self.serialize(snapshot)?)?;
        Ok(())
    }

    pub fn get_snapshot(&self, hash: &str) -> IndexerResult<Option<SnapshotRecord>> {
        let cf = self.get_cf(ColumnFamilies::SNAPSHOTS)?;
        match self.db.get_cf(&cf, hash.as_bytes())? {
            Some(data) => Ok(Some(self.deserialize(&data)?)),
            None => Ok(None),
        }
    }

    /// Record an arbitrary metadata value, e.g. the last flushed height.
    pub fn put_metadata(&self, key: &str, value: &[u8]) -> IndexerResult<()> {
        let cf = self.get_cf(ColumnFamilies::METADATA)?;
        self.db.put_cf(&cf, key.as_bytes(), value)?;
        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> IndexerResult<Option<Vec<u8>>> {
        let cf = self.get_cf(ColumnFamilies::METADATA)?;
        Ok(self.db.get_cf(&cf, key.as_bytes())?)
    }

    /// Create a write batch for applying many blocks atomically.
    pub fn create_batch(&self) -> BlockStoreBatch {
        BlockStoreBatch {
            batch: WriteBatch::default(),
            manager: self.clone(),
        }
    }

    pub fn flush(&self) -> IndexerResult<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Approximate per-column-family key counts and sizes.
    pub fn get_stats(&self) -> IndexerResult<HashMap<String, String>> {
        let mut stats = HashMap::new();

        for cf_name in ColumnFamilies::all() {
            let cf = self.get_cf(cf_name)?;

            if let Ok(Some(count)) = self.db.property_value_cf(&cf, "rocksdb.estimate-num-keys") {
                stats.insert(format!("{cf_name}_keys"), count);
            }
            if let Ok(Some(size)) = self
                .db
                .property_value_cf(&cf, "rocksdb.total-sst-files-size")
            {
                stats.insert(format!("{cf_name}_size_bytes"), size);
            }
        }

        Ok(stats)
    }

    pub async fn health_check(&self) -> IndexerResult<()> {
        self.get_cf(ColumnFamilies::BLOCKS)?;
        Ok(())
    }
}

/// Write batch for atomic multi-block writes
pub struct BlockStoreBatch {
    batch: WriteBatch,
    manager: BlockStoreManager,
}

impl BlockStoreBatch {
    pub fn put_block(&mut self, block: &BlockRecord) -> IndexerResult<()> {
        let blocks = self.manager.get_cf(ColumnFamilies::BLOCKS)?;
        let heights = self.manager.get_cf(ColumnFamilies::HEIGHTS)?;
        self.batch
            .put_cf(&blocks, block.hash.as_bytes(), self.manager.serialize(block)?);
        self.batch.put_cf(
            &heights,
            height_key(block.chain_id, block.height),
            block.hash.as_bytes(),
        );
        Ok(())
    }

    pub fn put_snapshot(&mut self, snapshot: &SnapshotRecord) -> IndexerResult<()> {
        let cf = self.manager.get_cf(ColumnFamilies::SNAPSHOTS)?;
        self.batch
            .put_cf(&cf, snapshot.hash.as_bytes(), self.manager.serialize(snapshot)?);
        Ok(())
    }

    pub fn write(self) -> IndexerResult<()> {
        self.manager.db.write(self.batch)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}
