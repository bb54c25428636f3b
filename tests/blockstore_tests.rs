//! Block store tests against a temporary RocksDB instance

use anyhow::Result;
use tempfile::TempDir;

use bridge_indexer::config::RocksDBConfig;
use bridge_indexer::database::BlockStoreManager;
use bridge_indexer::models::{BlockRecord, SnapshotRecord};

async fn create_test_store() -> Result<(BlockStoreManager, TempDir)> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let temp_dir = TempDir::new()?;
    let config = RocksDBConfig {
        path: temp_dir.path().to_path_buf(),
        enable_compression: false,
        max_open_files: 100,
        write_buffer_size_mb: 16,
        max_write_buffer_number: 2,
        block_cache_size_mb: 32,
    };

    let store = BlockStoreManager::new(&config).await?;
    Ok((store, temp_dir))
}

fn sample_block(chain_id: i64, height: i64) -> BlockRecord {
    BlockRecord {
        chain_id,
        height,
        hash: format!("0xblock-{chain_id}-{height}"),
        time: 1_700_000_000 + height,
        raw: vec![0xde, 0xad, 0xbe, 0xef],
    }
}

#[tokio::test]
async fn block_round_trip_by_hash_and_height() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let block = sample_block(2, 100);
    store.put_block(&block)?;

    let by_hash = store.get_block_by_hash(&block.hash)?;
    assert_eq!(by_hash, Some(block.clone()));

    let by_height = store.get_block_by_height(2, 100)?;
    assert_eq!(by_height, Some(block));

    assert_eq!(store.get_block_by_hash("0xmissing")?, None);
    assert_eq!(store.get_block_by_height(2, 101)?, None);
    assert_eq!(store.get_block_by_height(3, 100)?, None);

    Ok(())
}

#[tokio::test]
async fn exists_tracks_writes() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let block = sample_block(5, 7);
    assert!(!store.block_exists(&block.hash)?);
    store.put_block(&block)?;
    assert!(store.block_exists(&block.hash)?);

    Ok(())
}

#[tokio::test]
async fn snapshot_round_trip() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let snapshot = SnapshotRecord {
        chain_id: 2,
        height: 50,
        hash: "0xsnap-50".to_string(),
        raw: vec![1, 2, 3, 4, 5],
    };
    store.put_snapshot(&snapshot)?;

    assert_eq!(store.get_snapshot("0xsnap-50")?, Some(snapshot));
    assert_eq!(store.get_snapshot("0xsnap-51")?, None);

    Ok(())
}

#[tokio::test]
async fn batch_applies_atomically() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    let mut batch = store.create_batch();
    assert!(batch.is_empty());
    for height in 0..10 {
        batch.put_block(&sample_block(7, height))?;
    }
    assert!(!batch.is_empty());
    batch.write()?;

    for height in 0..10 {
        let block = store.get_block_by_height(7, height)?;
        assert_eq!(block.map(|b| b.height), Some(height));
    }

    Ok(())
}

#[tokio::test]
async fn metadata_round_trip() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    assert_eq!(store.get_metadata("flushed_height")?, None);
    store.put_metadata("flushed_height", &42i64.to_be_bytes())?;
    assert_eq!(
        store.get_metadata("flushed_height")?,
        Some(42i64.to_be_bytes().to_vec())
    );

    Ok(())
}

#[tokio::test]
async fn data_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = RocksDBConfig {
        path: temp_dir.path().to_path_buf(),
        enable_compression: false,
        max_open_files: 100,
        write_buffer_size_mb: 16,
        max_write_buffer_number: 2,
        block_cache_size_mb: 32,
    };

    let block = sample_block(9, 1);
    {
        let store = BlockStoreManager::new(&config).await?;
        store.put_block(&block)?;
        store.flush()?;
    }

    let store = BlockStoreManager::new(&config).await?;
    assert_eq!(store.get_block_by_hash(&block.hash)?, Some(block));

    Ok(())
}

#[tokio::test]
async fn stats_report_column_families() -> Result<()> {
    let (store, _temp_dir) = create_test_store().await?;

    for height in 0..20 {
        store.put_block(&sample_block(1, height))?;
    }
    store.flush()?;

    let stats = store.get_stats()?;
    assert!(!stats.is_empty());

    Ok(())
}
