//! SQLite storage backend for Blocksync.
//!
//! Persists sync positions and block records to a single SQLite file.
//! Uses `sqlx` with WAL mode for concurrent read performance.
//!
//! # Usage
//! ```rust,no_run
//! use blocksync_storage::sqlite::SqliteStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStorage::open("./sync.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStorage::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use blocksync_core::{PositionStore, StoreError, SyncPosition};

use crate::records::{BlockRecord, BlockRecordStore};

/// SQLite-backed storage for sync positions and block records.
pub struct SqliteStorage {
    pool: SqlitePool,
    start_height: u64,
}

impl SqliteStorage {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./sync.db"`) or a full
    /// SQLite URL (`"sqlite:./sync.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let storage = Self {
            pool,
            start_height: 0,
        };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Open an in-memory SQLite database.
    ///
    /// All data is lost when the pool is dropped. Ideal for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let storage = Self {
            pool,
            start_height: 0,
        };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Height returned by `load` for pairs with no record yet
    /// (e.g. a protocol's genesis offset).
    pub fn with_start_height(mut self, height: u64) -> Self {
        self.start_height = height;
        self
    }

    /// Create tables and enable WAL mode.
    async fn init_schema(&self) -> Result<(), StoreError> {
        // WAL mode — better concurrent read throughput
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sync_positions (
                protocol   TEXT    NOT NULL,
                network    TEXT    NOT NULL,
                height     INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (protocol, network)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS block_records (
                protocol    TEXT    NOT NULL,
                network     TEXT    NOT NULL,
                height      INTEGER NOT NULL,
                block_hash  TEXT    NOT NULL,
                parent_hash TEXT    NOT NULL,
                timestamp   INTEGER NOT NULL,
                tx_count    INTEGER NOT NULL,
                recorded_at INTEGER NOT NULL,
                PRIMARY KEY (protocol, network, height)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    // ─── Status / reset ─────────────────────────────────────────────────────────

    /// All stored positions, for status displays.
    pub async fn positions(&self) -> Result<Vec<SyncPosition>, StoreError> {
        let rows = sqlx::query(
            "SELECT protocol, network, height, updated_at
             FROM sync_positions ORDER BY protocol, network",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter()
            .map(|r| {
                let height: i64 = r.get("height");
                if height < 0 {
                    return Err(StoreError::Corrupt {
                        protocol: r.get("protocol"),
                        network: r.get("network"),
                        reason: format!("negative height {height}"),
                    });
                }
                Ok(SyncPosition {
                    protocol: r.get("protocol"),
                    network: r.get("network"),
                    height: height as u64,
                    updated_at: r.get("updated_at"),
                })
            })
            .collect()
    }

    /// Delete the position record for a pair (the next `load` returns the
    /// configured starting height again).
    pub async fn delete_position(&self, protocol: &str, network: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sync_positions WHERE protocol = ? AND network = ?")
            .bind(protocol)
            .bind(network)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(protocol, network, "position deleted");
        Ok(())
    }
}

// ─── PositionStore impl ──────────────────────────────────────────────────────

#[async_trait]
impl PositionStore for SqliteStorage {
    async fn load(&self, protocol: &str, network: &str) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT height FROM sync_positions WHERE protocol = ? AND network = ?",
        )
        .bind(protocol)
        .bind(network)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(r) => {
                let height: i64 = r.get("height");
                if height < 0 {
                    return Err(StoreError::Corrupt {
                        protocol: protocol.to_string(),
                        network: network.to_string(),
                        reason: format!("negative height {height}"),
                    });
                }
                Ok(height as u64)
            }
            None => Ok(self.start_height),
        }
    }

    async fn save(&self, protocol: &str, network: &str, height: u64) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO sync_positions (protocol, network, height, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(protocol)
        .bind(network)
        .bind(height as i64)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(protocol, network, height, "position saved");
        Ok(())
    }
}

// ─── BlockRecordStore impl ───────────────────────────────────────────────────

#[async_trait]
impl BlockRecordStore for SqliteStorage {
    async fn upsert(&self, record: BlockRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO block_records
             (protocol, network, height, block_hash, parent_hash, timestamp, tx_count, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.protocol)
        .bind(&record.network)
        .bind(record.height as i64)
        .bind(&record.hash)
        .bind(&record.parent_hash)
        .bind(record.timestamp)
        .bind(record.tx_count as i64)
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(
            protocol = %record.protocol,
            network = %record.network,
            height = record.height,
            "block record stored"
        );
        Ok(())
    }

    async fn get(
        &self,
        protocol: &str,
        network: &str,
        height: u64,
    ) -> Result<Option<BlockRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT protocol, network, height, block_hash, parent_hash, timestamp, tx_count, recorded_at
             FROM block_records WHERE protocol = ? AND network = ? AND height = ?",
        )
        .bind(protocol)
        .bind(network)
        .bind(height as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(row.map(|r| BlockRecord {
            protocol: r.get("protocol"),
            network: r.get("network"),
            height: r.get::<i64, _>("height") as u64,
            hash: r.get("block_hash"),
            parent_hash: r.get("parent_hash"),
            timestamp: r.get("timestamp"),
            tx_count: r.get::<i64, _>("tx_count") as u32,
            recorded_at: r.get("recorded_at"),
        }))
    }

    async fn count(&self, protocol: &str, network: &str) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as cnt FROM block_records WHERE protocol = ? AND network = ?",
        )
        .bind(protocol)
        .bind(network)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let cnt: i64 = row.get("cnt");
        Ok(cnt as u64)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(height: u64) -> BlockRecord {
        BlockRecord {
            protocol: "ethereum".into(),
            network: "mainnet".into(),
            height,
            hash: format!("0x{height:064x}"),
            parent_hash: format!("0x{:064x}", height - 1),
            timestamp: 1_700_000_000 + height as i64 * 12,
            tx_count: 5,
            recorded_at: 1_700_000_000,
        }
    }

    // ── PositionStore ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn position_roundtrip() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.save("ethereum", "mainnet", 1_000).await.unwrap();
        assert_eq!(store.load("ethereum", "mainnet").await.unwrap(), 1_000);
    }

    #[tokio::test]
    async fn position_upsert_overwrites() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.save("ethereum", "mainnet", 100).await.unwrap();
        store.save("ethereum", "mainnet", 101).await.unwrap();

        // Only one row; second save overwrites the first
        assert_eq!(store.load("ethereum", "mainnet").await.unwrap(), 101);
        assert_eq!(store.positions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_pair_returns_start_height() {
        let store = SqliteStorage::in_memory()
            .await
            .unwrap()
            .with_start_height(17_000_000);

        assert_eq!(
            store.load("ethereum", "mainnet").await.unwrap(),
            17_000_000
        );
    }

    #[tokio::test]
    async fn pairs_are_isolated() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.save("ethereum", "mainnet", 500).await.unwrap();
        store.save("ethereum", "sepolia", 42).await.unwrap();

        assert_eq!(store.load("ethereum", "mainnet").await.unwrap(), 500);
        assert_eq!(store.load("ethereum", "sepolia").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn delete_position_restores_start_height() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.save("ethereum", "mainnet", 500).await.unwrap();
        store.delete_position("ethereum", "mainnet").await.unwrap();
        assert_eq!(store.load("ethereum", "mainnet").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn positions_lists_all_pairs() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.save("ethereum", "mainnet", 10).await.unwrap();
        store.save("ethereum", "sepolia", 20).await.unwrap();

        let all = store.positions().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].network, "mainnet");
        assert_eq!(all[0].height, 10);
        assert_eq!(all[1].network, "sepolia");
        assert_eq!(all[1].height, 20);
    }

    // ── BlockRecordStore ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn record_roundtrip() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.upsert(sample_record(100)).await.unwrap();

        let loaded = store.get("ethereum", "mainnet", 100).await.unwrap().unwrap();
        assert_eq!(loaded, sample_record(100));
        assert!(store.get("ethereum", "mainnet", 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_upsert_is_idempotent() {
        let store = SqliteStorage::in_memory().await.unwrap();

        // Reprocessing the same height writes the same key twice.
        store.upsert(sample_record(100)).await.unwrap();
        store.upsert(sample_record(100)).await.unwrap();

        assert_eq!(store.count("ethereum", "mainnet").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn record_count_is_per_pair() {
        let store = SqliteStorage::in_memory().await.unwrap();

        store.upsert(sample_record(100)).await.unwrap();
        store.upsert(sample_record(101)).await.unwrap();

        let mut other = sample_record(100);
        other.network = "sepolia".into();
        store.upsert(other).await.unwrap();

        assert_eq!(store.count("ethereum", "mainnet").await.unwrap(), 2);
        assert_eq!(store.count("ethereum", "sepolia").await.unwrap(), 1);
    }
}
