//! In-memory storage backend.
//!
//! Stores sync positions and block records in RAM. Useful for testing and
//! short-lived runs that don't need persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use blocksync_core::{PositionStore, StoreError, SyncPosition};

use crate::records::{BlockRecord, BlockRecordStore};

/// In-memory position + record storage.
///
/// All data is lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    start_height: u64,
    positions: Mutex<HashMap<String, SyncPosition>>,
    records: Mutex<HashMap<String, BlockRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose `load` returns `height` for pairs with no record yet.
    pub fn starting_at(height: u64) -> Self {
        Self {
            start_height: height,
            ..Self::default()
        }
    }

    fn pair_key(protocol: &str, network: &str) -> String {
        format!("{protocol}:{network}")
    }

    fn record_key(protocol: &str, network: &str, height: u64) -> String {
        format!("{protocol}:{network}:{height}")
    }

    /// All stored positions, for status displays.
    pub fn positions(&self) -> Vec<SyncPosition> {
        self.positions.lock().unwrap().values().cloned().collect()
    }

    /// Delete the position record for a pair (e.g. when resetting).
    pub fn delete_position(&self, protocol: &str, network: &str) {
        self.positions
            .lock()
            .unwrap()
            .remove(&Self::pair_key(protocol, network));
    }
}

#[async_trait]
impl PositionStore for MemoryStorage {
    async fn load(&self, protocol: &str, network: &str) -> Result<u64, StoreError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .get(&Self::pair_key(protocol, network))
            .map(|p| p.height)
            .unwrap_or(self.start_height))
    }

    async fn save(&self, protocol: &str, network: &str, height: u64) -> Result<(), StoreError> {
        let key = Self::pair_key(protocol, network);
        self.positions
            .lock()
            .unwrap()
            .insert(key, SyncPosition::new(protocol, network, height));
        Ok(())
    }
}

#[async_trait]
impl BlockRecordStore for MemoryStorage {
    async fn upsert(&self, record: BlockRecord) -> Result<(), StoreError> {
        let key = Self::record_key(&record.protocol, &record.network, record.height);
        self.records.lock().unwrap().insert(key, record);
        Ok(())
    }

    async fn get(
        &self,
        protocol: &str,
        network: &str,
        height: u64,
    ) -> Result<Option<BlockRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&Self::record_key(protocol, network, height))
            .cloned())
    }

    async fn count(&self, protocol: &str, network: &str) -> Result<u64, StoreError> {
        let prefix = format!("{protocol}:{network}:");
        Ok(self
            .records
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .count() as u64)
    }
}
