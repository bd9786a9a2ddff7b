//! Processed-block records — the output of the bundled recording action.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use blocksync_core::StoreError;

/// A summary row written once per processed block.
///
/// Keyed by (protocol, network, height): writing the same block again
/// replaces the row, which is what makes the recording action safe to run
/// more than once per height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub protocol: String,
    pub network: String,
    pub height: u64,
    /// Block hash as reported by the source.
    pub hash: String,
    /// Parent block hash.
    pub parent_hash: String,
    /// Block timestamp (seconds since epoch).
    pub timestamp: i64,
    /// Number of transactions in the block.
    pub tx_count: u32,
    /// Unix timestamp of when this record was written.
    pub recorded_at: i64,
}

/// Sink for processed-block records.
#[async_trait]
pub trait BlockRecordStore: Send + Sync {
    /// Insert or replace the record for (protocol, network, height).
    async fn upsert(&self, record: BlockRecord) -> Result<(), StoreError>;

    /// Fetch the record for a specific height, if one was written.
    async fn get(
        &self,
        protocol: &str,
        network: &str,
        height: u64,
    ) -> Result<Option<BlockRecord>, StoreError>;

    /// Number of records written for a (protocol, network) pair.
    async fn count(&self, protocol: &str, network: &str) -> Result<u64, StoreError>;
}

// The record sink is typically the same database that stores positions, so
// the capability forwards through Arc for sharing.
#[async_trait]
impl<T: BlockRecordStore + ?Sized> BlockRecordStore for std::sync::Arc<T> {
    async fn upsert(&self, record: BlockRecord) -> Result<(), StoreError> {
        (**self).upsert(record).await
    }

    async fn get(
        &self,
        protocol: &str,
        network: &str,
        height: u64,
    ) -> Result<Option<BlockRecord>, StoreError> {
        (**self).get(protocol, network, height).await
    }

    async fn count(&self, protocol: &str, network: &str) -> Result<u64, StoreError> {
        (**self).count(protocol, network).await
    }
}
