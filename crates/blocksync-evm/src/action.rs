//! Block-recording action — the bundled `BlockAction` implementation.

use async_trait::async_trait;

use blocksync_core::{ActionError, BlockAction};
use blocksync_storage::records::{BlockRecord, BlockRecordStore};

use crate::types::EvmBlock;

/// Records a summary row per processed block.
///
/// The row is keyed by (protocol, network, height) and written with an
/// upsert, so reprocessing a height after a partial failure replaces the
/// existing row instead of duplicating it — the idempotency the engine
/// requires of its action.
pub struct RecordBlocks<R> {
    records: R,
}

impl<R: BlockRecordStore> RecordBlocks<R> {
    pub fn new(records: R) -> Self {
        Self { records }
    }
}

#[async_trait]
impl<R: BlockRecordStore> BlockAction for RecordBlocks<R> {
    type Block = EvmBlock;

    async fn run(&self, protocol: &str, network: &str, block: EvmBlock) -> Result<(), ActionError> {
        let height = block.number_u64();
        let record = BlockRecord {
            protocol: protocol.to_string(),
            network: network.to_string(),
            height,
            hash: block.hash.clone(),
            parent_hash: block.parent_hash.clone(),
            timestamp: block.timestamp_i64(),
            tx_count: block.tx_count(),
            recorded_at: chrono::Utc::now().timestamp(),
        };

        self.records.upsert(record).await?;

        tracing::debug!(protocol, network, height, "block recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocksync_storage::MemoryStorage;
    use std::sync::Arc;

    fn block(height: u64) -> EvmBlock {
        serde_json::from_value(serde_json::json!({
            "number": format!("0x{height:x}"),
            "hash": format!("0x{height:064x}"),
            "parentHash": format!("0x{:064x}", height - 1),
            "timestamp": "0x6553f100",
            "transactions": [
                {"hash": "0xt1", "from": "0xdead", "to": "0xbeef", "input": "0x", "value": "0x0"},
                {"hash": "0xt2", "from": "0xdead", "to": "0xbeef", "input": "0x", "value": "0x0"}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn records_block_summary() {
        let storage = Arc::new(MemoryStorage::new());
        let action = RecordBlocks::new(storage.clone());

        action.run("ethereum", "mainnet", block(100)).await.unwrap();

        let rec = storage.get("ethereum", "mainnet", 100).await.unwrap().unwrap();
        assert_eq!(rec.height, 100);
        assert_eq!(rec.tx_count, 2);
    }

    #[tokio::test]
    async fn reprocessing_a_height_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let action = RecordBlocks::new(storage.clone());

        action.run("ethereum", "mainnet", block(100)).await.unwrap();
        action.run("ethereum", "mainnet", block(100)).await.unwrap();

        assert_eq!(storage.count("ethereum", "mainnet").await.unwrap(), 1);
    }
}
