//! EVM block source — implements the core `BlockSource` capability.

use async_trait::async_trait;
use serde_json::json;

use blocksync_core::{BlockSource, FetchError};

use crate::client::EvmRpcClient;
use crate::types::EvmBlock;

/// Fetches materialized EVM blocks by height over JSON-RPC.
///
/// A `null` result from `eth_getBlockByNumber` means the chain has not
/// produced the height yet (or the node is behind) and maps to
/// [`FetchError::NotAvailable`]; undecodable payloads and number mismatches
/// are hard [`FetchError::InvalidBlock`] errors.
pub struct EvmBlockSource<C> {
    client: C,
}

impl<C: EvmRpcClient> EvmBlockSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: EvmRpcClient> BlockSource for EvmBlockSource<C> {
    type Block = EvmBlock;

    async fn fetch(&self, height: u64) -> Result<EvmBlock, FetchError> {
        let params = json!([format!("0x{height:x}"), true]);
        let result = self.client.call("eth_getBlockByNumber", params).await?;

        if result.is_null() {
            return Err(FetchError::NotAvailable { height });
        }

        let block: EvmBlock =
            serde_json::from_value(result).map_err(|e| FetchError::InvalidBlock {
                height,
                reason: e.to_string(),
            })?;

        if block.number_u64() != height {
            return Err(FetchError::InvalidBlock {
                height,
                reason: format!("node returned block {}", block.number_u64()),
            });
        }

        Ok(block)
    }
}
