//! Block source — height-indexed lookup of materialized blocks.

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait for fetching the block at a given height.
///
/// The block type is source-defined and opaque to the engine, which holds it
/// only long enough to hand it to the processing action. Transport (RPC,
/// file, cache) is entirely the implementation's business; so are any
/// transport-level retries. See [`FetchError`] for the availability
/// distinction implementations must make.
#[async_trait]
pub trait BlockSource: Send + Sync {
    type Block: Send + 'static;

    /// Fetch the block at `height`.
    async fn fetch(&self, height: u64) -> Result<Self::Block, FetchError>;
}
