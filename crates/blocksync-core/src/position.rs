//! Position store — the durable cursor for each (protocol, network) pair.
//!
//! The position is the last height whose processing *and* persistence both
//! completed. It is the only state that survives a crash; the engine itself
//! keeps nothing between calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A persisted sync position record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPosition {
    /// Protocol slug (e.g. `"ethereum"`).
    pub protocol: String,
    /// Network slug (e.g. `"mainnet"`).
    pub network: String,
    /// Last height whose processing and persistence both completed.
    pub height: u64,
    /// Unix timestamp of the last save.
    pub updated_at: i64,
}

impl SyncPosition {
    /// Create a record stamped with the current time.
    pub fn new(protocol: impl Into<String>, network: impl Into<String>, height: u64) -> Self {
        Self {
            protocol: protocol.into(),
            network: network.into(),
            height,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Trait for reading and durably writing sync positions.
///
/// Implementations include `MemoryPositions`, `SqlitePositions` and
/// `PostgresPositions` in `blocksync-storage`.
///
/// # Contract
///
/// - `save` must be durable before returning: the engine treats a successful
///   return as a hard guarantee that the value survives a crash.
/// - `load` on a pair with no record returns the store's configured starting
///   height (e.g. a genesis offset). The engine treats whatever comes back
///   as authoritative and never applies a default of its own.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Last confirmed height for a (protocol, network) pair.
    async fn load(&self, protocol: &str, network: &str) -> Result<u64, StoreError>;

    /// Durably record `height` as the new position for the pair.
    async fn save(&self, protocol: &str, network: &str, height: u64) -> Result<(), StoreError>;
}

// A shared store (one database serving several engines) is the common
// deployment, so the capability forwards through Arc.
#[async_trait]
impl<T: PositionStore + ?Sized> PositionStore for std::sync::Arc<T> {
    async fn load(&self, protocol: &str, network: &str) -> Result<u64, StoreError> {
        (**self).load(protocol, network).await
    }

    async fn save(&self, protocol: &str, network: &str, height: u64) -> Result<(), StoreError> {
        (**self).save(protocol, network, height).await
    }
}
