//! Processing action — the domain side effects applied to each block.

use async_trait::async_trait;

use crate::error::ActionError;

/// Trait for the per-block processing action.
///
/// The engine delivers every height at least once and never skips one, but
/// a height can be delivered again after a partial failure (a crash or a
/// failed position write after the action succeeded). Implementations must
/// therefore be safe to invoke more than once for the same
/// (protocol, network, height) — e.g. by writing keyed upserts rather than
/// blind inserts. End-to-end exactly-once *effect* exists only when this
/// holds; the engine cannot enforce it.
#[async_trait]
pub trait BlockAction: Send + Sync {
    type Block: Send + 'static;

    /// Apply all domain side effects for `block`.
    async fn run(
        &self,
        protocol: &str,
        network: &str,
        block: Self::Block,
    ) -> Result<(), ActionError>;
}
