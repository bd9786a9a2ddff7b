//! The sequential sync engine — one forward step per call.
//!
//! # Crash consistency
//!
//! The position is persisted strictly *after* the action has run, so a
//! failure anywhere leaves the stored cursor at the last fully completed
//! height. The four failure points and their effects:
//!
//! - position read fails → nothing happened
//! - block fetch fails → nothing happened; same height next call
//! - action fails → position unchanged; same height refetched next call
//! - position write fails → action effects exist but the cursor does not
//!   move; the next call refetches and reprocesses the same height
//!
//! This yields at-least-once delivery of every height to the action with no
//! skips. The engine performs no retries, no backoff and no locking; when
//! and how often to call [`Sequential::advance`] — and keeping at most one
//! call in flight per pair — is the scheduler's job.

use crate::action::BlockAction;
use crate::error::SyncError;
use crate::position::PositionStore;
use crate::source::BlockSource;

/// Advances one (protocol, network) pair through its chain, one block at a
/// time.
///
/// The pair identity and the three collaborators are fixed at construction;
/// one instance handles exactly one pair. Cancellation follows ordinary
/// future semantics: dropping the `advance` future aborts the outstanding
/// collaborator call and no later stage runs.
pub struct Sequential<S, C, A> {
    protocol: String,
    network: String,
    positions: S,
    source: C,
    action: A,
}

impl<S, C, A> Sequential<S, C, A>
where
    S: PositionStore,
    C: BlockSource,
    A: BlockAction<Block = C::Block>,
{
    pub fn new(
        protocol: impl Into<String>,
        network: impl Into<String>,
        positions: S,
        source: C,
        action: A,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            network: network.into(),
            positions,
            source,
            action,
        }
    }

    /// The protocol slug this engine is bound to.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The network slug this engine is bound to.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Perform one forward step and return the height advanced to.
    ///
    /// Load position `p` → fetch block `p + 1` → run the action → persist
    /// `p + 1`. Every failure is surfaced verbatim as a [`SyncError`]
    /// identifying the stage; no partial commit, no internal recovery.
    pub async fn advance(&self) -> Result<u64, SyncError> {
        let current = self
            .positions
            .load(&self.protocol, &self.network)
            .await
            .map_err(SyncError::PositionRead)?;

        let next = current + 1;

        let block = self
            .source
            .fetch(next)
            .await
            .map_err(|source| SyncError::BlockFetch {
                height: next,
                source,
            })?;

        self.action
            .run(&self.protocol, &self.network, block)
            .await
            .map_err(|source| SyncError::Process {
                height: next,
                source,
            })?;

        self.positions
            .save(&self.protocol, &self.network, next)
            .await
            .map_err(|source| SyncError::PositionWrite {
                height: next,
                source,
            })?;

        tracing::debug!(
            protocol = %self.protocol,
            network = %self.network,
            height = next,
            "advanced sync position"
        );

        Ok(next)
    }
}
