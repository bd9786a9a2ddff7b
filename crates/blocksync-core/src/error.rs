//! Error types for the sync pipeline.

use thiserror::Error;

/// Errors raised by a [`crate::PositionStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the query failed.
    #[error("storage backend: {0}")]
    Backend(String),

    /// A record exists but could not be interpreted.
    #[error("corrupt position record for {protocol}/{network}: {reason}")]
    Corrupt {
        protocol: String,
        network: String,
        reason: String,
    },
}

/// Errors raised by a [`crate::BlockSource`] implementation.
///
/// Implementations must distinguish [`FetchError::NotAvailable`] — the chain
/// has not produced the requested height yet (or the node is still catching
/// up) — from hard transport and data errors. The engine never branches on
/// the distinction; schedulers typically poll-wait on `NotAvailable` and
/// alert on the rest.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The block at `height` does not exist yet.
    #[error("block {height} not available yet")]
    NotAvailable { height: u64 },

    /// The source could not be reached.
    #[error("transport: {0}")]
    Transport(String),

    /// The source returned data that could not be decoded into a block.
    #[error("invalid block {height}: {reason}")]
    InvalidBlock { height: u64, reason: String },
}

/// Error raised by a [`crate::BlockAction`] implementation.
///
/// Opaque to the engine; actions attach whatever detail their domain needs.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ActionError {
    reason: String,
}

impl ActionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for ActionError {
    fn from(e: StoreError) -> Self {
        Self::new(e.to_string())
    }
}

/// Outcome of a failed [`crate::Sequential::advance`] call.
///
/// One variant per pipeline stage, carrying the collaborator's error
/// unmodified as the source. The stage tells the caller what the position
/// now reflects:
///
/// | Variant | Position effect |
/// |---|---|
/// | `PositionRead` | none — nothing happened |
/// | `BlockFetch` | none — the same height is fetched next call |
/// | `Process` | unchanged — the same height is reprocessed next call |
/// | `PositionWrite` | unchanged — the action already ran; reprocessing occurs |
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("reading sync position")]
    PositionRead(#[source] StoreError),

    #[error("fetching block {height}")]
    BlockFetch {
        height: u64,
        #[source]
        source: FetchError,
    },

    #[error("processing block {height}")]
    Process {
        height: u64,
        #[source]
        source: ActionError,
    },

    #[error("writing sync position {height}")]
    PositionWrite {
        height: u64,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    /// The height the failed step was working on, if one had been computed.
    pub fn height(&self) -> Option<u64> {
        match self {
            Self::PositionRead(_) => None,
            Self::BlockFetch { height, .. }
            | Self::Process { height, .. }
            | Self::PositionWrite { height, .. } => Some(*height),
        }
    }

    /// Returns `true` if the failure is the block source reporting that the
    /// chain has not produced the requested height yet.
    pub fn is_not_available(&self) -> bool {
        matches!(
            self,
            Self::BlockFetch {
                source: FetchError::NotAvailable { .. },
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_per_stage() {
        let e = SyncError::PositionRead(StoreError::Backend("down".into()));
        assert_eq!(e.height(), None);

        let e = SyncError::Process {
            height: 42,
            source: ActionError::new("boom"),
        };
        assert_eq!(e.height(), Some(42));
    }

    #[test]
    fn not_available_detection() {
        let waiting = SyncError::BlockFetch {
            height: 7,
            source: FetchError::NotAvailable { height: 7 },
        };
        assert!(waiting.is_not_available());

        let hard = SyncError::BlockFetch {
            height: 7,
            source: FetchError::Transport("connection refused".into()),
        };
        assert!(!hard.is_not_available());
    }
}
