//! blocksync-storage — pluggable storage backends for Blocksync.
//!
//! Backends:
//! - [`memory`] — in-memory (dev/testing, no persistence)
//! - [`sqlite`] — SQLite via `sqlx` (embedded, single-file persistence)
//! - [`postgres`] — PostgreSQL via `sqlx` (shared production deployments)
//!
//! Every backend implements the core [`blocksync_core::PositionStore`]
//! capability plus [`records::BlockRecordStore`], the sink used by the
//! bundled block-recording action.

pub mod records;

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStorage;
pub use records::{BlockRecord, BlockRecordStore};
