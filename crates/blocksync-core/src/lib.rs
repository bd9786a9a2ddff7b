//! blocksync-core — foundation for the sequential per-chain sync engine.
//!
//! # Architecture
//!
//! ```text
//! Sequential (one per protocol/network pair)
//!     ├── PositionStore  (durable cursor: last confirmed height)
//!     ├── BlockSource    (height → materialized block)
//!     └── BlockAction    (domain side effects per block)
//! ```
//!
//! Each [`Sequential::advance`] call performs exactly one forward step:
//! load position → fetch block at position + 1 → run the action → persist
//! the new position. Failures surface verbatim; the position only moves
//! after the action has succeeded, so every height reaches the action
//! at least once and none is ever skipped.

pub mod action;
pub mod engine;
pub mod error;
pub mod position;
pub mod source;

pub use action::BlockAction;
pub use engine::Sequential;
pub use error::{ActionError, FetchError, StoreError, SyncError};
pub use position::{PositionStore, SyncPosition};
pub use source::BlockSource;
