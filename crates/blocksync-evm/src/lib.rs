//! blocksync-evm — EVM collaborators for the Blocksync engine.
//!
//! Provides the two EVM-flavored capability implementations the engine
//! composes:
//!
//! - [`EvmBlockSource`] — fetches materialized blocks over JSON-RPC
//!   (`eth_getBlockByNumber`), through a pluggable [`EvmRpcClient`]
//!   transport ([`HttpRpcClient`] for production, scripted clients in
//!   tests).
//! - [`RecordBlocks`] — a processing action that upserts one summary
//!   record per block into any `BlockRecordStore`.
//!
//! The transport is deliberately single-shot: pacing and retry policy
//! belong to whatever schedules the engine, never to this layer.

pub mod action;
pub mod client;
pub mod source;
pub mod types;

pub use action::RecordBlocks;
pub use client::{EvmRpcClient, HttpRpcClient};
pub use source::EvmBlockSource;
pub use types::{parse_hex_u64, EvmBlock, EvmTransaction};
