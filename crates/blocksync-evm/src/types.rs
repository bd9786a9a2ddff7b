//! EVM block types as returned by `eth_getBlockByNumber`.

use serde::{Deserialize, Serialize};

/// A block with full transaction objects, as returned by
/// `eth_getBlockByNumber(tag, true)`.
///
/// Quantity fields keep the node's hex encoding; use the `_u64`/`_i64`
/// accessors to decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmBlock {
    pub number: String,
    pub hash: String,
    #[serde(rename = "parentHash")]
    pub parent_hash: String,
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<EvmTransaction>,
}

impl EvmBlock {
    /// Block number as u64.
    pub fn number_u64(&self) -> u64 {
        parse_hex_u64(&self.number)
    }

    /// Block timestamp as seconds since epoch.
    pub fn timestamp_i64(&self) -> i64 {
        parse_hex_u64(&self.timestamp) as i64
    }

    /// Number of transactions in the block.
    pub fn tx_count(&self) -> u32 {
        self.transactions.len() as u32
    }
}

/// A transaction within a fetched block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmTransaction {
    pub hash: String,
    pub from: Option<String>,
    /// `None` for contract-creation transactions.
    pub to: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub value: String,
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_u64_basic() {
        assert_eq!(parse_hex_u64("0x1"), 1);
        assert_eq!(parse_hex_u64("0xff"), 255);
        assert_eq!(parse_hex_u64("1234"), 0x1234);
    }

    #[test]
    fn block_json_decoding() {
        let block: EvmBlock = serde_json::from_value(serde_json::json!({
            "number": "0x112a880",
            "hash": "0xaaa",
            "parentHash": "0xbbb",
            "timestamp": "0x6553f100",
            "transactions": [
                {"hash": "0x1", "from": "0xdead", "to": "0xbeef", "input": "0x", "value": "0x0"},
                {"hash": "0x2", "from": "0xdead", "to": null, "input": "0x6080", "value": "0x0"}
            ]
        }))
        .unwrap();

        assert_eq!(block.number_u64(), 18_000_000);
        assert_eq!(block.timestamp_i64(), 0x6553f100);
        assert_eq!(block.tx_count(), 2);
        assert!(block.transactions[1].to.is_none());
    }

    #[test]
    fn block_without_transactions_field() {
        let block: EvmBlock = serde_json::from_value(serde_json::json!({
            "number": "0x1",
            "hash": "0xaaa",
            "parentHash": "0xbbb",
            "timestamp": "0x0"
        }))
        .unwrap();

        assert_eq!(block.tx_count(), 0);
    }
}
