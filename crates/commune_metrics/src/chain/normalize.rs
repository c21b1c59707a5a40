//! Normalization of node-reported scalars.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid block number: {0}")]
    InvalidBlockNumber(String),
}

/// Parse a block number as reported in a header: `0x`-prefixed hex, or decimal.
pub fn parse_block_number(s: &str) -> Result<u64, NormalizeError> {
    let t = s.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16),
        Some(_) => return Err(NormalizeError::InvalidBlockNumber(s.to_string())),
        None => t.parse::<u64>(),
    };
    parsed.map_err(|_| NormalizeError::InvalidBlockNumber(s.to_string()))
}
