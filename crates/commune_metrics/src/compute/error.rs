//! Faults raised by the derivation layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    #[error("invalid fee: {name} = {value}% (expected 0..=100)")]
    InvalidFee { name: &'static str, value: u16 },
    #[error("invalid fee: combined fees {0}% exceed 100%")]
    CombinedFee(u32),
    /// APR has no meaning when nothing is staked. Distinct from a 0% return.
    #[error("apr undefined: total stake is zero")]
    NoStake,
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("invalid display amount: {0}")]
    InvalidAmount(String),
    #[error("field `{0}` is derived and cannot be excluded")]
    ReservedField(String),
}

impl DeriveError {
    /// True for degenerate computations (result undefined), false for rejected input.
    pub fn is_undefined(&self) -> bool {
        matches!(self, DeriveError::NoStake)
    }
}
