//! Deregistration immunity.

/// True while `regblock + immunity_period` is still ahead of `current_block`.
/// A module loses immunity at exactly the boundary block.
pub fn is_immune(regblock: u64, immunity_period: u64, current_block: u64) -> bool {
    u128::from(regblock) + u128::from(immunity_period) > u128::from(current_block)
}
