//! Constant variables.

/// Identifiers are stored in `u64`, which bounds the ring width.
pub const MAX_RING_BITS: u8 = 64;
/// Ring width used when a caller does not configure one.
pub const DEFAULT_RING_BITS: u8 = 32;
