//! Constant variables.
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_FIX_FINGERS_INTERVAL_MS: u64 = 3000;
