//! Protocol constants.

/// Default mempool capacity in bytes.
pub const DEFAULT_POOL_CAPACITY: u64 = 5_000_000;

/// Default maximum block size in bytes.
pub const DEFAULT_MAX_BLOCK_SIZE: u64 = 1_000_000;
