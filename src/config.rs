//! Compile-time sweep settings. Edit and rebuild to change what the binary measures.

/// Smallest region measured, in bytes
pub const MIN_SIZE: usize = 1024 * 1024 * 1024;

/// Largest region measured, in bytes
pub const MAX_SIZE: usize = 1024 * 1024 * 1024;

/// log2 of the number of samples taken per doubling of the region size
pub const GRANULARITY: u32 = 1;

/// Workers per round, pinned to cores `0..NUM_CPUS`
pub const NUM_CPUS: usize = 2;
