//! Constants for the default size-class table and process exit codes.

/// Slot sizes (bytes) of the default size classes, ascending.
pub const DEFAULT_SLOT_SIZES: [usize; 4] = [256, 512, 1024, 2048];

/// Number of chunks in each default size class.
pub const DEFAULT_CLASS_CAPACITY: usize = 100;

/// Exit codes used by the `chunkpool` binary.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// No size class can serve the requested size.
    pub const ERROR_OVERSIZED: i32 = 2;
    /// The selected size class had no available chunk.
    pub const ERROR_EXHAUSTED: i32 = 3;
    /// Invalid size-class configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// A chunk was released twice or to the wrong pool.
    pub const ERROR_DOUBLE_FREE: i32 = 5;
}
