//! Error types for pool operations.

use crate::chunk::ChunkHandle;

/// Errors returned by pool construction, acquisition and release.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No size class has a slot size strictly greater than the request.
    #[error("requested {requested} bytes, but the largest slot size is {largest} bytes")]
    OversizedRequest {
        /// Requested size in bytes.
        requested: usize,
        /// Slot size of the largest configured class.
        largest: usize,
    },

    /// The selected class has no available chunk left.
    #[error("size class {class_id} ({slot_size} bytes) has no available chunk")]
    PoolExhausted {
        /// Index of the exhausted class.
        class_id: usize,
        /// Slot size of the exhausted class.
        slot_size: usize,
    },

    /// The handle does not refer to a chunk currently in use in this pool.
    #[error("chunk {0} is not in use in this pool (double free or foreign chunk)")]
    DoubleFreeOrForeignChunk(ChunkHandle),

    /// The size-class table is malformed.
    #[error("invalid size-class configuration: {0}")]
    InvalidConfig(String),

    /// Backing storage for a class could not be reserved.
    #[error("failed to reserve {bytes} bytes for size class {class_id}")]
    Reserve {
        /// Index of the class being initialized.
        class_id: usize,
        /// Number of bytes that could not be reserved.
        bytes: usize,
    },
}
