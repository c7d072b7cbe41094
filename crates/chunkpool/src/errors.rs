//! Error handling and exit codes.

use chunkpool_core::exit_codes;
use chunkpool_core::PoolError;

/// Exit code for a pool error.
pub fn pool_exit_code(err: &PoolError) -> i32 {
    match err {
        PoolError::OversizedRequest { .. } => exit_codes::ERROR_OVERSIZED,
        PoolError::PoolExhausted { .. } => exit_codes::ERROR_EXHAUSTED,
        PoolError::DoubleFreeOrForeignChunk(_) => exit_codes::ERROR_DOUBLE_FREE,
        PoolError::InvalidConfig(_) => exit_codes::ERROR_CONFIG,
        PoolError::Reserve { .. } => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for an application error, looking through any added context.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PoolError>())
        .map_or(exit_codes::ERROR_GENERIC, pool_exit_code)
}
