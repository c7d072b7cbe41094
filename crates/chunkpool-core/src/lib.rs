//! # chunkpool-core
//!
//! Fixed-capacity memory pool built from preallocated chunks grouped into
//! size classes. Requests are served from the smallest class whose slot size
//! is strictly greater than the requested size, and every grant and release
//! is accounted at chunk, class and pool scope.
//!
//! ```
//! use chunkpool_core::{Pool, SizeClassTable};
//!
//! let mut pool = Pool::new(SizeClassTable::default()).unwrap();
//! let handle = pool.acquire(56).unwrap();
//! assert_eq!(pool.chunk(handle).unwrap().slot_size(), 256);
//! pool.release(handle).unwrap();
//! assert_eq!(pool.stats().alloc_count, 1);
//! assert_eq!(pool.stats().free_count, 1);
//! ```
#![warn(missing_docs)]

pub mod chunk;
pub mod class;
pub mod constants;
pub mod error;
pub mod pool;
pub mod report;
pub mod size_class;
pub mod stack;
pub mod stats;

// Re-exports
pub use chunk::{Chunk, ChunkHandle, ChunkStatus};
pub use class::ChunkClass;
pub use constants::exit_codes;
pub use error::PoolError;
pub use pool::{ClassSnapshot, Pool, PoolSnapshot};
pub use report::report;
pub use size_class::{SizeClass, SizeClassTable};
pub use stack::BoundedStack;
pub use stats::Stats;
