//! The pool: one chunk class per size class plus pool-wide statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, ChunkHandle};
use crate::class::ChunkClass;
use crate::error::PoolError;
use crate::size_class::SizeClassTable;
use crate::stats::Stats;

/// Source of process-unique pool ids, used to spot handles from other pools.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Fixed-capacity, size-classed chunk pool.
///
/// Every chunk is allocated up front; classes never grow or shrink. The pool
/// owns all chunk storage, and callers hold a [`ChunkHandle`] while a chunk
/// is in use and give it back through [`Pool::release`].
#[derive(Debug)]
pub struct Pool {
    id: u64,
    table: SizeClassTable,
    classes: Vec<ChunkClass>,
    stats: Stats,
}

impl Pool {
    /// Allocate every chunk described by `table`.
    ///
    /// Fails only if backing storage cannot be reserved, which callers
    /// should treat as fatal.
    pub fn new(table: SizeClassTable) -> Result<Self, PoolError> {
        let classes = table
            .classes()
            .iter()
            .enumerate()
            .map(|(id, &class)| ChunkClass::new(id, class))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            table,
            classes,
            stats: Stats::new(),
        };
        tracing::info!(
            pool = pool.id,
            classes = pool.classes.len(),
            chunks = pool.total_capacity(),
            bytes = pool.reserved_bytes(),
            "chunk pool initialized"
        );
        Ok(pool)
    }

    /// Grant a chunk able to hold `size` bytes.
    ///
    /// The chunk comes from the first class whose slot size is strictly
    /// greater than `size`. On success the class, chunk and pool stats are
    /// updated, in that order, with the same load ratio.
    pub fn acquire(&mut self, size: usize) -> Result<ChunkHandle, PoolError> {
        let Some(class_id) = self.table.select(size) else {
            let largest = self.table.largest_slot_size();
            tracing::warn!(requested = size, largest, "no size class fits request");
            return Err(PoolError::OversizedRequest {
                requested: size,
                largest,
            });
        };

        let class = &mut self.classes[class_id];
        let Some(grant) = class.grant(size) else {
            let slot_size = class.slot_size();
            tracing::warn!(class = class_id, slot_size, "size class exhausted");
            return Err(PoolError::PoolExhausted {
                class_id,
                slot_size,
            });
        };
        self.stats.record_alloc(size, grant.load);

        tracing::debug!(
            requested = size,
            class = class_id,
            slot_size = class.slot_size(),
            chunk = grant.index,
            available = class.available(),
            "chunk granted"
        );

        Ok(ChunkHandle {
            pool_id: self.id,
            class_id,
            index: grant.index,
            generation: grant.generation,
        })
    }

    /// Return a granted chunk to its class.
    ///
    /// Releasing a handle that is not a live grant of this pool (already
    /// released, stale, or from another pool) fails with
    /// [`PoolError::DoubleFreeOrForeignChunk`] and changes nothing.
    pub fn release(&mut self, handle: ChunkHandle) -> Result<(), PoolError> {
        let reclaimed = if handle.pool_id == self.id {
            self.classes
                .get_mut(handle.class_id)
                .and_then(|class| class.reclaim(handle.index, handle.generation))
        } else {
            None
        };

        let Some(size) = reclaimed else {
            tracing::warn!(%handle, "rejected release");
            return Err(PoolError::DoubleFreeOrForeignChunk(handle));
        };
        self.stats.record_free(size);

        tracing::debug!(%handle, size, "chunk released");
        Ok(())
    }

    /// Class that would serve `size`, without granting anything.
    #[must_use]
    pub fn class_for(&self, size: usize) -> Option<&ChunkClass> {
        self.table.select(size).map(|id| &self.classes[id])
    }

    /// The chunk behind `handle`, if the handle is a live grant of this pool.
    #[must_use]
    pub fn chunk(&self, handle: ChunkHandle) -> Option<&Chunk> {
        if handle.pool_id != self.id {
            return None;
        }
        self.classes
            .get(handle.class_id)?
            .chunk(handle.index)
            .filter(|c| c.is_used() && c.generation() == handle.generation)
    }

    /// In-use bytes of the chunk behind `handle`.
    pub fn data(&self, handle: ChunkHandle) -> Result<&[u8], PoolError> {
        self.chunk(handle)
            .map(Chunk::data)
            .ok_or(PoolError::DoubleFreeOrForeignChunk(handle))
    }

    /// Mutable in-use bytes of the chunk behind `handle`.
    pub fn data_mut(&mut self, handle: ChunkHandle) -> Result<&mut [u8], PoolError> {
        if self.chunk(handle).is_none() {
            return Err(PoolError::DoubleFreeOrForeignChunk(handle));
        }
        self.classes
            .get_mut(handle.class_id)
            .and_then(|class| class.chunk_mut(handle.index))
            .map(Chunk::data_mut)
            .ok_or(PoolError::DoubleFreeOrForeignChunk(handle))
    }

    /// Pool-wide statistics.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Class with index `id`.
    #[must_use]
    pub fn class(&self, id: usize) -> Option<&ChunkClass> {
        self.classes.get(id)
    }

    /// All classes, ascending by slot size.
    #[must_use]
    pub fn classes(&self) -> &[ChunkClass] {
        &self.classes
    }

    /// The table the pool was built from.
    #[must_use]
    pub fn table(&self) -> &SizeClassTable {
        &self.table
    }

    /// Chunks ready to be granted, across all classes.
    #[must_use]
    pub fn total_available(&self) -> usize {
        self.classes.iter().map(ChunkClass::available).sum()
    }

    /// Total number of chunks, across all classes.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.classes.iter().map(ChunkClass::capacity).sum()
    }

    /// Bytes of chunk storage owned by the pool.
    #[must_use]
    pub fn reserved_bytes(&self) -> usize {
        self.table.total_bytes()
    }

    /// Whether every class's available stack agrees with its chunk statuses.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.classes.iter().all(ChunkClass::is_consistent)
    }

    /// Serializable copy of the pool and class statistics.
    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            pool: self.stats,
            classes: self
                .classes
                .iter()
                .map(|class| ClassSnapshot {
                    class_id: class.id(),
                    slot_size: class.slot_size(),
                    capacity: class.capacity(),
                    available: class.available(),
                    stats: *class.stats(),
                })
                .collect(),
        }
    }
}

/// Point-in-time view of a pool's statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Pool-wide stats.
    pub pool: Stats,
    /// Per-class views, ascending by slot size.
    pub classes: Vec<ClassSnapshot>,
}

/// Point-in-time view of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    /// Class index.
    pub class_id: usize,
    /// Slot size in bytes.
    pub slot_size: usize,
    /// Number of chunks.
    pub capacity: usize,
    /// Chunks ready to be granted.
    pub available: usize,
    /// Class-wide stats.
    pub stats: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkStatus;
    use crate::size_class::SizeClass;

    fn default_pool() -> Pool {
        Pool::new(SizeClassTable::default()).unwrap()
    }

    fn small_pool() -> Pool {
        Pool::new(SizeClassTable::new(vec![SizeClass::new(2, 64), SizeClass::new(1, 128)]).unwrap())
            .unwrap()
    }

    #[test]
    fn init_all_available() {
        let pool = default_pool();
        assert_eq!(pool.classes().len(), 4);
        assert_eq!(pool.total_capacity(), 400);
        assert_eq!(pool.total_available(), 400);
        assert_eq!(*pool.stats(), Stats::default());
        for class in pool.classes() {
            assert_eq!(*class.stats(), Stats::default());
            assert!(class
                .chunks()
                .iter()
                .all(|c| c.status() == ChunkStatus::Available && c.current_size() == 0));
        }
        assert!(pool.is_consistent());
    }

    #[test]
    fn chunk_buffer_is_slot_sized() {
        let pool = default_pool();
        for class in pool.classes() {
            for chunk in class.chunks() {
                assert_eq!(chunk.buffer().len(), class.slot_size());
            }
        }
    }

    #[test]
    fn acquire_56_uses_256_class() {
        let mut pool = default_pool();
        let handle = pool.acquire(56).unwrap();
        assert_eq!(handle.class_id(), 0);
        let chunk = pool.chunk(handle).unwrap();
        assert_eq!(chunk.slot_size(), 256);
        assert_eq!(chunk.current_size(), 56);
        assert_eq!(chunk.status(), ChunkStatus::Used);
    }

    #[test]
    fn acquire_1024_uses_2048_class() {
        let mut pool = default_pool();
        let handle = pool.acquire(1024).unwrap();
        assert_eq!(pool.chunk(handle).unwrap().slot_size(), 2048);
        assert_eq!(pool.class_for(1024).unwrap().slot_size(), 2048);
    }

    #[test]
    fn boundary_sizes() {
        let mut pool = default_pool();
        assert_eq!(
            pool.acquire(2048),
            Err(PoolError::OversizedRequest {
                requested: 2048,
                largest: 2048
            })
        );
        let handle = pool.acquire(2047).unwrap();
        assert_eq!(pool.chunk(handle).unwrap().slot_size(), 2048);
        assert_eq!(pool.stats().alloc_count, 1);
    }

    #[test]
    fn oversized_changes_nothing() {
        let mut pool = default_pool();
        assert!(pool.acquire(usize::MAX).is_err());
        assert_eq!(*pool.stats(), Stats::default());
        assert_eq!(pool.total_available(), 400);
    }

    #[test]
    fn exhaustion_after_capacity() {
        let mut pool = default_pool();
        let handles: Vec<_> = (0..100).map(|_| pool.acquire(56).unwrap()).collect();
        assert_eq!(handles.len(), 100);
        assert_eq!(
            pool.acquire(56),
            Err(PoolError::PoolExhausted {
                class_id: 0,
                slot_size: 256
            })
        );
        assert_eq!(pool.class(0).unwrap().available(), 0);
        assert_eq!(pool.class(0).unwrap().stats().alloc_count, 100);
        // Other classes are unaffected.
        assert!(pool.acquire(300).is_ok());
        assert!(pool.is_consistent());
    }

    #[test]
    fn single_acquire_load_is_exact_at_every_scope() {
        let mut pool = default_pool();
        let handle = pool.acquire(56).unwrap();
        let expected = 56.0 / 256.0;
        assert_eq!(pool.chunk(handle).unwrap().stats().avg_load, expected);
        assert_eq!(pool.class(0).unwrap().stats().avg_load, expected);
        assert_eq!(pool.stats().avg_load, expected);
    }

    #[test]
    fn pool_load_uses_granted_slot_size() {
        let mut pool = default_pool();
        let _a = pool.acquire(128).unwrap();
        let _b = pool.acquire(1024).unwrap();
        assert!((pool.stats().avg_load - 0.5).abs() < 1e-12);
        assert_eq!(pool.stats().alloc_bytes, 1152);
    }

    #[test]
    fn acquire_release_restores_state() {
        let mut pool = default_pool();
        let handle = pool.acquire(100).unwrap();
        pool.release(handle).unwrap();

        let class = pool.class(0).unwrap();
        assert_eq!(class.available(), 100);
        let chunk = class.chunk(handle.index()).unwrap();
        assert_eq!(chunk.status(), ChunkStatus::Available);
        assert_eq!(chunk.current_size(), 0);
        assert_eq!(chunk.stats().alloc_count, 1);
        assert_eq!(chunk.stats().free_count, 1);
        assert_eq!(chunk.stats().free_bytes, 100);
        assert_eq!(class.stats().free_bytes, 100);
        assert_eq!(pool.stats().free_count, 1);
        assert!(pool.chunk(handle).is_none());
    }

    #[test]
    fn double_release_rejected_without_side_effects() {
        let mut pool = default_pool();
        let handle = pool.acquire(56).unwrap();
        pool.release(handle).unwrap();

        let before = pool.snapshot();
        assert_eq!(
            pool.release(handle),
            Err(PoolError::DoubleFreeOrForeignChunk(handle))
        );
        assert_eq!(pool.snapshot(), before);
        assert_eq!(pool.class(0).unwrap().available(), 100);
        assert!(pool.is_consistent());
    }

    #[test]
    fn stale_handle_rejected_after_regrant() {
        let mut pool = small_pool();
        let first = pool.acquire(10).unwrap();
        pool.release(first).unwrap();
        let second = pool.acquire(20).unwrap();
        assert_eq!(first.index(), second.index());
        assert!(pool.release(first).is_err());
        assert_eq!(pool.chunk(second).unwrap().current_size(), 20);
        assert!(pool.release(second).is_ok());
    }

    #[test]
    fn foreign_handle_rejected() {
        let mut a = small_pool();
        let mut b = small_pool();
        let handle = a.acquire(10).unwrap();
        let _other = b.acquire(10).unwrap();
        assert!(matches!(
            b.release(handle),
            Err(PoolError::DoubleFreeOrForeignChunk(_))
        ));
        assert!(b.chunk(handle).is_none());
        assert_eq!(b.stats().free_count, 0);
        assert!(a.release(handle).is_ok());
    }

    #[test]
    fn data_access() {
        let mut pool = small_pool();
        let handle = pool.acquire(5).unwrap();
        pool.data_mut(handle).unwrap().copy_from_slice(b"hello");
        assert_eq!(pool.data(handle).unwrap(), b"hello");
        pool.release(handle).unwrap();
        assert!(pool.data(handle).is_err());
        assert!(pool.data_mut(handle).is_err());
    }

    #[test]
    fn end_to_end_demo_sequence() {
        let mut pool = default_pool();
        let chunk = pool.acquire(56).unwrap();
        pool.release(chunk).unwrap();
        let chunk = pool.acquire(1024).unwrap();
        pool.release(chunk).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.alloc_count, 2);
        assert_eq!(stats.free_count, 2);
        assert_eq!(stats.alloc_bytes, 56 + 1024);
        assert_eq!(stats.free_bytes, 56 + 1024);
        let expected = (56.0 / 256.0 + 1024.0 / 2048.0) / 2.0;
        assert!((stats.avg_load - expected).abs() < 1e-12);
    }

    #[test]
    fn snapshot_serializes() {
        let mut pool = small_pool();
        let _h = pool.acquire(32).unwrap();
        let snapshot = pool.snapshot();
        assert_eq!(snapshot.classes.len(), 2);
        assert_eq!(snapshot.classes[0].available, 1);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: PoolSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn unreservable_storage_is_fatal() {
        let table = SizeClassTable::new(vec![SizeClass::new(1, usize::MAX)]).unwrap();
        assert_eq!(
            Pool::new(table).unwrap_err(),
            PoolError::Reserve {
                class_id: 0,
                bytes: usize::MAX
            }
        );
    }

    #[test]
    fn later_class_reserve_failure_names_that_class() {
        let table = SizeClassTable::new(vec![
            SizeClass::new(2, 64),
            SizeClass::new(2, usize::MAX),
        ])
        .unwrap();
        assert!(matches!(
            Pool::new(table),
            Err(PoolError::Reserve { class_id: 1, .. })
        ));
    }

    #[test]
    fn pools_get_distinct_ids() {
        let mut a = small_pool();
        let mut b = small_pool();
        let ha = a.acquire(1).unwrap();
        let hb = b.acquire(1).unwrap();
        assert_ne!(ha, hb);
    }
}
