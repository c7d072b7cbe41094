//! A size class: its fixed chunk array, available stack and class-wide stats.

use crate::chunk::Chunk;
use crate::error::PoolError;
use crate::size_class::SizeClass;
use crate::stack::BoundedStack;
use crate::stats::{load_ratio, Stats};

/// Outcome of granting one chunk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Grant {
    pub(crate) index: usize,
    pub(crate) generation: u64,
    pub(crate) load: f64,
}

/// All chunks of one slot size.
///
/// The indices on `available` are exactly the chunks whose status is
/// available, so `available() + in_use() == capacity()` at all times.
#[derive(Debug)]
pub struct ChunkClass {
    id: usize,
    slot_size: usize,
    chunks: Vec<Chunk>,
    available: BoundedStack<usize>,
    stats: Stats,
}

impl ChunkClass {
    /// Allocate `class.capacity` chunks of `class.slot_size` bytes each and
    /// put every one of them on the available stack.
    pub(crate) fn new(id: usize, class: SizeClass) -> Result<Self, PoolError> {
        let reserve_err = || PoolError::Reserve {
            class_id: id,
            bytes: class.total_bytes(),
        };

        let mut chunks = Vec::new();
        chunks
            .try_reserve_exact(class.capacity)
            .map_err(|_| reserve_err())?;
        let mut available =
            BoundedStack::try_with_capacity(class.capacity).map_err(|_| reserve_err())?;

        for index in 0..class.capacity {
            let mut buffer = Vec::new();
            buffer
                .try_reserve_exact(class.slot_size)
                .map_err(|_| reserve_err())?;
            buffer.resize(class.slot_size, 0u8);
            chunks.push(Chunk::new(buffer.into_boxed_slice(), id));
            available.push(index).map_err(|_| reserve_err())?;
        }

        Ok(Self {
            id,
            slot_size: class.slot_size,
            chunks,
            available,
            stats: Stats::new(),
        })
    }

    /// Pop an available chunk and grant it for `size` bytes, recording the
    /// grant in the class stats first and the chunk stats second.
    ///
    /// Returns `None` when every chunk is in use.
    pub(crate) fn grant(&mut self, size: usize) -> Option<Grant> {
        let index = self.available.pop()?;
        let load = load_ratio(size, self.slot_size);
        let chunk = &mut self.chunks[index];
        self.stats.record_alloc(size, load);
        chunk.grant(size, load);
        Some(Grant {
            index,
            generation: chunk.generation(),
            load,
        })
    }

    /// Reclaim the chunk at `index` if it is in use under `generation`,
    /// recording the release in the class stats and then the chunk stats,
    /// and push it back on the available stack.
    ///
    /// Returns the size that was in use, or `None` if the chunk is not a
    /// live grant matching `generation`.
    pub(crate) fn reclaim(&mut self, index: usize, generation: u64) -> Option<usize> {
        let chunk = self.chunks.get_mut(index)?;
        if !chunk.is_used() || chunk.generation() != generation {
            return None;
        }
        self.stats.record_free(chunk.current_size());
        let size = chunk.reclaim();
        // Only indices that just went from used to available come back here,
        // so the stack always has room.
        let pushed = self.available.push(index);
        debug_assert!(pushed.is_ok(), "available stack overflow in class {}", self.id);
        Some(size)
    }

    pub(crate) fn chunk_mut(&mut self, index: usize) -> Option<&mut Chunk> {
        self.chunks.get_mut(index)
    }

    /// Index of this class in the pool.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Bytes each chunk in this class can hold.
    #[must_use]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Fixed number of chunks.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks ready to be granted.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Number of chunks currently granted.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.capacity() - self.available()
    }

    /// Class-wide statistics.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Chunk at `index`.
    #[must_use]
    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// All chunks, in index order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Whether the available stack and chunk statuses agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let used = self.chunks.iter().filter(|c| c.is_used()).count();
        used + self.available.len() == self.capacity()
            && self
                .available
                .iter()
                .all(|&i| self.chunks.get(i).is_some_and(|c| !c.is_used()))
    }
}
