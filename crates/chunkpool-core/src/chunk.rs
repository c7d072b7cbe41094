//! A single fixed-size chunk and the handle callers hold while it is in use.

use std::fmt;

use crate::stats::Stats;

/// Whether a chunk is free or handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// On its class's available stack.
    Available,
    /// Granted to a caller.
    Used,
}

/// Token for a granted chunk.
///
/// Handles are plain values: copying one does not grant a second chunk.
/// The generation changes on every grant, so a handle kept after its chunk
/// was released (and possibly granted again) no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkHandle {
    pub(crate) pool_id: u64,
    pub(crate) class_id: usize,
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl ChunkHandle {
    /// Index of the size class the chunk belongs to.
    #[must_use]
    pub fn class_id(&self) -> usize {
        self.class_id
    }

    /// Position of the chunk within its class.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Grant number this handle was issued for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for ChunkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}/{}:{} (gen {})",
            self.pool_id, self.class_id, self.index, self.generation
        )
    }
}

/// One buffer slot of a size class.
///
/// `buffer`, `slot_size` and `class_id` are fixed at creation; status,
/// current size and stats change with every acquire/release cycle.
/// `current_size` is zero exactly when the chunk is available.
#[derive(Debug)]
pub struct Chunk {
    buffer: Box<[u8]>,
    current_size: usize,
    stats: Stats,
    status: ChunkStatus,
    class_id: usize,
    generation: u64,
}

impl Chunk {
    pub(crate) fn new(buffer: Box<[u8]>, class_id: usize) -> Self {
        Self {
            buffer,
            current_size: 0,
            stats: Stats::new(),
            status: ChunkStatus::Available,
            class_id,
            generation: 0,
        }
    }

    /// Mark the chunk used for `size` bytes and record the grant.
    pub(crate) fn grant(&mut self, size: usize, load: f64) {
        self.current_size = size;
        self.status = ChunkStatus::Used;
        self.generation += 1;
        self.stats.record_alloc(size, load);
    }

    /// Record the release and mark the chunk available again.
    /// Returns the size that was in use.
    pub(crate) fn reclaim(&mut self) -> usize {
        let size = self.current_size;
        self.stats.record_free(size);
        self.status = ChunkStatus::Available;
        self.current_size = 0;
        size
    }

    /// Maximum number of bytes the chunk can serve.
    #[must_use]
    pub fn slot_size(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently in use; zero when available.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ChunkStatus {
        self.status
    }

    /// Whether the chunk is granted to a caller.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.status == ChunkStatus::Used
    }

    /// Owning class index.
    #[must_use]
    pub fn class_id(&self) -> usize {
        self.class_id
    }

    /// Number of times this chunk has been granted.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Statistics for this chunk alone.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Whole backing buffer, `slot_size` bytes long.
    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The `current_size` bytes in use.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.current_size]
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..self.current_size]
    }
}
