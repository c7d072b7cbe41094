//! Allocation statistics, kept identically at chunk, class and pool scope.

use serde::{Deserialize, Serialize};

/// Running allocation statistics for one scope.
///
/// `alloc_count` and `alloc_bytes` move only on a successful acquire,
/// `free_count` and `free_bytes` only on a release. `avg_load` is the running
/// mean of `requested / slot_size` over every acquire this record has seen
/// and is left untouched by releases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of successful acquires.
    pub alloc_count: u64,
    /// Number of releases.
    pub free_count: u64,
    /// Total bytes requested across acquires.
    pub alloc_bytes: u64,
    /// Total bytes returned across releases.
    pub free_bytes: u64,
    /// Mean load ratio over all acquires.
    pub avg_load: f64,
}

impl Stats {
    /// Create zeroed stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one acquire of `size` bytes with the given load ratio.
    ///
    /// The same `load` is passed to every scope touched by one acquire, so
    /// chunk, class and pool averages all use the granted chunk's slot size.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_alloc(&mut self, size: usize, load: f64) {
        let n = self.alloc_count as f64;
        self.avg_load = (self.avg_load * n + load) / (n + 1.0);
        self.alloc_count += 1;
        self.alloc_bytes += size as u64;
    }

    /// Record one release of `size` bytes.
    pub fn record_free(&mut self, size: usize) {
        self.free_count += 1;
        self.free_bytes += size as u64;
    }

    /// Number of acquires not yet matched by a release.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.alloc_count.saturating_sub(self.free_count)
    }
}

/// Load ratio of a request against the slot that serves it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn load_ratio(requested: usize, slot_size: usize) -> f64 {
    if slot_size == 0 {
        return 0.0;
    }
    requested as f64 / slot_size as f64
}
