//! Plain-text rendering of a [`Stats`] record.

use std::fmt;

use crate::stats::Stats;

/// Render the five fields of `stats`, one labelled line each.
#[must_use]
pub fn report(stats: &Stats) -> String {
    stats.to_string()
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ALLOC NB    : {}", self.alloc_count)?;
        writeln!(f, "FREE NB     : {}", self.free_count)?;
        writeln!(f, "ALLOC SIZE  : {}", self.alloc_bytes)?;
        writeln!(f, "FREE SIZE   : {}", self.free_bytes)?;
        writeln!(f, "AVG LOAD    : {:.6}", self.avg_load)
    }
}
