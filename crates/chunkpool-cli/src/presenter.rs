//! Presenters for pool statistics.

use std::io::{self, Write};

use chunkpool_core::{report, ChunkHandle, Pool};

use crate::output::{format_bytes, format_load, format_number, write_json};
use crate::ui;

/// Presents the outcome of a demonstration run.
pub trait StatsPresenter {
    /// Report one successful acquire.
    fn present_acquire(
        &self,
        out: &mut dyn Write,
        pool: &Pool,
        size: usize,
        handle: ChunkHandle,
    ) -> io::Result<()>;

    /// Report the final pool state.
    fn present_pool(&self, out: &mut dyn Write, pool: &Pool, details: bool) -> io::Result<()>;
}

/// Human-readable text presenter.
pub struct TextPresenter {
    verbose: bool,
    quiet: bool,
}

impl TextPresenter {
    /// Create a text presenter; `quiet` wins over `verbose`.
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl StatsPresenter for TextPresenter {
    fn present_acquire(
        &self,
        out: &mut dyn Write,
        pool: &Pool,
        size: usize,
        handle: ChunkHandle,
    ) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        let slot = pool.chunk(handle).map_or(0, |c| c.slot_size());
        writeln!(
            out,
            "acquired {size} bytes from the {slot}-byte class (chunk {})",
            handle.index()
        )
    }

    fn present_pool(&self, out: &mut dyn Write, pool: &Pool, details: bool) -> io::Result<()> {
        if self.quiet {
            return write!(out, "{}", report(pool.stats()));
        }

        writeln!(out, "{}", ui::header("Pool"))?;
        write!(out, "{}", report(pool.stats()))?;

        if details {
            for class in pool.classes() {
                writeln!(
                    out,
                    "{}",
                    ui::header(&format!("Class {} ({} bytes)", class.id(), class.slot_size()))
                )?;
                writeln!(
                    out,
                    "Chunks      : {}/{} available",
                    format_number(class.available() as u64),
                    format_number(class.capacity() as u64)
                )?;
                write!(out, "{}", report(class.stats()))?;
            }
        }

        if self.verbose {
            writeln!(
                out,
                "Reserved    : {}",
                format_bytes(pool.reserved_bytes() as u64)
            )?;
            writeln!(out, "Mean load   : {}", format_load(pool.stats().avg_load))?;
        }
        Ok(())
    }
}

/// JSON snapshot presenter.
pub struct JsonPresenter;

impl StatsPresenter for JsonPresenter {
    fn present_acquire(
        &self,
        _out: &mut dyn Write,
        _pool: &Pool,
        _size: usize,
        _handle: ChunkHandle,
    ) -> io::Result<()> {
        Ok(())
    }

    fn present_pool(&self, out: &mut dyn Write, pool: &Pool, _details: bool) -> io::Result<()> {
        write_json(out, &pool.snapshot())
    }
}
