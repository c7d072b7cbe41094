//! Application configuration from CLI flags and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use chunkpool_core::{PoolError, SizeClass, SizeClassTable};

/// chunkpool — acquire and release chunks from a size-classed memory pool.
#[derive(Parser, Debug)]
#[command(name = "chunkpool", version, about)]
pub struct AppConfig {
    /// Request sizes in bytes, acquired in order.
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "56,1024",
        env = "CHUNKPOOL_SIZES"
    )]
    pub sizes: Vec<usize>,

    /// Size class as CAPACITYxSLOT, e.g. 100x256 (repeatable, ascending).
    #[arg(long = "class", value_name = "CAPACITYxSLOT", value_parser = parse_size_class)]
    pub classes: Vec<SizeClass>,

    /// JSON file holding the size-class table.
    #[arg(long, value_name = "FILE", conflicts_with = "classes")]
    pub config: Option<PathBuf>,

    /// Keep every chunk until all sizes are acquired, then release them.
    #[arg(long)]
    pub hold: bool,

    /// Also print per-class statistics.
    #[arg(short, long)]
    pub details: bool,

    /// Print a JSON snapshot instead of text.
    #[arg(long)]
    pub json: bool,

    /// Write a JSON snapshot to this file.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only the pool-wide report).
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// The size-class table selected by `--config`, `--class`, or the default.
    pub fn size_class_table(&self) -> Result<SizeClassTable> {
        if let Some(path) = &self.config {
            return load_table(path);
        }
        if self.classes.is_empty() {
            return Ok(SizeClassTable::default());
        }
        Ok(SizeClassTable::new(self.classes.clone())?)
    }
}

/// Read a size-class table from a JSON file.
pub fn load_table(path: &Path) -> Result<SizeClassTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let table = serde_json::from_str(&content)
        .map_err(|e| PoolError::InvalidConfig(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded size-class table");
    Ok(table)
}

/// Parse a size class written as `CAPACITYxSLOT`.
fn parse_size_class(s: &str) -> Result<SizeClass, String> {
    let (capacity, slot) = s
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected CAPACITYxSLOT, got {s:?}"))?;
    let capacity = capacity
        .trim()
        .parse()
        .map_err(|e| format!("bad capacity {capacity:?}: {e}"))?;
    let slot_size = slot
        .trim()
        .parse()
        .map_err(|e| format!("bad slot size {slot:?}: {e}"))?;
    Ok(SizeClass::new(capacity, slot_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_size_class_formats() {
        assert_eq!(parse_size_class("100x256"), Ok(SizeClass::new(100, 256)));
        assert_eq!(parse_size_class(" 4X64 "), Ok(SizeClass::new(4, 64)));
        assert!(parse_size_class("100").is_err());
        assert!(parse_size_class("ax256").is_err());
        assert!(parse_size_class("4x").is_err());
    }

    #[test]
    fn defaults() {
        let config = AppConfig::try_parse_from(["chunkpool"]).unwrap();
        assert_eq!(config.sizes, vec![56, 1024]);
        assert_eq!(config.size_class_table().unwrap(), SizeClassTable::default());
    }

    #[test]
    fn classes_from_flags() {
        let config =
            AppConfig::try_parse_from(["chunkpool", "--class", "2x64", "--class", "1x128"])
                .unwrap();
        let table = config.size_class_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.largest_slot_size(), 128);
    }

    #[test]
    fn unordered_classes_rejected() {
        let config =
            AppConfig::try_parse_from(["chunkpool", "--class", "2x128", "--class", "1x64"])
                .unwrap();
        let err = config.size_class_table().unwrap_err();
        assert!(err.downcast_ref::<PoolError>().is_some());
    }

    #[test]
    fn classes_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"classes":[{{"capacity":3,"slot_size":32}},{{"capacity":1,"slot_size":4096}}]}}"#
        )
        .unwrap();
        let table = load_table(file.path()).unwrap();
        assert_eq!(table.classes()[0], SizeClass::new(3, 32));
        assert_eq!(table.largest_slot_size(), 4096);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"classes":[]}}"#).unwrap();
        let err = load_table(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PoolError>(),
            Some(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_conflicts_with_class() {
        assert!(AppConfig::try_parse_from([
            "chunkpool",
            "--config",
            "table.json",
            "--class",
            "1x64"
        ])
        .is_err());
    }
}
