//! CLI output formatting.

use std::io::{self, Write};

use chunkpool_core::PoolSnapshot;

/// Format a byte count with a binary unit suffix.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Format a load ratio as a percentage.
#[must_use]
pub fn format_load(load: f64) -> String {
    format!("{:.2}%", load * 100.0)
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Write a pretty-printed JSON snapshot followed by a newline.
///
/// # Errors
///
/// Returns an I/O error if serialization or the write fails.
pub fn write_json(out: &mut dyn Write, snapshot: &PoolSnapshot) -> io::Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

/// Write a JSON snapshot to a file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_to_file(path: &str, snapshot: &PoolSnapshot) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_json(&mut file, snapshot)
}
