//! Utility functions.

use crate::error::{GenomicSQLiteError, Result};

use std::fs;
use std::path::Path;

//-----------------------------------------------------------------------------

// Utilities for working with files.

const SIZE_UNITS: [(f64, &str); 6] = [
    (1.0, "B"),
    (1024.0, "KiB"),
    (1024.0 * 1024.0, "MiB"),
    (1024.0 * 1024.0 * 1024.0, "GiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0, "PiB"),
];

/// Returns a human-readable representation of the given number of bytes.
pub fn human_readable_size(bytes: usize) -> String {
    let mut unit = 0;
    let value = bytes as f64;
    while unit + 1 < SIZE_UNITS.len() && value >= SIZE_UNITS[unit + 1].0 {
        unit += 1;
    }
    format!("{:.3} {}", value / SIZE_UNITS[unit].0, SIZE_UNITS[unit].1)
}

/// Returns a human-readable size of the file.
pub fn file_size<P: AsRef<Path>>(filename: P) -> Option<String> {
    let metadata = fs::metadata(filename).ok()?;
    Some(human_readable_size(metadata.len() as usize))
}

/// Returns `true` if the file exists.
pub fn file_exists<P: AsRef<Path>>(filename: P) -> bool {
    fs::metadata(filename).is_ok()
}

//-----------------------------------------------------------------------------

/// Single-quotes a string value for interpolation into generated SQL,
/// doubling embedded quotes.
///
/// Quoting is the only sanitisation performed, and it applies to values only;
/// table and schema names are interpolated unquoted everywhere in this crate
/// and must come from a trusted source.
///
/// # Errors
///
/// Fails with `NonPrintable` if the value contains a byte outside the
/// printable ASCII range `[0x20, 0x7E]`.
pub fn sql_quote(value: &str) -> Result<String> {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('\'');
    for c in value.chars() {
        if !(' '..='~').contains(&c) {
            return Err(GenomicSQLiteError::NonPrintable(value.to_string()));
        }
        if c == '\'' {
            result.push_str("''");
        } else {
            result.push(c);
        }
    }
    result.push('\'');
    Ok(result)
}

//-----------------------------------------------------------------------------
