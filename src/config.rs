//! Tuning options for compressed databases.
//!
//! Callers supply options as a JSON object; the recognised keys are layered
//! over built-in defaults into the typed [`GenomicSQLiteConfig`] record, so
//! that the hot paths downstream never touch JSON values.

use crate::error::{GenomicSQLiteError, Result};

use serde_json::Value;


//-----------------------------------------------------------------------------

/// Merged tuning options for opening or attaching a compressed database.
///
/// The field names correspond to the JSON keys accepted by
/// [`GenomicSQLiteConfig::from_json`]. See the crate documentation for the
/// effect of each option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicSQLiteConfig {
    /// Disable journalling and locking for a one-shot bulk load.
    pub unsafe_load: bool,
    /// Open the database file read-only and assume it never changes.
    pub immutable: bool,
    /// Page cache budget, applied to both the outer (compressed block) cache
    /// and the inner (logical page) cache.
    pub page_cache_mib: i64,
    /// Worker threads for the compressed storage layer and the SQLite
    /// `threads` pragma; -1 selects `min(8, hardware concurrency)`.
    pub threads: i64,
    /// Force storage-layer prefetch even when small inner pages would
    /// normally disable it.
    pub force_prefetch: bool,
    /// Zstandard compression level for newly written blocks.
    pub zstd_level: i64,
    /// SQLite page size in KiB; a power of two in `1..=64`.
    pub inner_page_kib: i64,
    /// Compressed block size in KiB; a power of two in `1..=64`.
    pub outer_page_kib: i64,
    /// Optional SQLite URI `mode` parameter ("ro", "rw", ...), copied
    /// verbatim; empty means unset.
    pub mode: String,
}

impl Default for GenomicSQLiteConfig {
    fn default() -> Self {
        GenomicSQLiteConfig {
            unsafe_load: false,
            immutable: false,
            page_cache_mib: 1024,
            threads: -1,
            force_prefetch: false,
            zstd_level: 6,
            inner_page_kib: 16,
            outer_page_kib: 32,
            mode: String::new(),
        }
    }
}

impl GenomicSQLiteConfig {
    /// Parses a JSON options document and layers it over the defaults.
    ///
    /// An empty string or an empty object yields the defaults. Unrecognised
    /// keys are ignored so that callers may reuse a larger configuration
    /// document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object, if a recognised
    /// key has the wrong type, or if a page size is not a power of two in
    /// `1..=64` KiB.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config = GenomicSQLiteConfig::default();
        if text.trim().is_empty() {
            return Ok(config);
        }

        let document: Value = serde_json::from_str(text)
            .map_err(|x| GenomicSQLiteError::InvalidConfig(x.to_string()))?;
        let object = document.as_object().ok_or_else(|| {
            GenomicSQLiteError::InvalidConfig(String::from("options document must be a JSON object"))
        })?;

        merge_bool(object, "unsafe_load", &mut config.unsafe_load)?;
        merge_bool(object, "immutable", &mut config.immutable)?;
        merge_int(object, "page_cache_MiB", &mut config.page_cache_mib)?;
        merge_int(object, "threads", &mut config.threads)?;
        merge_bool(object, "force_prefetch", &mut config.force_prefetch)?;
        merge_int(object, "zstd_level", &mut config.zstd_level)?;
        merge_int(object, "inner_page_KiB", &mut config.inner_page_kib)?;
        merge_int(object, "outer_page_KiB", &mut config.outer_page_kib)?;
        merge_string(object, "mode", &mut config.mode)?;

        check_page_size("inner_page_KiB", config.inner_page_kib)?;
        check_page_size("outer_page_KiB", config.outer_page_kib)?;
        Ok(config)
    }

    /// Resolves the `threads` option to a concrete worker count.
    pub fn resolved_threads(&self) -> i64 {
        if self.threads >= 0 {
            self.threads
        } else {
            let parallelism = std::thread::available_parallelism()
                .map(|x| x.get() as i64)
                .unwrap_or(1);
            parallelism.min(8)
        }
    }
}

//-----------------------------------------------------------------------------

/// Renders the built-in defaults as a JSON document.
///
/// This is the value returned by the SQL function
/// `genomicsqlite_default_config_json()`.
pub fn default_config_json() -> String {
    let defaults = GenomicSQLiteConfig::default();
    format!(
        "{{\n    \"unsafe_load\": {},\n    \"immutable\": {},\n    \"page_cache_MiB\": {},\n    \"threads\": {},\n    \"force_prefetch\": {},\n    \"zstd_level\": {},\n    \"inner_page_KiB\": {},\n    \"outer_page_KiB\": {}\n}}",
        defaults.unsafe_load,
        defaults.immutable,
        defaults.page_cache_mib,
        defaults.threads,
        defaults.force_prefetch,
        defaults.zstd_level,
        defaults.inner_page_kib,
        defaults.outer_page_kib
    )
}

//-----------------------------------------------------------------------------

fn merge_bool(
    object: &serde_json::Map<String, Value>,
    key: &str,
    destination: &mut bool,
) -> Result<()> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Bool(value)) => {
            *destination = *value;
            Ok(())
        }
        Some(_) => Err(GenomicSQLiteError::ConfigTypeMismatch {
            option: key.to_string(),
            expected: "boolean",
        }),
    }
}

fn merge_int(
    object: &serde_json::Map<String, Value>,
    key: &str,
    destination: &mut i64,
) -> Result<()> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Number(value)) if value.is_i64() => {
            *destination = value.as_i64().unwrap_or(*destination);
            Ok(())
        }
        Some(_) => Err(GenomicSQLiteError::ConfigTypeMismatch {
            option: key.to_string(),
            expected: "integer",
        }),
    }
}

fn merge_string(
    object: &serde_json::Map<String, Value>,
    key: &str,
    destination: &mut String,
) -> Result<()> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(value)) => {
            *destination = value.clone();
            Ok(())
        }
        Some(_) => Err(GenomicSQLiteError::ConfigTypeMismatch {
            option: key.to_string(),
            expected: "string",
        }),
    }
}

fn check_page_size(key: &str, value: i64) -> Result<()> {
    if (1..=64).contains(&value) && value.count_ones() == 1 {
        Ok(())
    } else {
        Err(GenomicSQLiteError::InvalidConfig(format!(
            "{} must be a power of two in 1..=64, got {}",
            key, value
        )))
    }
}
