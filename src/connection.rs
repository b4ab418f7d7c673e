//! Opening, attaching, and tuning compressed databases.
//!
//! A compressed database is an ordinary SQLite database stored through the
//! stacked `zstd` VFS, which maps logical pages onto compressed blocks. This
//! module composes the file URI that selects the VFS and its parameters, the
//! PRAGMA script that tunes the inner database, and the `ATTACH` /
//! `VACUUM INTO` statements for working with additional compressed files.
//! The VFS itself is an external component; everything here only configures
//! it.

use crate::config::GenomicSQLiteConfig;
use crate::error::{GenomicSQLiteError, Result};
use crate::functions;
use crate::utils;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use rusqlite::{Connection, OpenFlags};


//-----------------------------------------------------------------------------

/// Minimum SQLite version; generated columns require 3.31.0.
const MIN_SQLITE_VERSION_NUMBER: i32 = 3_031_000;
const MIN_SQLITE_VERSION: &str = "3.31.0";

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// One-shot process-wide bootstrap.
///
/// Verifies that the linked SQLite library is recent enough for generated
/// columns, and that the version observed through a live connection matches
/// the library the extension was compiled against (a mismatch means the
/// process has linked two copies of SQLite). Idempotent; [`open`] calls this
/// implicitly.
///
/// # Errors
///
/// `HostTooOld` or `InconsistentLinkage` as described above; passes through
/// database errors from the probe connection.
pub fn init() -> Result<()> {
    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }

    if rusqlite::version_number() < MIN_SQLITE_VERSION_NUMBER {
        return Err(GenomicSQLiteError::HostTooOld {
            found: rusqlite::version().to_string(),
            required: MIN_SQLITE_VERSION,
        });
    }

    // The version reported by a statement must agree with the linked library;
    // otherwise two distinct SQLite copies are loaded in this process.
    let probe = Connection::open_in_memory()
        .map_err(|x| GenomicSQLiteError::ExtensionLoadFailed(x.to_string()))?;
    let reported: String = probe
        .query_row("SELECT sqlite_version()", [], |row| row.get(0))
        .map_err(|x| GenomicSQLiteError::ExtensionLoadFailed(x.to_string()))?;
    if reported != rusqlite::version() {
        return Err(GenomicSQLiteError::InconsistentLinkage {
            compiled: rusqlite::version().to_string(),
            loaded: reported,
        });
    }

    INITIALIZED.store(true, Ordering::Release);
    Ok(())
}

//-----------------------------------------------------------------------------

// Percent-escape a path for use inside a file: URI. Unreserved characters and
// path separators pass through.
fn escape_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                result.push(byte as char);
            }
            _ => {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}

/// Composes the `file:` URI that opens `dbfile` through the compressed VFS
/// with the given configuration.
///
/// # Examples
///
/// ```
/// use genomicsqlite::GenomicSQLiteConfig;
///
/// let config = GenomicSQLiteConfig::default();
/// let uri = genomicsqlite::uri("/tmp/example.db", &config);
/// assert!(uri.starts_with("file:/tmp/example.db?vfs=zstd"));
/// assert!(uri.contains("&outer_page_size=32768"));
/// ```
pub fn uri(dbfile: &str, config: &GenomicSQLiteConfig) -> String {
    let mut result = format!("file:{}?vfs=zstd", escape_path(dbfile));
    result.push_str(&format!(
        "&outer_cache_size={}",
        -64 * config.page_cache_mib
    ));
    result.push_str(&format!("&threads={}", config.threads));
    if !config.mode.is_empty() {
        result.push_str(&format!("&mode={}", config.mode));
    }
    result.push_str(&format!(
        "&outer_page_size={}",
        config.outer_page_kib * 1024
    ));
    result.push_str(&format!("&level={}", config.zstd_level));
    if config.immutable {
        result.push_str("&immutable=1");
    }
    if config.unsafe_load {
        result.push_str("&nolock=1&outer_unsafe");
    }
    // Prefetch is usually counterproductive with small inner pages.
    if config.threads > 1 && config.inner_page_kib < 16 && !config.force_prefetch {
        result.push_str("&noprefetch=1");
    }
    result
}

//-----------------------------------------------------------------------------

/// Produces the PRAGMA script tuning a connection (or an attached schema) for
/// compressed storage.
///
/// The script sets the page size first (SQLite requires this before any table
/// exists), then the cache size, the page-count ceiling, the worker thread
/// count (root schema only), and the journalling mode. With `unsafe_load`,
/// journalling and locking are disabled entirely for one-shot bulk loads;
/// otherwise the inner journal is kept in memory, since the compressed outer
/// layer already provides crash-safe rollback.
///
/// # Examples
///
/// ```
/// use genomicsqlite::GenomicSQLiteConfig;
///
/// let script = genomicsqlite::tuning_sql(&GenomicSQLiteConfig::default(), "");
/// assert!(script.starts_with("PRAGMA page_size=16384"));
/// assert!(script.contains("journal_mode=MEMORY"));
/// ```
pub fn tuning_sql(config: &GenomicSQLiteConfig, schema: &str) -> String {
    let prefix = if schema.is_empty() {
        String::new()
    } else {
        format!("{}.", schema)
    };

    let mut statements = vec![
        format!("PRAGMA {}page_size={}", prefix, config.inner_page_kib * 1024),
        format!("PRAGMA {}cache_size={}", prefix, -960 * config.page_cache_mib),
        format!("PRAGMA {}max_page_count=2147483646", prefix),
    ];
    if schema.is_empty() {
        statements.push(format!("PRAGMA threads={}", config.resolved_threads()));
    }
    if config.unsafe_load {
        statements.push(format!("PRAGMA {}journal_mode=OFF", prefix));
        statements.push(format!("PRAGMA {}synchronous=OFF", prefix));
        statements.push(format!("PRAGMA {}locking_mode=EXCLUSIVE", prefix));
    } else {
        statements.push(format!("PRAGMA {}journal_mode=MEMORY", prefix));
    }
    statements.join("; ")
}

//-----------------------------------------------------------------------------

/// Opens a compressed database and installs the Genomics Extension SQL
/// surface on the connection.
///
/// The file is opened through the compressed VFS selected by [`uri`], the
/// scalar functions and table-valued functions are registered, and the
/// [`tuning_sql`] script is executed. The `zstd` VFS must have been
/// registered with SQLite by the host process.
///
/// # Arguments
///
/// * `dbfile`: Database filename.
/// * `flags`: SQLite open flags; `SQLITE_OPEN_URI` is added automatically.
/// * `config`: Merged tuning options.
///
/// # Errors
///
/// Any failure while opening, registering, or tuning closes the partially
/// opened connection and surfaces the error.
pub fn open<P: AsRef<Path>>(
    dbfile: P,
    flags: OpenFlags,
    config: &GenomicSQLiteConfig,
) -> Result<Connection> {
    init()?;
    let path = dbfile.as_ref().to_str().ok_or_else(|| {
        GenomicSQLiteError::InvalidConfig(String::from("database filename is not valid UTF-8"))
    })?;
    let connection =
        Connection::open_with_flags(uri(path, config), flags | OpenFlags::SQLITE_OPEN_URI)?;
    // Dropping the connection on the error paths closes it.
    functions::register(&connection)?;
    connection.execute_batch(&tuning_sql(config, ""))?;
    Ok(connection)
}

//-----------------------------------------------------------------------------

/// Generates the SQL script attaching another compressed database under the
/// given schema alias, including the schema-qualified tuning pragmas.
///
/// # Errors
///
/// Fails with `NonPrintable` if the URI would contain a character outside the
/// printable ASCII range.
pub fn attach_sql(dbfile: &str, schema_name: &str, config: &GenomicSQLiteConfig) -> Result<String> {
    let quoted = utils::sql_quote(&uri(dbfile, config))?;
    Ok(format!(
        "ATTACH {} AS {};{}",
        quoted,
        schema_name,
        tuning_sql(config, schema_name)
    ))
}

/// Generates the SQL script that `VACUUM`s the current database into a new
/// compressed file.
///
/// The destination URI adds `outer_unsafe=true` since the fresh copy needs no
/// crash safety while it is being written.
///
/// # Errors
///
/// Fails with `NonPrintable` if the URI would contain a character outside the
/// printable ASCII range.
pub fn vacuum_into_sql(destfile: &str, config: &GenomicSQLiteConfig) -> Result<String> {
    let dest_uri = format!("{}&outer_unsafe=true", uri(destfile, config));
    Ok(format!(
        "PRAGMA page_size = {};\nVACUUM INTO {}",
        config.inner_page_kib * 1024,
        utils::sql_quote(&dest_uri)?
    ))
}

//-----------------------------------------------------------------------------

/// Returns the Genomics Extension version.
pub fn version() -> String {
    String::from(env!("CARGO_PKG_VERSION"))
}
