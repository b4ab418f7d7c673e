//! Error types for the Genomics Extension.

use thiserror::Error;

/// Result type alias for Genomics Extension operations.
pub type Result<T> = std::result::Result<T, GenomicSQLiteError>;

/// Errors that can occur in the Genomics Extension.
///
/// SQLite errors pass through with the engine's own message; everything else
/// identifies which contract was violated.
#[derive(Debug, Error)]
pub enum GenomicSQLiteError {
    /// The caller-supplied options document is malformed or has a value
    /// outside its permitted domain.
    #[error("GenomicSQLite: invalid configuration: {0}")]
    InvalidConfig(String),

    /// A recognised configuration option has the wrong JSON type.
    #[error("GenomicSQLite: expected {expected} for configuration option {option}")]
    ConfigTypeMismatch {
        /// Option key as written in the document.
        option: String,
        /// Required JSON type.
        expected: &'static str,
    },

    /// The SQLite library is older than the minimum this extension requires
    /// (generated columns support).
    #[error("GenomicSQLite: SQLite library version {found} is older than required {required}")]
    HostTooOld {
        /// Version reported by the library.
        found: String,
        /// Minimum supported version.
        required: &'static str,
    },

    /// One-time initialization failed.
    #[error("GenomicSQLite: initialization failed: {0}")]
    ExtensionLoadFailed(String),

    /// Two distinct copies of SQLite are linked into this process.
    #[error("GenomicSQLite: inconsistent SQLite library linkage in this process ({compiled} vs {loaded})")]
    InconsistentLinkage {
        /// Version the extension was compiled against.
        compiled: String,
        /// Version observed through a live connection.
        loaded: String,
    },

    /// The table has no genomic range index (or does not exist).
    #[error("GenomicSQLite: table {table} is probably missing a genomic range index; {message}")]
    MissingIndex {
        /// Table name as given by the caller.
        table: String,
        /// Underlying SQLite message.
        message: String,
    },

    /// The genomic range index holds level values outside the valid domain.
    #[error("GenomicSQLite: genomic range index on {0} is corrupted")]
    CorruptIndex(String),

    /// `floor`/`ceiling` outside `0..=15` or `floor > ceiling`.
    #[error("GenomicSQLite: invalid level floor/ceiling ({floor}, {ceiling})")]
    InvalidLevelRange {
        /// Requested floor.
        floor: i64,
        /// Requested ceiling.
        ceiling: i64,
    },

    /// The requested reference assembly is not in the hard-coded catalogue.
    #[error("GenomicSQLite: unknown reference assembly {0}")]
    UnknownAssembly(String),

    /// Reference sequence names collided in a by-name lookup.
    #[error("GenomicSQLite: reference sequence name {0} is not unique")]
    NamesNotUnique(String),

    /// A genomic range string such as `chr1:2,345-6,789` cannot be parsed.
    #[error("GenomicSQLite: cannot parse genomic range: {0}")]
    InvalidRange(String),

    /// A value destined for SQL single-quoting contains a byte outside the
    /// printable ASCII range.
    #[error("GenomicSQLite: non-printable character in: {0}")]
    NonPrintable(String),

    /// Passthrough SQLite error.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
