//! # GenomicSQLite: compressed genomic databases with range-indexed tables.
//!
//! This crate extends SQLite with two tightly coupled capabilities for
//! bioinformatics tools that keep aligned reads, variant calls, or
//! annotations in a single self-contained database file:
//!
//! 1. Transparent block-level compression of the database file, by
//!    configuring a stacked `zstd` VFS underneath SQLite's pager. The crate
//!    composes the file URI and PRAGMA script that select the VFS, its block
//!    size, compression level, caches, and worker threads; the VFS itself is
//!    an external component registered with SQLite by the host process.
//! 2. The **Genomic Range Index (GRI)**, which accelerates "all rows
//!    overlapping region R" queries on tables whose rows denote intervals
//!    `[beg, end)` on named reference sequences. See [`gri`] for the bin
//!    hierarchy and the query generation, and the `genomic_range_rowids()`
//!    table-valued function for the SQL-level interface.
//!
//! ### Basic concepts
//!
//! A table becomes range-indexed by executing the script from
//! [`create_genomic_range_index_sql`], which adds four generated virtual
//! columns (`_gri_rid`, `_gri_beg`, `_gri_len`, `_gri_lvl`) and a composite
//! index over them. The rid, begin, and end may be arbitrary expressions
//! over the table's stored columns. Afterwards, overlap queries run either
//! through the `genomic_range_rowids()` table-valued function or by
//! embedding the SELECT produced by [`genomic_range_rowids_sql`].
//!
//! Reference sequence metadata (rid to name, assembly, length, refget
//! digest) conventionally lives in the `_gri_refseq` table; see [`refseq`].
//!
//! ### Example
//!
//! ```
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! genomicsqlite::register(&conn).unwrap();
//!
//! conn.execute_batch(
//!     "CREATE TABLE feature(rid INTEGER, beg INTEGER, end INTEGER);
//!      INSERT INTO feature VALUES(3, 12, 34);
//!      INSERT INTO feature VALUES(3, 0, 23);
//!      INSERT INTO feature VALUES(3, 34, 56)",
//! ).unwrap();
//! let gri_sql = genomicsqlite::create_genomic_range_index_sql(
//!     "feature", "rid", "beg", "end", -1,
//! ).unwrap();
//! conn.execute_batch(&gri_sql).unwrap();
//!
//! let overlapping: i64 = conn.query_row(
//!     "SELECT COUNT(*) FROM genomic_range_rowids('feature', 3, 34, 34)",
//!     [],
//!     |row| row.get(0),
//! ).unwrap();
//! assert_eq!(overlapping, 2);
//! ```
//!
//! [`open`] wraps the whole connection procedure for compressed files: URI
//! composition, SQL surface registration, and tuning. The generated SQL and
//! the on-disk `_gri_*` schema are compatible with any other implementation
//! honouring the same reserved names and level conventions.

pub mod capi;
pub mod config;
pub mod connection;
pub mod error;
pub mod functions;
pub mod gri;
pub mod refseq;
pub mod sequence;
pub mod utils;

mod vtab;

pub use config::{default_config_json, GenomicSQLiteConfig};
pub use connection::{attach_sql, init, open, tuning_sql, uri, vacuum_into_sql, version};
pub use error::{GenomicSQLiteError, Result};
pub use functions::register;
pub use gri::{
    create_genomic_range_index_sql, detect_level_range, genomic_range_rowids_sql, GRI_MAX_LEVEL,
    GRI_MAX_POS,
};
pub use refseq::{
    get_reference_sequences_by_name, get_reference_sequences_by_rid, put_reference_assembly_sql,
    put_reference_sequence_sql, RefSeq,
};
