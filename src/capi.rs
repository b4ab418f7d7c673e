//! C ABI for the SQL-string generators and the connection opener.
//!
//! Every function returning `char*` follows one convention: the return value
//! is a heap buffer allocated with `sqlite3_malloc`, which the caller frees
//! with `sqlite3_free`. On success the buffer holds a nonempty NUL-terminated
//! string; on failure it begins with a NUL byte immediately followed by a
//! NUL-terminated error message. A null return means allocation itself
//! failed.

use crate::config::{self, GenomicSQLiteConfig};
use crate::connection;
use crate::error::{GenomicSQLiteError, Result};
use crate::gri;
use crate::refseq;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use rusqlite::{ffi, Connection, OpenFlags};


//-----------------------------------------------------------------------------

unsafe fn allocate_c_string(payload: &str) -> *mut c_char {
    let buffer = ffi::sqlite3_malloc((payload.len() + 1) as c_int) as *mut c_char;
    if buffer.is_null() {
        return std::ptr::null_mut();
    }
    std::ptr::copy_nonoverlapping(payload.as_ptr() as *const c_char, buffer, payload.len());
    *buffer.add(payload.len()) = 0;
    buffer
}

unsafe fn c_string_result(result: Result<String>) -> *mut c_char {
    match result {
        Ok(value) => allocate_c_string(&value),
        Err(error) => allocate_c_string(&format!("\0{}", error)),
    }
}

unsafe fn text_argument(pointer: *const c_char, default: &str) -> String {
    if pointer.is_null() {
        return default.to_string();
    }
    CStr::from_ptr(pointer).to_string_lossy().into_owned()
}

unsafe fn set_error_message(pz_err_msg: *mut *mut c_char, message: &str) {
    if pz_err_msg.is_null() {
        return;
    }
    *pz_err_msg = allocate_c_string(message);
}

//-----------------------------------------------------------------------------

/// Returns the Genomics Extension version string.
///
/// # Safety
///
/// The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_version() -> *mut c_char {
    c_string_result(Ok(connection::version()))
}

/// Returns the default configuration JSON document.
///
/// # Safety
///
/// The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_default_config_json() -> *mut c_char {
    c_string_result(Ok(config::default_config_json()))
}

/// Composes the compressed-database URI for a file and configuration.
///
/// # Safety
///
/// `dbfile` must be a valid NUL-terminated string; `config_json` may be null.
/// The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_uri(
    dbfile: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let dbfile = text_argument(dbfile, "");
    let config_json = text_argument(config_json, "");
    c_string_result(
        GenomicSQLiteConfig::from_json(&config_json)
            .map(|options| connection::uri(&dbfile, &options)),
    )
}

/// Produces the tuning PRAGMA script for a configuration and optional
/// schema.
///
/// # Safety
///
/// `config_json` and `schema` may be null. The caller frees the returned
/// buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_tuning_sql(
    config_json: *const c_char,
    schema: *const c_char,
) -> *mut c_char {
    let config_json = text_argument(config_json, "");
    let schema = text_argument(schema, "");
    c_string_result(
        GenomicSQLiteConfig::from_json(&config_json)
            .map(|options| connection::tuning_sql(&options, &schema)),
    )
}

/// Generates the SQL attaching another compressed database.
///
/// # Safety
///
/// `dbfile` and `schema_name` must be valid NUL-terminated strings;
/// `config_json` may be null. The caller frees the returned buffer with
/// `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_attach_sql(
    dbfile: *const c_char,
    schema_name: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let dbfile = text_argument(dbfile, "");
    let schema_name = text_argument(schema_name, "");
    let config_json = text_argument(config_json, "");
    c_string_result(
        GenomicSQLiteConfig::from_json(&config_json)
            .and_then(|options| connection::attach_sql(&dbfile, &schema_name, &options)),
    )
}

/// Generates the `VACUUM INTO` script for producing a compressed copy.
///
/// # Safety
///
/// `destfile` must be a valid NUL-terminated string; `config_json` may be
/// null. The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_vacuum_into_sql(
    destfile: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let destfile = text_argument(destfile, "");
    let config_json = text_argument(config_json, "");
    c_string_result(
        GenomicSQLiteConfig::from_json(&config_json)
            .and_then(|options| connection::vacuum_into_sql(&destfile, &options)),
    )
}

//-----------------------------------------------------------------------------

/// Generates the genomic range index DDL for a table.
///
/// # Safety
///
/// All text arguments must be valid NUL-terminated strings. The caller frees
/// the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn create_genomic_range_index_sql(
    table: *const c_char,
    rid: *const c_char,
    beg: *const c_char,
    end: *const c_char,
    floor: c_int,
) -> *mut c_char {
    let table = text_argument(table, "");
    let rid = text_argument(rid, "");
    let beg = text_argument(beg, "");
    let end = text_argument(end, "");
    c_string_result(gri::create_genomic_range_index_sql(
        &table,
        &rid,
        &beg,
        &end,
        floor as i64,
    ))
}

/// Generates the parenthesised overlap-query SELECT for a GRI-indexed table.
///
/// Empty or null `qrid`/`qbeg`/`qend` default to the parameters
/// `?1`/`?2`/`?3`.
///
/// # Safety
///
/// `dbconn` must be a valid open database handle for the duration of the
/// call. The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn genomic_range_rowids_sql(
    dbconn: *mut ffi::sqlite3,
    table: *const c_char,
    qrid: *const c_char,
    qbeg: *const c_char,
    qend: *const c_char,
    ceiling: c_int,
    floor: c_int,
) -> *mut c_char {
    let table = text_argument(table, "");
    let qrid = text_argument(qrid, "?1");
    let qbeg = text_argument(qbeg, "?2");
    let qend = text_argument(qend, "?3");
    let qrid = if qrid.is_empty() { String::from("?1") } else { qrid };
    let qbeg = if qbeg.is_empty() { String::from("?2") } else { qbeg };
    let qend = if qend.is_empty() { String::from("?3") } else { qend };

    let database = match Connection::from_handle(dbconn) {
        Ok(database) => database,
        Err(error) => return c_string_result(Err(error.into())),
    };
    let result = gri::genomic_range_rowids_sql(
        Some(&database),
        &table,
        &qrid,
        &qbeg,
        &qend,
        ceiling as i64,
        floor as i64,
    );
    std::mem::forget(database);
    c_string_result(result)
}

/// Generates the SQL inserting one reference sequence (DDL included).
///
/// # Safety
///
/// `name` must be a valid NUL-terminated string; the other text arguments
/// may be null. The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn put_genomic_reference_sequence_sql(
    name: *const c_char,
    length: i64,
    assembly: *const c_char,
    refget_id: *const c_char,
    meta_json: *const c_char,
    rid: i64,
    schema: *const c_char,
) -> *mut c_char {
    let name = text_argument(name, "");
    let assembly = text_argument(assembly, "");
    let refget_id = text_argument(refget_id, "");
    let meta_json = text_argument(meta_json, "{}");
    let schema = text_argument(schema, "");
    c_string_result(refseq::put_reference_sequence_sql(
        &name,
        length,
        if assembly.is_empty() { None } else { Some(assembly.as_str()) },
        if refget_id.is_empty() { None } else { Some(refget_id.as_str()) },
        Some(meta_json.as_str()),
        if rid >= 0 { Some(rid) } else { None },
        if schema.is_empty() { None } else { Some(schema.as_str()) },
        true,
    ))
}

/// Generates the SQL batch registering a hard-coded reference assembly.
///
/// # Safety
///
/// `assembly` must be a valid NUL-terminated string; `schema` may be null.
/// The caller frees the returned buffer with `sqlite3_free`.
#[no_mangle]
pub unsafe extern "C" fn put_genomic_reference_assembly_sql(
    assembly: *const c_char,
    schema: *const c_char,
) -> *mut c_char {
    let assembly = text_argument(assembly, "");
    let schema = text_argument(schema, "");
    c_string_result(refseq::put_reference_assembly_sql(
        &assembly,
        if schema.is_empty() { None } else { Some(schema.as_str()) },
    ))
}

//-----------------------------------------------------------------------------

type OpenV2Fn =
    unsafe extern "C" fn(*const c_char, *mut *mut ffi::sqlite3, c_int, *const c_char) -> c_int;
type EnableLoadExtensionFn = unsafe extern "C" fn(*mut ffi::sqlite3, c_int) -> c_int;
type LoadExtensionFn = unsafe extern "C" fn(
    *mut ffi::sqlite3,
    *const c_char,
    *const c_char,
    *mut *mut c_char,
) -> c_int;

/// One-shot bootstrap for C callers.
///
/// The supplied function pointers must resolve to the same SQLite library
/// this extension is linked against; a mismatch means the process has linked
/// two copies of SQLite, which corrupts every shared handle.
///
/// # Safety
///
/// The function pointers must be valid; `pz_err_msg`, if non-null, receives
/// a `sqlite3_malloc`ed message on failure.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_init(
    open_v2: OpenV2Fn,
    _enable_load_extension: EnableLoadExtensionFn,
    _load_extension: LoadExtensionFn,
    pz_err_msg: *mut *mut c_char,
) -> c_int {
    if open_v2 as usize != ffi::sqlite3_open_v2 as usize {
        let error = GenomicSQLiteError::InconsistentLinkage {
            compiled: rusqlite::version().to_string(),
            loaded: String::from("a second statically or dynamically linked SQLite"),
        };
        set_error_message(pz_err_msg, &error.to_string());
        return ffi::SQLITE_ERROR;
    }
    match connection::init() {
        Ok(()) => ffi::SQLITE_OK,
        Err(error) => {
            set_error_message(pz_err_msg, &error.to_string());
            ffi::SQLITE_ERROR
        }
    }
}

/// Opens a compressed database; see [`crate::open`].
///
/// On success `*pp_db` receives the connection handle, which the caller
/// closes with `sqlite3_close`.
///
/// # Safety
///
/// `filename` must be a valid NUL-terminated string and `pp_db` a valid out
/// pointer; `pz_err_msg`, if non-null, receives a `sqlite3_malloc`ed message
/// on failure.
#[no_mangle]
pub unsafe extern "C" fn genomicsqlite_open(
    filename: *const c_char,
    pp_db: *mut *mut ffi::sqlite3,
    pz_err_msg: *mut *mut c_char,
    flags: c_int,
    config_json: *const c_char,
) -> c_int {
    if pp_db.is_null() {
        return ffi::SQLITE_MISUSE;
    }
    *pp_db = std::ptr::null_mut();
    let filename = text_argument(filename, "");
    let config_json = text_argument(config_json, "");

    let open = || -> Result<Connection> {
        let options = GenomicSQLiteConfig::from_json(&config_json)?;
        connection::open(
            &filename,
            OpenFlags::from_bits_truncate(flags),
            &options,
        )
    };
    match open() {
        Ok(database) => {
            let handle = database.handle();
            std::mem::forget(database);
            *pp_db = handle;
            ffi::SQLITE_OK
        }
        Err(error) => {
            set_error_message(pz_err_msg, &error.to_string());
            ffi::SQLITE_ERROR
        }
    }
}
