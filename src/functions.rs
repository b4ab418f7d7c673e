//! SQL surface of the Genomics Extension.
//!
//! [`register`] installs on a connection every scalar function, the `UINT`
//! collation, and the two table-valued functions, mirroring what the
//! loadable-extension deployment installs on each new connection through the
//! auto-extension hook. [`crate::open`] calls it automatically; hosts that
//! open their own connections call it directly.

use crate::config::{self, GenomicSQLiteConfig};
use crate::connection;
use crate::error::GenomicSQLiteError;
use crate::gri;
use crate::refseq;
use crate::sequence;
use crate::vtab;

use std::cmp::Ordering;

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, Result};

//-----------------------------------------------------------------------------

fn user_error(error: GenomicSQLiteError) -> rusqlite::Error {
    rusqlite::Error::UserFunctionError(Box::new(error))
}

fn argument_error(function: &str, detail: &str) -> rusqlite::Error {
    rusqlite::Error::UserFunctionError(format!("{}() {}", function, detail).into())
}

fn check_arity(ctx: &Context, function: &str, min: usize, max: usize) -> Result<()> {
    let count = ctx.len();
    if count < min || count > max {
        return Err(argument_error(function, "wrong number of arguments"));
    }
    Ok(())
}

fn optional_text(ctx: &Context, index: usize) -> Result<Option<String>> {
    if index >= ctx.len() {
        return Ok(None);
    }
    ctx.get::<Option<String>>(index)
}

fn optional_int(ctx: &Context, index: usize, default: i64) -> Result<i64> {
    if index >= ctx.len() {
        return Ok(default);
    }
    Ok(ctx.get::<Option<i64>>(index)?.unwrap_or(default))
}

fn config_argument(ctx: &Context, index: usize) -> Result<GenomicSQLiteConfig> {
    let text = optional_text(ctx, index)?.unwrap_or_default();
    GenomicSQLiteConfig::from_json(&text).map_err(user_error)
}

//-----------------------------------------------------------------------------

// Text collation comparing embedded unsigned integer runs numerically, so
// that e.g. chr2 sorts before chr10. Digit runs differing only in leading
// zeros compare equal.
fn uint_collate(left: &str, right: &str) -> Ordering {
    let left = left.as_bytes();
    let right = right.as_bytes();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if left[i].is_ascii_digit() && right[j].is_ascii_digit() {
            while i < left.len() && left[i] == b'0' {
                i += 1;
            }
            while j < right.len() && right[j] == b'0' {
                j += 1;
            }
            let start_left = i;
            let start_right = j;
            while i < left.len() && left[i].is_ascii_digit() {
                i += 1;
            }
            while j < right.len() && right[j].is_ascii_digit() {
                j += 1;
            }
            let order = (i - start_left)
                .cmp(&(j - start_right))
                .then_with(|| left[start_left..i].cmp(&right[start_right..j]));
            if order != Ordering::Equal {
                return order;
            }
        } else {
            if left[i] != right[j] {
                return left[i].cmp(&right[j]);
            }
            i += 1;
            j += 1;
        }
    }
    (left.len() - i).cmp(&(right.len() - j))
}

//-----------------------------------------------------------------------------

fn twobit_decode(ctx: &Context, function: &str, rna: bool) -> Result<Value> {
    check_arity(ctx, function, 1, 3)?;
    let y = optional_int(ctx, 1, 0)?;
    let z = if ctx.len() >= 3 {
        ctx.get::<Option<i64>>(2)?
    } else {
        None
    };
    match ctx.get_raw(0) {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Blob(blob) => {
            let length = sequence::twobit_length(blob);
            let (offset, sub_length) = sequence::substr_bounds(length, y, z);
            let decoded = sequence::twobit_nucleotides(blob, offset, sub_length, rna);
            Ok(Value::Text(String::from_utf8_lossy(&decoded).into_owned()))
        }
        ValueRef::Text(text) => {
            if !text.is_ascii() {
                return Err(argument_error(function, "expected nucleotide TEXT"));
            }
            let (offset, sub_length) = sequence::substr_bounds(text.len(), y, z);
            Ok(Value::Text(
                String::from_utf8_lossy(&text[offset..offset + sub_length]).into_owned(),
            ))
        }
        _ => Err(argument_error(function, "expected BLOB or TEXT")),
    }
}

//-----------------------------------------------------------------------------

/// Registers the Genomics Extension SQL functions, the `UINT` collation, and
/// the `genomic_range_rowids` / `genomic_range_index_levels` table-valued
/// functions on a connection.
///
/// # Errors
///
/// Passes through any registration errors from the database layer.
pub fn register(connection: &Connection) -> Result<()> {
    let plain = FunctionFlags::SQLITE_UTF8;
    let deterministic = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    connection.create_scalar_function("genomicsqlite_version", 0, plain, |_| {
        Ok(connection::version())
    })?;
    connection.create_scalar_function("genomicsqlite_default_config_json", 0, plain, |_| {
        Ok(config::default_config_json())
    })?;

    connection.create_scalar_function("genomicsqlite_uri", -1, plain, |ctx| {
        check_arity(ctx, "genomicsqlite_uri", 1, 2)?;
        let dbfile: String = ctx.get(0)?;
        let config = config_argument(ctx, 1)?;
        Ok(connection::uri(&dbfile, &config))
    })?;
    connection.create_scalar_function("genomicsqlite_tuning_sql", -1, plain, |ctx| {
        check_arity(ctx, "genomicsqlite_tuning_sql", 0, 2)?;
        let config = config_argument(ctx, 0)?;
        let schema = optional_text(ctx, 1)?.unwrap_or_default();
        Ok(connection::tuning_sql(&config, &schema))
    })?;
    connection.create_scalar_function("genomicsqlite_attach_sql", -1, plain, |ctx| {
        check_arity(ctx, "genomicsqlite_attach_sql", 2, 3)?;
        let dbfile: String = ctx.get(0)?;
        let schema: String = ctx.get(1)?;
        let config = config_argument(ctx, 2)?;
        connection::attach_sql(&dbfile, &schema, &config).map_err(user_error)
    })?;
    connection.create_scalar_function("genomicsqlite_vacuum_into_sql", -1, plain, |ctx| {
        check_arity(ctx, "genomicsqlite_vacuum_into_sql", 1, 2)?;
        let destfile: String = ctx.get(0)?;
        let config = config_argument(ctx, 1)?;
        connection::vacuum_into_sql(&destfile, &config).map_err(user_error)
    })?;

    connection.create_scalar_function("create_genomic_range_index_sql", -1, plain, |ctx| {
        check_arity(ctx, "create_genomic_range_index_sql", 4, 5)?;
        let table: String = ctx.get(0)?;
        let rid: String = ctx.get(1)?;
        let beg: String = ctx.get(2)?;
        let end: String = ctx.get(3)?;
        let floor = optional_int(ctx, 4, -1)?;
        gri::create_genomic_range_index_sql(&table, &rid, &beg, &end, floor).map_err(user_error)
    })?;
    connection.create_scalar_function("genomic_range_rowids_sql", -1, plain, |ctx| {
        check_arity(ctx, "genomic_range_rowids_sql", 1, 6)?;
        let table: String = ctx.get(0)?;
        let qrid = optional_text(ctx, 1)?.unwrap_or_else(|| String::from("?1"));
        let qbeg = optional_text(ctx, 2)?.unwrap_or_else(|| String::from("?2"));
        let qend = optional_text(ctx, 3)?.unwrap_or_else(|| String::from("?3"));
        let ceiling = optional_int(ctx, 4, -1)?;
        let floor = optional_int(ctx, 5, -1)?;
        let db = unsafe { ctx.get_connection()? };
        gri::genomic_range_rowids_sql(Some(&*db), &table, &qrid, &qbeg, &qend, ceiling, floor)
            .map_err(user_error)
    })?;

    connection.create_scalar_function(
        "put_genomic_reference_sequence_sql",
        -1,
        plain,
        |ctx| {
            check_arity(ctx, "put_genomic_reference_sequence_sql", 2, 7)?;
            let name: String = ctx.get(0)?;
            let length: i64 = ctx.get(1)?;
            let assembly = optional_text(ctx, 2)?;
            let refget_id = optional_text(ctx, 3)?;
            let meta_json = optional_text(ctx, 4)?;
            let rid = optional_int(ctx, 5, -1)?;
            let schema = optional_text(ctx, 6)?;
            refseq::put_reference_sequence_sql(
                &name,
                length,
                assembly.as_deref(),
                refget_id.as_deref(),
                meta_json.as_deref(),
                if rid >= 0 { Some(rid) } else { None },
                schema.as_deref(),
                true,
            )
            .map_err(user_error)
        },
    )?;
    connection.create_scalar_function(
        "put_genomic_reference_assembly_sql",
        -1,
        plain,
        |ctx| {
            check_arity(ctx, "put_genomic_reference_assembly_sql", 1, 2)?;
            let assembly: String = ctx.get(0)?;
            let schema = optional_text(ctx, 1)?;
            refseq::put_reference_assembly_sql(&assembly, schema.as_deref()).map_err(user_error)
        },
    )?;

    connection.create_scalar_function("nucleotides_twobit", 1, deterministic, |ctx| {
        match ctx.get_raw(0) {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Text(text) => {
                if text.is_empty() {
                    return Ok(Value::Text(String::new()));
                }
                if !text.is_ascii() {
                    return Err(argument_error("nucleotides_twobit", "non-ASCII input"));
                }
                match sequence::nucleotides_twobit(text) {
                    Some(blob) => Ok(Value::Blob(blob)),
                    // sequences with ambiguity codes stay as text
                    None => Ok(Value::Text(String::from_utf8_lossy(text).into_owned())),
                }
            }
            _ => Err(argument_error("nucleotides_twobit", "expected TEXT")),
        }
    })?;
    connection.create_scalar_function("twobit_length", 1, deterministic, |ctx| {
        match ctx.get_raw(0) {
            ValueRef::Blob(blob) => Ok(Value::Integer(sequence::twobit_length(blob) as i64)),
            ValueRef::Text(text) => Ok(Value::Integer(text.len() as i64)),
            ValueRef::Null => Ok(Value::Null),
            _ => Err(argument_error("twobit_length", "expected BLOB or TEXT")),
        }
    })?;
    connection.create_scalar_function("twobit_dna", -1, deterministic, |ctx| {
        twobit_decode(ctx, "twobit_dna", false)
    })?;
    connection.create_scalar_function("twobit_rna", -1, deterministic, |ctx| {
        twobit_decode(ctx, "twobit_rna", true)
    })?;
    connection.create_scalar_function("dna_revcomp", 1, deterministic, |ctx| {
        match ctx.get_raw(0) {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Text(text) => match sequence::dna_revcomp(text) {
                Some(sequence) => Ok(Value::Text(String::from_utf8_lossy(&sequence).into_owned())),
                None => Err(argument_error("dna_revcomp", "non-DNA input")),
            },
            _ => Err(argument_error("dna_revcomp", "expected TEXT")),
        }
    })?;

    connection.create_scalar_function(
        "parse_genomic_range_sequence",
        1,
        deterministic,
        |ctx| match ctx.get_raw(0) {
            ValueRef::Null => Ok(Value::Null),
            _ => {
                let text: String = ctx.get(0)?;
                let (sequence, _, _) =
                    sequence::parse_genomic_range(&text).map_err(user_error)?;
                Ok(Value::Text(sequence))
            }
        },
    )?;
    connection.create_scalar_function(
        "parse_genomic_range_begin",
        1,
        deterministic,
        |ctx| match ctx.get_raw(0) {
            ValueRef::Null => Ok(Value::Null),
            _ => {
                let text: String = ctx.get(0)?;
                let (_, begin, _) = sequence::parse_genomic_range(&text).map_err(user_error)?;
                Ok(Value::Integer(begin as i64))
            }
        },
    )?;
    connection.create_scalar_function(
        "parse_genomic_range_end",
        1,
        deterministic,
        |ctx| match ctx.get_raw(0) {
            ValueRef::Null => Ok(Value::Null),
            _ => {
                let text: String = ctx.get(0)?;
                let (_, _, end) = sequence::parse_genomic_range(&text).map_err(user_error)?;
                Ok(Value::Integer(end as i64))
            }
        },
    )?;

    connection.create_collation("UINT", uint_collate)?;
    vtab::register_modules(connection)?;
    Ok(())
}

//-----------------------------------------------------------------------------
