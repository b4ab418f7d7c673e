//! Reference sequence metadata (`_gri_refseq`).
//!
//! A conventional table mapping integer reference sequence identifiers (rid)
//! to names, assemblies, lengths, and refget digests. The table is created
//! lazily by the first insertion script and only ever appended to. Like the
//! GRI column names, `_gri_refseq` and its `_gri_refseq_name` index are part
//! of the on-disk ABI.
//!
//! All writers here return SQL strings rather than executing anything, so
//! callers can batch the statements inside their own transactions.

use crate::error::{GenomicSQLiteError, Result};
use crate::utils;

use std::collections::BTreeMap;

use rusqlite::Connection;

mod assemblies;


//-----------------------------------------------------------------------------

/// Genomic reference sequence metadata; one row of `_gri_refseq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSeq {
    /// Integer reference sequence identifier.
    pub rid: i64,
    /// Sequence name (e.g. `chr1`).
    pub name: String,
    /// Sequence length in base pairs.
    pub length: i64,
    /// Assembly name, if recorded.
    pub assembly: Option<String>,
    /// refget sequence digest, if recorded.
    pub refget_id: Option<String>,
    /// Free-form metadata, stored as a JSON object.
    pub meta_json: String,
}

//-----------------------------------------------------------------------------

fn schema_prefix(schema: Option<&str>) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => format!("{}.", schema),
        _ => String::new(),
    }
}

fn refseq_ddl(schema: Option<&str>) -> String {
    let prefix = schema_prefix(schema);
    let mut out = format!(
        "CREATE TABLE IF NOT EXISTS {}_gri_refseq(_gri_rid INTEGER NOT NULL PRIMARY KEY, gri_refseq_name TEXT NOT NULL, gri_assembly TEXT, gri_refget_id TEXT UNIQUE, gri_refseq_length INTEGER NOT NULL, gri_refseq_meta_json TEXT NOT NULL DEFAULT '{{}}', UNIQUE(gri_assembly,gri_refseq_name))",
        prefix
    );
    out.push_str(&format!(
        ";\nCREATE INDEX IF NOT EXISTS {}_gri_refseq_name ON _gri_refseq(gri_refseq_name)",
        prefix
    ));
    out
}

/// Generates the SQL inserting one reference sequence into `_gri_refseq`.
///
/// # Arguments
///
/// * `name`: Sequence name.
/// * `length`: Sequence length in base pairs.
/// * `assembly`: Optional assembly name.
/// * `refget_id`: Optional refget digest.
/// * `meta_json`: Optional metadata object; defaults to `{}`.
/// * `rid`: Explicit rid, or [`None`] to let the database assign one.
/// * `schema`: Optional schema qualifier for the catalogue table.
/// * `with_ddl`: Prepend the CREATE-IF-NOT-EXISTS DDL; callers pass `true`
///   on (at least) the first insertion into a database.
///
/// # Errors
///
/// Fails with `NonPrintable` if a value contains a character outside the
/// printable ASCII range.
#[allow(clippy::too_many_arguments)]
pub fn put_reference_sequence_sql(
    name: &str,
    length: i64,
    assembly: Option<&str>,
    refget_id: Option<&str>,
    meta_json: Option<&str>,
    rid: Option<i64>,
    schema: Option<&str>,
    with_ddl: bool,
) -> Result<String> {
    let prefix = schema_prefix(schema);
    let mut out = String::new();
    if with_ddl {
        out.push_str(&refseq_ddl(schema));
        out.push_str(";\n");
    }

    let quoted_or_null = |value: Option<&str>| -> Result<String> {
        match value {
            Some(value) if !value.is_empty() => utils::sql_quote(value),
            _ => Ok(String::from("NULL")),
        }
    };
    let meta = match meta_json {
        Some(meta) if !meta.is_empty() => meta,
        _ => "{}",
    };
    out.push_str(&format!(
        "INSERT INTO {prefix}_gri_refseq(_gri_rid,gri_refseq_name,gri_assembly,gri_refget_id,gri_refseq_length,gri_refseq_meta_json) VALUES({rid},{name},{assembly},{refget},{length},{meta})",
        prefix = prefix,
        rid = rid.map_or(String::from("NULL"), |rid| rid.to_string()),
        name = utils::sql_quote(name)?,
        assembly = quoted_or_null(assembly)?,
        refget = quoted_or_null(refget_id)?,
        length = length,
        meta = utils::sql_quote(meta)?
    ));
    Ok(out)
}

/// Generates the SQL batch registering every sequence of a well-known
/// reference assembly, with the catalogue DDL prepended.
///
/// # Errors
///
/// Fails with `UnknownAssembly` if the assembly is not in the hard-coded
/// catalogue.
pub fn put_reference_assembly_sql(assembly: &str, schema: Option<&str>) -> Result<String> {
    let sequences = match assembly {
        "GRCh38_no_alt_analysis_set" => assemblies::GRCH38_NO_ALT_ANALYSIS_SET,
        _ => return Err(GenomicSQLiteError::UnknownAssembly(assembly.to_string())),
    };

    let mut out = String::new();
    for (index, (name, length, refget_id)) in sequences.iter().enumerate() {
        if index > 0 {
            out.push_str(";\n");
        }
        out.push_str(&put_reference_sequence_sql(
            name,
            *length,
            Some(assembly),
            *refget_id,
            None,
            None,
            schema,
            index == 0,
        )?);
    }
    Ok(out)
}

//-----------------------------------------------------------------------------

/// Reads the stored reference sequences into a lookup table keyed by rid,
/// optionally restricted to one assembly.
///
/// # Errors
///
/// Passes through any database errors (including the absence of the
/// catalogue table).
pub fn get_reference_sequences_by_rid(
    connection: &Connection,
    assembly: Option<&str>,
    schema: Option<&str>,
) -> Result<BTreeMap<i64, RefSeq>> {
    let query = format!(
        "SELECT _gri_rid, gri_refseq_name, gri_refseq_length, gri_assembly, gri_refget_id, gri_refseq_meta_json FROM {}_gri_refseq{}",
        schema_prefix(schema),
        if assembly.is_some() { " WHERE gri_assembly = ?1" } else { "" }
    );
    let mut statement = connection.prepare(&query)?;

    let read_row = |row: &rusqlite::Row| -> rusqlite::Result<RefSeq> {
        Ok(RefSeq {
            rid: row.get(0)?,
            name: row.get(1)?,
            length: row.get(2)?,
            assembly: row.get(3)?,
            refget_id: row.get(4)?,
            meta_json: row.get(5)?,
        })
    };
    let mut result = BTreeMap::new();
    let rows = match assembly {
        Some(assembly) => statement.query_map([assembly], read_row)?,
        None => statement.query_map([], read_row)?,
    }
    .collect::<rusqlite::Result<Vec<RefSeq>>>()?;
    for refseq in rows {
        result.insert(refseq.rid, refseq);
    }
    Ok(result)
}

/// Reads the stored reference sequences into a lookup table keyed by name.
///
/// # Errors
///
/// Fails with `NamesNotUnique` if two returned sequences share a name; use
/// the assembly filter to disambiguate multi-assembly databases.
pub fn get_reference_sequences_by_name(
    connection: &Connection,
    assembly: Option<&str>,
    schema: Option<&str>,
) -> Result<BTreeMap<String, RefSeq>> {
    let mut result = BTreeMap::new();
    for (_, refseq) in get_reference_sequences_by_rid(connection, assembly, schema)? {
        let name = refseq.name.clone();
        if result.insert(name.clone(), refseq).is_some() {
            return Err(GenomicSQLiteError::NamesNotUnique(name));
        }
    }
    Ok(result)
}
