//! The Genomic Range Index (GRI).
//!
//! A GRI accelerates "all rows overlapping region R" queries on tables whose
//! rows denote half-open intervals `[beg, end)` on named reference sequences.
//! It consists of four generated virtual columns added to the indexed table
//! and one composite index over them:
//!
//! * `_gri_rid`: reference sequence identifier (caller-supplied expression)
//! * `_gri_beg`: interval begin position
//! * `_gri_len`: interval length (`end - beg`)
//! * `_gri_lvl`: negated level of the smallest 16-ary bin size covering the
//!   length, so `_gri_lvl = -min { lv in floor..=15 : _gri_len <= 16^lv }`,
//!   or NULL for null or negative lengths
//! * index `<table>__gri` on `(_gri_rid, _gri_lvl, _gri_beg, _gri_len)`
//!
//! Levels are stored negated so that the short intervals dominating real
//! datasets land at the rightmost end of the index b-tree, keeping bulk
//! insertion append-mostly. These column and index names, and the negation
//! convention, are the on-disk ABI: any implementation honouring them can
//! read a database written by another.
//!
//! An overlap query is a UNION ALL of per-level index range scans. For each
//! occupied level `lv`, every interval of that level overlapping the query
//! range `[qbeg, qend]` has `_gri_beg` between `qbeg - 16^lv` (the widest
//! interval of the level still reaching `qbeg`) and `qend`; the trailing
//! `_gri_beg + _gri_len >= qbeg` filter strips the false positives admitted
//! by the relaxed lower bound. [`detect_level_range`] prunes the per-level
//! queries down to the levels actually occupied.

use crate::error::{GenomicSQLiteError, Result};

use rusqlite::Connection;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Highest GRI level; bin sizes are `16^0 .. 16^GRI_MAX_LEVEL` positions.
pub const GRI_MAX_LEVEL: i64 = 15;

/// Highest position representable in a GRI-indexed interval.
pub const GRI_MAX_POS: i64 = (1 << 36) - 1 - (1 << 32);

// Splits a possibly schema-qualified table name into the schema prefix
// (including the trailing dot, or empty) and the bare table name.
pub(crate) fn split_schema_table(qualified: &str) -> (String, String) {
    match qualified.find('.') {
        Some(position) => (
            qualified[..position + 1].to_string(),
            qualified[position + 1..].to_string(),
        ),
        None => (String::new(), qualified.to_string()),
    }
}

//-----------------------------------------------------------------------------

/// Generates the SQL script that adds a genomic range index to a table.
///
/// The script adds the four `_gri_*` generated virtual columns and creates
/// the `<table>__gri` composite index. The rid, begin, and end arguments may
/// be arbitrary scalar expressions over the table's stored columns; they are
/// interpolated into the generated DDL verbatim. `floor` prunes the level
/// case-expression from below; `-1` selects the default of 0.
///
/// The same inputs always produce byte-identical output.
///
/// # Examples
///
/// ```
/// let script = genomicsqlite::create_genomic_range_index_sql(
///     "feat", "chrom_id", "beg", "end", -1,
/// ).unwrap();
/// assert!(script.ends_with(
///     "CREATE INDEX feat__gri ON feat(_gri_rid, _gri_lvl, _gri_beg, _gri_len)"
/// ));
/// ```
///
/// # Errors
///
/// Fails if `floor` is outside `{-1, 0..=15}`.
pub fn create_genomic_range_index_sql(
    schema_table: &str,
    rid: &str,
    beg: &str,
    end: &str,
    floor: i64,
) -> Result<String> {
    let (_, table) = split_schema_table(schema_table);
    let floor = if floor == -1 { 0 } else { floor };
    if !(0..=GRI_MAX_LEVEL).contains(&floor) {
        return Err(GenomicSQLiteError::InvalidLevelRange {
            floor,
            ceiling: GRI_MAX_LEVEL,
        });
    }

    let mut out = String::new();
    out.push_str(&format!(
        "ALTER TABLE {} ADD COLUMN _gri_rid INTEGER AS ({}) VIRTUAL",
        schema_table, rid
    ));
    out.push_str(&format!(
        ";\nALTER TABLE {} ADD COLUMN _gri_beg INTEGER AS ({}) VIRTUAL",
        schema_table, beg
    ));
    out.push_str(&format!(
        ";\nALTER TABLE {} ADD COLUMN _gri_len INTEGER AS (({})-({})) VIRTUAL",
        schema_table, end, beg
    ));
    out.push_str(&format!(
        ";\nALTER TABLE {} ADD COLUMN _gri_lvl INTEGER AS (CASE WHEN _gri_len IS NULL OR _gri_len < 0 THEN NULL",
        schema_table
    ));
    for level in floor..=GRI_MAX_LEVEL {
        // level negated so that small-interval insertions are b-tree-rightmost
        out.push_str(&format!(
            " WHEN _gri_len <= 0x1{} THEN -{}",
            "0".repeat(level as usize),
            level
        ));
    }
    out.push_str(" ELSE NULL END) VIRTUAL");
    out.push_str(&format!(
        ";\nCREATE INDEX {}__gri ON {}(_gri_rid, _gri_lvl, _gri_beg, _gri_len)",
        schema_table, table
    ));
    Ok(out)
}

//-----------------------------------------------------------------------------

/// Detects the minimum and maximum level actually occupied in a table's
/// genomic range index.
///
/// The obvious `SELECT MIN(_gri_lvl), MAX(_gri_lvl)` forces a full index
/// scan, because SQLite does not plan a skip-scan for it. This routine
/// instead walks the distinct `_gri_rid` values with a recursive CTE, picks
/// the extreme level for each rid with `ORDER BY ... LIMIT 1` probes that use
/// the leading index columns, and aggregates the per-rid extremes here on the
/// client side, guaranteeing a single pass over the index.
///
/// On an empty (or all-NULL) index the full range `(0, 15)` is returned,
/// which keeps downstream query generation valid while matching no rows.
///
/// # Errors
///
/// `MissingIndex` if the query cannot even be prepared (no such table, or no
/// `<table>__gri` index); `CorruptIndex` if the observed levels fall outside
/// `0..=15` or invert.
pub fn detect_level_range(connection: &Connection, schema_table: &str) -> Result<(i64, i64)> {
    let (_, table) = split_schema_table(schema_table);
    let tbl_gri = format!("{} INDEXED BY {}__gri", schema_table, table);
    let query = format!(
        "WITH RECURSIVE __distinct(__rid) AS\n \
         (SELECT (SELECT _gri_rid FROM {tbl} ORDER BY _gri_rid NULLS LAST LIMIT 1) AS __rid_0 WHERE __rid_0 IS NOT NULL\n  \
         UNION ALL\n  \
         SELECT (SELECT _gri_rid FROM {tbl} WHERE _gri_rid > __rid ORDER BY _gri_rid LIMIT 1) AS __rid_i FROM __distinct WHERE __rid_i IS NOT NULL)\n\
         SELECT\n \
         (SELECT _gri_lvl FROM {tbl} WHERE _gri_rid = __rid AND _gri_lvl <= 0 ORDER BY _gri_rid, _gri_lvl LIMIT 1),\n \
         (SELECT _gri_lvl FROM {tbl} WHERE _gri_rid = __rid AND _gri_lvl <= 0 ORDER BY _gri_rid DESC, _gri_lvl DESC LIMIT 1)\n\
         FROM __distinct",
        tbl = tbl_gri
    );

    let mut statement =
        connection
            .prepare(&query)
            .map_err(|x| GenomicSQLiteError::MissingIndex {
                table: schema_table.to_string(),
                message: x.to_string(),
            })?;
    let mut min_level: i64 = GRI_MAX_LEVEL;
    let mut max_level: i64 = 0;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        // un-negating as we go
        if let Some(level) = row.get::<_, Option<i64>>(0)? {
            max_level = max_level.max(-level);
        }
        if let Some(level) = row.get::<_, Option<i64>>(1)? {
            min_level = min_level.min(-level);
        }
    }

    if min_level == GRI_MAX_LEVEL && max_level == 0 {
        // empty index
        std::mem::swap(&mut min_level, &mut max_level);
    }
    if !(0 <= min_level && min_level <= max_level && max_level <= GRI_MAX_LEVEL) {
        return Err(GenomicSQLiteError::CorruptIndex(schema_table.to_string()));
    }
    Ok((min_level, max_level))
}

//-----------------------------------------------------------------------------

/// Generates the parenthesised SELECT returning the rowids of all rows whose
/// interval overlaps the query range, in ascending rowid order.
///
/// `qrid`, `qbeg`, and `qend` are SQL expressions (typically `?1`/`?2`/`?3`
/// parameters, or columns of another table in a join). If `ceiling < 0` and a
/// connection is supplied, [`detect_level_range`] narrows the emitted
/// per-level queries to the occupied levels (`floor` is taken from detection
/// too, unless the caller pinned it); without a connection the safe full
/// range `(15, 0)` is used, which stays correct through subsequent inserts
/// and updates at the cost of more sub-queries.
///
/// # Errors
///
/// `InvalidLevelRange` unless `0 <= floor <= ceiling <= 15` after applying
/// defaults; detection errors pass through.
pub fn genomic_range_rowids_sql(
    connection: Option<&Connection>,
    schema_table: &str,
    qrid: &str,
    qbeg: &str,
    qend: &str,
    ceiling: i64,
    floor: i64,
) -> Result<String> {
    let mut ceiling = ceiling;
    let mut floor = floor;
    if ceiling < 0 {
        match connection {
            Some(db) => {
                let (detected_floor, detected_ceiling) = detect_level_range(db, schema_table)?;
                if floor < 0 {
                    floor = detected_floor;
                }
                ceiling = detected_ceiling;
            }
            None => {
                ceiling = GRI_MAX_LEVEL;
                if floor < 0 {
                    floor = 0;
                }
            }
        }
    } else if floor == -1 {
        floor = 0;
    }
    if !(0 <= floor && floor <= ceiling && ceiling <= GRI_MAX_LEVEL) {
        return Err(GenomicSQLiteError::InvalidLevelRange { floor, ceiling });
    }

    let (_, table) = split_schema_table(schema_table);
    let mut levels = String::from(" (");
    for level in (floor..=ceiling).rev() {
        if level < ceiling {
            levels.push_str("\n  UNION ALL\n  ");
        }
        // The lower _gri_beg bound relaxes qbeg by one bin width (the widest
        // interval of this level that can still reach qbeg); the trailing
        // filter removes the false positives this admits. The upper bound
        // subtracts zero from qend: without some arithmetic there, SQLite
        // picks a poor plan when qbeg/qend name columns of another table, and
        // unary + would strip type affinity instead.
        levels.push_str(&format!(
            "SELECT _rowid_ FROM {it} INDEXED BY {table}__gri WHERE\n   \
             ({it}._gri_rid,{it}._gri_lvl,{it}._gri_beg) BETWEEN (({qrid}),-{level},({qbeg})-0x1{zeros}) AND (({qrid}),-{level},({qend})-0)\n   \
             AND ({it}._gri_beg+{it}._gri_len) >= ({qbeg})",
            it = schema_table,
            table = table,
            qrid = qrid,
            qbeg = qbeg,
            qend = qend,
            level = level,
            zeros = "0".repeat(level as usize)
        ));
    }
    levels.push(')');
    Ok(format!(
        "(SELECT _rowid_ FROM\n{}\n ORDER BY _rowid_)",
        levels
    ))
}
