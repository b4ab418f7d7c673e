//! Table-valued functions `genomic_range_rowids()` and
//! `genomic_range_index_levels()`.
//!
//! These expose the overlap-query generator and the level-range detector as
//! eponymous virtual tables, so that SQL callers can stream overlapping
//! rowids without assembling any query text themselves:
//!
//! ```sql
//! SELECT * FROM feat WHERE feat._rowid_ IN
//!   genomic_range_rowids('feat', ?1, ?2, ?3)
//! ```
//!
//! Arguments arrive through hidden columns, following SQLite's table-valued
//! function convention. Each connection-scoped module instance owns a cache:
//! `genomic_range_rowids` keeps a pool of prepared overlap statements per
//! table, stamped with the `(ceiling, floor)` they were compiled for, and
//! `genomic_range_index_levels` remembers the last detected level range per
//! main-schema table until the database's data-version stamp or
//! total-changes counter moves.
//!
//! Inside the cursor callbacks, rusqlite's safe API cannot reach the owning
//! connection, so the pooled statements are raw `sqlite3_stmt` handles
//! behind a small RAII wrapper.

use crate::gri;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::rc::Rc;

use rusqlite::ffi;
use rusqlite::types::{Null, Value};
use rusqlite::vtab::{
    eponymous_only_module, sqlite3_vtab, sqlite3_vtab_cursor, Context, Filters, IndexConstraintOp,
    IndexInfo, VTab, VTabConnection, VTabCursor,
};
use rusqlite::{Connection, Result};


//-----------------------------------------------------------------------------

/// Registers both virtual-table modules on a connection.
pub(crate) fn register_modules(connection: &Connection) -> Result<()> {
    connection.create_module(
        "genomic_range_rowids",
        eponymous_only_module::<GenomicRangeRowidsTab>(),
        None,
    )?;
    connection.create_module(
        "genomic_range_index_levels",
        eponymous_only_module::<GenomicRangeIndexLevelsTab>(),
        None,
    )?;
    Ok(())
}

//-----------------------------------------------------------------------------

fn last_error(db: *mut ffi::sqlite3, code: c_int) -> rusqlite::Error {
    let message = unsafe {
        let pointer = ffi::sqlite3_errmsg(db);
        if pointer.is_null() {
            String::from("unknown SQLite error")
        } else {
            CStr::from_ptr(pointer).to_string_lossy().into_owned()
        }
    };
    rusqlite::Error::SqliteFailure(ffi::Error::new(code), Some(message))
}

// Owned prepared statement on a raw connection handle, finalized on drop.
// The handle must outlive the statement; here both belong to the virtual
// table's connection.
struct RawStatement {
    statement: *mut ffi::sqlite3_stmt,
    db: *mut ffi::sqlite3,
}

impl RawStatement {
    unsafe fn prepare(db: *mut ffi::sqlite3, sql: &str) -> Result<Self> {
        let sql = CString::new(sql)
            .map_err(|_| rusqlite::Error::ModuleError(String::from("SQL contains a NUL byte")))?;
        let mut statement: *mut ffi::sqlite3_stmt = std::ptr::null_mut();
        let rc = ffi::sqlite3_prepare_v2(db, sql.as_ptr(), -1, &mut statement, std::ptr::null_mut());
        if rc != ffi::SQLITE_OK {
            return Err(last_error(db, rc));
        }
        Ok(RawStatement { statement, db })
    }

    fn bind_value(&mut self, index: c_int, value: &Value) -> Result<()> {
        let rc = unsafe {
            match value {
                Value::Null => ffi::sqlite3_bind_null(self.statement, index),
                Value::Integer(value) => ffi::sqlite3_bind_int64(self.statement, index, *value),
                Value::Real(value) => ffi::sqlite3_bind_double(self.statement, index, *value),
                Value::Text(value) => ffi::sqlite3_bind_text(
                    self.statement,
                    index,
                    value.as_ptr() as *const c_char,
                    value.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                ),
                Value::Blob(value) => ffi::sqlite3_bind_blob(
                    self.statement,
                    index,
                    value.as_ptr() as *const c_void,
                    value.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                ),
            }
        };
        if rc != ffi::SQLITE_OK {
            return Err(last_error(self.db, rc));
        }
        Ok(())
    }

    // Returns true on a result row, false at the end of the result set.
    fn step(&mut self) -> Result<bool> {
        match unsafe { ffi::sqlite3_step(self.statement) } {
            ffi::SQLITE_ROW => Ok(true),
            ffi::SQLITE_DONE => Ok(false),
            code => Err(last_error(self.db, code)),
        }
    }

    fn column_int64(&self, column: c_int) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.statement, column) }
    }

    fn reset(&mut self) {
        unsafe {
            ffi::sqlite3_reset(self.statement);
        }
    }
}

impl Drop for RawStatement {
    fn drop(&mut self) {
        unsafe {
            ffi::sqlite3_finalize(self.statement);
        }
    }
}

//-----------------------------------------------------------------------------

// xBestIndex for a table-valued function: the arguments must arrive as
// usable equality constraints forming a prefix of the hidden columns, at
// most one per column, passed to xFilter in column order. Everything else is
// rejected with SQLITE_CONSTRAINT so the planner tries another shape.
fn best_index_tvf(
    info: &mut IndexInfo,
    visible_columns: c_int,
    min_args: usize,
    max_args: usize,
) -> Result<()> {
    fn constraint_error() -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_CONSTRAINT), None)
    }

    let count = info.constraints().count();
    if count < min_args || count > max_args {
        return Err(constraint_error());
    }
    let mut bitmap: u64 = 0;
    let mut arguments: Vec<(usize, c_int)> = Vec::with_capacity(count);
    for (index, constraint) in info.constraints().enumerate() {
        let argument = constraint.column() - visible_columns;
        if argument < 0
            || argument as usize >= max_args
            || bitmap & (1 << argument) != 0
            || constraint.operator() != IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ
            || !constraint.is_usable()
        {
            return Err(constraint_error());
        }
        bitmap |= 1 << argument;
        arguments.push((index, argument + 1));
    }
    // constrained columns must form a prefix of the hidden columns
    if bitmap != (1u64 << count) - 1 {
        return Err(constraint_error());
    }
    for (index, argv_index) in arguments {
        let mut usage = info.constraint_usage(index);
        usage.set_argv_index(argv_index);
        usage.set_omit(true);
    }
    Ok(())
}

//-----------------------------------------------------------------------------

struct StmtPool {
    ceiling: i64,
    floor: i64,
    pool: Vec<RawStatement>,
}

impl Default for StmtPool {
    fn default() -> Self {
        StmtPool {
            ceiling: gri::GRI_MAX_LEVEL,
            floor: 0,
            pool: Vec::new(),
        }
    }
}

type PoolMap = Rc<RefCell<BTreeMap<String, StmtPool>>>;

/// `genomic_range_rowids(tableName, qrid, qbeg, qend[, ceiling[, floor]])`:
/// streams the rowids of rows in the named GRI-indexed table whose intervals
/// overlap the query range, in ascending rowid order.
#[repr(C)]
pub struct GenomicRangeRowidsTab {
    base: sqlite3_vtab,
    db: *mut ffi::sqlite3,
    pools: PoolMap,
}

unsafe impl<'vtab> VTab<'vtab> for GenomicRangeRowidsTab {
    type Aux = ();
    type Cursor = GenomicRangeRowidsCursor<'vtab>;

    fn connect(
        db: &mut VTabConnection,
        _aux: Option<&()>,
        _args: &[&[u8]],
    ) -> Result<(String, Self)> {
        let handle = unsafe { db.handle() };
        Ok((
            String::from(
                "CREATE TABLE genomic_range_rowids(_rowid_ INTEGER, tableName HIDDEN, qrid HIDDEN, qbeg HIDDEN, qend HIDDEN, ceiling HIDDEN, floor HIDDEN)",
            ),
            GenomicRangeRowidsTab {
                base: sqlite3_vtab::default(),
                db: handle,
                pools: Rc::new(RefCell::new(BTreeMap::new())),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> Result<()> {
        best_index_tvf(info, 1, 4, 6)?;
        let consumed = {
            let mut order_bys = info.order_bys();
            match order_bys.next() {
                None => true,
                Some(order_by) => {
                    order_by.column() == 0
                        && !order_by.is_order_by_desc()
                        && order_bys.next().is_none()
                }
            }
        };
        info.set_order_by_consumed(consumed);
        Ok(())
    }

    fn open(&'vtab mut self) -> Result<GenomicRangeRowidsCursor<'vtab>> {
        Ok(GenomicRangeRowidsCursor {
            base: sqlite3_vtab_cursor::default(),
            db: self.db,
            pools: self.pools.clone(),
            statement: None,
            table: String::new(),
            ceiling: gri::GRI_MAX_LEVEL,
            floor: 0,
            phantom: PhantomData,
        })
    }
}

/// Cursor over one `genomic_range_rowids()` query.
#[repr(C)]
pub struct GenomicRangeRowidsCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    db: *mut ffi::sqlite3,
    pools: PoolMap,
    statement: Option<RawStatement>,
    table: String,
    ceiling: i64,
    floor: i64,
    phantom: PhantomData<&'vtab GenomicRangeRowidsTab>,
}

impl GenomicRangeRowidsCursor<'_> {
    // Return the borrowed statement to its pool, unless the pool has since
    // been restamped with different level bounds.
    fn return_statement(&mut self) {
        if let Some(mut statement) = self.statement.take() {
            let mut pools = self.pools.borrow_mut();
            if let Some(pool) = pools.get_mut(&self.table) {
                if pool.ceiling == self.ceiling && pool.floor == self.floor {
                    statement.reset();
                    pool.pool.push(statement);
                }
            }
        }
    }
}

impl Drop for GenomicRangeRowidsCursor<'_> {
    fn drop(&mut self) {
        self.return_statement();
    }
}

unsafe impl VTabCursor for GenomicRangeRowidsCursor<'_> {
    fn filter(
        &mut self,
        _idx_num: c_int,
        _idx_str: Option<&str>,
        args: &Filters<'_>,
    ) -> Result<()> {
        self.return_statement();
        self.table.clear();

        if args.len() < 4 || args.len() > 6 {
            return Err(rusqlite::Error::ModuleError(String::from(
                "genomic_range_rowids() expects 4-6 arguments",
            )));
        }
        let table: String = args.get(0).map_err(|_| {
            rusqlite::Error::ModuleError(String::from(
                "genomic_range_rowids() argument 1 should be the GRI-indexed table name",
            ))
        })?;
        let mut ceiling = gri::GRI_MAX_LEVEL;
        let mut floor = 0;
        if args.len() >= 5 {
            if let Some(value) = args.get::<Option<i64>>(4).map_err(|_| {
                rusqlite::Error::ModuleError(String::from(
                    "genomic_range_rowids() expected integer ceiling",
                ))
            })? {
                ceiling = value;
            }
        }
        if args.len() >= 6 {
            if let Some(value) = args.get::<Option<i64>>(5).map_err(|_| {
                rusqlite::Error::ModuleError(String::from(
                    "genomic_range_rowids() expected integer floor",
                ))
            })? {
                floor = value;
            }
        }
        if floor < 0 || ceiling > gri::GRI_MAX_LEVEL || floor > ceiling {
            return Err(rusqlite::Error::ModuleError(String::from(
                "genomic_range_rowids() ceiling/floor domain error",
            )));
        }
        self.table = table;
        self.ceiling = ceiling;
        self.floor = floor;

        // Borrow a pooled statement compiled for these bounds, or compile a
        // fresh one. New bounds wipe the table's pool.
        let pooled = {
            let mut pools = self.pools.borrow_mut();
            let pool = pools.entry(self.table.clone()).or_default();
            if pool.ceiling != ceiling || pool.floor != floor {
                pool.pool.clear();
                pool.ceiling = ceiling;
                pool.floor = floor;
            }
            pool.pool.pop()
        };
        let mut statement = match pooled {
            Some(statement) => statement,
            None => {
                let sql = {
                    let connection = unsafe { Connection::from_handle(self.db) }?;
                    let result = gri::genomic_range_rowids_sql(
                        Some(&connection),
                        &self.table,
                        "?1",
                        "?2",
                        "?3",
                        ceiling,
                        floor,
                    );
                    std::mem::forget(connection);
                    result.map_err(|x| rusqlite::Error::ModuleError(x.to_string()))?
                };
                // trim the enclosing parentheses to get a preparable SELECT
                let trimmed = &sql[1..sql.len() - 1];
                unsafe { RawStatement::prepare(self.db, trimmed) }.map_err(|x| {
                    rusqlite::Error::ModuleError(format!(
                        "genomic_range_rowids(): table {} does not exist or lacks a genomic range index; {}",
                        self.table, x
                    ))
                })?
            }
        };

        for index in 0..3 {
            let value: Value = args.get(index + 1)?;
            statement.bind_value(index as c_int + 1, &value)?;
        }
        self.statement = Some(statement);
        self.next()
    }

    fn next(&mut self) -> Result<()> {
        if let Some(statement) = self.statement.as_mut() {
            match statement.step() {
                Ok(true) => {}
                Ok(false) => self.return_statement(),
                Err(error) => {
                    self.statement = None;
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    fn eof(&self) -> bool {
        self.statement.is_none()
    }

    fn column(&self, ctx: &mut Context, column: c_int) -> Result<()> {
        match self.statement.as_ref() {
            Some(statement) if column == 0 => ctx.set_result(&statement.column_int64(0)),
            _ => ctx.set_result(&Null),
        }
    }

    fn rowid(&self) -> Result<i64> {
        match self.statement.as_ref() {
            Some(statement) => Ok(statement.column_int64(0)),
            None => Err(rusqlite::Error::ModuleError(String::from(
                "genomic_range_rowids() cursor is exhausted",
            ))),
        }
    }
}

//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct CachedLevels {
    data_version: u32,
    total_changes: i64,
    ceiling: i64,
    floor: i64,
}

type LevelsMap = Rc<RefCell<BTreeMap<String, CachedLevels>>>;

/// `genomic_range_index_levels(tableName)`: one row
/// `(_gri_ceiling, _gri_floor)` describing the levels currently occupied in
/// the named table's GRI.
#[repr(C)]
pub struct GenomicRangeIndexLevelsTab {
    base: sqlite3_vtab,
    db: *mut ffi::sqlite3,
    cache: LevelsMap,
}

unsafe impl<'vtab> VTab<'vtab> for GenomicRangeIndexLevelsTab {
    type Aux = ();
    type Cursor = GenomicRangeIndexLevelsCursor<'vtab>;

    fn connect(
        db: &mut VTabConnection,
        _aux: Option<&()>,
        _args: &[&[u8]],
    ) -> Result<(String, Self)> {
        let handle = unsafe { db.handle() };
        Ok((
            String::from(
                "CREATE TABLE genomic_range_index_levels(_gri_ceiling INTEGER, _gri_floor INTEGER, tableName HIDDEN)",
            ),
            GenomicRangeIndexLevelsTab {
                base: sqlite3_vtab::default(),
                db: handle,
                cache: Rc::new(RefCell::new(BTreeMap::new())),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> Result<()> {
        best_index_tvf(info, 2, 1, 1)?;
        info.set_order_by_consumed(true);
        info.set_estimated_cost(1.0);
        info.set_estimated_rows(1);
        Ok(())
    }

    fn open(&'vtab mut self) -> Result<GenomicRangeIndexLevelsCursor<'vtab>> {
        Ok(GenomicRangeIndexLevelsCursor {
            base: sqlite3_vtab_cursor::default(),
            db: self.db,
            cache: self.cache.clone(),
            levels: None,
            phantom: PhantomData,
        })
    }
}

/// Cursor yielding the one result row of `genomic_range_index_levels()`.
#[repr(C)]
pub struct GenomicRangeIndexLevelsCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    db: *mut ffi::sqlite3,
    cache: LevelsMap,
    levels: Option<(i64, i64)>, // (ceiling, floor)
    phantom: PhantomData<&'vtab GenomicRangeIndexLevelsTab>,
}

unsafe impl VTabCursor for GenomicRangeIndexLevelsCursor<'_> {
    fn filter(
        &mut self,
        _idx_num: c_int,
        _idx_str: Option<&str>,
        args: &Filters<'_>,
    ) -> Result<()> {
        self.levels = None;
        let table: String = args.get(0).map_err(|_| {
            rusqlite::Error::ModuleError(String::from(
                "genomic_range_index_levels() expects a table name",
            ))
        })?;
        let (schema, bare) = gri::split_schema_table(&table);

        // Results are cached for main-schema tables only: an attached schema
        // name could be re-attached to a different file between calls. The
        // cache is invalidated when either the data-version stamp or the
        // total-changes counter moves.
        let main = schema.is_empty() || schema.eq_ignore_ascii_case("main.");
        let mut data_version: c_uint = 0;
        let mut total_changes: i64 = 0;
        if main {
            let rc = unsafe {
                ffi::sqlite3_file_control(
                    self.db,
                    std::ptr::null(),
                    ffi::SQLITE_FCNTL_DATA_VERSION,
                    &mut data_version as *mut c_uint as *mut c_void,
                )
            };
            if rc != ffi::SQLITE_OK {
                return Err(last_error(self.db, rc));
            }
            total_changes = unsafe { ffi::sqlite3_total_changes(self.db) } as i64;
            if let Some(cached) = self.cache.borrow().get(&bare) {
                if cached.data_version == data_version && cached.total_changes == total_changes {
                    self.levels = Some((cached.ceiling, cached.floor));
                    return Ok(());
                }
            }
        }

        let detected = {
            let connection = unsafe { Connection::from_handle(self.db) }?;
            let result = gri::detect_level_range(&connection, &table);
            std::mem::forget(connection);
            result.map_err(|x| rusqlite::Error::ModuleError(x.to_string()))?
        };
        let (floor, ceiling) = detected;
        self.levels = Some((ceiling, floor));
        if main {
            self.cache.borrow_mut().insert(
                bare,
                CachedLevels {
                    data_version,
                    total_changes,
                    ceiling,
                    floor,
                },
            );
        }
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        self.levels = None;
        Ok(())
    }

    fn eof(&self) -> bool {
        self.levels.is_none()
    }

    fn column(&self, ctx: &mut Context, column: c_int) -> Result<()> {
        match (self.levels, column) {
            (Some((ceiling, _)), 0) => ctx.set_result(&ceiling),
            (Some((_, floor)), 1) => ctx.set_result(&floor),
            _ => ctx.set_result(&Null),
        }
    }

    fn rowid(&self) -> Result<i64> {
        Ok(1)
    }
}
