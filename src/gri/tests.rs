use super::*;

use crate::functions;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

//-----------------------------------------------------------------------------

fn memdb() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    let result = functions::register(&connection);
    assert!(result.is_ok(), "Failed to register SQL surface: {}", result.unwrap_err());
    connection
}

fn indexed_feature_table(connection: &Connection, rows: &[(i64, i64, i64)]) {
    connection
        .execute_batch("CREATE TABLE feat(chrom_id INTEGER, beg INTEGER, end INTEGER)")
        .unwrap();
    {
        let mut insert = connection
            .prepare("INSERT INTO feat(chrom_id, beg, end) VALUES (?1, ?2, ?3)")
            .unwrap();
        for (rid, beg, end) in rows {
            insert.execute((rid, beg, end)).unwrap();
        }
    }
    let script = create_genomic_range_index_sql("feat", "chrom_id", "beg", "end", -1);
    assert!(script.is_ok(), "Failed to generate index DDL: {}", script.unwrap_err());
    let result = connection.execute_batch(&script.unwrap());
    assert!(result.is_ok(), "Failed to create index: {}", result.unwrap_err());
}

fn overlap_rowids(connection: &Connection, range: (i64, i64, i64)) -> Vec<i64> {
    let query = genomic_range_rowids_sql(Some(connection), "feat", "?1", "?2", "?3", -1, -1);
    assert!(query.is_ok(), "Failed to generate overlap query: {}", query.unwrap_err());
    let sql = format!("SELECT _rowid_ FROM feat WHERE feat._rowid_ IN\n{}", query.unwrap());
    let mut statement = connection.prepare(&sql).unwrap();
    let rowids = statement
        .query_map(range, |row| row.get::<_, i64>(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<i64>>>()
        .unwrap();
    rowids
}

//-----------------------------------------------------------------------------

#[test]
fn create_index_script() {
    let script = create_genomic_range_index_sql("feat", "chrom_id", "beg", "end", -1).unwrap();

    let alters = script.matches("ALTER TABLE feat ADD COLUMN _gri_").count();
    assert_eq!(alters, 4, "Wrong number of ALTER TABLE statements");
    for column in ["_gri_rid", "_gri_beg", "_gri_len", "_gri_lvl"] {
        assert!(
            script.contains(&format!("ADD COLUMN {} INTEGER AS (", column)),
            "Missing generated column {}",
            column
        );
    }
    assert!(script.contains("(chrom_id) VIRTUAL"), "Missing rid expression");
    assert!(script.contains("((end)-(beg)) VIRTUAL"), "Missing length expression");
    assert!(
        script.contains("WHEN _gri_len <= 0x10000000000 THEN -10"),
        "Missing level-10 case branch"
    );
    assert!(
        script.ends_with("CREATE INDEX feat__gri ON feat(_gri_rid, _gri_lvl, _gri_beg, _gri_len)"),
        "Wrong index DDL tail"
    );

    // byte-identical on repeated invocation
    let again = create_genomic_range_index_sql("feat", "chrom_id", "beg", "end", -1).unwrap();
    assert_eq!(script, again);
}

#[test]
fn create_index_floor() {
    let script = create_genomic_range_index_sql("feat", "rid", "beg", "end", 3).unwrap();
    assert!(!script.contains("THEN -0"), "Levels below the floor should be pruned");
    assert!(!script.contains("<= 0x100 THEN -2"), "Levels below the floor should be pruned");
    assert!(script.contains("WHEN _gri_len <= 0x1000 THEN -3"), "Missing floor level branch");
    assert!(script.contains("WHEN _gri_len <= 0x1000000000000000 THEN -15"), "Missing top level");

    for floor in [-2, 16, 100] {
        let result = create_genomic_range_index_sql("feat", "rid", "beg", "end", floor);
        assert!(
            matches!(result, Err(GenomicSQLiteError::InvalidLevelRange { .. })),
            "Accepted floor {}",
            floor
        );
    }
}

#[test]
fn create_index_schema_qualified() {
    let script =
        create_genomic_range_index_sql("aux1.feat", "rid", "beg", "end", -1).unwrap();
    assert!(script.contains("ALTER TABLE aux1.feat ADD COLUMN _gri_rid"));
    assert!(
        script.ends_with(
            "CREATE INDEX aux1.feat__gri ON feat(_gri_rid, _gri_lvl, _gri_beg, _gri_len)"
        ),
        "Index must be created in the table's schema"
    );
}

//-----------------------------------------------------------------------------

#[test]
fn level_assignment() {
    let connection = memdb();
    let lengths: [(i64, i64); 10] = [
        (0, 0),
        (1, 0),
        (2, -1),
        (16, -1),
        (17, -2),
        (256, -2),
        (257, -3),
        (65536, -4),
        (1 << 36, -9),
        ((1 << 36) + 1, -10),
    ];
    let rows: Vec<(i64, i64, i64)> =
        lengths.iter().map(|(len, _)| (1, 1000, 1000 + len)).collect();
    indexed_feature_table(&connection, &rows);

    let mut statement = connection
        .prepare("SELECT _gri_len, _gri_lvl FROM feat ORDER BY _rowid_")
        .unwrap();
    let observed = statement
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<Vec<(i64, i64)>>>()
        .unwrap();
    for (index, (len, expected)) in lengths.iter().enumerate() {
        assert_eq!(observed[index].0, *len, "Wrong length for row {}", index + 1);
        assert_eq!(observed[index].1, *expected, "Wrong level for length {}", len);
    }
}

#[test]
fn level_assignment_null_and_negative() {
    let connection = memdb();
    connection
        .execute_batch("CREATE TABLE feat(chrom_id INTEGER, beg INTEGER, end INTEGER)")
        .unwrap();
    let script = create_genomic_range_index_sql("feat", "chrom_id", "beg", "end", -1).unwrap();
    connection.execute_batch(&script).unwrap();
    connection
        .execute_batch(
            "INSERT INTO feat VALUES (1, NULL, 100);
             INSERT INTO feat VALUES (1, 100, NULL);
             INSERT INTO feat VALUES (1, 100, 50)",
        )
        .unwrap();
    let nulls: i64 = connection
        .query_row("SELECT COUNT(*) FROM feat WHERE _gri_lvl IS NULL", [], |row| row.get(0))
        .unwrap();
    assert_eq!(nulls, 3, "Null or negative lengths must not be assigned a level");
}

//-----------------------------------------------------------------------------

#[test]
fn literal_overlap_results() {
    let connection = memdb();
    indexed_feature_table(&connection, &[(1, 100, 200), (1, 1000, 1050)]);

    assert_eq!(overlap_rowids(&connection, (1, 150, 160)), vec![1]);
    assert_eq!(overlap_rowids(&connection, (1, 1040, 1040)), vec![2]);
    assert_eq!(overlap_rowids(&connection, (1, 300, 400)), Vec::<i64>::new());
    assert_eq!(overlap_rowids(&connection, (2, 100, 200)), Vec::<i64>::new());
}

#[test]
fn endpoint_inclusion() {
    let connection = memdb();
    indexed_feature_table(&connection, &[(1, 100, 200)]);

    // both interval endpoints participate in overlap
    assert_eq!(overlap_rowids(&connection, (1, 200, 300)), vec![1]);
    assert_eq!(overlap_rowids(&connection, (1, 0, 100)), vec![1]);
    assert_eq!(overlap_rowids(&connection, (1, 0, 99)), Vec::<i64>::new());
    assert_eq!(overlap_rowids(&connection, (1, 201, 300)), Vec::<i64>::new());
}

#[test]
fn null_query_range() {
    let connection = memdb();
    indexed_feature_table(&connection, &[(1, 100, 200)]);

    let query =
        genomic_range_rowids_sql(Some(&connection), "feat", "?1", "?2", "?3", -1, -1).unwrap();
    let sql = format!("SELECT _rowid_ FROM feat WHERE feat._rowid_ IN\n{}", query);
    let mut statement = connection.prepare(&sql).unwrap();
    let count = statement
        .query_map((None::<i64>, 0_i64, 1000_i64), |row| row.get::<_, i64>(0))
        .unwrap()
        .count();
    assert_eq!(count, 0, "Null rid must match nothing");
}

#[test]
fn text_rid_expressions() {
    let connection = memdb();
    connection
        .execute_batch("CREATE TABLE feat(chrom_id TEXT, beg INTEGER, end INTEGER)")
        .unwrap();
    connection
        .execute_batch(
            "INSERT INTO feat VALUES ('chr17', 100, 200);
             INSERT INTO feat VALUES ('chr18', 100, 200)",
        )
        .unwrap();
    let script = create_genomic_range_index_sql("feat", "chrom_id", "beg", "end", -1).unwrap();
    connection.execute_batch(&script).unwrap();

    let query =
        genomic_range_rowids_sql(Some(&connection), "feat", "?1", "?2", "?3", -1, -1).unwrap();
    let sql = format!("SELECT _rowid_ FROM feat WHERE feat._rowid_ IN\n{}", query);
    let mut statement = connection.prepare(&sql).unwrap();
    let rowids = statement
        .query_map(("chr17", 150, 160), |row| row.get::<_, i64>(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<i64>>>()
        .unwrap();
    assert_eq!(rowids, vec![1]);
}

//-----------------------------------------------------------------------------

#[test]
fn detected_level_range() {
    let connection = memdb();
    // lengths 100 and 50 both land on level 2 (16 < len <= 256)
    indexed_feature_table(&connection, &[(1, 100, 200), (1, 1000, 1050)]);
    let range = detect_level_range(&connection, "feat");
    assert!(range.is_ok(), "Detection failed: {}", range.unwrap_err());
    assert_eq!(range.unwrap(), (2, 2));

    // a single occupied level yields a single per-level sub-query
    let query =
        genomic_range_rowids_sql(Some(&connection), "feat", "?1", "?2", "?3", -1, -1).unwrap();
    assert_eq!(query.matches("UNION ALL").count(), 0, "Expected one per-level query");
    assert_eq!(query.matches("SELECT _rowid_ FROM feat INDEXED BY").count(), 1);
}

#[test]
fn detected_level_range_multiple_rids() {
    let connection = memdb();
    indexed_feature_table(
        &connection,
        &[
            (1, 0, 1),       // level 0
            (2, 0, 100),     // level 2
            (3, 0, 70000),   // level 5 (65536 < len <= 1048576)
            (3, 50, 60),     // level 1
        ],
    );
    assert_eq!(detect_level_range(&connection, "feat").unwrap(), (0, 5));

    let query =
        genomic_range_rowids_sql(Some(&connection), "feat", "?1", "?2", "?3", -1, -1).unwrap();
    assert_eq!(query.matches("UNION ALL").count(), 5, "Expected six per-level queries");
}

#[test]
fn detected_level_range_empty() {
    let connection = memdb();
    indexed_feature_table(&connection, &[]);
    assert_eq!(detect_level_range(&connection, "feat").unwrap(), (0, 15));

    // the generated query is valid and returns nothing
    assert_eq!(overlap_rowids(&connection, (1, 0, 1 << 35)), Vec::<i64>::new());
}

#[test]
fn detected_level_range_null_rows_only() {
    let connection = memdb();
    connection
        .execute_batch("CREATE TABLE feat(chrom_id INTEGER, beg INTEGER, end INTEGER)")
        .unwrap();
    let script = create_genomic_range_index_sql("feat", "chrom_id", "beg", "end", -1).unwrap();
    connection.execute_batch(&script).unwrap();
    connection
        .execute_batch(
            "INSERT INTO feat VALUES (NULL, NULL, NULL);
             INSERT INTO feat VALUES (NULL, 0, 10000000000)",
        )
        .unwrap();
    assert_eq!(detect_level_range(&connection, "feat").unwrap(), (0, 15));
}

#[test]
fn missing_index() {
    let connection = memdb();
    connection
        .execute_batch("CREATE TABLE unindexed(rid INTEGER, beg INTEGER, end INTEGER)")
        .unwrap();
    for table in ["unindexed", "nonexistent"] {
        let result = detect_level_range(&connection, table);
        assert!(
            matches!(result, Err(GenomicSQLiteError::MissingIndex { .. })),
            "Expected MissingIndex for {}",
            table
        );
    }
}

#[test]
fn corrupt_index() {
    // Fabricate a table carrying the reserved names with an out-of-domain
    // level value.
    let connection = memdb();
    connection
        .execute_batch(
            "CREATE TABLE feat(_gri_rid INTEGER, _gri_lvl INTEGER, _gri_beg INTEGER, _gri_len INTEGER);
             CREATE INDEX feat__gri ON feat(_gri_rid, _gri_lvl, _gri_beg, _gri_len);
             INSERT INTO feat VALUES (1, -16, 0, 10)",
        )
        .unwrap();
    let result = detect_level_range(&connection, "feat");
    assert!(matches!(result, Err(GenomicSQLiteError::CorruptIndex(_))));
}

//-----------------------------------------------------------------------------

#[test]
fn query_generation_without_connection() {
    let query = genomic_range_rowids_sql(None, "feat", "?1", "?2", "?3", -1, -1).unwrap();
    assert!(query.starts_with("(SELECT _rowid_ FROM"));
    assert!(query.ends_with("ORDER BY _rowid_)"));
    // safe defaults cover all 16 levels, highest first
    assert_eq!(query.matches("UNION ALL").count(), 15);
    assert!(query.contains("BETWEEN ((?1),-15,(?2)-0x1000000000000000)"));
    assert!(query.contains("AND ((?1),-0,(?3)-0)"));
    let level15 = query.find("-15,").unwrap();
    let level0 = query.rfind("-0,").unwrap();
    assert!(level15 < level0, "Levels must be emitted in descending order");
}

#[test]
fn query_generation_pinned_bounds() {
    let query = genomic_range_rowids_sql(None, "feat", "?1", "?2", "?3", 4, 2).unwrap();
    assert_eq!(query.matches("UNION ALL").count(), 2);
    assert!(query.contains("-4,(?2)-0x10000)"));
    assert!(query.contains("-2,(?2)-0x100)"));
    assert!(!query.contains("-1,(?2)"));

    // pinned floor with detected ceiling
    let connection = memdb();
    indexed_feature_table(&connection, &[(1, 0, 70000)]); // level 5
    let query =
        genomic_range_rowids_sql(Some(&connection), "feat", "?1", "?2", "?3", -1, 2).unwrap();
    assert_eq!(query.matches("UNION ALL").count(), 3, "floor 2 .. ceiling 5");
}

#[test]
fn query_generation_join_expressions() {
    let query = genomic_range_rowids_sql(
        None,
        "exons2",
        "exons.rid",
        "exons.beg",
        "exons.end",
        3,
        3,
    )
    .unwrap();
    assert!(query.contains("BETWEEN ((exons.rid),-3,(exons.beg)-0x1000) AND ((exons.rid),-3,(exons.end)-0)"));
    assert!(query.contains("(exons2._gri_beg+exons2._gri_len) >= (exons.beg)"));
}

#[test]
fn query_generation_invalid_bounds() {
    for (ceiling, floor) in [(16, 0), (4, 5), (2, -2), (100, 100)] {
        let result = genomic_range_rowids_sql(None, "feat", "?1", "?2", "?3", ceiling, floor);
        assert!(
            matches!(result, Err(GenomicSQLiteError::InvalidLevelRange { .. })),
            "Accepted ceiling {} floor {}",
            ceiling,
            floor
        );
    }
}

//-----------------------------------------------------------------------------

#[test]
fn join_matches_linear_scan() {
    let connection = memdb();
    connection
        .execute_batch(
            "CREATE TABLE query_regions(rid INTEGER, beg INTEGER, end INTEGER);
             CREATE TABLE annotations(rid INTEGER, beg INTEGER, end INTEGER)",
        )
        .unwrap();
    {
        let mut insert_region = connection
            .prepare("INSERT INTO query_regions VALUES (?1, ?2, ?3)")
            .unwrap();
        let mut insert_annotation = connection
            .prepare("INSERT INTO annotations VALUES (?1, ?2, ?3)")
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        for _ in 0..100 {
            let rid = rng.gen_range(1..=2_i64);
            let beg = rng.gen_range(0..100_000_i64);
            insert_region.execute((rid, beg, beg + rng.gen_range(1..5_000_i64))).unwrap();
        }
        for _ in 0..300 {
            let rid = rng.gen_range(1..=2_i64);
            let beg = rng.gen_range(0..100_000_i64);
            insert_annotation.execute((rid, beg, beg + rng.gen_range(0..2_000_i64))).unwrap();
        }
    }
    let script =
        create_genomic_range_index_sql("annotations", "rid", "beg", "end", -1).unwrap();
    connection.execute_batch(&script).unwrap();

    let rowids = genomic_range_rowids_sql(
        Some(&connection),
        "annotations",
        "query_regions.rid",
        "query_regions.beg",
        "query_regions.end",
        -1,
        -1,
    )
    .unwrap();
    let query = format!(
        "SELECT query_regions._rowid_, annotations._rowid_ FROM query_regions \
         LEFT JOIN annotations ON annotations._rowid_ IN\n{}\n \
         ORDER BY query_regions._rowid_, annotations._rowid_",
        rowids
    );
    let control = "SELECT query_regions._rowid_, annotations._rowid_ FROM query_regions \
                   LEFT JOIN annotations NOT INDEXED ON annotations.rid = query_regions.rid \
                   AND annotations.beg <= query_regions.end AND annotations.end >= query_regions.beg \
                   ORDER BY query_regions._rowid_, annotations._rowid_";

    let run = |sql: &str| -> Vec<(i64, Option<i64>)> {
        let mut statement = connection.prepare(sql).unwrap();
        let rows = statement
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        rows
    };
    let indexed = run(&query);
    let expected = run(control);
    assert_eq!(indexed, expected, "Join through the GRI disagrees with the linear scan");
    assert!(!indexed.is_empty());
}

#[test]
fn random_windows_match_linear_scan() {
    let mut rng = StdRng::seed_from_u64(0xBADF00D);
    let connection = memdb();
    connection
        .execute_batch("CREATE TABLE features(rid INTEGER, beg INTEGER, end INTEGER)")
        .unwrap();
    {
        let mut insert = connection
            .prepare("INSERT INTO features(rid, beg, end) VALUES (?1, ?2, ?3)")
            .unwrap();
        for _ in 0..500 {
            let rid = rng.gen_range(1..=3_i64);
            // log-uniform lengths exercise every level up to 16^9
            let level = rng.gen_range(0..=9_u32);
            let len = rng.gen_range(0..=16_i64.pow(level));
            let beg = if rng.gen_bool(0.5) {
                rng.gen_range(0..2_000_000_i64)
            } else {
                rng.gen_range(0..1_i64 << 34)
            };
            insert.execute((rid, beg, beg + len)).unwrap();
        }
    }
    let script = create_genomic_range_index_sql("features", "rid", "beg", "end", -1).unwrap();
    connection.execute_batch(&script).unwrap();

    let query = genomic_range_rowids_sql(Some(&connection), "features", "?1", "?2", "?3", -1, -1)
        .unwrap();
    let indexed_sql = format!("SELECT _rowid_ FROM features WHERE features._rowid_ IN\n{}", query);
    let mut indexed = connection.prepare(&indexed_sql).unwrap();
    let mut control = connection
        .prepare(
            "SELECT _rowid_ FROM features NOT INDEXED \
             WHERE rid = ?1 AND beg <= ?3 AND end >= ?2 ORDER BY _rowid_",
        )
        .unwrap();

    let mut total_results = 0;
    for _ in 0..5000 {
        let rid = rng.gen_range(1..=3_i64);
        let beg = if rng.gen_bool(0.5) {
            rng.gen_range(0..2_000_000_i64)
        } else {
            rng.gen_range(0..1_i64 << 34)
        };
        let end = beg + rng.gen_range(0..10_000_i64);
        let range = (rid, beg, end);

        let indexed_rows = indexed
            .query_map(range, |row| row.get::<_, i64>(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<i64>>>()
            .unwrap();
        let control_rows = control
            .query_map(range, |row| row.get::<_, i64>(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<i64>>>()
            .unwrap();
        assert_eq!(indexed_rows, control_rows, "Mismatch for window {:?}", range);

        // sorted and duplicate-free
        for pair in indexed_rows.windows(2) {
            assert!(pair[0] < pair[1], "Unsorted or duplicated rowids for {:?}", range);
        }
        total_results += indexed_rows.len();
    }
    assert!(total_results > 0, "The random windows never hit anything");
}
