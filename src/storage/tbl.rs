//! Pipe-delimited `.tbl` table reader
//!
//! One row per line, fields separated by `|`. Fields beyond the declared
//! column count (including the empty field after dbgen's trailing `|`) are
//! ignored. Rows missing a needed field, or with a non-integer key, are
//! skipped and counted rather than failing the load. Bytes that are not
//! valid UTF-8 are decoded lossily, so they never fail a load on their own.

use super::Tables;
use crate::error::{QueryError, Result};
use crate::tpch::{
    Customer, LineItem, Nation, Order, Region, Supplier, CUSTOMER_COLUMNS, LINEITEM_COLUMNS,
    NATION_COLUMNS, ORDERS_COLUMNS, REGION_COLUMNS, SUPPLIER_COLUMNS,
};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A row type that can be decoded from one `.tbl` line
pub trait TblRecord: Sized {
    /// Table name; the file read is `<TABLE>.tbl`
    const TABLE: &'static str;
    /// Declared column order of the file
    const COLUMNS: &'static [&'static str];

    /// Decode a row from its fields, at most `COLUMNS.len()` of them.
    /// The error is a human-readable reason used when the row is skipped.
    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String>;
}

fn text<'a, T: TblRecord>(fields: &[&'a str], idx: usize) -> std::result::Result<&'a str, String> {
    fields
        .get(idx)
        .copied()
        .ok_or_else(|| format!("missing column {}", T::COLUMNS[idx]))
}

fn key<T: TblRecord>(fields: &[&str], idx: usize) -> std::result::Result<i64, String> {
    let raw = text::<T>(fields, idx)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("column {} is not an integer key: {:?}", T::COLUMNS[idx], raw))
}

impl TblRecord for Region {
    const TABLE: &'static str = "region";
    const COLUMNS: &'static [&'static str] = REGION_COLUMNS;

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(Region::new(key::<Self>(fields, 0)?, text::<Self>(fields, 1)?))
    }
}

impl TblRecord for Nation {
    const TABLE: &'static str = "nation";
    const COLUMNS: &'static [&'static str] = NATION_COLUMNS;

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(Nation::new(
            key::<Self>(fields, 0)?,
            text::<Self>(fields, 1)?,
            key::<Self>(fields, 2)?,
        ))
    }
}

impl TblRecord for Customer {
    const TABLE: &'static str = "customer";
    const COLUMNS: &'static [&'static str] = CUSTOMER_COLUMNS;

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(Customer::new(key::<Self>(fields, 0)?, key::<Self>(fields, 3)?))
    }
}

impl TblRecord for Supplier {
    const TABLE: &'static str = "supplier";
    const COLUMNS: &'static [&'static str] = SUPPLIER_COLUMNS;

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(Supplier::new(key::<Self>(fields, 0)?, key::<Self>(fields, 3)?))
    }
}

impl TblRecord for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = ORDERS_COLUMNS;

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(Order::new(
            key::<Self>(fields, 0)?,
            key::<Self>(fields, 1)?,
            text::<Self>(fields, 4)?,
        ))
    }
}

impl TblRecord for LineItem {
    const TABLE: &'static str = "lineitem";
    const COLUMNS: &'static [&'static str] = LINEITEM_COLUMNS;

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(LineItem::new(
            key::<Self>(fields, 0)?,
            key::<Self>(fields, 2)?,
            text::<Self>(fields, 5)?,
            text::<Self>(fields, 6)?,
        ))
    }
}

/// Read `<dir>/<T::TABLE>.tbl` into rows, preserving file order
pub fn read_table<T: TblRecord>(dir: &Path) -> Result<Vec<T>> {
    let path = dir.join(format!("{}.tbl", T::TABLE));
    let file = File::open(&path).map_err(|source| QueryError::TableLoad {
        path: path.clone(),
        source,
    })?;

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| QueryError::TableLoad {
                path: path.clone(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        // Invalid UTF-8 is replaced with U+FFFD; the row itself is kept
        let decoded = String::from_utf8_lossy(&buf);
        if matches!(decoded, Cow::Owned(_)) {
            debug!(table = T::TABLE, line = line_no, "replaced invalid UTF-8 bytes");
        }
        let line = decoded.trim_end_matches('\n').trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('|').take(T::COLUMNS.len()).collect();
        match T::from_fields(&fields) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                skipped += 1;
                debug!(table = T::TABLE, line = line_no, %reason, "skipping row");
            }
        }
    }

    if skipped > 0 {
        warn!(
            table = T::TABLE,
            skipped,
            kept = rows.len(),
            "skipped malformed rows"
        );
    }
    Ok(rows)
}

/// Load all six Q5 tables from a directory of `.tbl` files
pub fn load_tables(dir: impl AsRef<Path>) -> Result<Tables> {
    let dir = dir.as_ref();
    let start = Instant::now();

    let tables = Tables {
        region: read_table(dir)?,
        nation: read_table(dir)?,
        customer: read_table(dir)?,
        supplier: read_table(dir)?,
        orders: read_table(dir)?,
        lineitem: read_table(dir)?,
    };

    info!(
        path = %dir.display(),
        rows = %tables.statistics(),
        elapsed = ?start.elapsed(),
        "loaded tables"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, table: &str, contents: &str) {
        fs::write(dir.join(format!("{}.tbl", table)), contents).unwrap();
    }

    #[test]
    fn test_read_dbgen_style_lines() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "nation",
            "0|ALGERIA|0| haggle carefully|\n8|INDIA|2|ss excuses|\n",
        );

        let nations: Vec<Nation> = read_table(dir.path()).unwrap();
        assert_eq!(
            nations,
            vec![Nation::new(0, "ALGERIA", 0), Nation::new(8, "INDIA", 2)]
        );
    }

    #[test]
    fn test_extra_trailing_columns_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "region", "2|ASIA|comment|extra|more\n");

        let regions: Vec<Region> = read_table(dir.path()).unwrap();
        assert_eq!(regions, vec![Region::new(2, "ASIA")]);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "orders",
            "1|10|O|100.0|1994-02-01|1-URGENT|Clerk#1|0|c|\n\
             \n\
             x|10|O|100.0|1994-02-01|1-URGENT|Clerk#1|0|c|\n\
             3|11|O\n\
             4|12|F|5.0|1995-06-30|2-HIGH|Clerk#2|0|c|\r\n",
        );

        let orders: Vec<Order> = read_table(dir.path()).unwrap();
        assert_eq!(
            orders,
            vec![
                Order::new(1, 10, "1994-02-01"),
                Order::new(4, 12, "1995-06-30")
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_row_does_not_fail_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("nation.tbl"),
            b"0|ALGERIA|0|ok|\n8|INDIA|2|bad \xff comment|\n12|JAPAN|2|ok|\n9|INDON\xc9SIA|2|latin-1|\n",
        )
        .unwrap();

        let nations: Vec<Nation> = read_table(dir.path()).unwrap();
        assert_eq!(nations.len(), 4);
        assert_eq!(nations[1], Nation::new(8, "INDIA", 2));
        assert_eq!(nations[2], Nation::new(12, "JAPAN", 2));
        assert_eq!(nations[3].name, "INDON\u{FFFD}SIA");
    }

    #[test]
    fn test_invalid_utf8_key_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("region.tbl"),
            b"2|ASIA|c|\n\xff3|EUROPE|c|\n",
        )
        .unwrap();

        let regions: Vec<Region> = read_table(dir.path()).unwrap();
        assert_eq!(regions, vec![Region::new(2, "ASIA")]);
    }

    #[test]
    fn test_lineitem_keeps_raw_numeric_text() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "lineitem",
            "100|5|1|1|17|1000.00|0.10|0.02|N|O|1994-03-01|1994-03-05|1994-03-10|NONE|AIR|c|\n\
             101|5|2|1|17|not-a-number|0.10|0.02|N|O|1994-03-01|1994-03-05|1994-03-10|NONE|AIR|c|\n",
        );

        let items: Vec<LineItem> = read_table(dir.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], LineItem::new(100, 1, "1000.00", "0.10"));
        assert_eq!(items[1].extended_price, "not-a-number");
    }

    #[test]
    fn test_missing_file_is_table_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table::<Supplier>(dir.path()).unwrap_err();
        match err {
            QueryError::TableLoad { path, .. } => assert!(path.ends_with("supplier.tbl")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_tables_requires_every_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "region", "2|ASIA|c|\n");
        write(dir.path(), "nation", "8|INDIA|2|c|\n");
        assert!(matches!(
            load_tables(dir.path()),
            Err(QueryError::TableLoad { .. })
        ));
    }
}
