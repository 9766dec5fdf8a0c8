//! TPC-H data generator
//!
//! Produces a TPC-H shaped dataset for the six Q5 tables. Values are not
//! dbgen-exact, but key relationships, date ranges and price/discount
//! formats match, so generated directories load like real `.tbl` output.

use crate::config::DATE_FORMAT;
use crate::error::Result;
use crate::storage::Tables;
use crate::tpch::schema::*;
use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const REGIONS: [(i64, &str); 5] = [
    (0, "AFRICA"),
    (1, "AMERICA"),
    (2, "ASIA"),
    (3, "EUROPE"),
    (4, "MIDDLE EAST"),
];

const NATIONS: [(i64, &str, i64); 25] = [
    (0, "ALGERIA", 0),
    (1, "ARGENTINA", 1),
    (2, "BRAZIL", 1),
    (3, "CANADA", 1),
    (4, "EGYPT", 4),
    (5, "ETHIOPIA", 0),
    (6, "FRANCE", 3),
    (7, "GERMANY", 3),
    (8, "INDIA", 2),
    (9, "INDONESIA", 2),
    (10, "IRAN", 4),
    (11, "IRAQ", 4),
    (12, "JAPAN", 2),
    (13, "JORDAN", 4),
    (14, "KENYA", 0),
    (15, "MOROCCO", 0),
    (16, "MOZAMBIQUE", 0),
    (17, "PERU", 1),
    (18, "CHINA", 2),
    (19, "ROMANIA", 3),
    (20, "SAUDI ARABIA", 4),
    (21, "VIETNAM", 2),
    (22, "RUSSIA", 3),
    (23, "UNITED KINGDOM", 3),
    (24, "UNITED STATES", 1),
];

/// Order dates span 1992-01-01 .. 1998-12-31
const DATE_RANGE_DAYS: i64 = 2557;

/// TPC-H data generator
pub struct TpchGenerator {
    scale_factor: f64,
    rng: StdRng,
    base_date: NaiveDate,
}

impl TpchGenerator {
    pub fn new(scale_factor: f64) -> Self {
        Self::with_seed(scale_factor, 42)
    }

    pub fn with_seed(scale_factor: f64, seed: u64) -> Self {
        Self {
            scale_factor,
            rng: StdRng::seed_from_u64(seed),
            base_date: NaiveDate::from_ymd_opt(1992, 1, 1).unwrap_or_default(),
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Generate all Q5 tables in memory
    pub fn generate(&mut self) -> Tables {
        let counts = TpchRowCounts::for_scale_factor(self.scale_factor);

        // Generate in order of dependencies
        let region = Self::generate_region();
        let nation = Self::generate_nation();
        let supplier = self.generate_supplier(counts.supplier);
        let customer = self.generate_customer(counts.customer);
        let orders = self.generate_orders(counts.orders, counts.customer);
        let lineitem = self.generate_lineitem(counts.lineitem, counts.orders, counts.supplier);

        Tables {
            region,
            nation,
            customer,
            supplier,
            orders,
            lineitem,
        }
    }

    /// Generate all Q5 tables and write them as `.tbl` files
    ///
    /// Lines carry every declared column and dbgen's trailing `|`.
    /// Columns Q5 never reads get deterministic filler values.
    pub fn write_tbl(&mut self, output_dir: &Path) -> Result<Tables> {
        fs::create_dir_all(output_dir)?;
        let tables = self.generate();

        write_table_file(output_dir, "region", &tables.region, |w, r| {
            writeln!(w, "{}|{}|region comment|", r.region_key, r.name)
        })?;
        write_table_file(output_dir, "nation", &tables.nation, |w, n| {
            writeln!(
                w,
                "{}|{}|{}|nation comment|",
                n.nation_key, n.name, n.region_key
            )
        })?;
        write_table_file(output_dir, "supplier", &tables.supplier, |w, s| {
            writeln!(
                w,
                "{k}|Supplier#{k:09}|Address {k}|{n}|{p}|{b:.2}|supplier comment|",
                k = s.supp_key,
                n = s.nation_key,
                p = phone(s.supp_key, s.nation_key),
                b = acctbal(s.supp_key),
            )
        })?;
        write_table_file(output_dir, "customer", &tables.customer, |w, c| {
            let segments = ["AUTOMOBILE", "BUILDING", "FURNITURE", "HOUSEHOLD", "MACHINERY"];
            writeln!(
                w,
                "{k}|Customer#{k:09}|Address {k}|{n}|{p}|{b:.2}|{s}|customer comment|",
                k = c.cust_key,
                n = c.nation_key,
                p = phone(c.cust_key, c.nation_key),
                b = acctbal(c.cust_key),
                s = segments[c.cust_key as usize % segments.len()],
            )
        })?;
        write_table_file(output_dir, "orders", &tables.orders, |w, o| {
            let status = ['O', 'F', 'P'];
            let priorities = ["1-URGENT", "2-HIGH", "3-MEDIUM", "4-NOT SPECIFIED", "5-LOW"];
            let i = o.order_key as usize;
            writeln!(
                w,
                "{}|{}|{}|{:.2}|{}|{}|Clerk#{:09}|0|order comment|",
                o.order_key,
                o.cust_key,
                status[i % status.len()],
                1000.0 + (i % 5000) as f64 * 97.31,
                o.order_date,
                priorities[i % priorities.len()],
                (i % 1000) + 1,
            )
        })?;

        let mut line_number = 0;
        let mut previous_order = None;
        write_table_file(output_dir, "lineitem", &tables.lineitem, |w, l| {
            let shipinstruct = ["DELIVER IN PERSON", "COLLECT COD", "NONE", "TAKE BACK RETURN"];
            let shipmode = ["REG AIR", "AIR", "RAIL", "SHIP", "TRUCK", "MAIL", "FOB"];
            if previous_order != Some(l.order_key) {
                previous_order = Some(l.order_key);
                line_number = 0;
            }
            line_number += 1;
            let i = l.order_key as usize + line_number;
            writeln!(
                w,
                "{}|{}|{}|{}|{}|{}|{}|0.0{}|{}|{}|1995-06-01|1995-06-15|1995-06-20|{}|{}|lineitem comment|",
                l.order_key,
                (i % 2000) + 1,
                l.supp_key,
                line_number,
                (i % 50) + 1,
                l.extended_price,
                l.discount,
                i % 9,
                ['N', 'R', 'A'][i % 3],
                ['O', 'F'][i % 2],
                shipinstruct[i % shipinstruct.len()],
                shipmode[i % shipmode.len()],
            )
        })?;

        info!(
            path = %output_dir.display(),
            scale_factor = self.scale_factor,
            rows = %tables.statistics(),
            "wrote tbl files"
        );
        Ok(tables)
    }

    fn generate_region() -> Vec<Region> {
        REGIONS
            .iter()
            .map(|(k, name)| Region::new(*k, *name))
            .collect()
    }

    fn generate_nation() -> Vec<Nation> {
        NATIONS
            .iter()
            .map(|(k, name, r)| Nation::new(*k, *name, *r))
            .collect()
    }

    /// Suppliers cycle through nations so every region has suppliers once
    /// there are at least 25 of them
    fn generate_supplier(&mut self, count: usize) -> Vec<Supplier> {
        (0..count)
            .map(|i| Supplier::new((i + 1) as i64, (i % NATIONS.len()) as i64))
            .collect()
    }

    fn generate_customer(&mut self, count: usize) -> Vec<Customer> {
        (0..count)
            .map(|i| Customer::new((i + 1) as i64, self.rng.gen_range(0..25)))
            .collect()
    }

    fn generate_orders(&mut self, count: usize, cust_count: usize) -> Vec<Order> {
        (0..count)
            .map(|i| {
                let offset = self.rng.gen_range(0..DATE_RANGE_DAYS);
                let date = self.base_date + Duration::days(offset);
                Order::new(
                    (i + 1) as i64,
                    ((i % cust_count) + 1) as i64,
                    date.format(DATE_FORMAT).to_string(),
                )
            })
            .collect()
    }

    fn generate_lineitem(
        &mut self,
        count: usize,
        order_count: usize,
        supp_count: usize,
    ) -> Vec<LineItem> {
        let mut items = Vec::with_capacity(count);
        let mut current_order: i64 = 1;

        for i in 0..count {
            // Move to next order periodically
            if i > 0 && self.rng.gen_bool(0.25) {
                current_order = ((current_order as usize % order_count) + 1) as i64;
            }

            let price: f64 = self.rng.gen_range(900.0..100000.0);
            let discount = self.rng.gen_range(0..=10) as f64 / 100.0;

            items.push(LineItem::new(
                current_order,
                ((i % supp_count) + 1) as i64,
                format!("{:.2}", price),
                format!("{:.2}", discount),
            ));
        }

        items
    }
}

fn phone(key: i64, nation_key: i64) -> String {
    format!(
        "{}-{:03}-{:03}-{:04}",
        nation_key + 10,
        key % 1000,
        (key * 7) % 1000,
        (key * 13) % 10000
    )
}

fn acctbal(key: i64) -> f64 {
    (key % 10_999) as f64 - 999.99
}

fn write_table_file<T, F>(output_dir: &Path, table_name: &str, rows: &[T], mut line: F) -> Result<()>
where
    F: FnMut(&mut BufWriter<File>, &T) -> std::io::Result<()>,
{
    let path = output_dir.join(format!("{}.tbl", table_name));
    let mut writer = BufWriter::new(File::create(&path)?);
    for row in rows {
        line(&mut writer, row)?;
    }
    writer.flush()?;

    info!(table = table_name, rows = rows.len(), path = %path.display(), "wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::load_tables;

    #[test]
    fn test_generate_small() {
        let tables = TpchGenerator::new(0.001).generate();

        assert_eq!(tables.region.len(), 5);
        assert_eq!(tables.nation.len(), 25);
        assert_eq!(tables.supplier.len(), 10);
        assert_eq!(tables.customer.len(), 150);
        assert_eq!(tables.orders.len(), 1500);
        assert_eq!(tables.lineitem.len(), 6000);
    }

    #[test]
    fn test_generated_values_in_range() {
        let tables = TpchGenerator::new(0.001).generate();

        for order in &tables.orders {
            assert!(order.order_date.as_str() >= "1992-01-01");
            assert!(order.order_date.as_str() <= "1998-12-31");
            assert_eq!(order.order_date.len(), 10);
        }
        for item in &tables.lineitem {
            let discount: f64 = item.discount.parse().unwrap();
            assert!((0.0..=0.10).contains(&discount));
            assert!(item.supp_key >= 1 && item.supp_key <= 10);
            assert!(item.order_key >= 1 && item.order_key <= 1500);
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = TpchGenerator::with_seed(0.001, 7).generate();
        let b = TpchGenerator::with_seed(0.001, 7).generate();
        let c = TpchGenerator::with_seed(0.001, 8).generate();

        assert_eq!(a.orders, b.orders);
        assert_eq!(a.lineitem, b.lineitem);
        assert_ne!(a.lineitem, c.lineitem);
    }

    #[test]
    fn test_tbl_files_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let written = TpchGenerator::new(0.001).write_tbl(dir.path()).unwrap();
        let loaded = load_tables(dir.path()).unwrap();

        assert_eq!(loaded.statistics(), written.statistics());
        assert_eq!(loaded.region, written.region);
        assert_eq!(loaded.nation, written.nation);
        assert_eq!(loaded.orders, written.orders);
        assert_eq!(loaded.lineitem, written.lineitem);
    }
}
