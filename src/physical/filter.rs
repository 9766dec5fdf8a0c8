//! Join filter pipeline
//!
//! Narrows the lineitem scan to rows that can contribute to Q5 by deriving
//! key sets in four passes:
//!
//! 1. region name -> region key
//! 2. region key -> target nations (plus the full nation name lookup)
//! 3. target nations -> target suppliers and target customers
//! 4. target customers + date window -> target orders
//!
//! Every pass is a single linear scan of its table. The resulting sets are
//! immutable and shared read-only with the aggregation workers.

use crate::config::QueryParams;
use crate::error::{QueryError, Result};
use crate::storage::Tables;
use crate::tpch::{Customer, Nation, Order, Region, Supplier};
use hashbrown::{HashMap, HashSet};
use tracing::debug;

/// Key sets and lookups produced by the filter pipeline
#[derive(Debug, Clone, Default)]
pub struct JoinFilter {
    /// Key of the requested region
    pub region_key: i64,
    /// Nations belonging to the region
    pub nations: HashSet<i64>,
    /// Suppliers located in a target nation
    pub suppliers: HashSet<i64>,
    /// Customers located in a target nation
    pub customers: HashSet<i64>,
    /// Orders of target customers placed inside the date window
    pub orders: HashSet<i64>,
    /// Name of every nation, regardless of region
    pub nation_names: HashMap<i64, String>,
    /// Nation of each target supplier
    pub supplier_nations: HashMap<i64, i64>,
}

impl JoinFilter {
    /// Run all four passes over `tables`
    ///
    /// Fails with `RegionNotFound` before scanning anything else if no
    /// region row carries the requested name.
    pub fn build(tables: &Tables, params: &QueryParams) -> Result<Self> {
        let region_key = resolve_region(&tables.region, &params.region)?;
        let (nations, nation_names) = filter_nations(&tables.nation, region_key);

        // Supplier and customer scans are independent
        let ((suppliers, supplier_nations), customers) = rayon::join(
            || filter_suppliers(&tables.supplier, &nations),
            || filter_customers(&tables.customer, &nations),
        );

        let orders = filter_orders(&tables.orders, &customers, params);

        debug!(
            region = %params.region,
            region_key,
            nations = nations.len(),
            suppliers = suppliers.len(),
            customers = customers.len(),
            orders = orders.len(),
            "join filter built"
        );

        Ok(Self {
            region_key,
            nations,
            suppliers,
            customers,
            orders,
            nation_names,
            supplier_nations,
        })
    }

    /// True if a lineitem with these keys passes both membership checks
    #[inline]
    pub fn matches(&self, supp_key: i64, order_key: i64) -> bool {
        self.suppliers.contains(&supp_key) && self.orders.contains(&order_key)
    }

    /// Name of the nation a target supplier belongs to
    pub fn supplier_nation_name(&self, supp_key: i64) -> Result<&str> {
        let nation_key = self.supplier_nations.get(&supp_key).ok_or_else(|| {
            QueryError::Internal(format!("supplier {} is not a target supplier", supp_key))
        })?;
        self.nation_names
            .get(nation_key)
            .map(String::as_str)
            .ok_or_else(|| QueryError::Internal(format!("nation {} has no name", nation_key)))
    }
}

/// Key of the first region whose name equals `name` exactly
pub fn resolve_region(regions: &[Region], name: &str) -> Result<i64> {
    regions
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.region_key)
        .ok_or_else(|| QueryError::RegionNotFound(name.to_string()))
}

/// Nations in `region_key`, and the name lookup for all nations
pub fn filter_nations(nations: &[Nation], region_key: i64) -> (HashSet<i64>, HashMap<i64, String>) {
    let mut targets = HashSet::new();
    let mut names = HashMap::with_capacity(nations.len());

    for nation in nations {
        names.insert(nation.nation_key, nation.name.clone());
        if nation.region_key == region_key {
            targets.insert(nation.nation_key);
        }
    }

    (targets, names)
}

/// Suppliers located in a target nation, with each one's nation key
pub fn filter_suppliers(
    suppliers: &[Supplier],
    nations: &HashSet<i64>,
) -> (HashSet<i64>, HashMap<i64, i64>) {
    let mut targets = HashSet::new();
    let mut supplier_nations = HashMap::new();

    for supplier in suppliers.iter().filter(|s| nations.contains(&s.nation_key)) {
        targets.insert(supplier.supp_key);
        supplier_nations.insert(supplier.supp_key, supplier.nation_key);
    }

    (targets, supplier_nations)
}

/// Customers located in a target nation
pub fn filter_customers(customers: &[Customer], nations: &HashSet<i64>) -> HashSet<i64> {
    customers
        .iter()
        .filter(|c| nations.contains(&c.nation_key))
        .map(|c| c.cust_key)
        .collect()
}

/// Orders placed by a target customer with `start_date <= o_orderdate < end_date`
pub fn filter_orders(
    orders: &[Order],
    customers: &HashSet<i64>,
    params: &QueryParams,
) -> HashSet<i64> {
    orders
        .iter()
        .filter(|o| customers.contains(&o.cust_key) && params.contains_date(&o.order_date))
        .map(|o| o.order_key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpch::LineItem;

    fn sample_tables() -> Tables {
        Tables {
            region: vec![Region::new(2, "ASIA"), Region::new(3, "EUROPE")],
            nation: vec![
                Nation::new(8, "INDIA", 2),
                Nation::new(12, "JAPAN", 2),
                Nation::new(7, "GERMANY", 3),
            ],
            customer: vec![
                Customer::new(1, 8),
                Customer::new(2, 7),
                Customer::new(3, 12),
                // nation 99 does not exist
                Customer::new(4, 99),
            ],
            supplier: vec![
                Supplier::new(1, 8),
                Supplier::new(2, 7),
                Supplier::new(3, 12),
            ],
            orders: vec![
                Order::new(100, 1, "1994-02-01"),
                Order::new(101, 2, "1994-02-01"),
                Order::new(102, 3, "1993-12-31"),
                Order::new(103, 3, "1994-01-01"),
                Order::new(104, 1, "1995-01-01"),
                Order::new(105, 4, "1994-06-01"),
            ],
            lineitem: vec![LineItem::new(100, 1, "1000.00", "0.10")],
        }
    }

    #[test]
    fn test_build_derives_all_sets() {
        let tables = sample_tables();
        let filter = JoinFilter::build(&tables, &QueryParams::tpch_default()).unwrap();

        assert_eq!(filter.region_key, 2);
        assert_eq!(filter.nations, HashSet::from([8, 12]));
        assert_eq!(filter.suppliers, HashSet::from([1, 3]));
        assert_eq!(filter.customers, HashSet::from([1, 3]));
        assert_eq!(filter.orders, HashSet::from([100, 103]));
        assert_eq!(filter.supplier_nations.get(&3), Some(&12));
        assert!(!filter.supplier_nations.contains_key(&2));
        // Name lookup covers nations outside the region too
        assert_eq!(filter.nation_names.get(&7).map(String::as_str), Some("GERMANY"));
    }

    #[test]
    fn test_unknown_region_fails() {
        let tables = sample_tables();
        let params = QueryParams::new("asia", "1994-01-01", "1995-01-01");
        match JoinFilter::build(&tables, &params) {
            Err(QueryError::RegionNotFound(name)) => assert_eq!(name, "asia"),
            other => panic!("expected RegionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_first_matching_region_wins() {
        let regions = vec![
            Region::new(5, "ASIA"),
            Region::new(2, "ASIA"),
            Region::new(3, "EUROPE"),
        ];
        assert_eq!(resolve_region(&regions, "ASIA").unwrap(), 5);
    }

    #[test]
    fn test_order_window_is_half_open() {
        let customers = HashSet::from([1]);
        let orders = vec![
            Order::new(1, 1, "1994-01-01"),
            Order::new(2, 1, "1994-12-31"),
            Order::new(3, 1, "1995-01-01"),
            Order::new(4, 1, "1993-12-31"),
            Order::new(5, 2, "1994-06-01"),
        ];
        let targets = filter_orders(&orders, &customers, &QueryParams::tpch_default());
        assert_eq!(targets, HashSet::from([1, 2]));
    }

    #[test]
    fn test_supplier_nation_name() {
        let tables = sample_tables();
        let filter = JoinFilter::build(&tables, &QueryParams::tpch_default()).unwrap();

        assert_eq!(filter.supplier_nation_name(1).unwrap(), "INDIA");
        assert_eq!(filter.supplier_nation_name(3).unwrap(), "JAPAN");
        assert!(matches!(
            filter.supplier_nation_name(2),
            Err(QueryError::Internal(_))
        ));
    }

    #[test]
    fn test_matches_requires_both_keys() {
        let tables = sample_tables();
        let filter = JoinFilter::build(&tables, &QueryParams::tpch_default()).unwrap();

        assert!(filter.matches(1, 100));
        assert!(!filter.matches(2, 100));
        assert!(!filter.matches(1, 101));
    }
}
