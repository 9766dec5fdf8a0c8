//! In-memory row store
//!
//! `Tables` holds the six relations Q5 touches. Tables are loaded once,
//! then only read: every later phase borrows them immutably.

mod tbl;

pub use tbl::{load_tables, read_table, TblRecord};

use crate::tpch::{Customer, LineItem, Nation, Order, Region, Supplier};
use std::fmt;

/// The six Q5 relations, each as a vector of fixed-layout rows in file order
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub region: Vec<Region>,
    pub nation: Vec<Nation>,
    pub customer: Vec<Customer>,
    pub supplier: Vec<Supplier>,
    pub orders: Vec<Order>,
    pub lineitem: Vec<LineItem>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStatistics {
    pub region: usize,
    pub nation: usize,
    pub customer: usize,
    pub supplier: usize,
    pub orders: usize,
    pub lineitem: usize,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statistics(&self) -> TableStatistics {
        TableStatistics {
            region: self.region.len(),
            nation: self.nation.len(),
            customer: self.customer.len(),
            supplier: self.supplier.len(),
            orders: self.orders.len(),
            lineitem: self.lineitem.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statistics().total() == 0
    }
}

impl TableStatistics {
    pub fn total(&self) -> usize {
        self.region + self.nation + self.customer + self.supplier + self.orders + self.lineitem
    }
}

impl fmt::Display for TableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "region={} nation={} customer={} supplier={} orders={} lineitem={}",
            self.region, self.nation, self.customer, self.supplier, self.orders, self.lineitem
        )
    }
}
