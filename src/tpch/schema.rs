//! TPC-H table layouts and row types
//!
//! Each row type keeps only the fields Q5 reads. The column lists give the
//! full declared order of the pipe-delimited `.tbl` files.

/// Columns of `region.tbl`
pub const REGION_COLUMNS: &[&str] = &["regionkey", "name", "comment"];

/// Columns of `nation.tbl`
pub const NATION_COLUMNS: &[&str] = &["nationkey", "name", "regionkey", "comment"];

/// Columns of `customer.tbl`
pub const CUSTOMER_COLUMNS: &[&str] = &[
    "custkey",
    "name",
    "address",
    "nationkey",
    "phone",
    "acctbal",
    "mktsegment",
    "comment",
];

/// Columns of `orders.tbl`
pub const ORDERS_COLUMNS: &[&str] = &[
    "orderkey",
    "custkey",
    "orderstatus",
    "totalprice",
    "orderdate",
    "orderpriority",
    "clerk",
    "shippriority",
    "comment",
];

/// Columns of `lineitem.tbl`
pub const LINEITEM_COLUMNS: &[&str] = &[
    "orderkey",
    "partkey",
    "suppkey",
    "linenumber",
    "quantity",
    "extendedprice",
    "discount",
    "tax",
    "returnflag",
    "linestatus",
    "shipdate",
    "commitdate",
    "receiptdate",
    "shipinstruct",
    "shipmode",
    "comment",
];

/// Columns of `supplier.tbl`
pub const SUPPLIER_COLUMNS: &[&str] = &[
    "suppkey",
    "name",
    "address",
    "nationkey",
    "phone",
    "acctbal",
    "comment",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub region_key: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nation {
    pub nation_key: i64,
    pub name: String,
    pub region_key: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    pub cust_key: i64,
    pub nation_key: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supplier {
    pub supp_key: i64,
    pub nation_key: i64,
}

/// A row of ORDERS
///
/// `order_date` stays textual; range checks compare it lexically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_key: i64,
    pub cust_key: i64,
    pub order_date: String,
}

/// A row of LINEITEM
///
/// Price and discount are kept as the raw column text and parsed only for
/// rows that survive both key filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub order_key: i64,
    pub supp_key: i64,
    pub extended_price: String,
    pub discount: String,
}

impl Region {
    pub fn new(region_key: i64, name: impl Into<String>) -> Self {
        Self {
            region_key,
            name: name.into(),
        }
    }
}

impl Nation {
    pub fn new(nation_key: i64, name: impl Into<String>, region_key: i64) -> Self {
        Self {
            nation_key,
            name: name.into(),
            region_key,
        }
    }
}

impl Customer {
    pub fn new(cust_key: i64, nation_key: i64) -> Self {
        Self {
            cust_key,
            nation_key,
        }
    }
}

impl Supplier {
    pub fn new(supp_key: i64, nation_key: i64) -> Self {
        Self {
            supp_key,
            nation_key,
        }
    }
}

impl Order {
    pub fn new(order_key: i64, cust_key: i64, order_date: impl Into<String>) -> Self {
        Self {
            order_key,
            cust_key,
            order_date: order_date.into(),
        }
    }
}

impl LineItem {
    pub fn new(
        order_key: i64,
        supp_key: i64,
        extended_price: impl Into<String>,
        discount: impl Into<String>,
    ) -> Self {
        Self {
            order_key,
            supp_key,
            extended_price: extended_price.into(),
            discount: discount.into(),
        }
    }
}

/// Scale factor row counts
pub struct TpchRowCounts {
    pub region: usize,
    pub nation: usize,
    pub supplier: usize,
    pub customer: usize,
    pub orders: usize,
    pub lineitem: usize,
}

impl TpchRowCounts {
    /// Get row counts for a given scale factor
    ///
    /// Every scaled table keeps at least one row so tiny factors still
    /// produce joinable data.
    pub fn for_scale_factor(sf: f64) -> Self {
        let scaled = |base: f64| ((base * sf) as usize).max(1);
        Self {
            region: 5,
            nation: 25,
            supplier: scaled(10_000.0),
            customer: scaled(150_000.0),
            orders: scaled(1_500_000.0),
            lineitem: scaled(6_000_000.0),
        }
    }
}
