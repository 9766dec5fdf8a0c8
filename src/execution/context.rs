//! Execution context - main entry point for query execution

use crate::cli::{OutputFormat, OutputFormatter};
use crate::config::QueryParams;
use crate::error::Result;
use crate::physical::{JoinFilter, RevenueAggregator, RevenueByNation};
use crate::storage::{load_tables, Tables};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Query execution result
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Revenue per supplier nation, ascending by nation name
    pub revenue: RevenueByNation,
    /// Execution metrics
    pub metrics: QueryMetrics,
}

/// Query execution metrics
#[derive(Debug, Clone, Default)]
pub struct QueryMetrics {
    /// Time spent deriving the key sets
    pub filter_time: Duration,
    /// Time spent in the parallel lineitem scan and merge
    pub aggregate_time: Duration,
    /// Total time
    pub total_time: Duration,
    /// Number of suppliers in the region
    pub target_suppliers: usize,
    /// Number of orders from the region inside the date window
    pub target_orders: usize,
    /// Number of workers used for aggregation
    pub workers: usize,
}

impl QueryResult {
    /// Number of nations in the result
    pub fn row_count(&self) -> usize {
        self.revenue.len()
    }

    /// Iterate `(nation, revenue)` in output order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.revenue.iter().map(|(n, r)| (n.as_str(), *r))
    }
}

/// Execution context - owns the loaded tables and runs Q5 over them
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    tables: Tables,
    /// Number of aggregation workers (defaults to 1)
    parallel_partitions: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(Tables::default())
    }
}

impl ExecutionContext {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables,
            parallel_partitions: crate::config::DEFAULT_THREADS,
        }
    }

    /// Load every Q5 table from a directory of `.tbl` files
    pub fn from_tbl_dir(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_tables(path)?))
    }

    /// Set the number of aggregation workers
    pub fn with_parallel_partitions(mut self, partitions: usize) -> Self {
        self.parallel_partitions = partitions.max(1);
        self
    }

    /// Get the number of aggregation workers
    pub fn parallel_partitions(&self) -> usize {
        self.parallel_partitions
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Run Q5 for the given region and date window
    pub fn execute(&self, params: &QueryParams) -> Result<QueryResult> {
        let start = Instant::now();
        let mut metrics = QueryMetrics {
            workers: self.parallel_partitions,
            ..Default::default()
        };

        // Filter
        let filter_start = Instant::now();
        let filter = JoinFilter::build(&self.tables, params)?;
        metrics.filter_time = filter_start.elapsed();
        metrics.target_suppliers = filter.suppliers.len();
        metrics.target_orders = filter.orders.len();

        // Aggregate
        let aggregate_start = Instant::now();
        let revenue = RevenueAggregator::new(&filter, self.parallel_partitions)
            .aggregate(&self.tables.lineitem)?;
        metrics.aggregate_time = aggregate_start.elapsed();

        metrics.total_time = start.elapsed();

        info!(
            region = %params.region,
            start_date = %params.start_date,
            end_date = %params.end_date,
            workers = metrics.workers,
            nations = revenue.len(),
            filter = ?metrics.filter_time,
            aggregate = ?metrics.aggregate_time,
            "query complete"
        );

        Ok(QueryResult { revenue, metrics })
    }
}

/// Utility to print query results
pub fn print_results(result: &QueryResult) {
    println!("Row count: {}", result.row_count());
    println!(
        "Timing: filter={:?}, aggregate={:?}, total={:?} ({} workers)",
        result.metrics.filter_time,
        result.metrics.aggregate_time,
        result.metrics.total_time,
        result.metrics.workers
    );
    println!();

    if result.row_count() > 0 {
        let _ = OutputFormatter::new(OutputFormat::Table).print(&result.revenue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::tpch::{Customer, LineItem, Nation, Order, Region, Supplier};

    fn create_test_context() -> ExecutionContext {
        let tables = Tables {
            region: vec![Region::new(2, "ASIA"), Region::new(3, "EUROPE")],
            nation: vec![Nation::new(8, "INDIA", 2), Nation::new(7, "GERMANY", 3)],
            customer: vec![Customer::new(1, 8), Customer::new(2, 7)],
            supplier: vec![Supplier::new(1, 8), Supplier::new(2, 7)],
            orders: vec![
                Order::new(100, 1, "1994-02-01"),
                Order::new(200, 2, "1994-02-01"),
            ],
            lineitem: vec![
                LineItem::new(100, 1, "1000.00", "0.10"),
                LineItem::new(200, 2, "500.00", "0.00"),
            ],
        };
        ExecutionContext::new(tables)
    }

    #[test]
    fn test_execute_asia() {
        let ctx = create_test_context();
        let result = ctx.execute(&QueryParams::tpch_default()).unwrap();

        assert_eq!(result.row_count(), 1);
        let (nation, revenue) = result.iter().next().unwrap();
        assert_eq!(nation, "INDIA");
        assert!((revenue - 900.0).abs() < 1e-9);
        assert_eq!(result.metrics.target_suppliers, 1);
        assert_eq!(result.metrics.target_orders, 1);
    }

    #[test]
    fn test_execute_europe() {
        let ctx = create_test_context().with_parallel_partitions(3);
        let params = QueryParams::new("EUROPE", "1994-01-01", "1995-01-01");
        let result = ctx.execute(&params).unwrap();

        assert_eq!(result.metrics.workers, 3);
        assert_eq!(result.revenue.get("GERMANY").copied(), Some(500.0));
    }

    #[test]
    fn test_unknown_region() {
        let ctx = create_test_context();
        let params = QueryParams::new("ATLANTIS", "1994-01-01", "1995-01-01");
        assert!(matches!(
            ctx.execute(&params),
            Err(QueryError::RegionNotFound(_))
        ));
    }

    #[test]
    fn test_parallel_partitions_clamped() {
        let ctx = ExecutionContext::default().with_parallel_partitions(0);
        assert_eq!(ctx.parallel_partitions(), 1);
        assert!(ctx.tables().is_empty());
    }
}
