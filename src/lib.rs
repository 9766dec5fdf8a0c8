//! Parallel TPC-H Q5 engine
//!
//! Computes local supplier volume: for one region and a half-open order
//! date window, the revenue of orders placed by customers in the region
//! and filled by suppliers in the same region, grouped by supplier nation.
//!
//! The pipeline is single-shot and in memory: load the six tables, derive
//! key sets with a chain of filters, then scan lineitems in parallel.

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod physical;
pub mod storage;
pub mod tpch;

// Re-export main types
pub use cli::{write_result_file, OutputFormat, OutputFormatter};
pub use config::{QueryConfig, QueryParams};
pub use error::{QueryError, Result};
pub use execution::{ExecutionContext, QueryMetrics, QueryResult};
pub use physical::{JoinFilter, RevenueAggregator, RevenueByNation};
pub use storage::{load_tables, Tables};
pub use tpch::TpchGenerator;
