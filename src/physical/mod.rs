//! Physical execution module
//!
//! The Q5 pipeline: key-set filtering followed by parallel aggregation

pub mod aggregate;
pub mod filter;

pub use aggregate::{RevenueAggregator, RevenueByNation};
pub use filter::JoinFilter;
