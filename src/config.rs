//! Query parameters and run configuration
//!
//! `QueryParams` carries the values substituted into Q5 (region name and a
//! half-open order-date window). `QueryConfig` adds what a full run needs:
//! worker count and the input/output locations.

use crate::error::{QueryError, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::warn;

/// Date format the TPC-H `.tbl` files use for `o_orderdate`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default number of aggregation workers
pub const DEFAULT_THREADS: usize = 1;

/// Region and date window for a Q5 run
///
/// Dates are compared as plain strings; callers must use a lexically
/// ordered format such as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Exact region name to match against `r_name`
    pub region: String,
    /// Inclusive lower bound on `o_orderdate`
    pub start_date: String,
    /// Exclusive upper bound on `o_orderdate`
    pub end_date: String,
}

impl QueryParams {
    pub fn new(
        region: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// The validation substitution from the TPC-H specification
    pub fn tpch_default() -> Self {
        Self::new("ASIA", "1994-01-01", "1995-01-01")
    }

    /// True if `date` falls inside `[start_date, end_date)`
    #[inline]
    pub fn contains_date(&self, date: &str) -> bool {
        date >= self.start_date.as_str() && date < self.end_date.as_str()
    }

    /// Check required values and warn about suspicious ones
    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(QueryError::Config("region name must not be empty".into()));
        }
        if self.start_date.is_empty() {
            return Err(QueryError::Config("start date must not be empty".into()));
        }
        if self.end_date.is_empty() {
            return Err(QueryError::Config("end date must not be empty".into()));
        }

        for date in [&self.start_date, &self.end_date] {
            if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
                warn!(date = %date, "date is not YYYY-MM-DD; comparison stays lexical");
            }
        }
        if self.start_date >= self.end_date {
            warn!(
                start = %self.start_date,
                end = %self.end_date,
                "empty date window, no order can qualify"
            );
        }
        Ok(())
    }
}

/// Everything needed for one end-to-end run
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub params: QueryParams,
    /// Number of aggregation workers
    pub threads: usize,
    /// Directory holding the `.tbl` files
    pub table_path: PathBuf,
    /// File the result is written to
    pub result_path: PathBuf,
}

impl QueryConfig {
    pub fn new(
        params: QueryParams,
        threads: usize,
        table_path: impl Into<PathBuf>,
        result_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            params,
            threads,
            table_path: table_path.into(),
            result_path: result_path.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if self.threads == 0 {
            return Err(QueryError::Config(
                "thread count must be a positive integer".into(),
            ));
        }
        if self.table_path.as_os_str().is_empty() {
            return Err(QueryError::Config("table path must not be empty".into()));
        }
        if self.result_path.as_os_str().is_empty() {
            return Err(QueryError::Config("result path must not be empty".into()));
        }
        Ok(())
    }
}
