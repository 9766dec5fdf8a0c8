//! Parallel revenue aggregation
//!
//! Fan-out/fan-in over the lineitem table:
//! - Worker `t` of `N` scans indices `t, t + N, t + 2N, ...`
//! - Each worker sums `l_extendedprice * (1 - l_discount)` per supplier
//!   nation into its own hash table, touching no shared state
//! - When its scan finishes, the worker takes the result lock once and adds
//!   its partial sums into the global totals
//!
//! The worker pool lives only for one aggregation. Any worker error fails
//! the whole aggregation and the partially merged totals are discarded.

use crate::error::{QueryError, Result};
use crate::physical::filter::JoinFilter;
use crate::tpch::LineItem;
use hashbrown::HashMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Revenue per supplier nation name, in ascending name order
pub type RevenueByNation = BTreeMap<String, f64>;

/// Thread-local partial sums keyed by nation name
pub type PartialRevenue<'a> = HashMap<&'a str, f64>;

/// Aggregates Q5 revenue over lineitems using a fixed number of workers
#[derive(Debug)]
pub struct RevenueAggregator<'a> {
    filter: &'a JoinFilter,
    workers: usize,
}

impl<'a> RevenueAggregator<'a> {
    /// Create an aggregator; a worker count of zero is treated as one
    pub fn new(filter: &'a JoinFilter, workers: usize) -> Self {
        Self {
            filter,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scan all lineitems and return total revenue per supplier nation
    ///
    /// Only nations with at least one qualifying lineitem appear.
    pub fn aggregate(&self, lineitems: &[LineItem]) -> Result<RevenueByNation> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("q5-worker-{}", i))
            .build()?;

        let totals: Mutex<RevenueByNation> = Mutex::new(BTreeMap::new());

        pool.install(|| {
            (0..self.workers)
                .into_par_iter()
                .try_for_each(|worker| -> Result<()> {
                    let partial = self.scan_partition(lineitems, worker)?;
                    debug!(worker, nations = partial.len(), "partition scanned");

                    let mut totals = totals.lock();
                    for (nation, revenue) in partial {
                        *totals.entry(nation.to_string()).or_insert(0.0) += revenue;
                    }
                    Ok(())
                })
        })?;

        Ok(totals.into_inner())
    }

    /// Sum revenue for the rows owned by `worker` under the striding rule
    pub fn scan_partition(
        &self,
        lineitems: &[LineItem],
        worker: usize,
    ) -> Result<PartialRevenue<'a>> {
        let mut partial = PartialRevenue::new();

        for item in lineitems.iter().skip(worker).step_by(self.workers) {
            // Both key checks come before any numeric parsing
            if !self.filter.matches(item.supp_key, item.order_key) {
                continue;
            }

            let price = parse_decimal("extendedprice", &item.extended_price)?;
            let discount = parse_decimal("discount", &item.discount)?;
            let nation = self.filter.supplier_nation_name(item.supp_key)?;

            *partial.entry(nation).or_insert(0.0) += price * (1.0 - discount);
        }

        Ok(partial)
    }
}

fn parse_decimal(column: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| QueryError::NumericParse {
            column,
            value: value.to_string(),
        })
}
