//! TPC-H tables used by Q5

mod generator;
mod schema;

pub use generator::*;
pub use schema::*;
