//! Result formatting for the command line
//!
//! Provides the pipe-delimited result file writer and alternative
//! renderings (table, CSV, JSON) for printing to a terminal.

mod output;

pub use output::{write_result_file, OutputFormat, OutputFormatter};
