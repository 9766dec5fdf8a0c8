//! Q5 engine CLI

use clap::{Args, Parser, Subcommand};
use q5_engine::config::{QueryConfig, QueryParams, DEFAULT_THREADS};
use q5_engine::execution::{print_results, ExecutionContext};
use q5_engine::{
    write_result_file, OutputFormat, OutputFormatter, QueryError, Result, TpchGenerator,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "query5")]
#[command(about = "Parallel TPC-H Q5 (local supplier volume) engine")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // Query flags given without a subcommand run the query
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Region name, matched exactly
    #[arg(long = "r_name", required = true)]
    r_name: Option<String>,

    /// Inclusive lower bound on o_orderdate
    #[arg(long = "start_date", required = true)]
    start_date: Option<String>,

    /// Exclusive upper bound on o_orderdate
    #[arg(long = "end_date", required = true)]
    end_date: Option<String>,

    /// Number of aggregation workers
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Directory containing region/nation/customer/orders/lineitem/supplier .tbl files
    #[arg(long = "table_path", required = true)]
    table_path: Option<PathBuf>,

    /// File to write `nation|revenue` lines to
    #[arg(long = "result_path", required = true)]
    result_path: Option<PathBuf>,

    /// Also print the result to stdout (pipe, table, csv, json)
    #[arg(long, value_name = "FORMAT")]
    print: Option<OutputFormat>,
}

impl RunArgs {
    fn into_config(self) -> Result<(QueryConfig, Option<OutputFormat>)> {
        fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
            value.ok_or_else(|| QueryError::Config(format!("missing required flag --{}", flag)))
        }

        let params = QueryParams::new(
            required(self.r_name, "r_name")?,
            required(self.start_date, "start_date")?,
            required(self.end_date, "end_date")?,
        );
        let config = QueryConfig::new(
            params,
            self.threads,
            required(self.table_path, "table_path")?,
            required(self.result_path, "result_path")?,
        );
        Ok((config, self.print))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run Q5 over a directory of .tbl files and write the result file
    Run(RunArgs),

    /// Generate a synthetic dataset as .tbl files
    Generate {
        /// Scale factor (0.01 = 60K lineitems, 1 = 6M lineitems)
        #[arg(short, long, default_value = "0.01")]
        sf: f64,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Time Q5 across worker counts
    Benchmark {
        /// Directory of .tbl files (generates in memory when omitted)
        #[arg(long = "table_path")]
        table_path: Option<PathBuf>,

        /// Scale factor for generated data
        #[arg(short, long, default_value = "0.01")]
        sf: f64,

        /// Worker counts to compare
        #[arg(long, value_delimiter = ',', default_value = "1,2,4")]
        threads: Vec<usize>,

        /// Number of iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,
    },
}

fn main() {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Run(cli.run));

    let outcome = match command {
        Commands::Run(args) => args
            .into_config()
            .and_then(|(config, print)| run(&config, print)),

        Commands::Generate { sf, output, seed } => {
            let start = Instant::now();
            TpchGenerator::with_seed(sf, seed)
                .write_tbl(&output)
                .map(|tables| {
                    println!(
                        "Generated {} rows in {:?} at {}",
                        tables.statistics().total(),
                        start.elapsed(),
                        output.display()
                    );
                })
        }

        Commands::Benchmark {
            table_path,
            sf,
            threads,
            iterations,
        } => benchmark(table_path, sf, &threads, iterations),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &QueryConfig, print: Option<OutputFormat>) -> Result<()> {
    config.validate()?;

    let ctx = ExecutionContext::from_tbl_dir(&config.table_path)?
        .with_parallel_partitions(config.threads);
    let result = ctx.execute(&config.params)?;

    write_result_file(&config.result_path, &result.revenue)?;

    if let Some(format) = print {
        if format == OutputFormat::Table {
            print_results(&result);
        } else {
            OutputFormatter::new(format).print(&result.revenue)?;
        }
    }
    Ok(())
}

fn benchmark(
    table_path: Option<PathBuf>,
    sf: f64,
    threads: &[usize],
    iterations: usize,
) -> Result<()> {
    let start = Instant::now();
    let tables = match &table_path {
        Some(path) => q5_engine::load_tables(path)?,
        None => TpchGenerator::new(sf).generate(),
    };
    println!(
        "Data ready in {:?} ({})\n",
        start.elapsed(),
        tables.statistics()
    );

    let params = QueryParams::tpch_default();
    let mut ctx = ExecutionContext::new(tables);

    for &workers in threads {
        ctx = ctx.with_parallel_partitions(workers);
        let mut total = Duration::ZERO;

        for iter in 0..iterations.max(1) {
            let result = ctx.execute(&params)?;
            total += result.metrics.total_time;
            println!(
                "threads={:>3} iter={:>2}: {:>3} nations, filter {:>8.3}ms, aggregate {:>8.3}ms",
                workers,
                iter + 1,
                result.row_count(),
                result.metrics.filter_time.as_secs_f64() * 1000.0,
                result.metrics.aggregate_time.as_secs_f64() * 1000.0
            );
        }

        println!(
            "threads={:>3} average: {:?}\n",
            workers,
            total / iterations.max(1) as u32
        );
    }
    Ok(())
}
