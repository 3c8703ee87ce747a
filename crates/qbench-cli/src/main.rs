//! qbench Command-Line Interface
//!
//! Runs benchmark workflows on the local simulator, caches their results and
//! evaluates metrics from them.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::evaluate::EvaluateArgs;
use commands::{cache, evaluate, pygsti, version};
use config::Config;

/// qbench - quantum benchmarking with cached execution and tomography
#[derive(Parser)]
#[command(name = "qbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML configuration file
    #[arg(long, global = true, env = "QBENCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a metric on a benchmark workflow
    Evaluate(EvaluateArgs),

    /// Execute PyGSTi circuit strings and write a dataset
    Pygsti {
        /// File with one circuit string per line
        #[arg(short, long)]
        input: PathBuf,

        /// Number of qubits
        #[arg(short, long, default_value = "1")]
        qubits: usize,

        /// Shots per circuit (overrides the configuration)
        #[arg(short, long)]
        shots: Option<u32>,

        /// Ignore cached results
        #[arg(long)]
        force_new: bool,

        /// Cache directory (overrides the configuration)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Dataset output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached timestamps per task
    List {
        /// Workflow identifier (e.g. RotationSweep, SPAMBenchmark_QST)
        #[arg(short, long)]
        workflow: String,

        /// Cache directory (overrides the configuration)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    // Setup logging
    let filter = match cli.verbose {
        0 => config.logging.level.as_deref().unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let verbose = cli.verbose > 0;

    // Execute command
    let result = match cli.command {
        Commands::Evaluate(args) => evaluate::execute(&args, &config, verbose),

        Commands::Pygsti {
            input,
            qubits,
            shots,
            force_new,
            cache_dir,
            output,
        } => pygsti::execute(
            &input,
            qubits,
            shots,
            force_new,
            cache_dir.as_deref(),
            output.as_deref(),
            &config,
            verbose,
        ),

        Commands::Cache { action } => match action {
            CacheAction::List {
                workflow,
                cache_dir,
            } => cache::execute_list(&workflow, cache_dir.as_deref(), &config),
        },

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
