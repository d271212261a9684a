//! Lethe - Exception-Reuse Memory-Growth Demonstration
//!
//! This is the CLI entry point: run the singleton (leaking) trial, the
//! factory (steady-state) trial, or both back to back with a comparison
//! summary and optional data artifacts.

use clap::{Args, Parser, Subcommand};
use lethe_core::{
    error::Result,
    report, run_mode, ProgressStyle, RaiseMode, TrialConfig,
};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lethe")]
#[command(about = "Exception-reuse memory-growth demonstration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Trial parameters shared by every subcommand
#[derive(Args)]
struct TrialArgs {
    /// Number of raise/catch cycles
    #[arg(short = 'n', long, default_value = "1000")]
    iterations: u64,

    /// Synthetic payload attached to each raise, in KB
    #[arg(long, default_value = "500")]
    payload_kb: u64,

    /// Sample resident memory every this many iterations
    #[arg(long, default_value = "100")]
    interval: u64,

    /// Write CSV/JSON artifacts under this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl TrialArgs {
    fn config(&self, mode: RaiseMode) -> TrialConfig {
        TrialConfig {
            iterations: self.iterations,
            mode,
            payload_kb: self.payload_kb,
            sample_interval: self.interval,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Raise and catch one reused exception instance (the leak)
    Singleton {
        #[command(flatten)]
        args: TrialArgs,
    },

    /// Raise and catch a fresh exception instance per iteration
    Factory {
        #[command(flatten)]
        args: TrialArgs,
    },

    /// Run both patterns with identical parameters and compare
    Compare {
        #[command(flatten)]
        args: TrialArgs,
    },
}

fn run_single(mode: RaiseMode, args: &TrialArgs) -> Result<()> {
    let config = args.config(mode);
    report::print_preamble(&config);
    let result = run_mode(&config, ProgressStyle::FrameCount)?;
    report::print_summary(&result);
    if let Some(dir) = &args.out_dir {
        let path = report::write_trial_csv(dir, &result)?;
        println!("Data saved to {}", path.display());
    }
    Ok(())
}

fn run_compare(args: &TrialArgs) -> Result<()> {
    let singleton_config = args.config(RaiseMode::Singleton);
    report::print_preamble(&singleton_config);
    let singleton = run_mode(&singleton_config, ProgressStyle::Growth)?;
    report::print_summary(&singleton);

    let factory_config = args.config(RaiseMode::Factory);
    println!();
    report::print_preamble(&factory_config);
    let factory = run_mode(&factory_config, ProgressStyle::Growth)?;
    report::print_summary(&factory);

    report::print_comparison(&singleton, &factory);

    if let Some(dir) = &args.out_dir {
        let singleton_csv = report::write_trial_csv(dir, &singleton)?;
        let factory_csv = report::write_trial_csv(dir, &factory)?;
        let comparison = report::write_comparison_json(dir, &singleton, &factory)?;
        println!("Data saved to {}", singleton_csv.display());
        println!("Data saved to {}", factory_csv.display());
        println!("Comparison saved to {}", comparison.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "lethe={0},lethe_core={0}",
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Demonstration lines own stdout
        .init();

    debug!("Lethe v{} starting...", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Singleton { args } => run_single(RaiseMode::Singleton, args),
        Commands::Factory { args } => run_single(RaiseMode::Factory, args),
        Commands::Compare { args } => run_compare(args),
    }
}
