//! Attune CLI - operator interface to the adaptive selection core
//!
//! - `attune config` prints the effective configuration
//! - `attune simulate` drives a seeded multi-user loop of selection,
//!   feedback and periodic harmonization against an in-memory store

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod catalog;
mod commands;
mod error;
mod output;

pub use commands::config::{ConfigSource, Preset};
pub use commands::simulate::{simulate, SimulateArgs, SimulationReport};
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Attune CLI application
#[derive(Parser)]
#[command(name = "attune")]
#[command(about = "Attune - adaptive candidate selection and harmonization", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (text, json, yaml)
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config(ConfigSource),

    /// Run a seeded select/feedback/harmonize simulation
    Simulate(SimulateArgs),
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so JSON/YAML on stdout stays parseable.
    let filter = if cli.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match cli.command {
        Commands::Config(source) => commands::config::execute(source, cli.output),
        Commands::Simulate(args) => commands::simulate::execute(args, cli.output).await,
    }
}
