use clap::Parser;
use tracing_subscriber::EnvFilter;

use pairscope::cli::{Cli, Commands};
use pairscope::commands::{run_lead_lag, run_matrix};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over the --verbose flag
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.verbose.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Matrix {
            data_dir,
            interval,
            time_column,
            price_column,
            alignment,
            threshold,
            top,
            output,
        } => run_matrix(
            data_dir,
            *interval,
            time_column,
            price_column,
            alignment,
            *threshold,
            *top,
            output.as_deref(),
        ),
        Commands::LeadLag {
            data_dir,
            interval,
            time_column,
            price_column,
            alignment,
            pairs,
            max_lag,
            output,
        } => run_lead_lag(
            data_dir,
            *interval,
            time_column,
            price_column,
            alignment,
            *pairs,
            *max_lag,
            output.as_deref(),
        ),
    }
}
