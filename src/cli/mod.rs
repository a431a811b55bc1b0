//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for PairScope:
//! the `matrix` and `lead-lag` subcommands and their shared data flags.

use clap::{Parser, Subcommand};

/// PairScope - Correlation and Lead-Lag Scanner
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compute the return-correlation matrix and pair rankings
    Matrix {
        /// Directory containing per-instrument CSV files
        #[arg(long, default_value = ".")]
        data_dir: String,
        /// Resampling bucket width in minutes
        #[arg(long, default_value_t = 5)]
        interval: u64,
        /// Timestamp column name
        #[arg(long, default_value = "date")]
        time_column: String,
        /// Close-price column name
        #[arg(long, default_value = "close")]
        price_column: String,
        /// Row-drop policy: 'whole-table' or 'pairwise'
        #[arg(long, default_value = "whole-table")]
        alignment: String,
        /// Absolute-correlation threshold for the high-correlation listing
        #[arg(long, default_value_t = 0.7)]
        threshold: f64,
        /// Number of ranked pairs to print
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Optional path for a JSON copy of the report
        #[arg(long)]
        output: Option<String>,
    },

    /// Test the top correlated pairs for lead-lag relationships
    LeadLag {
        /// Directory containing per-instrument CSV files
        #[arg(long, default_value = ".")]
        data_dir: String,
        /// Resampling bucket width in minutes
        #[arg(long, default_value_t = 5)]
        interval: u64,
        /// Timestamp column name
        #[arg(long, default_value = "date")]
        time_column: String,
        /// Close-price column name
        #[arg(long, default_value = "close")]
        price_column: String,
        /// Row-drop policy: 'whole-table' or 'pairwise'
        #[arg(long, default_value = "whole-table")]
        alignment: String,
        /// Number of top-ranked pairs to analyze
        #[arg(long, default_value_t = 6)]
        pairs: usize,
        /// Maximum lag offset tested, in buckets
        #[arg(long, default_value_t = 5)]
        max_lag: usize,
        /// Optional path for a JSON copy of the report
        #[arg(long)]
        output: Option<String>,
    },
}
