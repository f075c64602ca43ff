//! Command-line argument parsing for Ising simulations

use clap::Parser;

use super::Mode;

/// 2D Ising model Metropolis simulations with optional YAML configuration
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Temperature sweep or a single recorded run
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Override output file for the log: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the structured results as JSON to this file
    #[arg(long)]
    pub data: Option<String>,

    /// Override number of lattice rows
    #[arg(long)]
    pub rows: Option<usize>,

    /// Override number of lattice columns
    #[arg(long)]
    pub cols: Option<usize>,

    /// Override probability of a site starting spin up
    #[arg(long)]
    pub init_prob: Option<f64>,

    /// Override coupling constant J
    #[arg(long)]
    pub coupling: Option<f64>,

    /// Override external field B
    #[arg(long)]
    pub field: Option<f64>,

    /// Override magnetic moment mu
    #[arg(long)]
    pub moment: Option<f64>,

    /// Override maximum number of time steps
    #[arg(long)]
    pub tmax: Option<usize>,

    /// Override lowest temperature of the sweep
    #[arg(long)]
    pub t_min: Option<f64>,

    /// Override highest temperature of the sweep
    #[arg(long)]
    pub t_max: Option<f64>,

    /// Override number of temperatures in the sweep
    #[arg(long)]
    pub temperatures: Option<usize>,

    /// Override number of samples per temperature
    #[arg(long)]
    pub samples: Option<usize>,

    /// Override temperature of a single run
    #[arg(long)]
    pub kt: Option<f64>,

    /// Override snapshot interval of a single run (0 disables snapshots)
    #[arg(long)]
    pub snapshot_interval: Option<usize>,

    /// Number of worker threads (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Base random seed (default: drawn from entropy and logged)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop the sweep at the first failed run
    #[arg(long)]
    pub fail_fast: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
