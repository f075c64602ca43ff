//! Input/Output operations for Ising simulations
//!
//! This module handles logging setup, summary tables and JSON export.

mod output;

pub use output::{print_sweep_summary, setup_output, write_json};
