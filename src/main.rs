//! Ising Monte Carlo Command-Line Interface
//!
//! Runs a parallel temperature sweep or a single recorded Metropolis run,
//! configured from YAML and command-line overrides.

use color_eyre::eyre::Result;
use ising_sweep::app::IsingApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    IsingApplication::from_cli()?.run()
}
