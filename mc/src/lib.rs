pub mod error;
pub mod ising;
pub mod sweep;

pub use error::{SimError, SweepError};
pub use ising::{Lattice, RunResult, Simulation, SimulationParams, Termination, Trajectory};
pub use sweep::{build_run_list, run_sweep, temperature_grid, Sampler, SweepOptions, SweepTable};
