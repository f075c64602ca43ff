pub mod analysis;
pub mod lattice;
pub mod model2d;
pub mod params;
pub mod trajectory;

pub use lattice::{Lattice, Spin};
pub use model2d::{
    acceptance_probability, attempt_flip, run, run_seeded, run_with_observer, RunResult,
    RunState, Simulation, Termination,
};
pub use params::SimulationParams;
pub use trajectory::{NoObserver, Snapshot, StepObserver, Trajectory};

#[cfg(test)]
mod tests;
