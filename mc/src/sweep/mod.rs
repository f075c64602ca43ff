//! Parallel temperature sweeps over independent Metropolis runs

pub mod plan;
pub mod sampler;
pub mod table;

pub use plan::{build_run_list, temperature_grid, RunKey, RunSpec, DEFAULT_TEMPERATURE_FLOOR};
pub use sampler::{run_sweep, CancelToken, Engine, MetropolisEngine, Sampler, SweepOptions, SweepProgress};
pub use table::{RunOutcome, Sample, SweepEntry, SweepRecord, SweepTable, TemperatureSummary};
