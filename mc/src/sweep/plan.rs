use itertools::iproduct;
use serde::Serialize;

use crate::ising::SimulationParams;

/// Lowest temperature handed to the engine by default. `kT = 0` would make
/// the Boltzmann factor divide by zero.
pub const DEFAULT_TEMPERATURE_FLOOR: f64 = 0.001;

/// Position of a run inside a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunKey {
    pub temperature_index: usize,
    pub sample_index: usize,
}

/// One independent run of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSpec {
    pub key: RunKey,
    pub params: SimulationParams,
    /// Seed of the run's private random number generator
    pub seed: u64,
}

/// `count` evenly spaced temperatures over `[min, max]`, endpoints included
///
/// Values at or below `floor` are raised to `floor`, so a grid starting at
/// zero becomes usable by the Metropolis engine.
pub fn temperature_grid(min: f64, max: f64, count: usize, floor: f64) -> Vec<f64> {
    let step = if count > 1 {
        (max - min) / (count - 1) as f64
    } else {
        0.0
    };

    (0..count)
        .map(|i| min + step * i as f64)
        .map(|kt| if kt <= floor { floor } else { kt })
        .collect()
}

/// Build the ordered list of runs for a temperature sweep
///
/// Temperatures keep their input order and the samples of one temperature
/// are contiguous. Every run gets its own seed derived from `base_seed`.
pub fn build_run_list(
    temperatures: &[f64],
    samples_per_temperature: usize,
    fixed: &SimulationParams,
    base_seed: u64,
) -> Vec<RunSpec> {
    iproduct!(temperatures.iter().enumerate(), 0..samples_per_temperature)
        .enumerate()
        .map(|(position, ((temperature_index, &kt), sample_index))| RunSpec {
            key: RunKey {
                temperature_index,
                sample_index,
            },
            params: fixed.with_temperature(kt),
            seed: base_seed.wrapping_add(position as u64),
        })
        .collect()
}
