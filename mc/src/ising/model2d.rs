use rand::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::lattice::Lattice;
use super::params::SimulationParams;
use super::trajectory::{NoObserver, StepObserver};
use crate::error::SimError;

/// Lifecycle of a single Metropolis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// Parameters validated, lattice being built
    Initializing,
    /// Time steps are being executed
    Stepping,
    /// No further steps will be taken
    Terminated,
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// All `tmax` time steps were executed
    MaxSteps,
    /// Every spin aligned after `step` time steps (absorbing state)
    Saturated { step: usize },
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Signed magnetization per site, in [-1, 1]
    pub final_magnetization: f64,
    pub final_lattice: Lattice,
    /// Number of time steps actually executed
    pub steps: usize,
    pub termination: Termination,
    /// Accepted spin flips over the whole run
    pub accepted_flips: u64,
}

/// Metropolis acceptance probability for an energy change `delta_e`
///
/// Non-positive changes are always accepted. A Boltzmann factor that is not
/// a finite number (NaN energy, overflow for extreme ΔE/kT) counts as zero,
/// so the proposed flip is rejected instead of poisoning the run.
pub fn acceptance_probability(delta_e: f64, kt: f64) -> f64 {
    if delta_e <= 0.0 {
        return 1.0;
    }

    let factor = (-delta_e / kt).exp();
    if factor.is_finite() {
        factor
    } else {
        0.0
    }
}

/// Attempt to flip the spin at (row, col) using the Metropolis rule
///
/// Returns `true` when the flip was accepted. `params` is expected to have
/// been validated.
pub fn attempt_flip<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    row: usize,
    col: usize,
    params: &SimulationParams,
    rng: &mut R,
) -> bool {
    let delta_e = lattice.energy_delta(row, col, params.coupling, params.field, params.moment);

    let accept = if delta_e <= 0.0 {
        true
    } else {
        rng.gen::<f64>() < acceptance_probability(delta_e, params.kt)
    };

    if accept {
        lattice.flip(row, col);
    }
    accept
}

/// A single Metropolis simulation on a rectangular lattice
///
/// Each time step performs `rows * cols` flip attempts on sites drawn
/// uniformly with replacement. The run ends after `tmax` steps or as soon as
/// all spins are aligned, whichever comes first.
#[derive(Debug, Clone)]
pub struct Simulation<R> {
    params: SimulationParams,
    lattice: Lattice,
    rng: R,
    step: usize,
    accepted_flips: u64,
    state: RunState,
    termination: Option<Termination>,
}

impl<R: Rng> Simulation<R> {
    /// Validate `params` and build a randomly initialized lattice
    pub fn new(params: SimulationParams, mut rng: R) -> Result<Self, SimError> {
        params.validate()?;
        let lattice = Lattice::initialize(params.rows, params.cols, params.init_prob, &mut rng)?;
        Ok(Self::start(params, lattice, rng))
    }

    /// Start from an explicit lattice instead of a random one
    pub fn with_lattice(params: SimulationParams, lattice: Lattice, rng: R) -> Result<Self, SimError> {
        params.validate()?;
        if lattice.rows() != params.rows || lattice.cols() != params.cols {
            return Err(SimError::invalid(
                "lattice",
                format!(
                    "lattice is {}x{} but parameters ask for {}x{}",
                    lattice.rows(),
                    lattice.cols(),
                    params.rows,
                    params.cols
                ),
            ));
        }
        Ok(Self::start(params, lattice, rng))
    }

    fn start(params: SimulationParams, lattice: Lattice, rng: R) -> Self {
        let mut sim = Self {
            params,
            lattice,
            rng,
            step: 0,
            accepted_flips: 0,
            state: RunState::Initializing,
            termination: None,
        };

        if params.tmax == 0 {
            sim.terminate(Termination::MaxSteps);
        } else {
            sim.state = RunState::Stepping;
        }
        sim
    }

    fn terminate(&mut self, termination: Termination) {
        self.state = RunState::Terminated;
        self.termination = Some(termination);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Number of completed time steps
    pub fn steps(&self) -> usize {
        self.step
    }

    /// Advance one time step. Does nothing once the run has terminated.
    pub fn step(&mut self) -> RunState {
        if self.state != RunState::Stepping {
            return self.state;
        }

        let rows = self.lattice.rows();
        let cols = self.lattice.cols();
        for _ in 0..rows * cols {
            let row = self.rng.gen_range(0..rows);
            let col = self.rng.gen_range(0..cols);

            if attempt_flip(&mut self.lattice, row, col, &self.params, &mut self.rng) {
                self.accepted_flips += 1;
            }
        }
        self.step += 1;

        // Integer check, so saturation is detected exactly for any lattice size
        if self.lattice.is_saturated() {
            self.terminate(Termination::Saturated { step: self.step });
        } else if self.step >= self.params.tmax {
            self.terminate(Termination::MaxSteps);
        }

        self.state
    }

    /// Step until termination, reporting every step to `observer`
    pub fn run_to_end<O: StepObserver + ?Sized>(&mut self, observer: &mut O) {
        observer.on_start(&self.lattice);
        while self.state == RunState::Stepping {
            self.step();
            observer.on_step(self.step, &self.lattice);
        }
    }

    /// Consume the simulation and produce its result
    pub fn finish(self) -> RunResult {
        RunResult {
            final_magnetization: self.lattice.magnetization_per_site(),
            steps: self.step,
            termination: self.termination.unwrap_or(Termination::MaxSteps),
            accepted_flips: self.accepted_flips,
            final_lattice: self.lattice,
        }
    }
}

/// Run a full simulation with the given parameters and random source
pub fn run<R: Rng>(params: &SimulationParams, rng: R) -> Result<RunResult, SimError> {
    run_with_observer(params, rng, &mut NoObserver)
}

/// Run a full simulation, reporting the lattice after every time step
pub fn run_with_observer<R: Rng, O: StepObserver + ?Sized>(
    params: &SimulationParams,
    rng: R,
    observer: &mut O,
) -> Result<RunResult, SimError> {
    let mut sim = Simulation::new(*params, rng)?;
    sim.run_to_end(observer);

    let result = sim.finish();
    debug!(
        kt = params.kt,
        steps = result.steps,
        magnetization = result.final_magnetization,
        "run finished: {:?}",
        result.termination
    );
    Ok(result)
}

/// Run a full simulation with a dedicated RNG seeded from `seed`
pub fn run_seeded(params: &SimulationParams, seed: u64) -> Result<RunResult, SimError> {
    run(params, StdRng::seed_from_u64(seed))
}
