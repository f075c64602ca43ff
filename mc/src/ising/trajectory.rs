use serde::Serialize;

use super::lattice::Lattice;

/// Receives the lattice as a run progresses
///
/// `on_start` sees the freshly initialized lattice, `on_step` is called after
/// every completed time step with the number of steps done so far.
pub trait StepObserver {
    fn on_start(&mut self, _lattice: &Lattice) {}

    fn on_step(&mut self, step: usize, lattice: &Lattice);
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl StepObserver for NoObserver {
    fn on_step(&mut self, _step: usize, _lattice: &Lattice) {}
}

/// Lattice state captured after `step` time steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub step: usize,
    pub lattice: Lattice,
}

/// Time series of |M|/N plus periodic lattice snapshots, for rendering a
/// single run as a curve or an animation
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    /// Snapshot every this many steps; zero disables snapshots
    pub snapshot_interval: usize,
    /// Absolute magnetization per site: initial value, then one per step
    pub magnetization: Vec<f64>,
    pub snapshots: Vec<Snapshot>,
}

impl Trajectory {
    pub fn new(snapshot_interval: usize) -> Self {
        Self {
            snapshot_interval,
            magnetization: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    fn wants_snapshot(&self, step: usize) -> bool {
        self.snapshot_interval > 0 && step % self.snapshot_interval == 0
    }
}

impl StepObserver for Trajectory {
    fn on_start(&mut self, lattice: &Lattice) {
        self.magnetization.push(lattice.abs_magnetization_per_site());
        if self.wants_snapshot(0) {
            self.snapshots.push(Snapshot {
                step: 0,
                lattice: lattice.clone(),
            });
        }
    }

    fn on_step(&mut self, step: usize, lattice: &Lattice) {
        self.magnetization.push(lattice.abs_magnetization_per_site());
        if self.wants_snapshot(step) {
            self.snapshots.push(Snapshot {
                step,
                lattice: lattice.clone(),
            });
        }
    }
}
