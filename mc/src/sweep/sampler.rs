use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use tracing::{info, warn};

use super::plan::{RunKey, RunSpec};
use super::table::{RunOutcome, Sample, SweepEntry, SweepTable};
use crate::error::{SimError, SweepError};
use crate::ising::run_seeded;

/// Something that can execute a single run of a sweep
///
/// Implementations must be callable from many worker threads at once.
pub trait Engine: Sync {
    fn simulate(&self, run: &RunSpec) -> Result<Sample, SimError>;
}

/// Metropolis engine seeded from each run's own seed
#[derive(Debug, Default, Clone, Copy)]
pub struct MetropolisEngine;

impl Engine for MetropolisEngine {
    fn simulate(&self, run: &RunSpec) -> Result<Sample, SimError> {
        let result = run_seeded(&run.params, run.seed)?;
        Ok(Sample {
            magnetization: result.final_magnetization,
            steps: result.steps,
        })
    }
}

/// Sweep execution options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Number of worker threads
    pub concurrency: usize,
    /// Cancel the remaining runs after the first failure
    pub fail_fast: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions {
            concurrency: rayon::current_num_threads(),
            fail_fast: false,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    total: AtomicUsize,
    remaining: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

/// Live progress of a sweep, readable from any thread
///
/// Cloning is cheap and every clone observes the same counters.
#[derive(Debug, Clone, Default)]
pub struct SweepProgress {
    counters: Arc<Counters>,
}

impl SweepProgress {
    pub fn total(&self) -> usize {
        self.counters.total.load(Ordering::Relaxed)
    }

    /// Runs not yet finished, failed or skipped
    pub fn remaining(&self) -> usize {
        self.counters.remaining.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> usize {
        self.counters.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.counters.failed.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> usize {
        self.counters.skipped.load(Ordering::Relaxed)
    }

    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    fn reset(&self, total: usize) {
        self.counters.total.store(total, Ordering::Relaxed);
        self.counters.remaining.store(total, Ordering::Relaxed);
        self.counters.completed.store(0, Ordering::Relaxed);
        self.counters.failed.store(0, Ordering::Relaxed);
        self.counters.skipped.store(0, Ordering::Relaxed);
    }

    fn finish_one(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
        self.counters.remaining.fetch_sub(1, Ordering::Release);
    }
}

/// Shared flag that stops a sweep from starting new runs
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs many independent simulations on a fixed-size worker pool
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    options: SweepOptions,
    progress: SweepProgress,
    cancel: CancelToken,
}

impl Sampler {
    pub fn new(options: SweepOptions) -> Self {
        Self {
            options,
            progress: SweepProgress::default(),
            cancel: CancelToken::default(),
        }
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    /// Handle for observing progress while `run` executes
    pub fn progress(&self) -> SweepProgress {
        self.progress.clone()
    }

    /// Handle for cancelling the sweep from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Execute every run in `runs` and collect the results by key
    ///
    /// A failing run is stored as [`RunOutcome::Failed`] and does not stop
    /// the others unless `fail_fast` is set. Cancelled runs are left out of
    /// the table entirely.
    pub fn run<E: Engine + ?Sized>(&self, engine: &E, runs: &[RunSpec]) -> Result<SweepTable, SweepError> {
        if self.options.concurrency == 0 {
            return Err(SweepError::InvalidSweep("concurrency must be at least 1".to_string()));
        }
        let mut seen = HashSet::with_capacity(runs.len());
        if let Some(dup) = runs.iter().find(|run| !seen.insert(run.key)) {
            return Err(SweepError::InvalidSweep(format!(
                "duplicate run key (temperature {}, sample {})",
                dup.key.temperature_index, dup.key.sample_index
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency)
            .thread_name(|i| format!("sweep-worker-{i}"))
            .build()?;

        info!(
            "Dispatching {} runs on {} worker threads",
            runs.len(),
            self.options.concurrency
        );
        self.progress.reset(runs.len());
        let results: Mutex<BTreeMap<RunKey, SweepEntry>> = Mutex::new(BTreeMap::new());

        pool.install(|| {
            runs.par_iter()
                .with_max_len(1)
                .for_each(|run| self.execute(engine, run, &results));
        });

        let entries = results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let table = SweepTable::from_entries(entries, self.progress.skipped(), self.cancel.is_cancelled());

        info!(
            "Sweep finished: {} completed, {} failed, {} skipped",
            table.completed_count(),
            table.failed_count(),
            table.skipped
        );
        Ok(table)
    }

    fn execute<E: Engine + ?Sized>(
        &self,
        engine: &E,
        run: &RunSpec,
        results: &Mutex<BTreeMap<RunKey, SweepEntry>>,
    ) {
        if self.cancel.is_cancelled() {
            self.progress.finish_one(&self.progress.counters.skipped);
            return;
        }

        let outcome = match engine.simulate(run) {
            Ok(sample) => RunOutcome::Completed(sample),
            Err(err) => {
                warn!(
                    "Run (temperature {}, sample {}) at kT={} failed: {}",
                    run.key.temperature_index, run.key.sample_index, run.params.kt, err
                );
                if self.options.fail_fast {
                    self.cancel.cancel();
                }
                RunOutcome::Failed(err)
            }
        };
        let failed = outcome.is_failed();

        let entry = SweepEntry {
            temperature: run.params.kt,
            outcome,
        };
        results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(run.key, entry);

        let counter = if failed {
            &self.progress.counters.failed
        } else {
            &self.progress.counters.completed
        };
        self.progress.finish_one(counter);
    }
}

/// Run a sweep with the Metropolis engine on `concurrency` threads
pub fn run_sweep(runs: &[RunSpec], concurrency: usize) -> Result<SweepTable, SweepError> {
    let sampler = Sampler::new(SweepOptions {
        concurrency,
        fail_fast: false,
    });
    sampler.run(&MetropolisEngine, runs)
}
