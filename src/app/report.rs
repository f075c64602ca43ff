use super::runner::{SinglePlan, SweepPlan};
use crate::io::print_sweep_summary;
use color_eyre::eyre::Result;
use mc::ising::analysis::critical_temperature;
use mc::ising::{RunResult, SimulationParams, Termination, Trajectory};
use mc::sweep::{SweepRecord, SweepTable, TemperatureSummary};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Data handed to an external plotting tool after a sweep
#[derive(Debug, Serialize)]
pub struct SweepExport<'a> {
    pub model: &'a SimulationParams,
    pub seed: u64,
    pub temperatures: &'a [f64],
    pub samples_per_temperature: usize,
    pub cancelled: bool,
    pub skipped: usize,
    pub summaries: Vec<TemperatureSummary>,
    pub records: Vec<SweepRecord>,
}

impl<'a> SweepExport<'a> {
    pub fn new(plan: &'a SweepPlan, table: &SweepTable) -> Self {
        Self {
            model: &plan.model,
            seed: plan.seed,
            temperatures: &plan.temperatures,
            samples_per_temperature: plan.samples,
            cancelled: table.cancelled,
            skipped: table.skipped,
            summaries: table.summaries(),
            records: table.records(),
        }
    }
}

/// Data handed to an external plotting tool after a single run
#[derive(Debug, Serialize)]
pub struct SingleRunExport<'a> {
    pub params: &'a SimulationParams,
    pub seed: u64,
    pub result: &'a RunResult,
    pub trajectory: &'a Trajectory,
}

pub fn report_sweep_summary(table: &SweepTable) -> Result<()> {
    info!("\nSweep summary (T_c = {:.4}):", critical_temperature());

    let mut buffer = Vec::new();
    print_sweep_summary(&mut buffer, &table.summaries())?;
    for line in String::from_utf8_lossy(&buffer).lines() {
        info!("  {}", line);
    }

    let failures: Vec<_> = table.failures().collect();
    if !failures.is_empty() {
        warn!("{} runs failed:", failures.len());
        for (key, kt, err) in failures {
            warn!(
                "  temperature #{} (kT={:.4}) sample #{}: {}",
                key.temperature_index, kt, key.sample_index, err
            );
        }
    }
    if table.cancelled {
        warn!("Sweep was cancelled, {} runs never started", table.skipped);
    }

    Ok(())
}

pub fn report_single_run(plan: &SinglePlan, result: &RunResult, trajectory: &Trajectory) {
    info!("\nSingle run finished.");
    match result.termination {
        Termination::Saturated { step } => info!("  All spins aligned after {} steps", step),
        Termination::MaxSteps => info!("  Reached tmax = {} steps", plan.params.tmax),
    }

    let attempts = (result.steps * plan.params.n_sites()).max(1);
    info!("  Final magnetization per site: {:.6}", result.final_magnetization);
    info!(
        "  Final energy per site: {:.6}",
        result.final_lattice.energy_per_site(
            plan.params.coupling,
            plan.params.field,
            plan.params.moment
        )
    );
    info!(
        "  Acceptance ratio: {:.4}",
        result.accepted_flips as f64 / attempts as f64
    );
    info!(
        "  Recorded {} magnetization values and {} snapshots",
        trajectory.magnetization.len(),
        trajectory.snapshots.len()
    );
    debug!("Final lattice:\n{}", result.final_lattice);
}
