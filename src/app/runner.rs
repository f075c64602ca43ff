use crate::config::{Args, Config};
use color_eyre::eyre::{eyre, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use mc::ising::{run_with_observer, RunResult, SimulationParams, Trajectory};
use mc::sweep::{
    build_run_list, temperature_grid, MetropolisEngine, Sampler, SweepOptions, SweepTable,
    DEFAULT_TEMPERATURE_FLOOR,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Everything needed to execute a temperature sweep
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub model: SimulationParams,
    pub temperatures: Vec<f64>,
    pub samples: usize,
    pub seed: u64,
    pub options: SweepOptions,
}

/// Everything needed to execute a single recorded run
#[derive(Debug, Clone)]
pub struct SinglePlan {
    pub params: SimulationParams,
    pub seed: u64,
    pub snapshot_interval: usize,
}

pub fn resolve_seed(args: &Args, config: &Config) -> u64 {
    args.seed.or(config.seed).unwrap_or_else(rand::random)
}

/// Model parameters after applying command-line overrides; `kt` is left at
/// its default and set per run
pub fn resolve_model(args: &Args, config: &Config) -> SimulationParams {
    let defaults = SimulationParams::default();
    let model = &config.model;
    SimulationParams {
        rows: args.rows.or(model.rows).unwrap_or(defaults.rows),
        cols: args.cols.or(model.cols).unwrap_or(defaults.cols),
        init_prob: args.init_prob.or(model.init_prob).unwrap_or(defaults.init_prob),
        kt: defaults.kt,
        coupling: args.coupling.or(model.coupling).unwrap_or(defaults.coupling),
        field: args.field.or(model.field).unwrap_or(defaults.field),
        moment: args.moment.or(model.moment).unwrap_or(defaults.moment),
        tmax: args.tmax.or(model.tmax).unwrap_or(defaults.tmax),
    }
}

pub fn resolve_sweep(args: &Args, config: &Config, seed: u64) -> SweepPlan {
    let sweep = &config.sweep;
    let t_min = args.t_min.or(sweep.t_min).unwrap_or(0.0);
    let t_max = args.t_max.or(sweep.t_max).unwrap_or(4.0);
    let count = args.temperatures.or(sweep.temperatures).unwrap_or(30);
    let floor = sweep.temperature_floor.unwrap_or(DEFAULT_TEMPERATURE_FLOOR);

    let defaults = SweepOptions::default();
    SweepPlan {
        model: resolve_model(args, config),
        temperatures: temperature_grid(t_min, t_max, count, floor),
        samples: args.samples.or(sweep.samples).unwrap_or(100),
        seed,
        options: SweepOptions {
            concurrency: args.threads.or(sweep.threads).unwrap_or(defaults.concurrency),
            fail_fast: args.fail_fast || sweep.fail_fast.unwrap_or(defaults.fail_fast),
        },
    }
}

pub fn resolve_single(args: &Args, config: &Config, seed: u64) -> SinglePlan {
    let model = resolve_model(args, config);
    let single = &config.single;
    SinglePlan {
        params: SimulationParams {
            rows: args.rows.or(single.rows).unwrap_or(model.rows),
            cols: args.cols.or(single.cols).unwrap_or(model.cols),
            tmax: args.tmax.or(single.tmax).unwrap_or(model.tmax),
            kt: args.kt.or(single.kt).unwrap_or(model.kt),
            ..model
        },
        seed,
        snapshot_interval: args.snapshot_interval.or(single.snapshot_interval).unwrap_or(0),
    }
}

/// Run every (temperature, sample) pair of `plan` and collect the table
pub fn run_sweep_plan(plan: &SweepPlan, show_progress: bool) -> Result<SweepTable> {
    let runs = build_run_list(&plan.temperatures, plan.samples, &plan.model, plan.seed);
    info!(
        "Sweeping {} temperatures in [{:.4}, {:.4}] with {} samples each ({} runs, seed {})",
        plan.temperatures.len(),
        plan.temperatures.first().copied().unwrap_or_default(),
        plan.temperatures.last().copied().unwrap_or_default(),
        plan.samples,
        runs.len(),
        plan.seed
    );

    let sampler = Sampler::new(plan.options);
    let progress = sampler.progress();
    let bar = if show_progress {
        let bar = ProgressBar::new(runs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}]",
            )
            .map_err(|e| eyre!("Invalid progress template: {}", e))?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let finished = AtomicBool::new(false);
    let table = thread::scope(|scope| {
        scope.spawn(|| {
            while !finished.load(Ordering::Acquire) {
                let done = progress.total().saturating_sub(progress.remaining());
                bar.set_position(done as u64);
                bar.set_message(format!("remaining {}", progress.remaining()));
                thread::sleep(Duration::from_millis(100));
            }
        });

        let table = sampler.run(&MetropolisEngine, &runs);
        finished.store(true, Ordering::Release);
        table
    })
    .wrap_err("Temperature sweep failed")?;

    bar.finish_with_message("done");
    Ok(table)
}

/// Execute one run while recording its magnetization series and snapshots
pub fn run_single_plan(plan: &SinglePlan) -> Result<(RunResult, Trajectory)> {
    info!(
        "Single run on a {}x{} lattice at kT={} for at most {} steps (seed {})",
        plan.params.rows, plan.params.cols, plan.params.kt, plan.params.tmax, plan.seed
    );

    let mut trajectory = Trajectory::new(plan.snapshot_interval);
    let result = run_with_observer(
        &plan.params,
        StdRng::seed_from_u64(plan.seed),
        &mut trajectory,
    )
    .wrap_err("Simulation run failed")?;

    Ok((result, trajectory))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_overrides_config() {
        let config = Config::from_yaml_str("model:\n  rows: 12\n  cols: 14\nsweep:\n  samples: 3\n").unwrap();
        let args = Args {
            rows: Some(8),
            samples: Some(2),
            threads: Some(3),
            ..Args::default()
        };

        let plan = resolve_sweep(&args, &config, 5);
        assert_eq!(plan.model.rows, 8);
        assert_eq!(plan.model.cols, 14);
        assert_eq!(plan.samples, 2);
        assert_eq!(plan.options.concurrency, 3);
        assert_eq!(plan.temperatures.len(), 30);
        assert_eq!(plan.temperatures[0], DEFAULT_TEMPERATURE_FLOOR);
        assert_eq!(plan.seed, 5);
    }

    #[test]
    fn test_single_run_uses_single_section() {
        let config = Config::default().with_defaults();
        let plan = resolve_single(&Args::default(), &config, 1);
        assert_eq!(plan.params.rows, 50);
        assert_eq!(plan.params.tmax, 1000);
        assert_eq!(plan.params.kt, 0.003);
        assert_eq!(plan.snapshot_interval, 50);
    }

    #[test]
    fn test_seed_precedence() {
        let config = Config {
            seed: Some(9),
            ..Config::default()
        };
        assert_eq!(resolve_seed(&Args::default(), &config), 9);
        let args = Args {
            seed: Some(4),
            ..Args::default()
        };
        assert_eq!(resolve_seed(&args, &config), 4);
    }

    #[test]
    fn test_small_sweep_runs() {
        let args = Args {
            rows: Some(5),
            cols: Some(5),
            tmax: Some(10),
            temperatures: Some(3),
            samples: Some(2),
            threads: Some(2),
            ..Args::default()
        };
        let config = Config::default().with_defaults();
        let plan = resolve_sweep(&args, &config, 11);

        let table = run_sweep_plan(&plan, false).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.failed_count(), 0);
    }
}
