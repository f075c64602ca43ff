mod report;
mod runner;

pub use report::{report_single_run, report_sweep_summary, SingleRunExport, SweepExport};
pub use runner::{
    resolve_model, resolve_seed, resolve_single, resolve_sweep, run_single_plan, run_sweep_plan,
    SinglePlan, SweepPlan,
};

use crate::config::{Args, Config, Mode};
use crate::io::{setup_output, write_json};
use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs;
use tracing::info;

pub struct IsingApplication {
    args: Args,
    config: Config,
}

impl IsingApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        Self::new(args)
    }

    pub fn new(args: Args) -> Result<Self> {
        let config = load_config(&args)?;
        config
            .validate()
            .map_err(|msg| eyre!("Invalid configuration: {}", msg))?;
        Ok(Self { args, config })
    }

    pub fn mode(&self) -> Mode {
        self.args.mode.or(self.config.mode).unwrap_or_default()
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded:\n{:?}", self.config);
        self.execute()
    }

    /// Run the selected mode without touching the global logger
    pub fn execute(&self) -> Result<()> {
        let seed = resolve_seed(&self.args, &self.config);

        match self.mode() {
            Mode::Sweep => {
                let plan = resolve_sweep(&self.args, &self.config, seed);
                let table = run_sweep_plan(&plan, !self.args.no_progress)?;
                report_sweep_summary(&table)?;

                if let Some(path) = &self.args.data {
                    write_json(path, &SweepExport::new(&plan, &table))?;
                }
            }
            Mode::Single => {
                let plan = resolve_single(&self.args, &self.config, seed);
                let (result, trajectory) = run_single_plan(&plan)?;
                report_single_run(&plan, &result, &trajectory);

                if let Some(path) = &self.args.data {
                    let export = SingleRunExport {
                        params: &plan.params,
                        seed: plan.seed,
                        result: &result,
                        trajectory: &trajectory,
                    };
                    write_json(path, &export)?;
                }
            }
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let Some(path) = &args.config_file else {
        return Ok(Config::default().with_defaults());
    };

    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;

    let config = Config::from_yaml_str(&config_content)
        .wrap_err("Failed to parse configuration file")?;

    Ok(config)
}
