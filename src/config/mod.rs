//! Configuration management for Ising simulations
//!
//! This module handles configuration structures, defaults, and validation
//! for temperature sweeps and single recorded runs.

mod args;

pub use args::Args;

use clap::ValueEnum;
use mc::sweep::DEFAULT_TEMPERATURE_FLOOR;
use serde::{Deserialize, Serialize};

/// What the application should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Many independent runs across a temperature range
    #[default]
    Sweep,
    /// One run with a recorded magnetization series and snapshots
    Single,
}

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    pub mode: Option<Mode>,
    #[serde(default)]
    pub model: ModelParams,
    #[serde(default)]
    pub sweep: SweepParams,
    #[serde(default)]
    pub single: SingleRunParams,
    pub seed: Option<u64>,
}

/// Lattice and Hamiltonian parameters shared by every run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelParams {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub init_prob: Option<f64>,
    pub coupling: Option<f64>,
    pub field: Option<f64>,
    pub moment: Option<f64>,
    pub tmax: Option<usize>,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            rows: Some(30),
            cols: Some(30),
            init_prob: Some(0.5),
            coupling: Some(1.0),
            field: Some(0.0),
            moment: Some(1.0),
            tmax: Some(1200),
        }
    }
}

impl ModelParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.rows.is_none() {
            self.rows = defaults.rows;
        }
        if self.cols.is_none() {
            self.cols = defaults.cols;
        }
        if self.init_prob.is_none() {
            self.init_prob = defaults.init_prob;
        }
        if self.coupling.is_none() {
            self.coupling = defaults.coupling;
        }
        if self.field.is_none() {
            self.field = defaults.field;
        }
        if self.moment.is_none() {
            self.moment = defaults.moment;
        }
        if self.tmax.is_none() {
            self.tmax = defaults.tmax;
        }
        self
    }
}

/// Temperature sweep parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepParams {
    pub t_min: Option<f64>,
    pub t_max: Option<f64>,
    pub temperatures: Option<usize>,
    pub temperature_floor: Option<f64>,
    pub samples: Option<usize>,
    pub threads: Option<usize>,
    pub fail_fast: Option<bool>,
}

impl Default for SweepParams {
    fn default() -> Self {
        SweepParams {
            t_min: Some(0.0),
            t_max: Some(4.0),
            temperatures: Some(30),
            temperature_floor: Some(DEFAULT_TEMPERATURE_FLOOR),
            samples: Some(100),
            threads: None,
            fail_fast: Some(false),
        }
    }
}

impl SweepParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.t_min.is_none() {
            self.t_min = defaults.t_min;
        }
        if self.t_max.is_none() {
            self.t_max = defaults.t_max;
        }
        if self.temperatures.is_none() {
            self.temperatures = defaults.temperatures;
        }
        if self.temperature_floor.is_none() {
            self.temperature_floor = defaults.temperature_floor;
        }
        if self.samples.is_none() {
            self.samples = defaults.samples;
        }
        if self.fail_fast.is_none() {
            self.fail_fast = defaults.fail_fast;
        }
        self
    }
}

/// Single-run demonstration parameters; lattice size and `tmax` here take
/// precedence over the `model` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SingleRunParams {
    pub kt: Option<f64>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub tmax: Option<usize>,
    pub snapshot_interval: Option<usize>,
}

impl Default for SingleRunParams {
    fn default() -> Self {
        SingleRunParams {
            kt: Some(0.003),
            rows: Some(50),
            cols: Some(50),
            tmax: Some(1000),
            snapshot_interval: Some(50),
        }
    }
}

impl SingleRunParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.kt.is_none() {
            self.kt = defaults.kt;
        }
        if self.rows.is_none() {
            self.rows = defaults.rows;
        }
        if self.cols.is_none() {
            self.cols = defaults.cols;
        }
        if self.tmax.is_none() {
            self.tmax = defaults.tmax;
        }
        if self.snapshot_interval.is_none() {
            self.snapshot_interval = defaults.snapshot_interval;
        }
        self
    }
}

impl Config {
    /// Apply default values to all parameter sections
    pub fn with_defaults(mut self) -> Self {
        self.mode = Some(self.mode.unwrap_or_default());
        self.model = self.model.with_defaults();
        self.sweep = self.sweep.with_defaults();
        self.single = self.single.with_defaults();
        self
    }

    /// Parse a YAML document and fill in defaults
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yml::Error> {
        Ok(serde_yml::from_str::<Config>(content)?.with_defaults())
    }

    /// Validate configuration parameters that the engine cannot check per run
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(t_min), Some(t_max)) = (self.sweep.t_min, self.sweep.t_max) {
            if t_min > t_max {
                return Err(format!(
                    "Sweep t_min ({}) must not exceed t_max ({})",
                    t_min, t_max
                ));
            }
        }
        if self.sweep.temperatures == Some(0) {
            return Err("Number of sweep temperatures must be positive".to_string());
        }
        if self.sweep.samples == Some(0) {
            return Err("Number of samples per temperature must be positive".to_string());
        }
        if self.sweep.threads == Some(0) {
            return Err("Number of threads must be positive".to_string());
        }
        if let Some(floor) = self.sweep.temperature_floor {
            if floor <= 0.0 {
                return Err("Temperature floor must be positive".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_sweep() {
        let config = Config::default().with_defaults();
        assert_eq!(config.mode, Some(Mode::Sweep));
        assert_eq!(config.model.rows, Some(30));
        assert_eq!(config.model.cols, Some(30));
        assert_eq!(config.model.tmax, Some(1200));
        assert_eq!(config.sweep.temperatures, Some(30));
        assert_eq!(config.sweep.samples, Some(100));
        assert_eq!(config.single.rows, Some(50));
        assert_eq!(config.single.tmax, Some(1000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
mode: single
model:
  rows: 12
  field: 0.25
sweep:
  samples: 8
single:
  kt: 1.5
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.mode, Some(Mode::Single));
        assert_eq!(config.model.rows, Some(12));
        assert_eq!(config.model.cols, Some(30));
        assert_eq!(config.model.field, Some(0.25));
        assert_eq!(config.sweep.samples, Some(8));
        assert_eq!(config.sweep.t_max, Some(4.0));
        assert_eq!(config.single.kt, Some(1.5));
        assert_eq!(config.single.snapshot_interval, Some(50));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.model.init_prob, Some(0.5));
        assert_eq!(config.sweep.temperature_floor, Some(DEFAULT_TEMPERATURE_FLOOR));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default().with_defaults();

        config.sweep.t_min = Some(5.0);
        assert!(config.validate().is_err());
        config.sweep.t_min = Some(0.0);

        config.sweep.samples = Some(0);
        assert!(config.validate().is_err());
        config.sweep.samples = Some(10);

        config.sweep.threads = Some(0);
        assert!(config.validate().is_err());
        config.sweep.threads = Some(2);

        config.sweep.temperature_floor = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Config::from_yaml_str("mode: wolff").is_err());
    }
}
