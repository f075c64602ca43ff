use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Parameters of a single Metropolis run on a rectangular lattice
///
/// All energies are in reduced units, so `kt` is the dimensionless
/// temperature `k_B T`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of lattice rows
    pub rows: usize,
    /// Number of lattice columns
    pub cols: usize,
    /// Probability that a site starts as spin up
    pub init_prob: f64,
    /// Temperature k_B T
    pub kt: f64,
    /// Nearest-neighbour coupling constant J
    pub coupling: f64,
    /// External magnetic field B
    pub field: f64,
    /// Magnetic moment mu of a site
    pub moment: f64,
    /// Maximum number of time steps (one step = rows * cols flip attempts)
    pub tmax: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            rows: 30,
            cols: 30,
            init_prob: 0.5,
            kt: 1.0,
            coupling: 1.0,
            field: 0.0,
            moment: 1.0,
            tmax: 1200,
        }
    }
}

impl SimulationParams {
    /// Same parameters at a different temperature
    pub fn with_temperature(mut self, kt: f64) -> Self {
        self.kt = kt;
        self
    }

    /// Number of sites on the lattice
    pub fn n_sites(&self) -> usize {
        self.rows * self.cols
    }

    /// Validate parameters before a run starts stepping
    pub fn validate(&self) -> Result<(), SimError> {
        validate_dimensions(self.rows, self.cols)?;
        validate_probability(self.init_prob)?;

        if !self.kt.is_finite() || self.kt <= 0.0 {
            return Err(SimError::invalid(
                "kt",
                format!("temperature must be positive and finite, got {}", self.kt),
            ));
        }
        for (name, value) in [
            ("coupling", self.coupling),
            ("field", self.field),
            ("moment", self.moment),
        ] {
            if !value.is_finite() {
                return Err(SimError::invalid(name, format!("must be finite, got {value}")));
            }
        }

        Ok(())
    }
}

pub(crate) fn validate_dimensions(rows: usize, cols: usize) -> Result<(), SimError> {
    if rows == 0 {
        return Err(SimError::invalid("rows", "lattice must have at least one row"));
    }
    if cols == 0 {
        return Err(SimError::invalid("cols", "lattice must have at least one column"));
    }
    Ok(())
}

pub(crate) fn validate_probability(prob: f64) -> Result<(), SimError> {
    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&prob) {
        return Err(SimError::invalid(
            "init_prob",
            format!("probability must lie in [0, 1], got {prob}"),
        ));
    }
    Ok(())
}
