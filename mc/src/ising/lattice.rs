use std::fmt;

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::params::{validate_dimensions, validate_probability};
use crate::error::SimError;

/// Spin value of a single site: +1 or -1
pub type Spin = i8;

/// Rectangular 2D lattice of Ising spins with periodic boundary conditions
///
/// Spins are stored row-major in a flat vector. Every entry is either
/// `+1` or `-1`; the dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    rows: usize,
    cols: usize,
    spins: Vec<Spin>,
}

impl Lattice {
    /// Create a lattice where each site is independently +1 with probability
    /// `init_prob` and -1 otherwise
    pub fn initialize<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        init_prob: f64,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        validate_dimensions(rows, cols)?;
        validate_probability(init_prob)?;

        let up = Bernoulli::new(init_prob)
            .map_err(|e| SimError::invalid("init_prob", e.to_string()))?;
        let spins = (0..rows * cols)
            .map(|_| if up.sample(&mut *rng) { 1 } else { -1 })
            .collect();

        Ok(Self { rows, cols, spins })
    }

    /// Create a lattice with every spin set to `spin` (ordered state)
    pub fn uniform(rows: usize, cols: usize, spin: Spin) -> Result<Self, SimError> {
        validate_dimensions(rows, cols)?;
        if spin != 1 && spin != -1 {
            return Err(SimError::invalid("spin", format!("spin must be +1 or -1, got {spin}")));
        }
        Ok(Self {
            rows,
            cols,
            spins: vec![spin; rows * cols],
        })
    }

    /// Build a lattice from explicit rows of spins
    pub fn from_rows(rows: &[Vec<Spin>]) -> Result<Self, SimError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        validate_dimensions(n_rows, n_cols)?;

        let mut spins = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(SimError::invalid("cols", "all rows must have the same length"));
            }
            if let Some(&bad) = row.iter().find(|&&s| s != 1 && s != -1) {
                return Err(SimError::invalid("spin", format!("spin must be +1 or -1, got {bad}")));
            }
            spins.extend_from_slice(row);
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            spins,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of sites
    pub fn n_sites(&self) -> usize {
        self.spins.len()
    }

    /// Flat row-major view of the spins
    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Spins as nested rows, convenient for plotting collaborators
    pub fn to_rows(&self) -> Vec<Vec<Spin>> {
        self.spins.chunks(self.cols).map(<[Spin]>::to_vec).collect()
    }

    /// Spin at (row, col); indices must be in range
    pub fn get(&self, row: usize, col: usize) -> Spin {
        self.spins[row * self.cols + col]
    }

    /// Spin at (i, j) with periodic boundary conditions
    pub(crate) fn get_periodic(&self, i: isize, j: isize) -> Spin {
        let i = i.rem_euclid(self.rows as isize) as usize;
        let j = j.rem_euclid(self.cols as isize) as usize;
        self.get(i, j)
    }

    /// Negate the spin at (row, col)
    pub fn flip(&mut self, row: usize, col: usize) {
        self.spins[row * self.cols + col] *= -1;
    }

    /// Sum of the four periodic nearest neighbours of (row, col)
    pub fn neighbor_sum(&self, row: usize, col: usize) -> i32 {
        let i = row as isize;
        let j = col as isize;

        self.get_periodic(i - 1, j) as i32
            + self.get_periodic(i, j + 1) as i32
            + self.get_periodic(i + 1, j) as i32
            + self.get_periodic(i, j - 1) as i32
    }

    /// Energy change caused by flipping the spin at (row, col)
    ///
    /// ΔE = 2 J s (Σ neighbours) + 2 B mu s, where `s` is the current spin.
    /// Flipping negates the site energy, hence the factor of two.
    pub fn energy_delta(
        &self,
        row: usize,
        col: usize,
        coupling: f64,
        field: f64,
        moment: f64,
    ) -> f64 {
        let spin = self.get(row, col) as f64;
        let neighbors = self.neighbor_sum(row, col) as f64;

        2.0 * coupling * spin * neighbors + 2.0 * field * moment * spin
    }

    /// Unnormalized magnetization (sum of all spins)
    pub fn magnetization(&self) -> i64 {
        self.spins.iter().map(|&s| s as i64).sum()
    }

    /// Magnetization per site, in [-1, 1]
    pub fn magnetization_per_site(&self) -> f64 {
        self.magnetization() as f64 / self.n_sites() as f64
    }

    /// Absolute magnetization per site
    pub fn abs_magnetization_per_site(&self) -> f64 {
        self.magnetization_per_site().abs()
    }

    /// True when every spin points the same way
    pub fn is_saturated(&self) -> bool {
        self.magnetization().unsigned_abs() == self.n_sites() as u64
    }

    /// Total energy E = -J Σ<ij> s_i s_j - B mu Σ s_i
    pub fn total_energy(&self, coupling: f64, field: f64, moment: f64) -> f64 {
        let mut energy = 0.0;

        for i in 0..self.rows {
            for j in 0..self.cols {
                let spin = self.get(i, j) as f64;

                // Only right and down neighbours, so each bond is counted once
                let right = self.get_periodic(i as isize, j as isize + 1) as f64;
                let down = self.get_periodic(i as isize + 1, j as isize) as f64;

                energy -= coupling * spin * (right + down);
                energy -= field * moment * spin;
            }
        }

        energy
    }

    /// Energy per site
    pub fn energy_per_site(&self, coupling: f64, field: f64, moment: f64) -> f64 {
        self.total_energy(coupling, field, moment) / self.n_sites() as f64
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.spins.chunks(self.cols) {
            for &spin in row {
                write!(f, "{:2}", if spin == 1 { "↑" } else { "↓" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
