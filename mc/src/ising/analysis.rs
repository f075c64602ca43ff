//! Utility functions for analyzing Ising model results

/// Critical temperature for the 2D Ising model (Onsager's exact result)
/// T_c = 2J / (k_B * ln(1 + √2)) ≈ 2.269 J/k_B
pub fn critical_temperature() -> f64 {
    2.0 / (1.0 + 2.0_f64.sqrt()).ln()
}

/// Theoretical energy per site at T=0 with all spins aligned and no field
pub fn energy_per_site_at_zero_temp(coupling: f64) -> f64 {
    // Each spin has 4 aligned neighbours, E = -J * 4 / 2 = -2J per site
    -2.0 * coupling
}

/// Spontaneous magnetization per site below T_c (Onsager/Yang), zero above
pub fn spontaneous_magnetization(kt: f64, coupling: f64) -> f64 {
    if kt <= 0.0 {
        return 1.0;
    }
    if kt >= critical_temperature() * coupling {
        return 0.0;
    }
    let sinh = (2.0 * coupling / kt).sinh();
    (1.0 - sinh.powi(-4)).powf(0.125)
}

/// Mean and population standard deviation of a set of samples
pub fn mean_and_std(samples: &[f64]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let mean_sq = samples.iter().map(|x| x * x).sum::<f64>() / n;
    let variance = (mean_sq - mean * mean).max(0.0);

    Some((mean, variance.sqrt()))
}
