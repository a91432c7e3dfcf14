//! Photons absorbed by each H₂ transition.
//!
//! At each wavelength the H₂ lines together absorb
//! I (1 − e^{−τ_H₂}), reduced by the transmission e^{−(τ_tot − τ_H₂)} of
//! every other absorber in the layer. Transition i takes the share
//! τ_i / τ_H₂ of that (McJunkin et al. 2016, Eqs. 12–13):
//!
//! $$R_i(\lambda) = I(\lambda)\, \frac{\tau_i}{\tau_{\text{H}_2}}\, \left(1 - e^{-\tau_{\text{H}_2}}\right) e^{-(\tau_{\text{tot}} - \tau_{\text{H}_2})}$$
//!
//! The per-transition pumping rate is the Riemann sum Σ_λ R_i(λ) Δλ on the
//! coarse grid. As τ_H₂ → 0 the rate tends to I σ_i N_i e^{−τ_HI} with no
//! singularity.

use ndarray::{Array2, ArrayView2};

use crate::transfer::{check_finite_rows, check_len, total_optical_depth};
use crate::types::{require, PhysicsError};

/// Below this optical depth (1 − e^{−x})/x is taken from its series.
const THIN_LIMIT: f64 = 1e-8;

/// H₂ self-shielding factor (1 − e^{−x}) / x, finite for every x ≥ 0 and
/// equal to 1 at x = 0.
pub fn self_shielding(x: f64) -> f64 {
    if x < THIN_LIMIT {
        1.0 - 0.5 * x
    } else {
        -(-x).exp_m1() / x
    }
}

/// Rate density R_i(λ) (ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹) for every H₂ row.
///
/// # Arguments
/// * `incident` - Unattenuated incident continuum on the coarse grid.
/// * `tau_h2` - H₂ rows of the optical depth.
/// * `tau_total` - Total optical depth over every absorber.
/// * `grid` - Coarse grid samples, used to locate failures.
/// * `row_offset` - Index of the first H₂ row in the combined line list.
pub fn absorption_rate_density(
    incident: &[f64],
    tau_h2: &ArrayView2<f64>,
    tau_total: &[f64],
    grid: &[f64],
    row_offset: usize,
) -> Result<Array2<f64>, PhysicsError> {
    check_len("absorption incident", tau_h2.ncols(), incident.len())?;
    check_len("absorption total optical depth", tau_h2.ncols(), tau_total.len())?;

    let h2_total = total_optical_depth(tau_h2);
    let weight: Vec<f64> = incident
        .iter()
        .zip(tau_total)
        .zip(&h2_total)
        .map(|((&i, &tot), &h2)| {
            // Rounding can leave the difference a hair below zero.
            let foreground = (tot - h2).max(0.0);
            i * self_shielding(h2) * (-foreground).exp()
        })
        .collect();

    let mut density = tau_h2.to_owned();
    for mut row in density.rows_mut() {
        for (r, &w) in row.iter_mut().zip(&weight) {
            *r *= w;
        }
    }
    check_finite_rows("absorption rate", &density, grid, row_offset)?;
    Ok(density)
}

/// Σ_λ R_i(λ) Δλ per row (ph cm⁻² s⁻¹ sr⁻¹).
pub fn integrate_rates(density: &Array2<f64>, step_aa: f64) -> Result<Vec<f64>, PhysicsError> {
    require(
        step_aa.is_finite() && step_aa > 0.0,
        "rate integration step",
        step_aa,
        "must be positive",
    )?;
    Ok(density
        .rows()
        .into_iter()
        .map(|row| row.iter().fold(0.0, |acc, &r| acc + r) * step_aa)
        .collect())
}

/// Per-transition pumping rates on a uniform coarse grid.
pub fn absorption_rates(
    incident: &[f64],
    tau_h2: &ArrayView2<f64>,
    tau_total: &[f64],
    grid: &[f64],
    step_aa: f64,
    row_offset: usize,
) -> Result<Vec<f64>, PhysicsError> {
    let density = absorption_rate_density(incident, tau_h2, tau_total, grid, row_offset)?;
    integrate_rates(&density, step_aa)
}
