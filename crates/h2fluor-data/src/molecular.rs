//! H₂ ground-state level structure and LTE populations.
//!
//! Level energies of X¹Σg⁺ follow the Dunham expansion
//!
//! $$E(v, J) = \omega_e (v + \tfrac12) - \omega_e x_e (v + \tfrac12)^2 + B_v J(J+1) - D_e J^2 (J+1)^2$$
//!
//! with $B_v = B_e - \alpha_e (v + \tfrac12)$, measured from (v, J) = (0, 0).
//! The truncated expansion turns over at high J (and high v) once the
//! negative terms dominate. Levels past the turnover are not bound and
//! carry no population; with the default constants the rotational ladder
//! ends at J = 25 for v = 0 and J = 13 for v = 14.
//! Populations are Boltzmann-distributed with the ortho/para nuclear-spin
//! weights (McJunkin et al. 2016, Eq. 8).

use ndarray::Array2;

use h2fluor_core::constants::{ANGSTROM_TO_CM, CGS};
use h2fluor_core::LevelPopulations;

use crate::provider::{require, DataError};

/// Spectroscopic constants of one electronic state (cm⁻¹).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DunhamConstants {
    pub omega_e: f64,
    pub omega_e_x_e: f64,
    pub b_e: f64,
    pub alpha_e: f64,
    pub d_e: f64,
}

impl Default for DunhamConstants {
    /// H₂ X¹Σg⁺ (Huber & Herzberg 1979).
    fn default() -> Self {
        Self {
            omega_e: 4401.21,
            omega_e_x_e: 121.33,
            b_e: 60.853,
            alpha_e: 3.062,
            d_e: 0.0471,
        }
    }
}

impl DunhamConstants {
    fn term(&self, v: u32, j: u32) -> f64 {
        let vh = v as f64 + 0.5;
        let jj = (j * (j + 1)) as f64;
        let b_v = self.b_e - self.alpha_e * vh;
        self.omega_e * vh - self.omega_e_x_e * vh * vh + b_v * jj - self.d_e * jj * jj
    }

    /// Energy of (v, J) above (0, 0), in cm⁻¹.
    pub fn level_energy_cm(&self, v: u32, j: u32) -> f64 {
        self.term(v, j) - self.term(0, 0)
    }

    /// Highest v ≤ `vmax` up to which the vibrational ladder still rises.
    pub fn vibrational_limit(&self, vmax: u32) -> u32 {
        (0..vmax)
            .find(|&v| self.term(v + 1, 0) <= self.term(v, 0))
            .unwrap_or(vmax)
    }

    /// Highest J ≤ `jmax` up to which the rotational ladder of `v` still rises.
    pub fn rotational_limit(&self, v: u32, jmax: u32) -> u32 {
        (0..jmax)
            .find(|&j| self.term(v, j + 1) <= self.term(v, j))
            .unwrap_or(jmax)
    }

    /// Whether (v, J) lies below both turnovers of the expansion.
    pub fn is_bound(&self, v: u32, j: u32) -> bool {
        v <= self.vibrational_limit(v) && j <= self.rotational_limit(v, j)
    }
}

/// Nuclear-spin statistical weight: 1 for para (even J), 3 for ortho (odd J).
pub fn nuclear_spin_weight(j: u32) -> f64 {
    if j % 2 == 0 {
        1.0
    } else {
        3.0
    }
}

/// LTE column densities N(v, J) for v ≤ `vmax`, J ≤ `jmax` summing to
/// `total_column_cm2`. Unbound levels get a zero column.
pub fn lte_populations(
    total_column_cm2: f64,
    temperature_k: f64,
    vmax: u32,
    jmax: u32,
) -> Result<LevelPopulations, DataError> {
    lte_populations_with(&DunhamConstants::default(), total_column_cm2, temperature_k, vmax, jmax)
}

/// [`lte_populations`] with explicit molecular constants.
pub fn lte_populations_with(
    constants: &DunhamConstants,
    total_column_cm2: f64,
    temperature_k: f64,
    vmax: u32,
    jmax: u32,
) -> Result<LevelPopulations, DataError> {
    require(
        total_column_cm2.is_finite() && total_column_cm2 >= 0.0,
        "H2 column density",
        total_column_cm2,
        "must be non-negative",
    )?;
    require(
        temperature_k.is_finite() && temperature_k > 0.0,
        "H2 temperature",
        temperature_k,
        "must be positive for a Boltzmann distribution",
    )?;

    let mut weights = Array2::zeros((vmax as usize + 1, jmax as usize + 1));
    let v_bound = constants.vibrational_limit(vmax);
    let j_bound: Vec<u32> = (0..=vmax).map(|v| constants.rotational_limit(v, jmax)).collect();
    for ((v, j), w) in weights.indexed_iter_mut() {
        let (v, j) = (v as u32, j as u32);
        if v > v_bound || j > j_bound[v as usize] {
            continue;
        }
        let energy = constants.level_energy_cm(v, j);
        let g = nuclear_spin_weight(j) * (2 * j + 1) as f64;
        *w = g * (-energy * CGS::SECOND_RADIATION_CONSTANT / temperature_k).exp();
    }

    let partition: f64 = weights.sum();
    let columns = weights.mapv(|w: f64| total_column_cm2 * w / partition);
    log::debug!(
        "H2 LTE populations at {} K: Z = {:.4e} over {} levels",
        temperature_k,
        partition,
        columns.len()
    );
    Ok(LevelPopulations::new(columns)?)
}

/// Absorption oscillator strength from the emission rate (McJunkin et al. 2016, Eq. 2).
///
/// f_lu = m_e c λ² / (8π² e²) · (2J_u + 1)/(2J_l + 1) · A_ul
pub fn oscillator_strength(wavelength_aa: f64, j_upper: f64, j_lower: f64, a_ul: f64) -> f64 {
    let lam_cm = wavelength_aa * ANGSTROM_TO_CM;
    let g_ratio = (2.0 * j_upper + 1.0) / (2.0 * j_lower + 1.0);
    CGS::ELECTRON_MASS * CGS::SPEED_OF_LIGHT * lam_cm * lam_cm
        / (8.0 * std::f64::consts::PI.powi(2) * CGS::ELEMENTARY_CHARGE.powi(2))
        * g_ratio
        * a_ul
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lyman_alpha_oscillator_strength() {
        // 2p → 1s: g_u/g_l = 3, A = 6.265e8 s⁻¹, f = 0.4164
        let f = oscillator_strength(1215.67, 1.0, 0.0, 6.265e8);
        assert_relative_eq!(f, 0.4164, max_relative = 1e-3);
    }

    #[test]
    fn test_rotational_ladder() {
        let c = DunhamConstants::default();
        assert_eq!(c.level_energy_cm(0, 0), 0.0);
        // J = 1 lies 2 B_0 − 4 D_e above the ground level, B_0 = B_e − α_e/2.
        let b0 = c.b_e - 0.5 * c.alpha_e;
        assert_relative_eq!(c.level_energy_cm(0, 1), 2.0 * b0 - 4.0 * c.d_e, max_relative = 1e-12);
        // Fundamental vibrational interval ω_e − 2ω_e x_e.
        assert_relative_eq!(
            c.level_energy_cm(1, 0),
            c.omega_e - 2.0 * c.omega_e_x_e,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_level_energy_rises_over_bound_levels() {
        let c = DunhamConstants::default();
        assert_eq!(c.vibrational_limit(14), 14);
        assert_eq!(c.rotational_limit(0, 30), 25);
        assert_eq!(c.rotational_limit(14, 25), 13);
        for v in 0..=14 {
            let jlim = c.rotational_limit(v, 25);
            for j in 1..=jlim {
                assert!(c.level_energy_cm(v, j) > c.level_energy_cm(v, j - 1), "v={v} J={j}");
            }
            assert!(c.is_bound(v, jlim));
            if jlim < 25 {
                assert!(!c.is_bound(v, jlim + 1));
            }
        }
    }

    #[test]
    fn test_unbound_levels_are_empty() {
        // v = 14 turns over after J = 13.
        let pops = lte_populations(1e20, 20.0, 14, 25).unwrap();
        assert_eq!(pops.column(14, 25).unwrap(), 0.0);
        assert_eq!(pops.column(14, 14).unwrap(), 0.0);
        assert!(pops.column(14, 13).unwrap() >= 0.0);
        assert_relative_eq!(pops.total(), 1e20, max_relative = 1e-12);
        // At 20 K nearly everything sits in J = 0.
        assert!(pops.column(0, 0).unwrap() > 0.9e20);
    }

    #[test]
    fn test_populations_sum_to_total() {
        let pops = lte_populations(1e20, 500.0, 14, 25).unwrap();
        assert_eq!(pops.as_array().dim(), (15, 26));
        assert_relative_eq!(pops.total(), 1e20, max_relative = 1e-12);
        assert!(pops.as_array().iter().all(|&n| n >= 0.0));
    }

    #[test]
    fn test_ortho_para_weighting() {
        let t = 500.0;
        let pops = lte_populations(1e20, t, 2, 3).unwrap();
        let c = DunhamConstants::default();
        let ratio = pops.column(0, 1).unwrap() / pops.column(0, 0).unwrap();
        let expected = 9.0 * (-c.level_energy_cm(0, 1) * CGS::SECOND_RADIATION_CONSTANT / t).exp();
        assert_relative_eq!(ratio, expected, max_relative = 1e-12);
        // At 500 K the J = 1 ortho level dominates J = 0.
        assert!(ratio > 1.0);
    }

    #[test]
    fn test_rejects_unphysical_state() {
        assert!(lte_populations(1e20, 0.0, 14, 25).is_err());
        assert!(lte_populations(-1.0, 500.0, 14, 25).is_err());
    }
}
