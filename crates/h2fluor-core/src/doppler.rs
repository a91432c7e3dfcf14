//! Doppler broadening and bulk Doppler shift.
//!
//! The line width is a velocity dispersion built from independent terms
//! added in quadrature:
//!
//! $$\Delta v = \sqrt{\Delta v_{\text{th}}^2 + b^2 + \Delta v_{\text{instr}}^2}$$
//!
//! with $\Delta v_{\text{th}} = \sqrt{2 k_B T / (2 m_p)}$ for the H₂ gas and
//! $\Delta v_{\text{instr}} = c / (R \sqrt{8 \ln 2})$ (McJunkin et al. 2016, Eq. 7).
//! One width pair, taken from the H₂ temperature, broadens every absorber in
//! the layer, HI included.

use serde::{Deserialize, Serialize};

use crate::constants::CGS;
use crate::types::{require, PhysicsError, Species};

/// A velocity-equivalent line width (cm s⁻¹), always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DopplerWidth(f64);

impl DopplerWidth {
    /// Wrap a width in cm s⁻¹, rejecting zero, negative and non-finite values.
    pub fn new(cm_per_s: f64) -> Result<Self, PhysicsError> {
        require(
            cm_per_s.is_finite() && cm_per_s > 0.0,
            "Doppler width",
            cm_per_s,
            "must be positive",
        )?;
        Ok(Self(cm_per_s))
    }

    pub fn cm_per_s(self) -> f64 {
        self.0
    }

    pub fn km_per_s(self) -> f64 {
        self.0 * 1e-5
    }

    /// The width expressed in wavelength at `wavelength_aa` (Å).
    pub fn wavelength_width_aa(self, wavelength_aa: f64) -> f64 {
        wavelength_aa * self.0 / CGS::SPEED_OF_LIGHT
    }
}

/// The two broadening regimes of one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopplerWidths {
    /// Thermal + non-thermal; used for absorption cross-sections.
    pub physical: DopplerWidth,
    /// Physical + instrumental; used to render emitted lines.
    pub total: DopplerWidth,
}

/// Quadrature sum √(Σ σᵢ²) of independent broadening terms.
pub fn quadrature_sum(terms: &[f64]) -> f64 {
    terms.iter().map(|t| t * t).sum::<f64>().sqrt()
}

/// Thermal velocity width √(2 k_B T / (μ m_p)) of a species.
pub fn thermal_width(temperature_k: f64, species: Species) -> Result<f64, PhysicsError> {
    require(
        temperature_k.is_finite() && temperature_k >= 0.0,
        "temperature",
        temperature_k,
        "must be non-negative",
    )?;
    let mass = species.mass_in_proton_masses() * CGS::PROTON_MASS;
    Ok((2.0 * CGS::BOLTZMANN_CONSTANT * temperature_k / mass).sqrt())
}

/// Instrumental width c / (R √(8 ln 2)).
pub fn instrumental_width(resolving_power: f64) -> Result<f64, PhysicsError> {
    require(
        resolving_power.is_finite() && resolving_power > 0.0,
        "resolving power",
        resolving_power,
        "must be positive",
    )?;
    Ok(CGS::SPEED_OF_LIGHT / (resolving_power * (8.0 * std::f64::consts::LN_2).sqrt()))
}

/// Combined width for one broadening regime.
///
/// # Arguments
/// * `temperature_k` - Kinetic temperature of the H₂ gas (K).
/// * `non_thermal_cm_s` - Non-thermal b-value (cm s⁻¹).
/// * `resolving_power` - Instrument resolving power; `None` omits the term.
pub fn compute_width(
    temperature_k: f64,
    non_thermal_cm_s: f64,
    resolving_power: Option<f64>,
) -> Result<DopplerWidth, PhysicsError> {
    require(
        non_thermal_cm_s.is_finite() && non_thermal_cm_s >= 0.0,
        "non-thermal velocity",
        non_thermal_cm_s,
        "must be non-negative",
    )?;
    let thermal = thermal_width(temperature_k, Species::H2)?;
    let width = match resolving_power {
        Some(r) => quadrature_sum(&[thermal, non_thermal_cm_s, instrumental_width(r)?]),
        None => quadrature_sum(&[thermal, non_thermal_cm_s]),
    };
    DopplerWidth::new(width)
}

/// Both regimes from the same temperature and b-value.
pub fn doppler_widths(
    temperature_k: f64,
    non_thermal_cm_s: f64,
    resolving_power: Option<f64>,
) -> Result<DopplerWidths, PhysicsError> {
    Ok(DopplerWidths {
        physical: compute_width(temperature_k, non_thermal_cm_s, None)?,
        total: compute_width(temperature_k, non_thermal_cm_s, resolving_power)?,
    })
}

/// Non-relativistic Doppler shift λ_obs = λ_rest (1 + v/c).
///
/// Positive velocities (recession) shift redward.
pub fn doppler_shift(wavelength_aa: f64, velocity_cm_s: f64) -> Result<f64, PhysicsError> {
    require(velocity_cm_s.is_finite(), "Doppler velocity", velocity_cm_s, "must be finite")?;
    Ok(wavelength_aa * (1.0 + velocity_cm_s / CGS::SPEED_OF_LIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KM_TO_CM;
    use approx::assert_relative_eq;

    #[test]
    fn test_h2_thermal_width_at_500k() {
        // √(k T / m_p) at 500 K ≈ 2.03 km/s
        let dv = thermal_width(500.0, Species::H2).unwrap();
        let expected = (CGS::BOLTZMANN_CONSTANT * 500.0 / CGS::PROTON_MASS).sqrt();
        assert_relative_eq!(dv, expected, max_relative = 1e-14);
        assert_relative_eq!(dv / KM_TO_CM, 2.03, epsilon = 0.01);
    }

    #[test]
    fn test_reduces_to_thermal_width() {
        let w = compute_width(500.0, 0.0, None).unwrap();
        assert_relative_eq!(
            w.cm_per_s(),
            thermal_width(500.0, Species::H2).unwrap(),
            max_relative = 1e-15
        );
    }

    #[test]
    fn test_quadrature_sum_is_order_invariant() {
        let terms = [2.03e5, 13.0e5, 1.27e5];
        let forward = quadrature_sum(&terms);
        let reversed = quadrature_sum(&[terms[2], terms[1], terms[0]]);
        let shuffled = quadrature_sum(&[terms[1], terms[2], terms[0]]);
        assert_relative_eq!(forward, reversed, max_relative = 1e-15);
        assert_relative_eq!(forward, shuffled, max_relative = 1e-15);
    }

    #[test]
    fn test_total_width_includes_instrument() {
        let w = doppler_widths(500.0, 13.0 * KM_TO_CM, Some(1e5)).unwrap();
        assert!(w.total > w.physical);
        let instr = instrumental_width(1e5).unwrap();
        assert_relative_eq!(
            w.total.cm_per_s().powi(2),
            w.physical.cm_per_s().powi(2) + instr * instr,
            max_relative = 1e-12
        );
        // c / (R √(8 ln 2)) ≈ 1.27 km/s at R = 10⁵
        assert_relative_eq!(instr / KM_TO_CM, 1.273, epsilon = 1e-3);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(compute_width(-1.0, 0.0, None).is_err());
        assert!(compute_width(100.0, 0.0, Some(0.0)).is_err());
        assert!(compute_width(100.0, 0.0, Some(-5.0)).is_err());
        assert!(compute_width(100.0, -1.0, None).is_err());
        // Zero temperature and no other term leaves no width at all.
        assert!(compute_width(0.0, 0.0, None).is_err());
    }

    #[test]
    fn test_doppler_shift() {
        let shifted = doppler_shift(1500.0, 10.0 * KM_TO_CM).unwrap();
        assert_relative_eq!(shifted, 1500.050_034_614_279_9, max_relative = 1e-13);
        assert_eq!(doppler_shift(1500.0, 0.0).unwrap(), 1500.0);
        assert!(doppler_shift(1500.0, f64::NAN).is_err());
        assert!(doppler_shift(1500.0, f64::INFINITY).is_err());
        assert!(doppler_shift(f64::NAN, 1e6).unwrap().is_nan());
    }
}
