//! Radiative transfer through the HI + H₂ absorbing layer.
//!
//! The stages run in order on the coarse wavelength grid:
//!
//! 1. [`cross_section`]: σ_i(λ) for every transition, HI rows first.
//! 2. [`optical_depth`]: τ_i = N_i σ_i and the fixed-order total τ_tot.
//! 3. [`source`]: the incident continuum attenuated by exp(−τ_tot).
//! 4. [`absorption`]: photons absorbed by each H₂ transition.
//!
//! Every stage returns a fresh value; nothing is accumulated on a shared
//! calculation object.

pub mod absorption;
pub mod cross_section;
pub mod optical_depth;
pub mod source;

pub use absorption::{absorption_rate_density, absorption_rates, integrate_rates, self_shielding};
pub use cross_section::{cross_section_prefactor, cross_sections};
pub use optical_depth::{optical_depth, total_optical_depth, OpticalDepth};
pub use source::attenuate;

use ndarray::Array2;

use crate::types::PhysicsError;

/// Fail on the first non-finite entry of a [transition × wavelength] array.
pub(crate) fn check_finite_rows(
    stage: &'static str,
    values: &Array2<f64>,
    grid: &[f64],
    row_offset: usize,
) -> Result<(), PhysicsError> {
    match values.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((i, j), _)) => Err(PhysicsError::NonFinite {
            stage,
            transition: Some(i + row_offset),
            wavelength_aa: grid.get(j).copied().unwrap_or(f64::NAN),
        }),
        None => Ok(()),
    }
}

/// Fail on the first non-finite sample of a spectrum-like vector.
pub(crate) fn check_finite_samples(
    stage: &'static str,
    values: &[f64],
    grid: &[f64],
) -> Result<(), PhysicsError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(j) => Err(PhysicsError::NonFinite {
            stage,
            transition: None,
            wavelength_aa: grid.get(j).copied().unwrap_or(f64::NAN),
        }),
        None => Ok(()),
    }
}

/// Return an error unless two lengths agree.
pub(crate) fn check_len(
    context: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), PhysicsError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PhysicsError::LengthMismatch {
            context,
            expected,
            actual,
        })
    }
}
