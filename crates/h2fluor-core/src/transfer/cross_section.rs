//! Absorption cross-sections.
//!
//! $$\sigma_i(\lambda) = \frac{\sqrt{\pi}\, e^2}{m_e c\, \Delta v}\, f_{lu}\, \lambda_{lu}\, H(a, y)$$
//!
//! with the damping constant Γ = A_tot of the upper level. HI and H₂ lines go
//! through the same expression with the same physical Doppler width.

use ndarray::Array2;

use h2fluor_compute::ComputeBackend;

use crate::constants::{ANGSTROM_TO_CM, CGS};
use crate::doppler::DopplerWidth;
use crate::profile::voigt_point;
use crate::transfer::check_finite_rows;
use crate::types::{validate_transitions, PhysicsError, Transition, WavelengthGrid};

/// √π e² / (m_e c Δv) in cm; times f_lu, λ_lu (cm) and H it gives σ in cm².
pub fn cross_section_prefactor(width: DopplerWidth) -> f64 {
    std::f64::consts::PI.sqrt() * CGS::ELEMENTARY_CHARGE * CGS::ELEMENTARY_CHARGE
        / (CGS::ELECTRON_MASS * CGS::SPEED_OF_LIGHT * width.cm_per_s())
}

/// Write σ(λ) (cm²) of one transition over `grid` into `row`.
pub fn cross_section_row(
    grid: &[f64],
    transition: &Transition,
    width: DopplerWidth,
    row: &mut [f64],
) {
    let strength = cross_section_prefactor(width)
        * transition.f_lu
        * transition.wavelength_aa
        * ANGSTROM_TO_CM;
    for (out, &lam) in row.iter_mut().zip(grid) {
        *out = strength * voigt_point(lam, transition.wavelength_aa, transition.a_total, width);
    }
}

/// Cross-section matrix [transitions × grid] in cm².
///
/// Rows follow the order of `transitions`; by convention the HI lines come
/// first so that the H₂ block is a contiguous tail. `width` is the physical
/// (instrument-free) width shared by every row.
pub fn cross_sections(
    grid: &WavelengthGrid,
    transitions: &[Transition],
    width: DopplerWidth,
    backend: &dyn ComputeBackend,
) -> Result<Array2<f64>, PhysicsError> {
    validate_transitions(transitions)?;
    let samples = grid.as_slice();

    let sigma = backend.parallel_row_fill(transitions.len(), samples.len(), &|i, row| {
        cross_section_row(samples, &transitions[i], width, row);
    })?;

    check_finite_rows("cross-section", &sigma, samples, 0)?;
    log::debug!(
        "Cross-sections: {} transitions x {} samples",
        transitions.len(),
        samples.len()
    );
    Ok(sigma)
}
