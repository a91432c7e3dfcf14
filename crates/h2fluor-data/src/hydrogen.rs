//! Atomic hydrogen absorbers.
//!
//! The Lyman series Lyα–Ly9 is embedded from the NIST Atomic Spectra Database
//! (fine-structure components blended). Column densities are distributed over
//! the distinct lower levels of the line list with Boltzmann weights, so every
//! line arising from 1s carries the full HI column.

use serde::{Deserialize, Serialize};

use h2fluor_core::constants::CGS;
use h2fluor_core::{Band, Species, Transition};

use crate::provider::{require, DataError};

/// Lyman series: (vacuum wavelength Å, A_ul s⁻¹, f_lu), upper n = 2, 3, …
const LYMAN_SERIES: &[(f64, f64, f64)] = &[
    (1215.670, 6.2650e8, 0.416_40),
    (1025.722, 1.6725e8, 0.079_120),
    (972.537, 6.8180e7, 0.029_010),
    (949.743, 3.4370e7, 0.013_940),
    (937.803, 1.9730e7, 0.007_799),
    (930.748, 1.2368e7, 0.004_814),
    (926.226, 8.2550e6, 0.003_183),
    (923.150, 5.7850e6, 0.002_216),
    (920.963, 4.2090e6, 0.001_605),
];

/// One HI line with half-integer angular momenta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicLine {
    pub wavelength_aa: f64,
    /// Total angular momentum of the lower level.
    pub j_lower: f64,
    pub j_upper: f64,
    pub a_ul: f64,
    pub f_lu: f64,
    /// Lower-level energy above the ground state (cm⁻¹).
    pub lower_energy_cm: f64,
    /// Principal quantum numbers.
    pub n_lower: u32,
    pub n_upper: u32,
}

impl AtomicLine {
    /// Statistical weight 2J + 1 of the lower level.
    pub fn lower_weight(&self) -> f64 {
        2.0 * self.j_lower + 1.0
    }

    /// As an absorber for the transfer engine.
    ///
    /// The vibrational slots carry principal quantum numbers and the rotational
    /// slots orbital angular momentum (s = 0, p = 1). The damping constant is
    /// A_ul.
    pub fn to_transition(&self) -> Transition {
        Transition {
            species: Species::Hi,
            band: Band::Atomic,
            v_upper: self.n_upper,
            j_upper: 1,
            v_lower: self.n_lower,
            j_lower: 0,
            wavelength_aa: self.wavelength_aa,
            a_total: self.a_ul,
            a_ul: self.a_ul,
            a_diss: 0.0,
            f_lu: self.f_lu,
        }
    }
}

/// The embedded Lyman series, Lyα first.
pub fn lyman_series() -> Vec<AtomicLine> {
    LYMAN_SERIES
        .iter()
        .enumerate()
        .map(|(i, &(wavelength_aa, a_ul, f_lu))| AtomicLine {
            wavelength_aa,
            j_lower: 0.5,
            j_upper: 1.5,
            a_ul,
            f_lu,
            lower_energy_cm: 0.0,
            n_lower: 1,
            n_upper: i as u32 + 2,
        })
        .collect()
}

/// Designation of a Lyman line: Greek letters up to n = 6, then the upper level.
pub fn lyman_label(n_upper: u32) -> String {
    match n_upper {
        2 => "Ly-alpha".into(),
        3 => "Ly-beta".into(),
        4 => "Ly-gamma".into(),
        5 => "Ly-delta".into(),
        6 => "Ly-epsilon".into(),
        n => format!("Ly(1-{})", n),
    }
}

/// Lower-level column density (cm⁻²) of each line.
///
/// N_l = N_HI g_l exp(−E_l hc/kT) / Σ_levels g exp(−E hc/kT), where the sum
/// runs over the distinct lower levels present in `lines`.
pub fn hi_columns(
    lines: &[AtomicLine],
    total_column_cm2: f64,
    temperature_k: f64,
) -> Result<Vec<f64>, DataError> {
    require(
        total_column_cm2.is_finite() && total_column_cm2 >= 0.0,
        "HI column density",
        total_column_cm2,
        "must be non-negative",
    )?;
    require(
        temperature_k.is_finite() && temperature_k > 0.0,
        "HI temperature",
        temperature_k,
        "must be positive for a Boltzmann distribution",
    )?;

    let weight = |l: &AtomicLine| {
        let boltzmann = -l.lower_energy_cm * CGS::SECOND_RADIATION_CONSTANT / temperature_k;
        l.lower_weight() * boltzmann.exp()
    };

    let mut levels: Vec<(u32, u64, u64)> = Vec::new();
    let mut partition = 0.0;
    for l in lines {
        let key = (l.n_lower, l.j_lower.to_bits(), l.lower_energy_cm.to_bits());
        if !levels.contains(&key) {
            levels.push(key);
            partition += weight(l);
        }
    }

    Ok(lines
        .iter()
        .map(|l| if partition > 0.0 { total_column_cm2 * weight(l) / partition } else { 0.0 })
        .collect())
}
