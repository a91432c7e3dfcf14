//! Core types shared across the h2fluor pipeline.
//!
//! This module defines the data structures that flow between the stages:
//! transitions, level populations, wavelength grids, spectra, the immutable
//! parameter set, and the error type every stage reports through.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use h2fluor_compute::ComputeError;

use crate::constants::{photon_energy_erg, ANGSTROM_PER_NM, ARCSEC2_PER_SR, CGS, KM_TO_CM};

/// Errors raised by the radiative-transfer engine.
#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid transition #{index}: {reason}")]
    InvalidTransition { index: usize, reason: String },

    #[error("Invalid wavelength grid: {0}")]
    InvalidGrid(String),

    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Negative {quantity} at index {index}: {value:e}")]
    NegativeValue {
        quantity: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Non-finite value in {stage} (transition {transition:?}) at {wavelength_aa:.4} Å")]
    NonFinite {
        stage: &'static str,
        transition: Option<usize>,
        wavelength_aa: f64,
    },

    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),
}

/// Reject a parameter unless `ok` holds.
pub(crate) fn require(
    ok: bool,
    name: &'static str,
    value: f64,
    reason: &'static str,
) -> Result<(), PhysicsError> {
    if ok {
        Ok(())
    } else {
        Err(PhysicsError::InvalidParameter { name, value, reason })
    }
}

/// Absorbing species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Atomic hydrogen.
    Hi,
    /// Molecular hydrogen.
    H2,
}

impl Species {
    /// Particle mass in units of the proton mass (m_H ≈ m_p, m_H₂ ≈ 2 m_p).
    pub fn mass_in_proton_masses(self) -> f64 {
        match self {
            Species::Hi => 1.0,
            Species::H2 => 2.0,
        }
    }
}

/// Electronic band of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// H₂ B¹Σu⁺ – X¹Σg⁺ (Lyman band).
    Lyman,
    /// H₂ C¹Πu – X¹Σg⁺ (Werner band).
    Werner,
    /// Atomic line (HI).
    Atomic,
}

impl FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "B" | "L" | "Lyman" | "lyman" => Ok(Band::Lyman),
            "C" | "W" | "Werner" | "werner" => Ok(Band::Werner),
            "HI" | "H" | "Atomic" | "atomic" => Ok(Band::Atomic),
            other => Err(format!("unknown band identifier '{}'", other)),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Band::Lyman => "B",
            Band::Werner => "C",
            Band::Atomic => "HI",
        };
        f.write_str(s)
    }
}

/// One spectroscopic line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub species: Species,
    pub band: Band,
    /// Upper vibrational quantum number (principal quantum number for HI).
    pub v_upper: u32,
    /// Upper rotational quantum number (orbital ℓ for HI).
    pub j_upper: u32,
    /// Lower vibrational quantum number (principal quantum number for HI).
    pub v_lower: u32,
    /// Lower rotational quantum number (orbital ℓ for HI).
    pub j_lower: u32,
    /// Line centre (Å).
    pub wavelength_aa: f64,
    /// Total decay rate of the upper level (s⁻¹); used as the damping constant.
    pub a_total: f64,
    /// Spontaneous decay rate of this line (s⁻¹).
    pub a_ul: f64,
    /// Dissociative decay rate of the upper level (s⁻¹).
    pub a_diss: f64,
    /// Absorption oscillator strength.
    pub f_lu: f64,
}

impl Transition {
    /// Check the record invariants: λ > 0 and A_tot ≥ A_ul + A_diss ≥ 0.
    pub fn validate(&self, index: usize) -> Result<(), PhysicsError> {
        let fail = |reason: String| Err(PhysicsError::InvalidTransition { index, reason });

        if !(self.wavelength_aa.is_finite() && self.wavelength_aa > 0.0) {
            return fail(format!("wavelength must be positive, got {}", self.wavelength_aa));
        }
        for (name, value) in [
            ("A_tot", self.a_total),
            ("A_ul", self.a_ul),
            ("A_diss", self.a_diss),
            ("f_lu", self.f_lu),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return fail(format!("{} must be finite and non-negative, got {}", name, value));
            }
        }
        // Tolerate rounding in tabulated rates.
        if self.a_ul + self.a_diss > self.a_total * (1.0 + 1e-9) {
            return fail(format!(
                "A_tot = {:e} is smaller than A_ul + A_diss = {:e}",
                self.a_total,
                self.a_ul + self.a_diss
            ));
        }
        Ok(())
    }

    /// Branching ratio A_ul / A_tot of this line.
    pub fn branching_ratio(&self) -> f64 {
        if self.a_total > 0.0 {
            self.a_ul / self.a_total
        } else {
            0.0
        }
    }

    /// Lower level (v, J).
    pub fn lower_level(&self) -> (u32, u32) {
        (self.v_lower, self.j_lower)
    }

    /// Upper level key (band, v, J); lines sharing it belong to one cascade.
    pub fn upper_level(&self) -> (Band, u32, u32) {
        (self.band, self.v_upper, self.j_upper)
    }
}

/// Validate every transition in a list.
pub fn validate_transitions(transitions: &[Transition]) -> Result<(), PhysicsError> {
    transitions
        .iter()
        .enumerate()
        .try_for_each(|(i, t)| t.validate(i))
}

/// Column densities N(v, J) of the H₂ ground electronic state (cm⁻²).
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPopulations {
    /// Shape (vmax + 1, jmax + 1).
    columns: Array2<f64>,
}

impl LevelPopulations {
    /// Wrap a (v, J) table, rejecting negative or non-finite entries.
    pub fn new(columns: Array2<f64>) -> Result<Self, PhysicsError> {
        for ((v, j), &n) in columns.indexed_iter() {
            require(n.is_finite(), "level column density", n, "must be finite")?;
            if n < 0.0 {
                return Err(PhysicsError::NegativeValue {
                    quantity: "level column density",
                    index: v * columns.ncols() + j,
                    value: n,
                });
            }
        }
        Ok(Self { columns })
    }

    /// Column density of level (v, J), or `None` outside the table.
    pub fn column(&self, v: u32, j: u32) -> Option<f64> {
        self.columns.get([v as usize, j as usize]).copied()
    }

    /// Sum over all tabulated levels.
    pub fn total(&self) -> f64 {
        self.columns.iter().sum()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.columns
    }
}

/// Strictly increasing wavelength samples (Å).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthGrid {
    samples: Vec<f64>,
    /// Spacing of a uniform grid; `None` for an explicit sample list.
    step_aa: Option<f64>,
}

impl WavelengthGrid {
    /// Uniform grid `start, start + step, …` up to and including `end`
    /// (rounded to the nearest whole number of steps).
    pub fn uniform(start_aa: f64, end_aa: f64, step_aa: f64) -> Result<Self, PhysicsError> {
        require(
            start_aa.is_finite() && start_aa > 0.0,
            "grid start",
            start_aa,
            "must be positive",
        )?;
        require(
            end_aa.is_finite() && end_aa > start_aa,
            "grid end",
            end_aa,
            "must exceed the start",
        )?;
        require(step_aa.is_finite() && step_aa > 0.0, "grid step", step_aa, "must be positive")?;
        require(
            step_aa <= end_aa - start_aa,
            "grid step",
            step_aa,
            "must not exceed the grid span",
        )?;

        let n = ((end_aa - start_aa) / step_aa).round() as usize;
        let samples = (0..=n).map(|i| start_aa + i as f64 * step_aa).collect();
        Ok(Self {
            samples,
            step_aa: Some(step_aa),
        })
    }

    /// Grid from explicit samples.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self, PhysicsError> {
        if samples.is_empty() {
            return Err(PhysicsError::InvalidGrid("no samples".into()));
        }
        if let Some(bad) = samples.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
            return Err(PhysicsError::InvalidGrid(format!(
                "wavelengths must be positive, got {}",
                bad
            )));
        }
        if let Some(i) = (1..samples.len()).find(|&i| samples[i] <= samples[i - 1]) {
            return Err(PhysicsError::InvalidGrid(format!(
                "samples must be strictly increasing (index {})",
                i
            )));
        }
        Ok(Self {
            samples,
            step_aa: None,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Uniform spacing, if the grid was built with one.
    pub fn step_aa(&self) -> Option<f64> {
        self.step_aa
    }

    /// (first, last) sample.
    pub fn range(&self) -> (f64, f64) {
        (self.samples[0], self.samples[self.samples.len() - 1])
    }
}

/// Intensity unit of an emitted spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpectralUnit {
    /// Photon units: ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹.
    #[default]
    #[serde(rename = "CU")]
    Cu,
    /// Energy units: erg cm⁻² s⁻¹ arcsec⁻² nm⁻¹.
    #[serde(rename = "ERG", alias = "ERGS")]
    Erg,
}

impl SpectralUnit {
    pub fn label(self) -> &'static str {
        match self {
            SpectralUnit::Cu => "ph cm^-2 s^-1 sr^-1 AA^-1",
            SpectralUnit::Erg => "erg cm^-2 s^-1 arcsec^-2 nm^-1",
        }
    }

    /// Convert an intensity from photon units at `wavelength_aa` into this unit.
    pub fn from_photon_units(self, wavelength_aa: f64, value: f64) -> f64 {
        match self {
            SpectralUnit::Cu => value,
            SpectralUnit::Erg => {
                value * photon_energy_erg(wavelength_aa) * ANGSTROM_PER_NM / ARCSEC2_PER_SR
            }
        }
    }
}

impl fmt::Display for SpectralUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectralUnit::Cu => f.write_str("CU"),
            SpectralUnit::Erg => f.write_str("ERG"),
        }
    }
}

/// Intensity sampled on a wavelength grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Wavelength samples (Å).
    pub wavelength_aa: Vec<f64>,
    /// Intensity at each sample, in `unit`.
    pub intensity: Vec<f64>,
    pub unit: SpectralUnit,
}

impl Spectrum {
    pub fn new(
        wavelength_aa: Vec<f64>,
        intensity: Vec<f64>,
        unit: SpectralUnit,
    ) -> Result<Self, PhysicsError> {
        if wavelength_aa.len() != intensity.len() {
            return Err(PhysicsError::LengthMismatch {
                context: "spectrum",
                expected: wavelength_aa.len(),
                actual: intensity.len(),
            });
        }
        Ok(Self {
            wavelength_aa,
            intensity,
            unit,
        })
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    /// Trapezoidal integral over wavelength.
    pub fn integrate(&self) -> f64 {
        self.wavelength_aa
            .windows(2)
            .zip(self.intensity.windows(2))
            .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
            .sum()
    }

    /// Wavelength and intensity of the brightest sample.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.intensity
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &y)| (self.wavelength_aa[i], y))
    }
}

/// Immutable parameter set for one model run.
///
/// Wavelengths are in Å, velocities in cm s⁻¹, temperatures in K and column
/// densities in cm⁻².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Highest lower-level vibrational quantum number kept.
    pub vmax: u32,
    /// Highest lower-level rotational quantum number kept.
    pub jmax: u32,
    /// Emission bandpass [min, max].
    pub bandpass_aa: [f64; 2],
    /// Minimum branching ratio A_ul/A_tot for an emitted line.
    pub branching_cutoff: f64,
    /// Instrument resolving power; `None` disables instrumental broadening.
    pub resolving_power: Option<f64>,
    pub unit: SpectralUnit,
    /// Span shared by the coarse and fine grids.
    pub grid_range_aa: [f64; 2],
    /// Coarse grid step (optical depth, source function, absorption rates).
    pub coarse_step_aa: f64,
    /// Fine grid step (emergent spectrum).
    pub fine_step_aa: f64,
    pub h2_temperature_k: f64,
    pub h2_column_cm2: f64,
    /// Levels with N(v, J) at or below this are not pumped.
    pub h2_level_cutoff_cm2: f64,
    /// Non-thermal Doppler b-value.
    pub velocity_dispersion_cm_s: f64,
    /// Bulk radial velocity, positive away from the observer.
    pub doppler_shift_cm_s: f64,
    pub hi_temperature_k: f64,
    pub hi_column_cm2: f64,
    /// Half-width, in Doppler widths, of the window each emitted line is
    /// evaluated over. `None` evaluates every line on the whole fine grid.
    pub profile_window: Option<f64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            vmax: 14,
            jmax: 25,
            bandpass_aa: [1450.0, 1620.0],
            branching_cutoff: 0.01,
            resolving_power: Some(100_000.0),
            unit: SpectralUnit::Cu,
            grid_range_aa: [912.0, 1800.0],
            coarse_step_aa: 0.1,
            fine_step_aa: 0.005,
            h2_temperature_k: 500.0,
            h2_column_cm2: 1e20,
            h2_level_cutoff_cm2: 1e15,
            velocity_dispersion_cm_s: 13.0 * KM_TO_CM,
            doppler_shift_cm_s: 0.0,
            hi_temperature_k: 3e4,
            hi_column_cm2: 1e21,
            profile_window: None,
        }
    }
}

impl ModelParams {
    /// Reject any physically invalid value. Nothing is clamped.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let [bp_min, bp_max] = self.bandpass_aa;
        require(bp_min.is_finite() && bp_min > 0.0, "bandpass min", bp_min, "must be positive")?;
        require(
            bp_max.is_finite() && bp_max > bp_min,
            "bandpass max",
            bp_max,
            "must exceed the minimum",
        )?;
        require(
            self.branching_cutoff.is_finite() && self.branching_cutoff >= 0.0,
            "branching cutoff",
            self.branching_cutoff,
            "must be non-negative",
        )?;
        if let Some(r) = self.resolving_power {
            require(r.is_finite() && r > 0.0, "resolving power", r, "must be positive")?;
        }
        require(
            self.h2_temperature_k.is_finite() && self.h2_temperature_k >= 0.0,
            "H2 temperature",
            self.h2_temperature_k,
            "must be non-negative",
        )?;
        require(
            self.hi_temperature_k.is_finite() && self.hi_temperature_k >= 0.0,
            "HI temperature",
            self.hi_temperature_k,
            "must be non-negative",
        )?;
        require(
            self.h2_column_cm2.is_finite() && self.h2_column_cm2 >= 0.0,
            "H2 column density",
            self.h2_column_cm2,
            "must be non-negative",
        )?;
        require(
            self.hi_column_cm2.is_finite() && self.hi_column_cm2 >= 0.0,
            "HI column density",
            self.hi_column_cm2,
            "must be non-negative",
        )?;
        require(
            self.h2_level_cutoff_cm2.is_finite() && self.h2_level_cutoff_cm2 >= 0.0,
            "H2 level cutoff",
            self.h2_level_cutoff_cm2,
            "must be non-negative",
        )?;
        require(
            self.velocity_dispersion_cm_s.is_finite() && self.velocity_dispersion_cm_s >= 0.0,
            "velocity dispersion",
            self.velocity_dispersion_cm_s,
            "must be non-negative",
        )?;
        require(
            self.doppler_shift_cm_s.is_finite()
                && self.doppler_shift_cm_s.abs() < CGS::SPEED_OF_LIGHT,
            "Doppler shift",
            self.doppler_shift_cm_s,
            "must be finite and slower than light",
        )?;
        if let Some(w) = self.profile_window {
            require(w.is_finite() && w > 0.0, "profile window", w, "must be positive")?;
        }
        self.coarse_grid()?;
        self.fine_grid()?;
        Ok(())
    }

    /// Grid for optical depth, source function and absorption rates.
    pub fn coarse_grid(&self) -> Result<WavelengthGrid, PhysicsError> {
        WavelengthGrid::uniform(self.grid_range_aa[0], self.grid_range_aa[1], self.coarse_step_aa)
    }

    /// Grid for the emergent spectrum.
    pub fn fine_grid(&self) -> Result<WavelengthGrid, PhysicsError> {
        WavelengthGrid::uniform(self.grid_range_aa[0], self.grid_range_aa[1], self.fine_step_aa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line() -> Transition {
        Transition {
            species: Species::H2,
            band: Band::Lyman,
            v_upper: 1,
            j_upper: 2,
            v_lower: 0,
            j_lower: 1,
            wavelength_aa: 1092.2,
            a_total: 1.7e9,
            a_ul: 1.0e8,
            a_diss: 0.0,
            f_lu: 0.01,
        }
    }

    #[test]
    fn test_transition_rates_invariant() {
        assert!(line().validate(0).is_ok());

        let bad = Transition { a_ul: 2.0e9, ..line() };
        let err = bad.validate(7).unwrap_err().to_string();
        assert!(err.contains("#7"), "error should name the record: {}", err);

        let neg = Transition { wavelength_aa: -5.0, ..line() };
        assert!(neg.validate(0).is_err());
    }

    #[test]
    fn test_uniform_grid_endpoints() {
        let grid = WavelengthGrid::uniform(912.0, 1800.0, 0.1).unwrap();
        assert_eq!(grid.len(), 8881);
        let (lo, hi) = grid.range();
        assert_relative_eq!(lo, 912.0);
        assert_relative_eq!(hi, 1800.0, epsilon = 1e-9);
        assert_eq!(grid.step_aa(), Some(0.1));
    }

    #[test]
    fn test_grid_rejects_unsorted_samples() {
        assert!(WavelengthGrid::from_samples(vec![1.0, 3.0, 2.0]).is_err());
        assert!(WavelengthGrid::from_samples(vec![0.0, 1.0]).is_err());
        assert!(WavelengthGrid::uniform(1000.0, 900.0, 0.1).is_err());
    }

    #[test]
    fn test_default_params_are_valid() {
        ModelParams::default().validate().unwrap();
    }

    #[test]
    fn test_params_reject_bad_physics() {
        let p = ModelParams { h2_temperature_k: -1.0, ..Default::default() };
        assert!(p.validate().is_err());
        let p = ModelParams { resolving_power: Some(0.0), ..Default::default() };
        assert!(p.validate().is_err());
        let p = ModelParams { hi_column_cm2: -1e20, ..Default::default() };
        assert!(p.validate().is_err());
        let p = ModelParams { doppler_shift_cm_s: f64::NAN, ..Default::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_erg_conversion_at_1500() {
        // 1 ph/(cm² s sr Å) at 1500 Å
        let erg = SpectralUnit::Erg.from_photon_units(1500.0, 1.0);
        let expected = photon_energy_erg(1500.0) * 10.0 / ARCSEC2_PER_SR;
        assert_relative_eq!(erg, expected, max_relative = 1e-12);
        assert_eq!(SpectralUnit::Cu.from_photon_units(1500.0, 3.0), 3.0);
    }

    #[test]
    fn test_band_parsing() {
        assert_eq!("B".parse::<Band>().unwrap(), Band::Lyman);
        assert_eq!("W".parse::<Band>().unwrap(), Band::Werner);
        assert!("X".parse::<Band>().is_err());
    }
}
