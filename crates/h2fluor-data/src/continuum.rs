//! Incident ultraviolet continua.
//!
//! - [`Blackbody`]: a diluted Planck field.
//! - [`DraineField`]: the interstellar radiation field of Draine (1978),
//!   *ApJS* **36**, 595.
//!
//! Both return photon intensities per ångström.

use serde::{Deserialize, Serialize};

use h2fluor_core::constants::{photon_energy_ev, ANGSTROM_TO_CM, CGS};

use crate::provider::{require, ContinuumModel, DataError};

fn unit_scale() -> f64 {
    1.0
}

/// Planck field B_λ(T) scaled by a geometric dilution factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blackbody {
    pub temperature_k: f64,
    #[serde(default = "unit_scale")]
    pub dilution: f64,
}

impl Blackbody {
    pub fn new(temperature_k: f64, dilution: f64) -> Result<Self, DataError> {
        let bb = Self {
            temperature_k,
            dilution,
        };
        bb.validate()?;
        Ok(bb)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        require(
            self.temperature_k.is_finite() && self.temperature_k > 0.0,
            "blackbody temperature",
            self.temperature_k,
            "must be positive",
        )?;
        require(
            self.dilution.is_finite() && self.dilution >= 0.0,
            "blackbody dilution",
            self.dilution,
            "must be non-negative",
        )
    }
}

impl ContinuumModel for Blackbody {
    fn name(&self) -> String {
        format!("Blackbody (T = {} K, W = {})", self.temperature_k, self.dilution)
    }

    fn intensity(&self, wavelength_aa: f64) -> f64 {
        // B_λ / (hc/λ) = 2c / λ⁴ / (e^x − 1), per cm; × 1e-8 per Å.
        let lam_cm = wavelength_aa * ANGSTROM_TO_CM;
        let x = CGS::SECOND_RADIATION_CONSTANT / (lam_cm * self.temperature_k);
        let photons_per_cm = 2.0 * CGS::SPEED_OF_LIGHT / lam_cm.powi(4) / x.exp_m1();
        self.dilution * photons_per_cm * ANGSTROM_TO_CM
    }
}

/// Draine (1978) interstellar radiation field, valid 5–13.6 eV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DraineField {
    /// Multiple of the standard field.
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

impl Default for DraineField {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl DraineField {
    /// Lower photon energy limit (eV).
    pub const E_MIN_EV: f64 = 5.0;
    /// Lyman limit (eV).
    pub const E_MAX_EV: f64 = 13.6;

    pub fn validate(&self) -> Result<(), DataError> {
        require(
            self.scale.is_finite() && self.scale >= 0.0,
            "ISRF scale",
            self.scale,
            "must be non-negative",
        )
    }

    /// Photon intensity per unit energy (ph cm⁻² s⁻¹ sr⁻¹ eV⁻¹).
    pub fn intensity_per_ev(&self, energy_ev: f64) -> f64 {
        if !(Self::E_MIN_EV..=Self::E_MAX_EV).contains(&energy_ev) {
            return 0.0;
        }
        let e = energy_ev;
        self.scale * (1.658e6 * e - 2.152e5 * e * e + 6.919e3 * e * e * e)
    }
}

impl ContinuumModel for DraineField {
    fn name(&self) -> String {
        format!("Draine ISRF (x{})", self.scale)
    }

    fn intensity(&self, wavelength_aa: f64) -> f64 {
        // |dE/dλ| = E / λ
        let e = photon_energy_ev(wavelength_aa);
        self.intensity_per_ev(e) * e / wavelength_aa
    }
}

/// The incident field of a run, selected by `kind` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IncidentSource {
    Blackbody(Blackbody),
    Isrf(DraineField),
}

impl Default for IncidentSource {
    fn default() -> Self {
        IncidentSource::Blackbody(Blackbody {
            temperature_k: 3.0e4,
            dilution: 1.0,
        })
    }
}

impl IncidentSource {
    pub fn validate(&self) -> Result<(), DataError> {
        match self {
            IncidentSource::Blackbody(bb) => bb.validate(),
            IncidentSource::Isrf(isrf) => isrf.validate(),
        }
    }
}

impl ContinuumModel for IncidentSource {
    fn name(&self) -> String {
        match self {
            IncidentSource::Blackbody(bb) => bb.name(),
            IncidentSource::Isrf(isrf) => isrf.name(),
        }
    }

    fn intensity(&self, wavelength_aa: f64) -> f64 {
        match self {
            IncidentSource::Blackbody(bb) => bb.intensity(wavelength_aa),
            IncidentSource::Isrf(isrf) => isrf.intensity(wavelength_aa),
        }
    }
}
