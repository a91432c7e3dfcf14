//! Incident continuum trait and data-layer errors.
//!
//! Every incident radiation field implements [`ContinuumModel`], which returns
//! the unattenuated specific intensity in photon units
//! (ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹) at a wavelength in ångströms.

use thiserror::Error;

use h2fluor_core::{PhysicsError, WavelengthGrid};

/// Errors from line lists, populations and continuum models.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid record {row} in '{path}': {reason}")]
    InvalidRecord {
        path: String,
        row: usize,
        reason: String,
    },

    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Reject a parameter unless `ok` holds.
pub(crate) fn require(
    ok: bool,
    name: &'static str,
    value: f64,
    reason: &'static str,
) -> Result<(), DataError> {
    if ok {
        Ok(())
    } else {
        Err(DataError::InvalidParameter { name, value, reason })
    }
}

/// An incident radiation field.
pub trait ContinuumModel: Send + Sync {
    /// Human-readable name of this field.
    fn name(&self) -> String;

    /// Photon intensity (ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹) at `wavelength_aa`.
    fn intensity(&self, wavelength_aa: f64) -> f64;

    /// Intensity at every sample of `grid`.
    fn evaluate(&self, grid: &WavelengthGrid) -> Vec<f64> {
        grid.as_slice().iter().map(|&lam| self.intensity(lam)).collect()
    }
}
