//! # h2fluor Core
//!
//! Radiative transfer and line synthesis for the ultraviolet fluorescence of
//! molecular hydrogen (McJunkin et al. 2016). An incident continuum is
//! attenuated by HI and H₂ absorption; the photons absorbed in H₂ Lyman and
//! Werner transitions are re-emitted through each upper level's decay
//! channels to form the emergent spectrum.
//!
//! ## Architecture
//!
//! [`model::FluorescenceModel`] drives the pipeline on a
//! [`h2fluor_compute::ComputeBackend`]. Each stage is also usable on its own as
//! a pure function.
//!
//! ## Modules
//!
//! - [`types`]: Transitions, populations, grids, spectra and parameters.
//! - [`constants`]: CGS constants and unit conversions.
//! - [`doppler`]: Thermal, non-thermal and instrumental line widths.
//! - [`profile`]: Faddeeva function and Voigt profiles.
//! - [`transfer`]: Cross-sections, optical depth, source function, absorption rates.
//! - [`emission`]: Fluorescent cascade and emergent spectra.
//! - [`resample`]: Linear interpolation between grids.
//! - [`model`]: The end-to-end calculation.
//!
//! ## Conventions
//!
//! CGS throughout, wavelengths in Å, intensities in photon units
//! (ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹) until a [`types::Spectrum`] is emitted.

pub mod constants;
pub mod doppler;
pub mod emission;
pub mod model;
pub mod profile;
pub mod resample;
pub mod transfer;
pub mod types;

pub use doppler::{doppler_shift, DopplerWidth, DopplerWidths};
pub use emission::{EmergentSpectra, FluorescenceLine};
pub use model::{FluorescenceModel, ModelInputs, ModelOutput, PumpingRate, RunSummary};
pub use types::{
    Band, LevelPopulations, ModelParams, PhysicsError, Species, SpectralUnit, Spectrum, Transition,
    WavelengthGrid,
};
