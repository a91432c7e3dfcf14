//! Physical constants and unit conversion factors.
//!
//! The engine works in CGS throughout, with two conventions layered on top:
//! wavelengths are carried in ångströms and intensities in photon units
//! (ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹). Conversions happen only at the input and output
//! boundaries.

/// Physical constants in CGS units (CODATA 2018).
pub struct CGS;

impl CGS {
    /// Speed of light (cm s⁻¹).
    pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e10;

    /// Boltzmann constant (erg K⁻¹).
    pub const BOLTZMANN_CONSTANT: f64 = 1.380_649e-16;

    /// Planck constant (erg s).
    pub const PLANCK_CONSTANT: f64 = 6.626_070_15e-27;

    /// Proton mass (g).
    pub const PROTON_MASS: f64 = 1.672_621_923_69e-24;

    /// Electron mass (g).
    pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-28;

    /// Elementary charge (esu).
    pub const ELEMENTARY_CHARGE: f64 = 4.803_204_712_570_263e-10;

    /// Second radiation constant hc/k (cm K), for level energies in cm⁻¹.
    pub const SECOND_RADIATION_CONSTANT: f64 = 1.438_776_877;

    /// Electron volt (erg).
    pub const ELECTRON_VOLT: f64 = 1.602_176_634e-12;
}

/// Ångström to centimetre.
pub const ANGSTROM_TO_CM: f64 = 1e-8;

/// Kilometre to centimetre.
pub const KM_TO_CM: f64 = 1e5;

/// Square arcseconds per steradian, (180·3600/π)².
pub const ARCSEC2_PER_SR: f64 = 4.254_517_029_615_221e10;

/// Ångströms per nanometre.
pub const ANGSTROM_PER_NM: f64 = 10.0;

/// Photon energy (erg) at a wavelength in ångströms.
pub fn photon_energy_erg(wavelength_aa: f64) -> f64 {
    CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT / (wavelength_aa * ANGSTROM_TO_CM)
}

/// Photon energy (eV) at a wavelength in ångströms.
pub fn photon_energy_ev(wavelength_aa: f64) -> f64 {
    photon_energy_erg(wavelength_aa) / CGS::ELECTRON_VOLT
}
