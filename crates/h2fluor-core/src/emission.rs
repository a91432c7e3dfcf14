//! Fluorescent cascade and the emergent spectrum.
//!
//! Every photon absorbed in a pumping transition leaves the upper level
//! (band, v_u, J_u) through one of its decay channels. Each bound channel with
//! branching ratio A_ul/A_tot above the cutoff and a rest wavelength inside the
//! bandpass becomes an emission line carrying rate × A_ul/A_tot. Lines are then
//! Doppler shifted, rendered as unit-area Voigt profiles with the total
//! (instrument-broadened) width, and summed on the fine grid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use h2fluor_compute::ComputeBackend;

use crate::doppler::{doppler_shift, DopplerWidth};
use crate::profile::line_shape;
use crate::resample::LinearInterpolator;
use crate::transfer::{check_finite_samples, check_len};
use crate::types::{Band, ModelParams, PhysicsError, Spectrum, Transition, WavelengthGrid};

/// One emitted line of the cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluorescenceLine {
    /// Index of the pumping transition that feeds this line.
    pub pump: usize,
    pub band: Band,
    pub v_upper: u32,
    pub j_upper: u32,
    pub v_lower: u32,
    pub j_lower: u32,
    /// Rest wavelength (Å).
    pub rest_wavelength_aa: f64,
    /// Observed (shifted) wavelength (Å).
    pub wavelength_aa: f64,
    /// Damping constant A_tot of the upper level (s⁻¹).
    pub damping_rate: f64,
    pub branching_ratio: f64,
    /// Integrated line intensity (ph cm⁻² s⁻¹ sr⁻¹).
    pub flux: f64,
}

/// Emission-only and emission-plus-continuum spectra on the fine grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergentSpectra {
    pub emission: Spectrum,
    pub total: Spectrum,
}

/// Expand pumping rates into emission lines.
///
/// # Arguments
/// * `pumps` - Pumping transitions; `rates[i]` belongs to `pumps[i]`.
/// * `cascade` - Every candidate decay channel, matched to pumps by upper level.
/// * `params` - Supplies the branching cutoff, bandpass and Doppler shift.
///
/// Lines are returned grouped by pump, each group in `cascade` order.
pub fn fluorescence_lines(
    pumps: &[Transition],
    rates: &[f64],
    cascade: &[Transition],
    params: &ModelParams,
) -> Result<Vec<FluorescenceLine>, PhysicsError> {
    check_len("pumping rates", pumps.len(), rates.len())?;
    let [bp_min, bp_max] = params.bandpass_aa;

    let mut channels: HashMap<(Band, u32, u32), Vec<&Transition>> = HashMap::new();
    for t in cascade {
        let ratio = t.branching_ratio();
        if ratio >= params.branching_cutoff
            && t.wavelength_aa >= bp_min
            && t.wavelength_aa <= bp_max
        {
            channels.entry(t.upper_level()).or_default().push(t);
        }
    }

    let mut lines = Vec::new();
    for (pump, (p, &rate)) in pumps.iter().zip(rates).enumerate() {
        if rate <= 0.0 {
            continue;
        }
        let Some(decays) = channels.get(&p.upper_level()) else {
            continue;
        };
        for t in decays {
            let branching_ratio = t.branching_ratio();
            lines.push(FluorescenceLine {
                pump,
                band: t.band,
                v_upper: t.v_upper,
                j_upper: t.j_upper,
                v_lower: t.v_lower,
                j_lower: t.j_lower,
                rest_wavelength_aa: t.wavelength_aa,
                wavelength_aa: doppler_shift(t.wavelength_aa, params.doppler_shift_cm_s)?,
                damping_rate: t.a_total,
                branching_ratio,
                flux: rate * branching_ratio,
            });
        }
    }

    log::debug!(
        "Cascade: {} pumps, {} decay channels in band, {} emission lines",
        pumps.len(),
        channels.values().map(Vec::len).sum::<usize>(),
        lines.len()
    );
    Ok(lines)
}

/// Sum of line profiles (photon units) at each fine-grid sample.
///
/// With `window = Some(k)`, a line contributes only within k Doppler widths of
/// its centre.
pub fn render_lines(
    grid: &WavelengthGrid,
    lines: &[FluorescenceLine],
    width: DopplerWidth,
    window: Option<f64>,
    backend: &dyn ComputeBackend,
) -> Result<Vec<f64>, PhysicsError> {
    let samples = grid.as_slice();
    if lines.is_empty() {
        return Ok(vec![0.0; samples.len()]);
    }

    let reach: Vec<f64> = lines
        .iter()
        .map(|l| window.map_or(f64::INFINITY, |k| k * width.wavelength_width_aa(l.wavelength_aa)))
        .collect();

    let intensity = backend.parallel_map(samples.len(), &|j| {
        let lam = samples[j];
        let mut sum = 0.0;
        for (line, &r) in lines.iter().zip(&reach) {
            if (lam - line.wavelength_aa).abs() <= r {
                sum += line.flux * line_shape(lam, line.wavelength_aa, line.damping_rate, width);
            }
        }
        sum
    })?;

    check_finite_samples("emission rendering", &intensity, samples)?;
    Ok(intensity)
}

/// Build the emergent spectra.
///
/// The attenuated continuum is interpolated from the coarse grid and moves
/// with the same bulk velocity as the lines. Both spectra are converted to
/// `params.unit` sample by sample.
pub fn assemble(
    fine: &WavelengthGrid,
    lines: &[FluorescenceLine],
    width_total: DopplerWidth,
    coarse: &WavelengthGrid,
    source: &[f64],
    params: &ModelParams,
    backend: &dyn ComputeBackend,
) -> Result<EmergentSpectra, PhysicsError> {
    if lines.is_empty() {
        log::warn!("No fluorescence lines selected; emission spectrum is zero");
    }
    let emission = render_lines(fine, lines, width_total, params.profile_window, backend)?;

    let continuum = LinearInterpolator::new(coarse, source)?;
    let stretch = doppler_shift(1.0, params.doppler_shift_cm_s)?;

    let samples = fine.as_slice();
    let mut emission_out = Vec::with_capacity(samples.len());
    let mut total_out = Vec::with_capacity(samples.len());
    for (&lam, &e) in samples.iter().zip(&emission) {
        let c = continuum.evaluate(lam / stretch);
        emission_out.push(params.unit.from_photon_units(lam, e));
        total_out.push(params.unit.from_photon_units(lam, e + c));
    }
    check_finite_samples("continuum resampling", &total_out, samples)?;

    Ok(EmergentSpectra {
        emission: Spectrum::new(samples.to_vec(), emission_out, params.unit)?,
        total: Spectrum::new(samples.to_vec(), total_out, params.unit)?,
    })
}
