//! The full fluorescence calculation for one parameter set.
//!
//! [`FluorescenceModel::run`] chains the stages in order: Doppler widths,
//! transition selection, cross-sections, optical depth, source function,
//! absorption rates, the fluorescent cascade and the emergent spectra. Every
//! intermediate product is returned in [`ModelOutput`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use h2fluor_compute::{ComputeBackend, SerialBackend};

use crate::doppler::{doppler_widths, DopplerWidths};
use crate::emission::{assemble, fluorescence_lines, EmergentSpectra, FluorescenceLine};
use crate::transfer::{
    absorption_rates, attenuate, check_len, cross_sections, optical_depth, OpticalDepth,
};
use crate::types::{
    validate_transitions, LevelPopulations, ModelParams, PhysicsError, Transition, WavelengthGrid,
};

/// Line lists, populations and the incident field for one run.
#[derive(Debug, Clone)]
pub struct ModelInputs {
    /// HI absorbers.
    pub hi_lines: Vec<Transition>,
    /// Lower-level column density (cm⁻²) of each HI line.
    pub hi_columns: Vec<f64>,
    /// Complete H₂ line list; filtered by (v, J) ceilings and population here.
    pub h2_lines: Vec<Transition>,
    pub h2_populations: LevelPopulations,
    /// Unattenuated continuum on the coarse grid (ph cm⁻² s⁻¹ sr⁻¹ Å⁻¹).
    pub incident: Vec<f64>,
}

/// Photons absorbed by one H₂ pumping transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpingRate {
    pub transition: Transition,
    /// N(v_l, J_l) of the lower level (cm⁻²).
    pub lower_column_cm2: f64,
    /// Integrated rate (ph cm⁻² s⁻¹ sr⁻¹).
    pub rate: f64,
}

/// Headline numbers of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub hi_lines: usize,
    /// H₂ lines inside the (v, J) ceilings.
    pub h2_lines: usize,
    pub pumping_transitions: usize,
    pub emission_lines: usize,
    /// Σ pumping rates (ph cm⁻² s⁻¹ sr⁻¹).
    pub absorbed_rate: f64,
    /// Σ line fluxes (ph cm⁻² s⁻¹ sr⁻¹).
    pub emitted_rate: f64,
    /// Line widths shared by every absorber.
    pub widths: DopplerWidths,
    pub backend: String,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub coarse_grid: WavelengthGrid,
    pub incident: Vec<f64>,
    pub tau_total: Vec<f64>,
    /// Attenuated continuum on the coarse grid (photon units).
    pub source: Vec<f64>,
    pub pumping: Vec<PumpingRate>,
    pub lines: Vec<FluorescenceLine>,
    pub spectra: EmergentSpectra,
    pub summary: RunSummary,
}

/// Keep lines whose lower level satisfies v ≤ `vmax` and J ≤ `jmax`.
pub fn select_by_quantum_numbers(lines: &[Transition], vmax: u32, jmax: u32) -> Vec<Transition> {
    lines
        .iter()
        .filter(|t| t.v_lower <= vmax && t.j_lower <= jmax)
        .cloned()
        .collect()
}

/// Keep lines whose lower level holds strictly more than `cutoff_cm2`.
///
/// Returns the selected lines and their lower-level column densities. Levels
/// missing from the population table count as empty.
pub fn select_pumped(
    lines: &[Transition],
    populations: &LevelPopulations,
    cutoff_cm2: f64,
) -> (Vec<Transition>, Vec<f64>) {
    lines
        .iter()
        .filter_map(|t| {
            let n = populations.column(t.v_lower, t.j_lower)?;
            (n > cutoff_cm2).then(|| (t.clone(), n))
        })
        .unzip()
}

/// Physical and total Doppler widths of the absorbing layer.
///
/// Both come from the H₂ temperature and apply to HI and H₂ rows alike.
pub fn layer_widths(params: &ModelParams) -> Result<DopplerWidths, PhysicsError> {
    doppler_widths(
        params.h2_temperature_k,
        params.velocity_dispersion_cm_s,
        params.resolving_power,
    )
}

/// Runs the radiative transfer and line synthesis on a compute backend.
pub struct FluorescenceModel {
    backend: Arc<dyn ComputeBackend>,
}

impl Default for FluorescenceModel {
    fn default() -> Self {
        Self::new(Arc::new(SerialBackend))
    }
}

impl FluorescenceModel {
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    /// Compute the emergent spectrum for `params`.
    pub fn run(
        &self,
        params: &ModelParams,
        inputs: &ModelInputs,
    ) -> Result<ModelOutput, PhysicsError> {
        params.validate()?;
        validate_transitions(&inputs.hi_lines)?;
        validate_transitions(&inputs.h2_lines)?;
        check_len("HI column densities", inputs.hi_lines.len(), inputs.hi_columns.len())?;

        let coarse = params.coarse_grid()?;
        let fine = params.fine_grid()?;
        check_len("incident continuum", coarse.len(), inputs.incident.len())?;

        let widths = layer_widths(params)?;
        log::debug!(
            "Doppler widths: {:.3} km/s physical, {:.3} km/s total",
            widths.physical.km_per_s(),
            widths.total.km_per_s()
        );

        // Transition selection
        let h2_lines = select_by_quantum_numbers(&inputs.h2_lines, params.vmax, params.jmax);
        let (pumps, pump_columns) =
            select_pumped(&h2_lines, &inputs.h2_populations, params.h2_level_cutoff_cm2);
        if pumps.is_empty() {
            log::warn!(
                "No H2 level exceeds the column cutoff {:e} cm^-2",
                params.h2_level_cutoff_cm2
            );
        }

        // HI rows first, H₂ pumps after.
        let absorbers: Vec<Transition> = inputs.hi_lines.iter().chain(&pumps).cloned().collect();
        let columns: Vec<f64> = inputs.hi_columns.iter().chain(&pump_columns).copied().collect();

        let sigma = cross_sections(&coarse, &absorbers, widths.physical, self.backend.as_ref())?;
        let depth = OpticalDepth::new(optical_depth(&columns, &sigma)?, inputs.hi_lines.len())?;
        let source = attenuate(&inputs.incident, depth.total())?;

        let step = coarse.step_aa().unwrap_or(params.coarse_step_aa);
        let rates = absorption_rates(
            &inputs.incident,
            &depth.h2(),
            depth.total(),
            coarse.as_slice(),
            step,
            depth.h2_start(),
        )?;

        let lines = fluorescence_lines(&pumps, &rates, &h2_lines, params)?;
        let spectra = assemble(
            &fine,
            &lines,
            widths.total,
            &coarse,
            &source,
            params,
            self.backend.as_ref(),
        )?;

        let summary = RunSummary {
            hi_lines: inputs.hi_lines.len(),
            h2_lines: h2_lines.len(),
            pumping_transitions: pumps.len(),
            emission_lines: lines.len(),
            absorbed_rate: rates.iter().sum(),
            emitted_rate: lines.iter().map(|l| l.flux).sum(),
            widths,
            backend: self.backend.device_info().name,
        };
        log::info!(
            "{} pumping transitions feed {} emission lines ({:.4e} ph/cm2/s/sr absorbed)",
            summary.pumping_transitions,
            summary.emission_lines,
            summary.absorbed_rate
        );

        let pumping = pumps
            .into_iter()
            .zip(pump_columns)
            .zip(&rates)
            .map(|((transition, lower_column_cm2), &rate)| PumpingRate {
                transition,
                lower_column_cm2,
                rate,
            })
            .collect();

        Ok(ModelOutput {
            coarse_grid: coarse,
            incident: inputs.incident.clone(),
            tau_total: depth.total().to_vec(),
            source,
            pumping,
            lines,
            spectra,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Band, Species};
    use ndarray::Array2;

    fn line(v_lower: u32, j_lower: u32) -> Transition {
        Transition {
            species: Species::H2,
            band: Band::Werner,
            v_upper: 0,
            j_upper: 1,
            v_lower,
            j_lower,
            wavelength_aa: 1008.5,
            a_total: 1e9,
            a_ul: 1e8,
            a_diss: 0.0,
            f_lu: 0.02,
        }
    }

    #[test]
    fn test_quantum_number_ceilings_are_inclusive() {
        let lines = [line(14, 25), line(15, 0), line(0, 26), line(3, 3)];
        let kept = select_by_quantum_numbers(&lines, 14, 25);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].lower_level(), (14, 25));
        assert_eq!(kept[1].lower_level(), (3, 3));
    }

    #[test]
    fn test_population_cutoff_is_strict() {
        let mut table = Array2::zeros((2, 3));
        table[[0, 0]] = 1e15;
        table[[0, 1]] = 2e15;
        let pops = LevelPopulations::new(table).unwrap();
        let lines = [line(0, 0), line(0, 1), line(1, 2), line(5, 5)];
        let (kept, columns) = select_pumped(&lines, &pops, 1e15);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].lower_level(), (0, 1));
        assert_eq!(columns, vec![2e15]);
    }

    #[test]
    fn test_layer_widths_follow_h2_temperature() {
        let base = ModelParams::default();
        let hot_hi = ModelParams {
            hi_temperature_k: 1e6,
            ..base.clone()
        };
        let widths = layer_widths(&base).unwrap();
        assert_eq!(widths, layer_widths(&hot_hi).unwrap());
        assert_eq!(
            widths.physical,
            crate::doppler::compute_width(500.0, base.velocity_dispersion_cm_s, None).unwrap()
        );
    }
}
