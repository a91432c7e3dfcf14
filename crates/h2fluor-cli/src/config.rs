//! TOML configuration for fluorescence model runs.
//!
//! Every table is optional; missing keys take the defaults of the reference
//! model (T_H2 = 500 K, N_H2 = 10²⁰ cm⁻², R = 10⁵, …). Only the H₂ line list
//! path has to be supplied for a meaningful run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use h2fluor_core::constants::KM_TO_CM;
use h2fluor_core::{ModelParams, SpectralUnit};
use h2fluor_data::{Blackbody, DraineField, IncidentSource};

/// Top-level job configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub lines: LinesConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub h2: H2Config,
    #[serde(default)]
    pub hi: HiConfig,
    #[serde(default)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Line lists and selection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinesConfig {
    /// H₂ line list (CSV), relative to the configuration file.
    #[serde(default = "default_h2_file")]
    pub h2_file: String,
    /// HI line list (CSV). Omit to use the embedded Lyman series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi_file: Option<String>,
    #[serde(default = "default_vmax")]
    pub vmax: u32,
    #[serde(default = "default_jmax")]
    pub jmax: u32,
    /// Minimum A_ul/A_tot of an emitted line.
    #[serde(default = "default_branching_cutoff")]
    pub branching_cutoff: f64,
}

impl Default for LinesConfig {
    fn default() -> Self {
        Self {
            h2_file: default_h2_file(),
            hi_file: None,
            vmax: default_vmax(),
            jmax: default_jmax(),
            branching_cutoff: default_branching_cutoff(),
        }
    }
}

fn default_h2_file() -> String {
    "h2_lines.csv".into()
}
fn default_vmax() -> u32 {
    14
}
fn default_jmax() -> u32 {
    25
}
fn default_branching_cutoff() -> f64 {
    0.01
}

/// Wavelength grids and execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// [start, end] in Å, shared by both grids.
    #[serde(default = "default_range")]
    pub range: [f64; 2],
    /// Step of the transfer grid (Å).
    #[serde(default = "default_coarse_step")]
    pub coarse_step: f64,
    /// Step of the emergent spectrum (Å).
    #[serde(default = "default_fine_step")]
    pub fine_step: f64,
    /// Evaluate each emitted line only within this many Doppler widths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_window: Option<f64>,
    /// Compute backend: "auto", "cpu", or "serial". Default: "auto".
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            range: default_range(),
            coarse_step: default_coarse_step(),
            fine_step: default_fine_step(),
            profile_window: None,
            backend: default_backend(),
        }
    }
}

fn default_range() -> [f64; 2] {
    [912.0, 1800.0]
}
fn default_coarse_step() -> f64 {
    0.1
}
fn default_fine_step() -> f64 {
    0.005
}
fn default_backend() -> String {
    "auto".into()
}

/// Molecular gas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct H2Config {
    /// Kinetic and excitation temperature (K).
    #[serde(default = "default_h2_temperature")]
    pub temperature: f64,
    /// Total column density (cm⁻²).
    #[serde(default = "default_h2_column")]
    pub column_density: f64,
    /// Levels at or below this column density (cm⁻²) are not pumped.
    #[serde(default = "default_level_cutoff")]
    pub level_cutoff: f64,
    /// Non-thermal b-value (km/s), also applied to HI.
    #[serde(default = "default_velocity_dispersion")]
    pub velocity_dispersion_km_s: f64,
}

impl Default for H2Config {
    fn default() -> Self {
        Self {
            temperature: default_h2_temperature(),
            column_density: default_h2_column(),
            level_cutoff: default_level_cutoff(),
            velocity_dispersion_km_s: default_velocity_dispersion(),
        }
    }
}

fn default_h2_temperature() -> f64 {
    500.0
}
fn default_h2_column() -> f64 {
    1e20
}
fn default_level_cutoff() -> f64 {
    1e15
}
fn default_velocity_dispersion() -> f64 {
    13.0
}

/// Atomic gas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiConfig {
    #[serde(default = "default_hi_temperature")]
    pub temperature: f64,
    #[serde(default = "default_hi_column")]
    pub column_density: f64,
}

impl Default for HiConfig {
    fn default() -> Self {
        Self {
            temperature: default_hi_temperature(),
            column_density: default_hi_column(),
        }
    }
}

fn default_hi_temperature() -> f64 {
    3e4
}
fn default_hi_column() -> f64 {
    1e21
}

/// Observation: resolution, bandpass, units and bulk velocity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default = "default_resolving_power")]
    pub resolving_power: f64,
    /// Set to false to omit the instrumental width entirely.
    #[serde(default = "default_true")]
    pub instrumental_broadening: bool,
    /// Emitted lines outside [min, max] (Å) are dropped.
    #[serde(default = "default_bandpass")]
    pub bandpass: [f64; 2],
    /// "CU" or "ERG".
    #[serde(default)]
    pub unit: SpectralUnit,
    /// Radial velocity (km/s), positive away from the observer.
    #[serde(default)]
    pub doppler_shift_km_s: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            resolving_power: default_resolving_power(),
            instrumental_broadening: true,
            bandpass: default_bandpass(),
            unit: SpectralUnit::Cu,
            doppler_shift_km_s: 0.0,
        }
    }
}

fn default_resolving_power() -> f64 {
    100_000.0
}
fn default_bandpass() -> [f64; 2] {
    [1450.0, 1620.0]
}

/// Incident field, selected by `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Blackbody {
        /// Temperature (K); the HI temperature when omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f64>,
        #[serde(default = "default_dilution")]
        dilution: f64,
    },
    Isrf(DraineField),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Blackbody {
            temperature: None,
            dilution: default_dilution(),
        }
    }
}

fn default_dilution() -> f64 {
    1.0
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./models").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save spectra as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_spectra: bool,
    /// Whether to also save spectra and lines as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
    /// Whether to save the coarse-grid source function (default: false).
    #[serde(default)]
    pub save_source: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_spectra: true,
            save_json: false,
            save_source: false,
        }
    }
}

fn default_output_dir() -> String {
    "./models".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Engine parameters in CGS.
    pub fn to_params(&self) -> ModelParams {
        ModelParams {
            vmax: self.lines.vmax,
            jmax: self.lines.jmax,
            bandpass_aa: self.instrument.bandpass,
            branching_cutoff: self.lines.branching_cutoff,
            resolving_power: self
                .instrument
                .instrumental_broadening
                .then_some(self.instrument.resolving_power),
            unit: self.instrument.unit,
            grid_range_aa: self.grid.range,
            coarse_step_aa: self.grid.coarse_step,
            fine_step_aa: self.grid.fine_step,
            h2_temperature_k: self.h2.temperature,
            h2_column_cm2: self.h2.column_density,
            h2_level_cutoff_cm2: self.h2.level_cutoff,
            velocity_dispersion_cm_s: self.h2.velocity_dispersion_km_s * KM_TO_CM,
            doppler_shift_cm_s: self.instrument.doppler_shift_km_s * KM_TO_CM,
            hi_temperature_k: self.hi.temperature,
            hi_column_cm2: self.hi.column_density,
            profile_window: self.grid.profile_window,
        }
    }

    /// The incident field, with an unset blackbody temperature taken from `[hi]`.
    pub fn incident_source(&self) -> Result<IncidentSource> {
        let source = match self.source {
            SourceConfig::Blackbody {
                temperature,
                dilution,
            } => IncidentSource::Blackbody(Blackbody::new(
                temperature.unwrap_or(self.hi.temperature),
                dilution,
            )?),
            SourceConfig::Isrf(isrf) => {
                isrf.validate()?;
                IncidentSource::Isrf(isrf)
            }
        };
        Ok(source)
    }

    /// Check every value the run will use.
    pub fn validate(&self) -> Result<()> {
        self.to_params().validate().context("Invalid model parameters")?;
        self.incident_source().context("Invalid incident source")?;
        h2fluor_compute::create_backend(&self.grid.backend).context("Invalid compute backend")?;
        Ok(())
    }
}

/// Load, parse and validate a TOML job configuration file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read configuration file '{}'", path.display()))?;
    let config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Cannot parse configuration file '{}'", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// The default configuration as commented TOML.
pub fn default_config_toml() -> Result<String> {
    let body = toml::to_string_pretty(&JobConfig::default())
        .context("Cannot serialise default configuration")?;
    Ok(format!(
        "# h2fluor job configuration\n\
         # Temperatures in K, column densities in cm^-2, wavelengths in Angstrom,\n\
         # velocities in km/s. [source] kind is \"blackbody\" or \"isrf\";\n\
         # the blackbody temperature defaults to the HI temperature.\n\n{}",
        body
    ))
}

/// Write the default configuration to `path`, refusing to overwrite.
pub fn create_config_file(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("'{}' already exists", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_toml()?)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_file_gives_reference_defaults() {
        let job: JobConfig = toml::from_str("").unwrap();
        let params = job.to_params();
        assert_eq!(params, ModelParams::default());
        assert_eq!(job.incident_source().unwrap(), IncidentSource::default());
        assert_eq!(job.grid.backend, "auto");
    }

    #[test]
    fn test_default_file_round_trips() {
        let text = default_config_toml().unwrap();
        let job: JobConfig = toml::from_str(&text).unwrap();
        assert_eq!(job.to_params(), ModelParams::default());
        job.validate().unwrap();
    }

    #[test]
    fn test_partial_tables_and_units() {
        let job: JobConfig = toml::from_str(
            r#"
            [h2]
            temperature = 1000.0
            velocity_dispersion_km_s = 5.0

            [instrument]
            unit = "ERG"
            doppler_shift_km_s = -20.0
            instrumental_broadening = false

            [source]
            kind = "isrf"
            scale = 3.0
            "#,
        )
        .unwrap();
        let params = job.to_params();
        assert_eq!(params.h2_temperature_k, 1000.0);
        assert_eq!(params.h2_column_cm2, 1e20);
        assert_relative_eq!(params.velocity_dispersion_cm_s, 5e5);
        assert_relative_eq!(params.doppler_shift_cm_s, -2e6);
        assert_eq!(params.unit, SpectralUnit::Erg);
        assert_eq!(params.resolving_power, None);
        assert_eq!(
            job.incident_source().unwrap(),
            IncidentSource::Isrf(DraineField { scale: 3.0 })
        );
    }

    #[test]
    fn test_blackbody_follows_hi_temperature() {
        let job: JobConfig = toml::from_str("[hi]\ntemperature = 2.0e4\n").unwrap();
        assert_eq!(
            job.incident_source().unwrap(),
            IncidentSource::Blackbody(Blackbody::new(2.0e4, 1.0).unwrap())
        );

        let job: JobConfig = toml::from_str(
            r#"
            [hi]
            temperature = 2.0e4

            [source]
            kind = "blackbody"
            temperature = 5.0e4
            dilution = 1e-14
            "#,
        )
        .unwrap();
        assert_eq!(
            job.incident_source().unwrap(),
            IncidentSource::Blackbody(Blackbody::new(5.0e4, 1e-14).unwrap())
        );
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let job: JobConfig = toml::from_str("[hi]\ntemperature = -5.0\n").unwrap();
        assert!(job.validate().is_err());
        let job: JobConfig = toml::from_str("[grid]\nbackend = \"gpu\"\n").unwrap();
        assert!(job.validate().is_err());
        assert!(toml::from_str::<JobConfig>("[instrument]\nunit = \"JY\"\n").is_err());
        let job: JobConfig =
            toml::from_str("[source]\nkind = \"blackbody\"\ntemperature = -1.0\n").unwrap();
        assert!(job.validate().is_err());
    }
}
