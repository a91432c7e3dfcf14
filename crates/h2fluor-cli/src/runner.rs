//! Model runner: ties together line lists, populations, the incident field
//! and the fluorescence engine, and writes the results.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use h2fluor_core::{
    FluorescenceLine, FluorescenceModel, ModelInputs, ModelOutput, ModelParams, RunSummary,
    Spectrum,
};
use h2fluor_data::{
    hi_columns, load_h2_lines, load_hi_lines, lte_populations, lyman_series, ContinuumModel,
};

use crate::config::JobConfig;

/// Results from a model run.
pub struct RunOutput {
    pub model_name: String,
    pub params: ModelParams,
    pub output: ModelOutput,
}

/// Output stem encoding the physical parameters of a run.
///
/// `h2-fluor-model_R={R}_TH2={T}_NH2={log N}_THI={T}_NHI={log N}`, with
/// temperatures and log column densities truncated to integers.
pub fn model_name(params: &ModelParams) -> String {
    let r = match params.resolving_power {
        Some(r) => format!("{:?}", r),
        None => "none".into(),
    };
    format!(
        "h2-fluor-model_R={}_TH2={}_NH2={}_THI={}_NHI={}",
        r,
        params.h2_temperature_k.trunc() as i64,
        log_column(params.h2_column_cm2),
        params.hi_temperature_k.trunc() as i64,
        log_column(params.hi_column_cm2),
    )
}

fn log_column(n: f64) -> String {
    if n > 0.0 {
        format!("{}", n.log10().trunc() as i64)
    } else {
        "0".into()
    }
}

/// Resolve a data path relative to the configuration file's directory.
fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Run the model described by `job`.
pub fn run_model(job: &JobConfig, base_dir: &Path) -> Result<RunOutput> {
    let params = job.to_params();
    params.validate().context("Invalid model parameters")?;

    let backend = h2fluor_compute::create_backend(&job.grid.backend)?;
    println!("Backend: {}", backend.device_info().name);

    // Line lists
    let h2_path = resolve(base_dir, &job.lines.h2_file);
    let h2_lines = load_h2_lines(&h2_path)
        .with_context(|| format!("Cannot load H2 line list '{}'", h2_path.display()))?;
    let hi_lines = match &job.lines.hi_file {
        Some(file) => {
            let path = resolve(base_dir, file);
            load_hi_lines(&path)
                .with_context(|| format!("Cannot load HI line list '{}'", path.display()))?
        }
        None => lyman_series(),
    };
    println!("  H2 transitions: {}", h2_lines.len());
    println!("  HI transitions: {}", hi_lines.len());

    // Populations and incident field
    let hi_cols = hi_columns(&hi_lines, params.hi_column_cm2, params.hi_temperature_k)?;
    let h2_populations = lte_populations(
        params.h2_column_cm2,
        params.h2_temperature_k,
        params.vmax,
        params.jmax,
    )?;
    let coarse = params.coarse_grid()?;
    let source = job.incident_source()?;
    let incident = source.evaluate(&coarse);
    println!("  Incident field: {}", source.name());

    let inputs = ModelInputs {
        hi_lines: hi_lines.iter().map(|l| l.to_transition()).collect(),
        hi_columns: hi_cols,
        h2_lines,
        h2_populations,
        incident,
    };

    let output = FluorescenceModel::new(backend)
        .run(&params, &inputs)
        .context("Fluorescence model failed")?;

    let s = &output.summary;
    println!(
        "  Pumping transitions: {} -> emission lines: {}",
        s.pumping_transitions, s.emission_lines
    );
    println!(
        "  Absorbed: {:.4e}, emitted in band: {:.4e} ph cm^-2 s^-1 sr^-1",
        s.absorbed_rate, s.emitted_rate
    );

    Ok(RunOutput {
        model_name: model_name(&params),
        params,
        output,
    })
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_header(file: &mut impl Write, run: &RunOutput) -> Result<()> {
    let p = &run.params;
    writeln!(file, "# h2fluor H2 fluorescence model")?;
    writeln!(file, "# model: {}", run.model_name)?;
    writeln!(
        file,
        "# T_H2 = {} K, N_H2 = {:e} cm^-2, T_HI = {} K, N_HI = {:e} cm^-2",
        p.h2_temperature_k, p.h2_column_cm2, p.hi_temperature_k, p.hi_column_cm2
    )?;
    writeln!(
        file,
        "# b = {} km/s, R = {:?}, v = {} km/s, bandpass = [{}, {}] AA",
        p.velocity_dispersion_cm_s * 1e-5,
        p.resolving_power,
        p.doppler_shift_cm_s * 1e-5,
        p.bandpass_aa[0],
        p.bandpass_aa[1]
    )?;
    writeln!(
        file,
        "# pumping transitions: {}, emission lines: {}",
        run.output.summary.pumping_transitions, run.output.summary.emission_lines
    )?;
    Ok(())
}

/// Write the emission and emission+continuum spectra to a CSV file.
pub fn write_spectra_csv(run: &RunOutput, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut file = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("Cannot create '{}'", path.display()))?,
    );

    let spectra = &run.output.spectra;
    write_header(&mut file, run)?;
    writeln!(file, "# unit: {}", spectra.emission.unit.label())?;
    writeln!(file, "#")?;
    writeln!(file, "wavelength_aa,emission,total")?;
    for ((lam, e), t) in spectra
        .emission
        .wavelength_aa
        .iter()
        .zip(&spectra.emission.intensity)
        .zip(&spectra.total.intensity)
    {
        writeln!(file, "{:.4},{:.6e},{:.6e}", lam, e, t)?;
    }
    file.flush()?;

    println!("Spectra written to: {}", path.display());
    Ok(())
}

/// Write the coarse-grid incident field, optical depth and source function.
pub fn write_source_csv(run: &RunOutput, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut file = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("Cannot create '{}'", path.display()))?,
    );

    let out = &run.output;
    write_header(&mut file, run)?;
    writeln!(file, "# unit: ph cm^-2 s^-1 sr^-1 AA^-1")?;
    writeln!(file, "#")?;
    writeln!(file, "wavelength_aa,incident,tau_total,source")?;
    for (((lam, inc), tau), src) in out
        .coarse_grid
        .as_slice()
        .iter()
        .zip(&out.incident)
        .zip(&out.tau_total)
        .zip(&out.source)
    {
        writeln!(file, "{:.4},{:.6e},{:.6e},{:.6e}", lam, inc, tau, src)?;
    }
    file.flush()?;

    println!("Source function written to: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    model: &'a str,
    params: &'a ModelParams,
    summary: &'a RunSummary,
    lines: &'a [FluorescenceLine],
    emission: &'a Spectrum,
    total: &'a Spectrum,
}

/// Write parameters, summary, emission lines and spectra to a JSON file.
pub fn write_spectra_json(run: &RunOutput, path: &Path) -> Result<()> {
    create_parent(path)?;
    let report = JsonReport {
        model: &run.model_name,
        params: &run.params,
        summary: &run.output.summary,
        lines: &run.output.lines,
        emission: &run.output.spectra.emission,
        total: &run.output.spectra.total,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Spectra (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobConfig;

    #[test]
    fn test_reference_model_name() {
        assert_eq!(
            model_name(&ModelParams::default()),
            "h2-fluor-model_R=100000.0_TH2=500_NH2=20_THI=30000_NHI=21"
        );
        let no_instrument = ModelParams {
            resolving_power: None,
            h2_column_cm2: 3.2e18,
            ..Default::default()
        };
        assert_eq!(
            model_name(&no_instrument),
            "h2-fluor-model_R=none_TH2=500_NH2=18_THI=30000_NHI=21"
        );
    }

    #[test]
    fn test_end_to_end_run_writes_outputs() {
        let dir = std::env::temp_dir().join(format!("h2fluor-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("lines.csv"),
            "vu,ju,vl,jl,band,lamlu,atot,aul,adiss\n\
             1,0,0,1,B,1092.732,1.87e9,1.36e8,0.0\n\
             1,0,3,1,B,1501.000,1.87e9,5.00e8,0.0\n\
             1,0,4,1,B,1560.000,1.87e9,4.00e8,0.0\n",
        )
        .unwrap();

        let job: JobConfig = toml::from_str(
            r#"
            [lines]
            h2_file = "lines.csv"

            [grid]
            range = [1000.0, 1600.0]
            coarse_step = 0.05
            fine_step = 0.05
            backend = "serial"
            "#,
        )
        .unwrap();

        let run = run_model(&job, &dir).unwrap();
        assert_eq!(run.output.summary.pumping_transitions, 1);
        assert_eq!(run.output.summary.emission_lines, 2);

        let out = dir.join(&run.model_name);
        write_spectra_csv(&run, &out.join("spectra.csv")).unwrap();
        write_spectra_json(&run, &out.join("spectra.json")).unwrap();
        write_source_csv(&run, &out.join("source.csv")).unwrap();

        let csv = std::fs::read_to_string(out.join("spectra.csv")).unwrap();
        assert!(csv.starts_with("# h2fluor"));
        assert!(csv.contains("wavelength_aa,emission,total"));
        let rows = csv.lines().filter(|l| !l.starts_with('#')).count();
        assert_eq!(rows, run.output.spectra.total.len() + 1);

        let text = std::fs::read_to_string(out.join("spectra.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["summary"]["emission_lines"], 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
