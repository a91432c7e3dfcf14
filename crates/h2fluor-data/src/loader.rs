//! CSV line-list readers.
//!
//! H₂ lists carry one row per transition:
//!
//! ```text
//! vu,ju,vl,jl,band,lamlu,atot,aul,adiss
//! 0,1,0,0,B,1108.127,1.87e9,1.69e9,0.0
//! ```
//!
//! with `band` one of `B`/`L` (Lyman) or `C`/`W` (Werner). Oscillator strengths
//! are derived from A_ul. HI lists use `lamlu,jl,ju,aul,flu` with optional
//! `el` (lower-level energy, cm⁻¹), `nl` and `nu` columns.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use h2fluor_core::{Band, Species, Transition};

use crate::hydrogen::AtomicLine;
use crate::molecular::oscillator_strength;
use crate::provider::DataError;

#[derive(Debug, Deserialize)]
struct H2Record {
    vu: u32,
    ju: u32,
    vl: u32,
    jl: u32,
    band: String,
    lamlu: f64,
    atot: f64,
    aul: f64,
    adiss: f64,
}

fn default_n_lower() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct HiRecord {
    lamlu: f64,
    jl: f64,
    ju: f64,
    aul: f64,
    flu: f64,
    #[serde(default)]
    el: f64,
    #[serde(default = "default_n_lower")]
    nl: u32,
    #[serde(default)]
    nu: u32,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader)
}

fn csv_error(source: &str) -> impl Fn(csv::Error) -> DataError + '_ {
    move |e| DataError::Csv {
        path: source.to_string(),
        source: e,
    }
}

/// Parse an H₂ line list. `source` names the input in error messages.
pub fn read_h2_lines<R: Read>(reader: R, source: &str) -> Result<Vec<Transition>, DataError> {
    let mut rdr = csv_reader(reader);
    let mut lines = Vec::new();
    for (row, record) in rdr.deserialize::<H2Record>().enumerate() {
        let r = record.map_err(csv_error(source))?;
        let band: Band = r.band.parse().map_err(|reason| DataError::InvalidRecord {
            path: source.to_string(),
            row,
            reason,
        })?;
        if band == Band::Atomic {
            return Err(DataError::InvalidRecord {
                path: source.to_string(),
                row,
                reason: "H2 line list contains an atomic band".into(),
            });
        }
        let t = Transition {
            species: Species::H2,
            band,
            v_upper: r.vu,
            j_upper: r.ju,
            v_lower: r.vl,
            j_lower: r.jl,
            wavelength_aa: r.lamlu,
            a_total: r.atot,
            a_ul: r.aul,
            a_diss: r.adiss,
            f_lu: oscillator_strength(r.lamlu, r.ju as f64, r.jl as f64, r.aul),
        };
        t.validate(row).map_err(|e| DataError::InvalidRecord {
            path: source.to_string(),
            row,
            reason: e.to_string(),
        })?;
        lines.push(t);
    }
    log::info!("Loaded {} H2 transitions from {}", lines.len(), source);
    Ok(lines)
}

/// Load an H₂ line list from a CSV file.
pub fn load_h2_lines(path: &Path) -> Result<Vec<Transition>, DataError> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| csv_error(&source)(e.into()))?;
    read_h2_lines(file, &source)
}

/// Parse an HI line list.
pub fn read_hi_lines<R: Read>(reader: R, source: &str) -> Result<Vec<AtomicLine>, DataError> {
    let mut rdr = csv_reader(reader);
    let mut lines = Vec::new();
    for (row, record) in rdr.deserialize::<HiRecord>().enumerate() {
        let r = record.map_err(csv_error(source))?;
        let line = AtomicLine {
            wavelength_aa: r.lamlu,
            j_lower: r.jl,
            j_upper: r.ju,
            a_ul: r.aul,
            f_lu: r.flu,
            lower_energy_cm: r.el,
            n_lower: r.nl,
            n_upper: r.nu,
        };
        line.to_transition().validate(row).map_err(|e| DataError::InvalidRecord {
            path: source.to_string(),
            row,
            reason: e.to_string(),
        })?;
        lines.push(line);
    }
    log::info!("Loaded {} HI transitions from {}", lines.len(), source);
    Ok(lines)
}

/// Load an HI line list from a CSV file.
pub fn load_hi_lines(path: &Path) -> Result<Vec<AtomicLine>, DataError> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| csv_error(&source)(e.into()))?;
    read_hi_lines(file, &source)
}
