//! # h2fluor Data
//!
//! Inputs for the h2fluor radiative-transfer engine: line lists, level
//! populations and incident continua. Incident fields implement the
//! [`ContinuumModel`](provider::ContinuumModel) trait.
//!
//! ## Available data sources
//!
//! | Source | Module | Status |
//! |--------|--------|--------|
//! | HI Lyman series (NIST ASD) | [`hydrogen`] | Embedded |
//! | H₂ Lyman/Werner line lists | [`loader`] | CSV |
//! | H₂ LTE populations | [`molecular`] | Implemented |
//! | Blackbody, Draine ISRF | [`continuum`] | Implemented |

pub mod continuum;
pub mod hydrogen;
pub mod loader;
pub mod molecular;
pub mod provider;

pub use continuum::{Blackbody, DraineField, IncidentSource};
pub use hydrogen::{hi_columns, lyman_series, AtomicLine};
pub use loader::{load_h2_lines, load_hi_lines, read_h2_lines, read_hi_lines};
pub use molecular::{lte_populations, oscillator_strength};
pub use provider::{ContinuumModel, DataError};
