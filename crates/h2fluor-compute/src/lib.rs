//! # h2fluor Compute
//!
//! Execution backends for the h2fluor radiative-transfer engine. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that keeps the
//! physics in `h2fluor-core` independent of how the per-transition and
//! per-wavelength work is scheduled.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | Serial | always | Implemented |
//! | CPU (Rayon) | `cpu` (default) | Implemented |
//!
//! Every backend fills rows and samples independently and never reduces
//! across them, so results are identical whichever backend runs a job.

pub mod backend;
pub mod serial;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};
pub use serial::SerialBackend;

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;

use std::sync::Arc;

/// Create a backend from a preference string.
///
/// - `"serial"`: single-threaded.
/// - `"cpu"`: Rayon thread pool (falls back to serial without the `cpu` feature).
/// - `"auto"` (default): same as `"cpu"` when available.
pub fn create_backend(preference: &str) -> Result<Arc<dyn ComputeBackend>, ComputeError> {
    match preference {
        "serial" => Ok(Arc::new(SerialBackend)),
        "cpu" | "auto" => {
            #[cfg(feature = "cpu")]
            {
                Ok(Arc::new(CpuBackend::new()))
            }
            #[cfg(not(feature = "cpu"))]
            {
                log::warn!("built without the `cpu` feature, using the serial backend");
                Ok(Arc::new(SerialBackend))
            }
        }
        other => Err(ComputeError::Unavailable(format!(
            "unknown backend '{}'. Valid values: auto, cpu, serial",
            other
        ))),
    }
}
