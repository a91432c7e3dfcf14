//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over execution strategies (serial,
//! thread pool) so that the radiative-transfer code in `h2fluor-core` stays
//! scheduling-agnostic.

use ndarray::Array2;
use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Array shape error: {0}")]
    ShapeError(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub threads: usize,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Abstraction over execution backends.
///
/// Both entry points hand each worker exclusive ownership of its output slot,
/// so implementations never need to combine partial results.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Fill a `rows × cols` matrix one row at a time.
    ///
    /// This is the entry point for the per-transition cross-section matrix:
    /// `fill_row(i, row)` writes row `i` in place and no row depends on another.
    fn parallel_row_fill(
        &self,
        rows: usize,
        cols: usize,
        fill_row: &(dyn Fn(usize, &mut [f64]) + Send + Sync),
    ) -> Result<Array2<f64>, ComputeError>;

    /// Evaluate `f(i)` for every `i` in `0..len`.
    ///
    /// Used for per-sample work such as rendering the emergent spectrum, where
    /// each sample performs its own fixed-order sum over lines.
    fn parallel_map(
        &self,
        len: usize,
        f: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<Vec<f64>, ComputeError>;
}

/// Wrap a flat row-major buffer into a matrix.
pub(crate) fn into_matrix(
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Array2<f64>, ComputeError> {
    Array2::from_shape_vec((rows, cols), data).map_err(|e| ComputeError::ShapeError(e.to_string()))
}
