//! Single-threaded reference backend.

use ndarray::Array2;

use crate::backend::{into_matrix, BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// Runs every row and sample on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Serial".into(),
            backend_type: BackendType::Serial,
            threads: 1,
        }
    }

    fn parallel_row_fill(
        &self,
        rows: usize,
        cols: usize,
        fill_row: &(dyn Fn(usize, &mut [f64]) + Send + Sync),
    ) -> Result<Array2<f64>, ComputeError> {
        let mut data = vec![0.0; rows * cols];
        if cols > 0 {
            for (i, row) in data.chunks_mut(cols).enumerate() {
                fill_row(i, row);
            }
        }
        into_matrix(rows, cols, data)
    }

    fn parallel_map(
        &self,
        len: usize,
        f: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<Vec<f64>, ComputeError> {
        Ok((0..len).map(f).collect())
    }
}
