//! CPU compute backend using Rayon for shared-memory parallelism.

use ndarray::Array2;

use crate::backend::{into_matrix, BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises work across threads via Rayon.
pub struct CpuBackend {
    num_threads: usize,
}

impl CpuBackend {
    /// Create a new CPU backend using all available threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            threads: self.num_threads,
        }
    }

    fn parallel_row_fill(
        &self,
        rows: usize,
        cols: usize,
        fill_row: &(dyn Fn(usize, &mut [f64]) + Send + Sync),
    ) -> Result<Array2<f64>, ComputeError> {
        use rayon::prelude::*;

        let mut data = vec![0.0; rows * cols];
        if cols > 0 {
            data.par_chunks_mut(cols)
                .enumerate()
                .for_each(|(i, row)| fill_row(i, row));
        }
        into_matrix(rows, cols, data)
    }

    fn parallel_map(
        &self,
        len: usize,
        f: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<Vec<f64>, ComputeError> {
        use rayon::prelude::*;

        Ok((0..len).into_par_iter().map(f).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SerialBackend;

    #[test]
    fn test_matches_serial_backend() {
        let fill = |i: usize, row: &mut [f64]| {
            for (j, v) in row.iter_mut().enumerate() {
                *v = ((i + 1) as f64).ln() * (j as f64).sqrt();
            }
        };
        let cpu = CpuBackend::new().parallel_row_fill(64, 33, &fill).unwrap();
        let serial = SerialBackend.parallel_row_fill(64, 33, &fill).unwrap();
        assert_eq!(cpu, serial);

        let f = |i: usize| (i as f64 * 0.37).sin();
        assert_eq!(
            CpuBackend::new().parallel_map(1000, &f).unwrap(),
            SerialBackend.parallel_map(1000, &f).unwrap()
        );
    }
}
