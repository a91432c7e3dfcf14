//! Optical depth of the combined HI + H₂ column.

use ndarray::{s, Array2, ArrayView2};

use crate::transfer::check_len;
use crate::types::PhysicsError;

/// τ_i(λ) = N_i σ_i(λ) for every transition.
///
/// `columns[i]` is the lower-level column density (cm⁻²) of row `i` of `sigma`.
pub fn optical_depth(columns: &[f64], sigma: &Array2<f64>) -> Result<Array2<f64>, PhysicsError> {
    check_len("optical depth columns", sigma.nrows(), columns.len())?;
    if let Some((index, &value)) = columns.iter().enumerate().find(|(_, n)| !(**n >= 0.0)) {
        return Err(PhysicsError::NegativeValue {
            quantity: "column density",
            index,
            value,
        });
    }

    let mut tau = sigma.clone();
    for (mut row, &n) in tau.rows_mut().into_iter().zip(columns) {
        row *= n;
    }
    Ok(tau)
}

/// τ_tot(λ) = Σ_i τ_i(λ), summed in row order.
pub fn total_optical_depth(tau: &ArrayView2<f64>) -> Vec<f64> {
    let mut total = vec![0.0; tau.ncols()];
    for row in tau.rows() {
        for (t, &x) in total.iter_mut().zip(row.iter()) {
            *t += x;
        }
    }
    total
}

/// Per-transition optical depth with the H₂ block as a trailing slice.
#[derive(Debug, Clone)]
pub struct OpticalDepth {
    tau: Array2<f64>,
    total: Vec<f64>,
    h2_start: usize,
}

impl OpticalDepth {
    /// Build from τ whose first `h2_start` rows are HI lines.
    pub fn new(tau: Array2<f64>, h2_start: usize) -> Result<Self, PhysicsError> {
        if h2_start > tau.nrows() {
            return Err(PhysicsError::LengthMismatch {
                context: "H2 row offset",
                expected: tau.nrows(),
                actual: h2_start,
            });
        }
        let total = total_optical_depth(&tau.view());
        Ok(Self { tau, total, h2_start })
    }

    /// All rows, HI first.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.tau
    }

    pub fn hi(&self) -> ArrayView2<'_, f64> {
        self.tau.slice(s![..self.h2_start, ..])
    }

    /// H₂ rows, a view into the combined array.
    pub fn h2(&self) -> ArrayView2<'_, f64> {
        self.tau.slice(s![self.h2_start.., ..])
    }

    /// Index of the first H₂ row.
    pub fn h2_start(&self) -> usize {
        self.h2_start
    }

    /// τ_tot over every HI and H₂ row.
    pub fn total(&self) -> &[f64] {
        &self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_scales_rows_by_column_density() {
        let sigma = array![[1e-18, 2e-18], [3e-20, 0.0]];
        let tau = optical_depth(&[1e18, 1e20], &sigma).unwrap();
        assert_relative_eq!(tau[[0, 0]], 1.0, max_relative = 1e-15);
        assert_relative_eq!(tau[[0, 1]], 2.0, max_relative = 1e-15);
        assert_relative_eq!(tau[[1, 0]], 3.0, max_relative = 1e-15);
        assert_eq!(tau[[1, 1]], 0.0);
    }

    #[test]
    fn test_monotone_in_column_density() {
        let sigma = array![[1e-21, 5e-19, 0.0]];
        let mut previous = optical_depth(&[0.0], &sigma).unwrap();
        for n in [1e14, 1e17, 1e20, 1e22] {
            let tau = optical_depth(&[n], &sigma).unwrap();
            assert!(tau.iter().all(|&t| t >= 0.0));
            assert!(tau.iter().zip(previous.iter()).all(|(a, b)| a >= b));
            previous = tau;
        }
    }

    #[test]
    fn test_rejects_negative_column() {
        let sigma = array![[1.0], [1.0]];
        let err = optical_depth(&[1.0, -1.0], &sigma).unwrap_err();
        assert!(matches!(err, PhysicsError::NegativeValue { index: 1, .. }));
        assert!(optical_depth(&[1.0], &sigma).is_err());
    }

    #[test]
    fn test_h2_rows_are_a_slice_of_the_total() {
        let tau = array![[0.5, 0.5], [1.0, 2.0], [0.25, 4.0]];
        let depth = OpticalDepth::new(tau, 1).unwrap();
        assert_eq!(depth.hi().nrows(), 1);
        assert_eq!(depth.h2(), array![[1.0, 2.0], [0.25, 4.0]]);
        assert_eq!(depth.total(), &[1.75, 6.5]);
        // The H₂ view shares storage with the combined array.
        assert_eq!(depth.h2().as_ptr(), depth.as_array().row(1).as_ptr());
    }
}
