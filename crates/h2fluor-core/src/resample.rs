//! Linear resampling between wavelength grids.
//!
//! Values outside the source range are clamped to the nearest end sample.

use crate::transfer::check_len;
use crate::types::{PhysicsError, WavelengthGrid};

/// Piecewise-linear interpolant over strictly increasing samples.
#[derive(Debug, Clone, Copy)]
pub struct LinearInterpolator<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
}

impl<'a> LinearInterpolator<'a> {
    pub fn new(grid: &'a WavelengthGrid, ys: &'a [f64]) -> Result<Self, PhysicsError> {
        check_len("interpolation values", grid.len(), ys.len())?;
        Ok(Self {
            xs: grid.as_slice(),
            ys,
        })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        // Binary search for the enclosing interval
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let t = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        self.ys[lo] + t * (self.ys[hi] - self.ys[lo])
    }
}

/// Interpolate `values` given on `from` onto every sample of `to`.
pub fn resample(
    from: &WavelengthGrid,
    values: &[f64],
    to: &[f64],
) -> Result<Vec<f64>, PhysicsError> {
    let interp = LinearInterpolator::new(from, values)?;
    Ok(to.iter().map(|&x| interp.evaluate(x)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_on_the_same_grid() {
        let grid = WavelengthGrid::uniform(1000.0, 1010.0, 0.5).unwrap();
        let values: Vec<f64> = grid.as_slice().iter().map(|x| (x * 0.3).sin() + 2.0).collect();
        let out = resample(&grid, &values, grid.as_slice()).unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn test_exact_at_shared_points_and_linear_between() {
        let coarse = WavelengthGrid::from_samples(vec![1.0, 2.0, 4.0]).unwrap();
        let values = [10.0, 20.0, 0.0];
        let out = resample(&coarse, &values, &[1.0, 1.5, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(out[0], 10.0);
        assert_relative_eq!(out[1], 15.0);
        assert_relative_eq!(out[2], 20.0);
        assert_relative_eq!(out[3], 10.0);
        assert_relative_eq!(out[4], 0.0);
    }

    #[test]
    fn test_clamps_outside_the_range() {
        let coarse = WavelengthGrid::from_samples(vec![1.0, 2.0]).unwrap();
        let out = resample(&coarse, &[3.0, 5.0], &[0.5, 2.5]).unwrap();
        assert_eq!(out, vec![3.0, 5.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let coarse = WavelengthGrid::from_samples(vec![1.0, 2.0]).unwrap();
        assert!(resample(&coarse, &[1.0], &[1.5]).is_err());
    }
}
