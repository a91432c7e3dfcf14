//! Voigt line profiles.
//!
//! A line broadened by both Doppler motion and natural damping has the Voigt
//! shape
//!
//! $$H(a, y) = \mathrm{Re}\, w(y + i a)$$
//!
//! where $w$ is the Faddeeva function, $a = \Gamma / (4\pi \Delta\nu_D)$ the
//! damping parameter and $y = |\nu - \nu_0| / \Delta\nu_D$ the offset from line
//! centre in Doppler widths. $H$ is normalised so that $\int H\,dy = \sqrt{\pi}$.

pub mod faddeeva;

pub use faddeeva::faddeeva;

use num_complex::Complex64;

use crate::constants::{ANGSTROM_TO_CM, CGS};
use crate::doppler::DopplerWidth;
use crate::types::{require, PhysicsError};

/// The Voigt function H(a, y).
pub fn voigt(a: f64, y: f64) -> f64 {
    faddeeva(Complex64::new(y, a)).re
}

/// Damping parameter `a` and offset `y` at one wavelength sample.
///
/// The Doppler width in frequency, Δν_D = Δv ν / c, is taken at the sample
/// frequency ν.
pub fn voigt_parameters(
    wavelength_aa: f64,
    center_aa: f64,
    damping_rate: f64,
    width: DopplerWidth,
) -> (f64, f64) {
    let nu = CGS::SPEED_OF_LIGHT / (wavelength_aa * ANGSTROM_TO_CM);
    let nu0 = CGS::SPEED_OF_LIGHT / (center_aa * ANGSTROM_TO_CM);
    let dnu_d = width.cm_per_s() * nu / CGS::SPEED_OF_LIGHT;

    let a = damping_rate / (4.0 * std::f64::consts::PI * dnu_d);
    let y = (nu - nu0).abs() / dnu_d;
    (a, y)
}

/// H at a single wavelength sample.
pub fn voigt_point(
    wavelength_aa: f64,
    center_aa: f64,
    damping_rate: f64,
    width: DopplerWidth,
) -> f64 {
    let (a, y) = voigt_parameters(wavelength_aa, center_aa, damping_rate, width);
    voigt(a, y)
}

fn check_line(center_aa: f64, damping_rate: f64) -> Result<(), PhysicsError> {
    require(
        center_aa.is_finite() && center_aa > 0.0,
        "line centre",
        center_aa,
        "must be positive",
    )?;
    require(
        damping_rate.is_finite() && damping_rate >= 0.0,
        "damping rate",
        damping_rate,
        "must be non-negative",
    )
}

/// Dimensionless Voigt profile H over a set of wavelengths (Å).
///
/// # Arguments
/// * `grid` - Sample wavelengths (Å).
/// * `center_aa` - Line centre (Å).
/// * `damping_rate` - Damping constant Γ (s⁻¹), the total upper-level decay rate.
/// * `width` - Velocity Doppler width.
pub fn voigt_profile(
    grid: &[f64],
    center_aa: f64,
    damping_rate: f64,
    width: DopplerWidth,
) -> Result<Vec<f64>, PhysicsError> {
    check_line(center_aa, damping_rate)?;
    Ok(grid
        .iter()
        .map(|&lam| voigt_point(lam, center_aa, damping_rate, width))
        .collect())
}

/// Unit-area line shape in wavelength, H / (√π Δλ_D) in Å⁻¹,
/// with Δλ_D = λ₀ Δv / c.
pub fn line_shape(
    wavelength_aa: f64,
    center_aa: f64,
    damping_rate: f64,
    width: DopplerWidth,
) -> f64 {
    let dlam_d = width.wavelength_width_aa(center_aa);
    voigt_point(wavelength_aa, center_aa, damping_rate, width)
        / (std::f64::consts::PI.sqrt() * dlam_d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KM_TO_CM;
    use approx::assert_relative_eq;

    fn sqrt_pi() -> f64 {
        std::f64::consts::PI.sqrt()
    }

    #[test]
    fn test_voigt_is_even_in_y() {
        for &a in &[1e-4, 0.01, 0.5, 3.0] {
            for &y in &[0.1, 1.0, 2.7, 15.0] {
                assert_eq!(voigt(a, y), voigt(a, -y));
            }
        }
    }

    #[test]
    fn test_voigt_limits() {
        // a → 0: Gaussian
        assert_relative_eq!(voigt(0.0, 1.3), (-1.69_f64).exp(), max_relative = 1e-12);
        // Peak: H(a, 0) = erfcx(a) ≈ 1 − 2a/√π
        assert_relative_eq!(voigt(1e-6, 0.0), 1.0 - 2e-6 / sqrt_pi(), max_relative = 1e-10);
        // Far wing: Lorentzian a / (√π y²)
        let (a, y) = (1e-3, 200.0);
        assert_relative_eq!(voigt(a, y), a / (sqrt_pi() * y * y), max_relative = 1e-4);
    }

    #[test]
    fn test_voigt_reference_values_in_the_wings() {
        // H(a, y) at small damping and a few Doppler widths from centre.
        let reference = [
            (1e-2, 2.0, 0.020_620_065_445_569_127),
            (1e-1, 1.5, 0.134_049_344_822_934_46),
            (1e-3, 2.5, 0.002_060_667_855_708_547),
            (1e-3, 3.0, 2.019_724_245_573_203e-4),
            (1e-4, 4.0, 4.037_490_347_118_378e-6),
            (1e-3, 5.0, 2.408_046_396_710_341_5e-5),
        ];
        for (a, y, h) in reference {
            assert_relative_eq!(voigt(a, y), h, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_voigt_integrates_to_sqrt_pi() {
        let a = 0.01;
        let half_span = 1000.0;
        let dy = 0.005;
        let n = (2.0 * half_span / dy) as usize;
        let mut sum = 0.0;
        for i in 0..=n {
            let y = -half_span + i as f64 * dy;
            let w = if i == 0 || i == n { 0.5 } else { 1.0 };
            sum += w * voigt(a, y);
        }
        // Add the Lorentzian tails beyond ±half_span.
        let tails = 2.0 * a / (sqrt_pi() * half_span);
        assert_relative_eq!(sum * dy + tails, sqrt_pi(), max_relative = 1e-5);
    }

    #[test]
    fn test_offset_is_wavelength_offset_in_doppler_widths() {
        let width = DopplerWidth::new(5.0 * KM_TO_CM).unwrap();
        let center = 1100.0;
        let dlam_d = width.wavelength_width_aa(center);
        let (_, y) = voigt_parameters(center + 2.0 * dlam_d, center, 1e8, width);
        assert_relative_eq!(y, 2.0, max_relative = 1e-10);
    }

    #[test]
    fn test_line_shape_has_unit_area() {
        let width = DopplerWidth::new(10.0 * KM_TO_CM).unwrap();
        let center = 1500.0;
        let dlam_d = width.wavelength_width_aa(center);
        let step = dlam_d / 50.0;
        let n = 40_000;
        let area: f64 = (0..=n)
            .map(|i| center - 20_000.0 * step + i as f64 * step)
            .map(|lam| line_shape(lam, center, 1e6, width) * step)
            .sum();
        assert_relative_eq!(area, 1.0, max_relative = 1e-3);
    }

    #[test]
    fn test_profile_rejects_bad_line() {
        let width = DopplerWidth::new(1e5).unwrap();
        assert!(voigt_profile(&[1000.0], -1.0, 1e8, width).is_err());
        assert!(voigt_profile(&[1000.0], 1000.0, f64::NAN, width).is_err());
        let h = voigt_profile(&[999.0, 1000.0, 1001.0], 1000.0, 1e8, width).unwrap();
        assert!(h[1] > h[0] && h[1] > h[2]);
    }
}
