//! The Faddeeva (scaled complex complementary error) function.
//!
//! $$w(z) = e^{-z^2}\,\mathrm{erfc}(-iz)$$
//!
//! Evaluated with the algorithm of Poppe & Wijers (ACM TOMS 680, 1990):
//! a Taylor series of $e^{-z^2}$-scaled erf near the origin, and a Laplace
//! continued fraction (truncated Taylor-accelerated in the intermediate region)
//! elsewhere. In the upper half plane the relative error is at the 1e-15 level
//! far from the origin and near the real axis close to it, and rises to about
//! 1e-9 where the series hands over to the accelerated continued fraction
//! (|z| ≈ 1.8 on the real axis) and around Re z ≈ 4 for small Im z.

use num_complex::Complex64;

/// 2/√π
const TWO_OVER_SQRT_PI: f64 = 1.128_379_167_095_512_573_9;

/// Evaluate w(z) for any complex argument.
///
/// For Im z < 0 the reflection w(z) = 2 e^{-z²} − w(−z) is used, which
/// overflows for large |z|; the Voigt function only needs Im z ≥ 0.
pub fn faddeeva(z: Complex64) -> Complex64 {
    let xi = z.re;
    let yi = z.im;
    let xabs = xi.abs();
    let yabs = yi.abs();

    let x = xabs / 6.3;
    let y = yabs / 4.4;
    let mut qrho = x * x + y * y;
    let mut xquad = xabs * xabs - yabs * yabs;
    let yquad = 2.0 * xabs * yabs;

    let use_series = qrho < 0.085_264;

    let mut u;
    let mut v;
    // e^{-z²} components, reused by the lower-half-plane reflection.
    let mut u2 = 0.0;
    let mut v2 = 0.0;

    if use_series {
        // Power series for e^{-z²} erf-like sum (Abramowitz & Stegun 7.1.5).
        qrho = (1.0 - 0.85 * y) * qrho.sqrt();
        let n = (6.0 + 72.0 * qrho).round() as i32;
        let mut j = 2 * n + 1;
        let mut xsum = 1.0 / j as f64;
        let mut ysum = 0.0;
        for i in (1..=n).rev() {
            j -= 2;
            let fi = i as f64;
            let xaux = (xsum * xquad - ysum * yquad) / fi;
            ysum = (xsum * yquad + ysum * xquad) / fi;
            xsum = xaux + 1.0 / j as f64;
        }
        let u1 = 1.0 - TWO_OVER_SQRT_PI * (xsum * yabs + ysum * xabs);
        let v1 = TWO_OVER_SQRT_PI * (xsum * xabs - ysum * yabs);
        let daux = (-xquad).exp();
        u2 = daux * yquad.cos();
        v2 = -daux * yquad.sin();

        u = u1 * u2 - v1 * v2;
        v = u1 * v2 + v1 * u2;
    } else {
        let h;
        let h2;
        let kapn;
        let nu;
        if qrho > 1.0 {
            // Plain continued fraction far from the origin.
            h = 0.0;
            h2 = 0.0;
            kapn = 0;
            qrho = qrho.sqrt();
            nu = (3.0 + 1442.0 / (26.0 * qrho + 77.0)) as i32;
        } else {
            qrho = (1.0 - y) * (1.0 - qrho).sqrt();
            h = 1.88 * qrho;
            h2 = 2.0 * h;
            kapn = (7.0 + 34.0 * qrho).round() as i32;
            nu = (16.0 + 26.0 * qrho).round() as i32;
        }

        let truncated_taylor = h > 0.0;
        let mut qlambda = if truncated_taylor { h2.powi(kapn) } else { 0.0 };

        let mut rx = 0.0;
        let mut ry = 0.0;
        let mut sx = 0.0;
        let mut sy = 0.0;
        for n in (0..=nu).rev() {
            let np1 = (n + 1) as f64;
            let tx = yabs + h + np1 * rx;
            let ty = xabs - np1 * ry;
            let c = 0.5 / (tx * tx + ty * ty);
            rx = c * tx;
            ry = c * ty;
            if truncated_taylor && n <= kapn {
                let tx = qlambda + sx;
                sx = rx * tx - ry * sy;
                sy = ry * tx + rx * sy;
                qlambda /= h2;
            }
        }

        if h == 0.0 {
            u = TWO_OVER_SQRT_PI * rx;
            v = TWO_OVER_SQRT_PI * ry;
        } else {
            u = TWO_OVER_SQRT_PI * sx;
            v = TWO_OVER_SQRT_PI * sy;
        }
        if yabs == 0.0 {
            u = (-xabs * xabs).exp();
        }
    }

    // Map back from the first quadrant.
    if yi < 0.0 {
        if use_series {
            u2 *= 2.0;
            v2 *= 2.0;
        } else {
            xquad = -xquad;
            let w1 = 2.0 * xquad.exp();
            u2 = w1 * yquad.cos();
            v2 = -w1 * yquad.sin();
        }
        u = u2 - u;
        v = v2 - v;
        if xi > 0.0 {
            v = -v;
        }
    } else if xi < 0.0 {
        v = -v;
    }

    Complex64::new(u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin() {
        let w = faddeeva(Complex64::new(0.0, 0.0));
        assert_relative_eq!(w.re, 1.0, max_relative = 1e-14);
        assert!(w.im.abs() < 1e-14);
    }

    #[test]
    fn test_real_axis_matches_gaussian_and_dawson() {
        // w(x) = e^{-x²} + (2i/√π) D(x); D(1) = 0.5380795069127684
        let w = faddeeva(Complex64::new(1.0, 0.0));
        assert_relative_eq!(w.re, (-1.0_f64).exp(), max_relative = 1e-13);
        assert_relative_eq!(w.im, 0.607_157_705_841_393_7, max_relative = 1e-12);

        // Far out on the real axis the imaginary part follows 1/(√π x).
        let w = faddeeva(Complex64::new(30.0, 0.0));
        assert_eq!(w.re, (-900.0_f64).exp());
        assert_relative_eq!(
            w.im,
            1.0 / (std::f64::consts::PI.sqrt() * 30.0) * (1.0 + 1.0 / 1800.0 + 3.0 / 3.24e6),
            max_relative = 1e-8
        );
    }

    #[test]
    fn test_imaginary_axis_is_erfcx() {
        // w(i) = erfcx(1)
        let w = faddeeva(Complex64::new(0.0, 1.0));
        assert_relative_eq!(w.re, 0.427_583_576_155_807, max_relative = 1e-13);
        assert!(w.im.abs() < 1e-15);

        // Asymptotic erfcx(y) ≈ (1 − 1/(2y²) + 3/(4y⁴)) / (√π y)
        let y: f64 = 100.0;
        let w = faddeeva(Complex64::new(0.0, y));
        let series = 1.0 - 1.0 / (2.0 * y * y) + 3.0 / (4.0 * y.powi(4));
        let asymptotic = series / (std::f64::consts::PI.sqrt() * y);
        assert_relative_eq!(w.re, asymptotic, max_relative = 1e-9);
    }

    #[test]
    fn test_first_quadrant_reference_value() {
        let w = faddeeva(Complex64::new(1.0, 1.0));
        assert_relative_eq!(w.re, 0.304_744_205_256_912_6, max_relative = 1e-12);
        assert_relative_eq!(w.im, 0.208_218_938_202_831_6, max_relative = 1e-12);
    }

    #[test]
    fn test_conjugate_symmetry_in_x() {
        for &(x, y) in &[(0.3, 0.01), (2.5, 0.5), (7.0, 1e-3), (0.05, 3.0)] {
            let wp = faddeeva(Complex64::new(x, y));
            let wm = faddeeva(Complex64::new(-x, y));
            assert_eq!(wp.re, wm.re);
            assert_eq!(wp.im, -wm.im);
        }
    }

    #[test]
    fn test_continuous_across_region_boundaries() {
        // qrho = 0.085264 and qrho = 1 switch algorithms; each side carries
        // up to ~1e-9 relative error.
        let x_inner = 6.3 * 0.085_264_f64.sqrt();
        let below = faddeeva(Complex64::new(x_inner - 1e-9, 0.0));
        let above = faddeeva(Complex64::new(x_inner + 1e-9, 0.0));
        assert_relative_eq!(below.im, above.im, max_relative = 5e-9);
        // Im w(1.8396...) = 0.380372940398664
        assert_relative_eq!(below.im, 0.380_372_940_398_664, max_relative = 2e-9);
        assert_relative_eq!(above.im, 0.380_372_940_398_664, max_relative = 2e-9);

        let below = faddeeva(Complex64::new(6.3 - 1e-9, 0.1));
        let above = faddeeva(Complex64::new(6.3 + 1e-9, 0.1));
        assert_relative_eq!(below.re, above.re, max_relative = 5e-9);
        assert_relative_eq!(below.im, above.im, max_relative = 5e-9);
    }
}
