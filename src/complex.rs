pub use nalgebra::Complex;

/// Complex scalar division.
///
/// Smith's algorithm: scales by the larger component of `y` so that
/// `|y|²` is never formed.
pub fn cdiv(x: Complex<f64>, y: Complex<f64>) -> Complex<f64> {
    if y.re.abs() > y.im.abs() {
        let r = y.im / y.re;
        let d = y.re + r * y.im;
        Complex::new((x.re + r * x.im) / d, (x.im - r * x.re) / d)
    } else {
        let r = y.re / y.im;
        let d = y.im + r * y.re;
        Complex::new((r * x.re + x.im) / d, (r * x.im - x.re) / d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_naive_division() {
        let x = Complex::new(3.0, -4.0);
        for y in [
            Complex::new(2.0, 1.0),
            Complex::new(0.5, -7.0),
            Complex::new(-3.0, 0.0),
            Complex::new(0.0, 2.0),
        ] {
            let expected = x / y;
            let actual = cdiv(x, y);
            assert_relative_eq!(actual.re, expected.re, max_relative = 1e-14);
            assert_relative_eq!(actual.im, expected.im, max_relative = 1e-14);
        }
    }

    #[test]
    fn survives_huge_divisor() {
        // |y|² overflows, the quotient does not.
        let y = Complex::new(1e200, 1e200);
        let q = cdiv(Complex::new(1e200, 0.0), y);
        assert_relative_eq!(q.re, 0.5, max_relative = 1e-14);
        assert_relative_eq!(q.im, -0.5, max_relative = 1e-14);
    }
}
