use nalgebra::{DMatrix, DVector};

use crate::complex::{cdiv, Complex};
use crate::hessenberg::Span;

/// Eigenvectors from the real Schur form.
///
/// Back-substitutes through the quasi-triangular `h` left by
/// [`crate::schur::reduce_to_real_schur`], then maps the vectors through the
/// accumulated transform so that column `i` of `v` belongs to eigenvalue
/// `(d[i], e[i])`. A conjugate pair at `(i, i + 1)` stores the real part of
/// the eigenvector of `d[i] + i·e[i]` in column `i` and its imaginary part in
/// column `i + 1`.
pub fn back_substitute(
    h: &mut DMatrix<f64>,
    v: &mut DMatrix<f64>,
    d: &DVector<f64>,
    e: &DVector<f64>,
    span: Span,
    norm: f64,
) {
    puffin::profile_function!();

    let nn = h.ncols();
    let Span { low, high } = span;

    if norm == 0.0 {
        return;
    }

    // Backsubstitute to find vectors of upper triangular form

    for n in (0..nn).rev() {
        if e[n] == 0.0 {
            real_vector(h, d, e, n, norm);
        } else if e[n] < 0.0 {
            complex_vector(h, d, e, n, norm);
        }
    }

    // Vectors of isolated roots

    for i in (0..nn).filter(|&i| !span.contains(i)) {
        for j in i..nn {
            v[(i, j)] = h[(i, j)];
        }
    }

    // Back transformation to get eigenvectors of original matrix

    for j in (low..nn).rev() {
        for i in low..=high {
            let mut z = 0.0;
            for k in low..=j.min(high) {
                z += v[(i, k)] * h[(k, j)];
            }
            v[(i, j)] = z;
        }
    }
}

/// Column `n` of `h` becomes the Schur-basis eigenvector of the real root `d[n]`.
fn real_vector(h: &mut DMatrix<f64>, d: &DVector<f64>, e: &DVector<f64>, n: usize, norm: f64) {
    let eps = f64::EPSILON;
    let p = d[n];
    let mut l = n;
    let mut z = 0.0;
    let mut s = 0.0;

    h[(n, n)] = 1.0;
    for i in (0..n).rev() {
        let w = h[(i, i)] - p;
        let mut r = 0.0;
        for j in l..=n {
            r += h[(i, j)] * h[(j, n)];
        }
        if e[i] < 0.0 {
            z = w;
            s = r;
        } else {
            l = i;
            if e[i] == 0.0 {
                h[(i, n)] = if w != 0.0 { -r / w } else { -r / (eps * norm) };

            // Solve real equations
            } else {
                let x = h[(i, i + 1)];
                let y = h[(i + 1, i)];
                let q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                let t = (x * s - z * r) / q;
                h[(i, n)] = t;
                h[(i + 1, n)] = if x.abs() > z.abs() {
                    (-r - w * t) / x
                } else {
                    (-s - y * t) / z
                };
            }

            // Overflow control

            let t = h[(i, n)].abs();
            if (eps * t) * t > 1.0 {
                for j in i..=n {
                    h[(j, n)] /= t;
                }
            }
        }
    }
}

/// Columns `n - 1` (real part) and `n` (imaginary part) of `h` become the
/// Schur-basis eigenvector of the pair whose second member is `(d[n], e[n])`.
fn complex_vector(h: &mut DMatrix<f64>, d: &DVector<f64>, e: &DVector<f64>, n: usize, norm: f64) {
    let eps = f64::EPSILON;
    let p = d[n];
    let q = e[n];
    let mut l = n - 1;
    let mut z = 0.0;
    let mut carried = Complex::new(0.0, 0.0);

    // Last vector component imaginary so matrix is triangular

    let last = if h[(n, n - 1)].abs() > h[(n - 1, n)].abs() {
        Complex::new(q / h[(n, n - 1)], -(h[(n, n)] - p) / h[(n, n - 1)])
    } else {
        cdiv(
            Complex::new(0.0, -h[(n - 1, n)]),
            Complex::new(h[(n - 1, n - 1)] - p, q),
        )
    };
    set_entry(h, n - 1, n, last);
    h[(n, n - 1)] = 0.0;
    h[(n, n)] = 1.0;

    for i in (0..(n - 1)).rev() {
        let mut sum = Complex::new(0.0, 0.0);
        for j in l..=n {
            sum += entry(h, j, n) * h[(i, j)];
        }
        let w = h[(i, i)] - p;

        if e[i] < 0.0 {
            z = w;
            carried = sum;
        } else {
            l = i;
            if e[i] == 0.0 {
                set_entry(h, i, n, cdiv(-sum, Complex::new(w, q)));
            } else {
                // Solve complex equations

                let x = h[(i, i + 1)];
                let y = h[(i + 1, i)];
                let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                let vi = (d[i] - p) * 2.0 * q;
                if vr == 0.0 && vi == 0.0 {
                    vr = eps * norm * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                }
                let top = cdiv(
                    carried * x - sum * Complex::new(z, q),
                    Complex::new(vr, vi),
                );
                set_entry(h, i, n, top);
                let below = if x.abs() > z.abs() + q.abs() {
                    (-sum - Complex::new(w, q) * top) / x
                } else {
                    cdiv(-carried - top * y, Complex::new(z, q))
                };
                set_entry(h, i + 1, n, below);
            }

            // Overflow control

            let t = h[(i, n - 1)].abs().max(h[(i, n)].abs());
            if (eps * t) * t > 1.0 {
                for j in i..=n {
                    h[(j, n - 1)] /= t;
                    h[(j, n)] /= t;
                }
            }
        }
    }
}

/// Row `i` of the complex vector stored in columns `n - 1` and `n`.
fn entry(h: &DMatrix<f64>, i: usize, n: usize) -> Complex<f64> {
    Complex::new(h[(i, n - 1)], h[(i, n)])
}

fn set_entry(h: &mut DMatrix<f64>, i: usize, n: usize, value: Complex<f64>) {
    h[(i, n - 1)] = value.re;
    h[(i, n)] = value.im;
}
