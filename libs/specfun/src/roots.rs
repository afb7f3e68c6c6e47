//! Root bracketing and Bessel zero tables.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::bessel;
use crate::error::{Error, Result};

/// Iteration budget for [`brent`].
pub const MAX_ITERATIONS: usize = 100;

const BRENT_TOLERANCE: f64 = 1e-14;

/// Finds a root of `f` inside the bracket `[a, b]` with Brent's method.
///
/// The bracket endpoints must evaluate to opposite signs; otherwise the
/// search fails with [`Error::NoSignChange`] without iterating. An endpoint
/// that is already an exact root is returned directly.
///
/// # Examples
///
/// ```
/// use std::f64::consts::FRAC_PI_2;
///
/// let root = specfun::roots::brent(f64::cos, 1.0, 2.0).unwrap();
/// assert!((root - FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut xa = a;
    let mut xb = b;
    let mut fa = f(xa);
    let mut fb = f(xb);
    if fa == 0.0 {
        return Ok(xa);
    }
    if fb == 0.0 {
        return Ok(xb);
    }
    if (fa > 0.0) == (fb > 0.0) {
        return Err(Error::NoSignChange { a, b });
    }
    let mut xc = xa;
    let mut fc = fa;
    let mut d = xb - xa;
    let mut e = xb - xa;
    for _ in 0..MAX_ITERATIONS {
        if (fb > 0.0) == (fc > 0.0) {
            xc = xa;
            fc = fa;
            d = xb - xa;
            e = d;
        }
        if fc.abs() < fb.abs() {
            xa = xb;
            xb = xc;
            xc = xa;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * f64::EPSILON * xb.abs() + 0.5 * BRENT_TOLERANCE;
        let mid = 0.5 * (xc - xb);
        if mid.abs() <= tol || fb == 0.0 {
            return Ok(xb);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Inverse quadratic interpolation, degrading to a secant step
            // when only two of the points are distinct.
            let s = fb / fa;
            let (mut p, mut q) = if xa == xc {
                (2.0 * mid * s, 1.0 - s)
            } else {
                let r1 = fa / fc;
                let r2 = fb / fc;
                (
                    s * (2.0 * mid * r1 * (r1 - r2) - (xb - xa) * (r2 - 1.0)),
                    (r1 - 1.0) * (r2 - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let limit = (3.0 * mid * q - (tol * q).abs()).min((e * q).abs());
            if 2.0 * p < limit {
                e = d;
                d = p / q;
            } else {
                d = mid;
                e = d;
            }
        } else {
            d = mid;
            e = d;
        }
        xa = xb;
        fa = fb;
        if d.abs() > tol {
            xb += d;
        } else {
            xb += tol.copysign(mid);
        }
        fb = f(xb);
    }
    Err(Error::MaxIterations {
        limit: MAX_ITERATIONS,
    })
}

/// Returns the first `count` positive zeros of the spherical Bessel
/// function `j_n`, in ascending order.
///
/// Zeros of consecutive orders interlace, so the table is built by
/// climbing a ladder: the closed-form zeros of `j_0` at `k * pi` seed the
/// base row, and each zero of order `m` is bracketed between adjacent
/// zeros of order `m - 1`. The base row carries `count + n` entries so
/// every level of the ladder has a full set of brackets.
pub fn sph_jn_zeros(n: u32, count: usize) -> Result<Vec<f64>> {
    climb(n, count, |k| k as f64 * PI, bessel::sph_jn)
}

/// Returns the first `count` positive zeros of the Riccati-Bessel
/// derivative `S_n'`, in ascending order.
///
/// Uses the same interlacing ladder as [`sph_jn_zeros`], seeded from
/// `S_0' = cos`, whose zeros are the odd multiples of `pi / 2`.
pub fn riccati_jn_prime_zeros(n: u32, count: usize) -> Result<Vec<f64>> {
    climb(
        n,
        count,
        |k| (2 * k - 1) as f64 * FRAC_PI_2,
        bessel::riccati_jn_prime,
    )
}

fn climb<B, F>(n: u32, count: usize, base: B, f: F) -> Result<Vec<f64>>
where
    B: Fn(usize) -> f64,
    F: Fn(u32, f64) -> f64,
{
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut ladder: Vec<f64> = (1..=count + n as usize).map(base).collect();
    for m in 1..=n {
        let need = count + (n - m) as usize;
        let mut next = Vec::with_capacity(need);
        for pair in ladder.windows(2).take(need) {
            next.push(brent(|x| f(m, x), pair[0], pair[1])?);
        }
        ladder = next;
    }
    ladder.truncate(count);
    Ok(ladder)
}
