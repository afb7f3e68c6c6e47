//! Adaptive numerical quadrature.

use crate::error::{Error, Result};

/// Default absolute error tolerance for [`integrate`].
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default subdivision depth budget for [`integrate`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Integrates `f` over `[a, b]` by adaptive Simpson quadrature with the
/// default tolerance and depth budget.
///
/// Reversing the endpoints negates the result. Fails with
/// [`Error::DepthExceeded`] if the integrand cannot be resolved to the
/// tolerance within the depth budget.
///
/// # Examples
///
/// ```
/// use std::f64::consts::PI;
///
/// let total = specfun::quad::integrate(f64::sin, 0.0, PI).unwrap();
/// assert!((total - 2.0).abs() < 1e-9);
/// ```
pub fn integrate<F>(f: F, a: f64, b: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    integrate_with(f, a, b, DEFAULT_TOLERANCE, DEFAULT_MAX_DEPTH)
}

/// Integrates `f` over `[a, b]` with an explicit absolute tolerance and
/// subdivision depth budget.
pub fn integrate_with<F>(f: F, a: f64, b: f64, tolerance: f64, max_depth: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return Ok(0.0);
    }
    let fa = f(a);
    let fb = f(b);
    let m = 0.5 * (a + b);
    let fm = f(m);
    let whole = simpson(a, b, fa, fm, fb);
    let quad = Adaptive {
        f: &f,
        budget: max_depth,
    };
    quad.refine(a, b, fa, fm, fb, whole, tolerance, max_depth)
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

struct Adaptive<'a, F> {
    f: &'a F,
    budget: usize,
}

impl<F> Adaptive<'_, F>
where
    F: Fn(f64) -> f64,
{
    #[allow(clippy::too_many_arguments)]
    fn refine(
        &self,
        a: f64,
        b: f64,
        fa: f64,
        fm: f64,
        fb: f64,
        whole: f64,
        tolerance: f64,
        depth: usize,
    ) -> Result<f64> {
        let m = 0.5 * (a + b);
        let lm = 0.5 * (a + m);
        let rm = 0.5 * (m + b);
        let flm = (self.f)(lm);
        let frm = (self.f)(rm);
        let left = simpson(a, m, fa, flm, fm);
        let right = simpson(m, b, fm, frm, fb);
        let delta = left + right - whole;
        // Richardson acceptance criterion for a halved Simpson step.
        if delta.abs() <= 15.0 * tolerance {
            return Ok(left + right + delta / 15.0);
        }
        if depth == 0 {
            return Err(Error::DepthExceeded { depth: self.budget });
        }
        let half = 0.5 * tolerance;
        Ok(self.refine(a, m, fa, flm, fm, left, half, depth - 1)?
            + self.refine(m, b, fm, frm, fb, right, half, depth - 1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn integrates_smooth_functions() {
        assert_relative_eq!(integrate(f64::sin, 0.0, PI).unwrap(), 2.0, max_relative = 1e-9);
        assert_relative_eq!(
            integrate(|x| x * x, 0.0, 1.0).unwrap(),
            1.0 / 3.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn empty_interval_is_zero() {
        assert_eq!(integrate(|x| x, 2.0, 2.0).unwrap(), 0.0);
    }

    #[test]
    fn reversed_endpoints_negate() {
        assert_relative_eq!(
            integrate(f64::cos, PI / 2.0, 0.0).unwrap(),
            -1.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn reports_depth_exhaustion() {
        let err = integrate_with(f64::sin, 0.0, PI, 1e-12, 2).unwrap_err();
        assert_eq!(err, Error::DepthExceeded { depth: 2 });
    }
}
