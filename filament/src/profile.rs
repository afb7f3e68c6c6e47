//! Matched-impedance taper profiles.
//!
//! A taper joins two transmission lines of different characteristic
//! impedance. The two laws here are the classic broadband designs:
//! Klopfenstein's optimum taper, which minimizes length for a given
//! passband reflection ripple, and Erickson's maximally flat taper, which
//! trades length for a reflection response that is maximally flat at the
//! passband edge.

use std::f64::consts::PI;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use specfun::bessel::bessel_i1;
use specfun::{quad, roots};

use crate::error::{Error, Result};

/// Speed of light in vacuum, in micrometers per second.
pub const SPEED_OF_LIGHT: f64 = 2.99792458e14;

/// Highest accepted Erickson flatness order.
///
/// The normalizing binomial overflows `f64` far above this, and no
/// practical design goes anywhere near it.
pub const MAX_ERICKSON_ORDER: u32 = 128;

/// The analytic impedance law of a taper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TaperKind {
    /// Klopfenstein's optimum taper: the shortest taper meeting a given
    /// passband reflection ripple.
    Klopfenstein {
        /// Passband reflection ripple in dB. Must be negative.
        ripple_db: f64,
    },
    /// Erickson's maximally flat taper.
    Erickson {
        /// Flatness order. Higher orders are flatter and longer.
        order: u32,
    },
}

/// A taper design request.
///
/// Normalized position `u` runs from 0 at the source end to 1 at the load
/// end. Both impedance laws carry their analytic end behavior: the load
/// end is pinned to the load impedance exactly, while the Klopfenstein law
/// keeps its characteristic small impedance steps just inside the taper
/// ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Builder)]
#[builder(pattern = "owned")]
pub struct TaperSpec {
    /// Characteristic impedance of the source-side line, in ohms.
    source_impedance: f64,
    /// Characteristic impedance of the load-side line, in ohms.
    load_impedance: f64,
    /// The impedance law to synthesize.
    kind: TaperKind,
    /// Lower edge of the taper passband, in hertz.
    cutoff_frequency: f64,
    /// Number of equal-electrical-length sections to discretize into.
    sections: usize,
}

impl TaperSpec {
    /// Creates a new [`TaperSpecBuilder`].
    pub fn builder() -> TaperSpecBuilder {
        TaperSpecBuilder::default()
    }

    /// Characteristic impedance of the source-side line, in ohms.
    pub fn source_impedance(&self) -> f64 {
        self.source_impedance
    }

    /// Characteristic impedance of the load-side line, in ohms.
    pub fn load_impedance(&self) -> f64 {
        self.load_impedance
    }

    /// The impedance law to synthesize.
    pub fn kind(&self) -> TaperKind {
        self.kind
    }

    /// Lower edge of the taper passband, in hertz.
    pub fn cutoff_frequency(&self) -> f64 {
        self.cutoff_frequency
    }

    /// Number of equal-electrical-length sections to discretize into.
    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Free-space wavelength at the cutoff frequency, in micrometers.
    pub fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT / self.cutoff_frequency
    }

    /// Checks the design parameters, failing with
    /// [`Error::InputValidation`] on the first violation.
    pub fn validate(&self) -> Result<()> {
        positive_finite(self.source_impedance, "source impedance")?;
        positive_finite(self.load_impedance, "load impedance")?;
        positive_finite(self.cutoff_frequency, "cutoff frequency")?;
        if self.source_impedance == self.load_impedance {
            return Err(Error::InputValidation(format!(
                "source and load impedance are both {} ohms; nothing to taper",
                self.source_impedance
            )));
        }
        if self.sections == 0 {
            return Err(Error::InputValidation(
                "section count must be at least 1".to_string(),
            ));
        }
        match self.kind {
            TaperKind::Klopfenstein { ripple_db } => {
                if !ripple_db.is_finite() || ripple_db >= 0.0 {
                    return Err(Error::InputValidation(format!(
                        "passband ripple must be negative dB, got {ripple_db}"
                    )));
                }
                self.klopfenstein_a(ripple_db)?;
            }
            TaperKind::Erickson { order } => {
                if order == 0 || order > MAX_ERICKSON_ORDER {
                    return Err(Error::InputValidation(format!(
                        "Erickson order must be in [1, {MAX_ERICKSON_ORDER}], got {order}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Characteristic impedance at normalized position `u` in `[0, 1]`.
    ///
    /// The exact load end `u = 1` returns the load impedance directly
    /// rather than evaluating the general formula there.
    pub fn impedance_at(&self, u: f64) -> Result<f64> {
        self.validate()?;
        self.z_at(u)
    }

    /// Total electrical length of the taper at cutoff, in micrometers of
    /// free-space propagation.
    ///
    /// The discretizer divides each section of this length by the local
    /// phase index, so the physical structure comes out shorter.
    pub fn electrical_length(&self) -> Result<f64> {
        self.validate()?;
        let lambda = self.wavelength();
        match self.kind {
            TaperKind::Klopfenstein { ripple_db } => {
                // The passband is beta * L >= A; the shortest taper takes
                // equality at the cutoff frequency.
                let a = self.klopfenstein_a(ripple_db)?;
                Ok(lambda * a / (2.0 * PI))
            }
            TaperKind::Erickson { order } => {
                // The passband opens at the first null of the reflection
                // response, which falls at the first zero of j_N.
                let zeros = roots::sph_jn_zeros(order, 1)?;
                Ok(lambda * zeros[0] / (2.0 * PI))
            }
        }
    }

    /// The impedance law sampled at `sections + 1` evenly spaced
    /// normalized positions, reversed so that index 0 is the load end.
    pub fn impedance_profile(&self) -> Result<Vec<f64>> {
        self.validate()?;
        let n = self.sections;
        let mut profile = Vec::with_capacity(n + 1);
        for i in 0..=n {
            profile.push(self.z_at(i as f64 / n as f64)?);
        }
        profile.reverse();
        Ok(profile)
    }

    fn z_at(&self, u: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&u) {
            return Err(Error::InputValidation(format!(
                "normalized position {u} outside [0, 1]"
            )));
        }
        if u == 1.0 {
            return Ok(self.load_impedance);
        }
        match self.kind {
            TaperKind::Klopfenstein { ripple_db } => self.klopfenstein_z(u, ripple_db),
            TaperKind::Erickson { order } => self.erickson_z(u, order),
        }
    }

    /// Mean log-impedance reflection coefficient `ln(Z2 / Z1) / 2`.
    fn reflection_coefficient(&self) -> f64 {
        0.5 * (self.load_impedance / self.source_impedance).ln()
    }

    /// The Klopfenstein shape parameter `A = acosh(|gamma0| / gamma_max)`.
    fn klopfenstein_a(&self, ripple_db: f64) -> Result<f64> {
        let gamma0 = self.reflection_coefficient();
        let gamma_max = 10f64.powf(ripple_db / 20.0);
        let ratio = gamma0.abs() / gamma_max;
        if ratio <= 1.0 {
            return Err(Error::InputValidation(format!(
                "ripple of {ripple_db} dB is looser than the taper's \
                 zero-frequency mismatch; acosh argument {ratio} must exceed 1"
            )));
        }
        Ok(ratio.acosh())
    }

    fn klopfenstein_z(&self, u: f64, ripple_db: f64) -> Result<f64> {
        let a = self.klopfenstein_a(ripple_db)?;
        let gamma0 = self.reflection_coefficient();
        // Z(u) = sqrt(Z1 Z2) exp(gamma0 A^2 phi(2u - 1, A) / cosh A)
        let z = 2.0 * u - 1.0;
        let phi = phi(z.abs(), a)?;
        let exponent = z.signum() * gamma0 * a * a * phi / a.cosh();
        Ok((self.source_impedance * self.load_impedance).sqrt() * exponent.exp())
    }

    fn erickson_z(&self, u: f64, order: u32) -> Result<f64> {
        // Z(u) = Z1 exp(ln(Z2 / Z1) I(u)), with I the integral over
        // [0, u] of [t (1 - t)]^N / B(N + 1, N + 1). The normalization
        // must sit inside the integrand: the raw kernel scales as 4^-N,
        // which falls below the quadrature's absolute tolerance once the
        // order reaches the teens.
        let beta = beta_symmetric(order);
        let fraction = quad::integrate(|t| (t * (1.0 - t)).powi(order as i32) / beta, 0.0, u)?;
        let log_ratio = (self.load_impedance / self.source_impedance).ln();
        Ok(self.source_impedance * (log_ratio * fraction).exp())
    }
}

/// Klopfenstein's auxiliary function
/// `phi(z, A) = integral of I1(A sqrt(1 - y^2)) / (A sqrt(1 - y^2)) dy`
/// over `[0, z]`.
///
/// The integrand extends continuously to `1/2` where its argument
/// vanishes, so the quadrature sees a smooth function over the whole
/// interval.
fn phi(z: f64, a: f64) -> Result<f64> {
    Ok(quad::integrate(
        |y| {
            let arg = a * (1.0 - y * y).max(0.0).sqrt();
            if arg < 1e-12 {
                0.5
            } else {
                bessel_i1(arg) / arg
            }
        },
        0.0,
        z,
    )?)
}

/// The symmetric beta function `B(N + 1, N + 1) = 1 / ((2N + 1) C(2N, N))`.
fn beta_symmetric(order: u32) -> f64 {
    let mut binom = 1.0f64;
    for k in 1..=order {
        binom *= (order + k) as f64 / k as f64;
    }
    1.0 / ((2 * order + 1) as f64 * binom)
}

fn positive_finite(x: f64, what: &str) -> Result<()> {
    if !x.is_finite() || x <= 0.0 {
        return Err(Error::InputValidation(format!(
            "{what} must be positive and finite, got {x}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn klop(sections: usize) -> TaperSpec {
        TaperSpec::builder()
            .source_impedance(1000.0)
            .load_impedance(50.0)
            .kind(TaperKind::Klopfenstein { ripple_db: -20.0 })
            .cutoff_frequency(2.0e9)
            .sections(sections)
            .build()
            .unwrap()
    }

    fn erickson(order: u32, sections: usize) -> TaperSpec {
        TaperSpec::builder()
            .source_impedance(50.0)
            .load_impedance(1000.0)
            .kind(TaperKind::Erickson { order })
            .cutoff_frequency(2.0e9)
            .sections(sections)
            .build()
            .unwrap()
    }

    #[test]
    fn klopfenstein_length_matches_closed_form() {
        let spec = klop(100);
        let lambda = SPEED_OF_LIGHT / 2.0e9;
        let gamma0 = 0.5 * (50.0f64 / 1000.0).ln().abs();
        let a = (gamma0 / 10f64.powf(-20.0 / 20.0)).acosh();
        assert_relative_eq!(
            spec.electrical_length().unwrap(),
            lambda * a / (2.0 * PI),
            max_relative = 1e-12
        );
    }

    #[test]
    fn erickson_length_uses_first_bessel_zero() {
        let spec = erickson(2, 10);
        let z21 = specfun::roots::sph_jn_zeros(2, 1).unwrap()[0];
        assert_relative_eq!(
            spec.electrical_length().unwrap(),
            spec.wavelength() * z21 / (2.0 * PI),
            max_relative = 1e-12
        );
    }

    #[test]
    fn load_end_is_exact() {
        assert_eq!(klop(10).impedance_at(1.0).unwrap(), 50.0);
        let spec = erickson(3, 10);
        assert_eq!(spec.impedance_at(1.0).unwrap(), 1000.0);
        assert_eq!(spec.impedance_at(0.0).unwrap(), 50.0);
    }

    #[test]
    fn klopfenstein_profile_is_monotonic_load_first() {
        let profile = klop(200).impedance_profile().unwrap();
        assert_eq!(profile.len(), 201);
        assert_eq!(profile[0], 50.0);
        for pair in profile.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        // The law keeps its end step: the source end of the taper sits
        // below the 1000 ohm feed.
        assert!(*profile.last().unwrap() < 1000.0);
    }

    #[test]
    fn erickson_profile_is_monotonic_load_first() {
        let profile = erickson(3, 150).impedance_profile().unwrap();
        assert_eq!(profile.len(), 151);
        assert_eq!(profile[0], 1000.0);
        assert_eq!(*profile.last().unwrap(), 50.0);
        for pair in profile.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn erickson_midpoint_is_the_geometric_mean() {
        // The integrand is symmetric about t = 1/2, so I(1/2) = 1/2 and
        // the midpoint impedance is the geometric mean of the two ends at
        // every order.
        for order in [2, 12, 40, MAX_ERICKSON_ORDER] {
            let z = erickson(order, 10).impedance_at(0.5).unwrap();
            assert_relative_eq!(z, (50.0f64 * 1000.0).sqrt(), max_relative = 1e-8);
        }
    }

    #[test]
    fn high_order_erickson_profile_is_monotonic_load_first() {
        // Near its ends an order-30 profile is flat to f64 resolution,
        // so strictness is only meaningful over the interior; the full
        // profile must still never rise beyond quadrature noise.
        let profile = erickson(30, 100).impedance_profile().unwrap();
        assert_eq!(profile.len(), 101);
        assert_eq!(profile[0], 1000.0);
        assert_eq!(*profile.last().unwrap(), 50.0);
        for pair in profile.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-6);
        }
        for pair in profile[20..=80].windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn large_ratios_stay_bounded() {
        for (zs, zl) in [(50.0, 1000.0), (1000.0, 50.0)] {
            for kind in [
                TaperKind::Klopfenstein { ripple_db: -20.0 },
                TaperKind::Erickson { order: 3 },
            ] {
                let spec = TaperSpec::builder()
                    .source_impedance(zs)
                    .load_impedance(zl)
                    .kind(kind)
                    .cutoff_frequency(2.0e9)
                    .sections(80)
                    .build()
                    .unwrap();
                let (lo, hi) = if zs < zl { (zs, zl) } else { (zl, zs) };
                for z in spec.impedance_profile().unwrap() {
                    assert!(z.is_finite());
                    assert!(z >= lo - 1e-9 && z <= hi + 1e-9);
                }
            }
        }
    }

    #[test]
    fn loose_ripple_is_rejected() {
        // ln(52/50)/2 is about 0.02, well under the -20 dB ripple of 0.1,
        // so no Klopfenstein taper exists.
        let spec = TaperSpec::builder()
            .source_impedance(50.0)
            .load_impedance(52.0)
            .kind(TaperKind::Klopfenstein { ripple_db: -20.0 })
            .cutoff_frequency(2.0e9)
            .sections(10)
            .build()
            .unwrap();
        assert!(matches!(spec.validate(), Err(Error::InputValidation(_))));
    }

    #[test]
    fn degenerate_parameters_are_rejected() {
        let base = klop(10);
        let mut equal = base;
        equal.load_impedance = equal.source_impedance;
        assert!(matches!(equal.validate(), Err(Error::InputValidation(_))));

        let mut no_sections = base;
        no_sections.sections = 0;
        assert!(matches!(
            no_sections.validate(),
            Err(Error::InputValidation(_))
        ));

        let mut bad_cutoff = base;
        bad_cutoff.cutoff_frequency = 0.0;
        assert!(matches!(
            bad_cutoff.validate(),
            Err(Error::InputValidation(_))
        ));

        let mut bad_order = erickson(1, 10);
        bad_order.kind = TaperKind::Erickson { order: 0 };
        assert!(matches!(
            bad_order.validate(),
            Err(Error::InputValidation(_))
        ));

        assert!(matches!(
            base.impedance_at(1.5),
            Err(Error::InputValidation(_))
        ));
    }
}
