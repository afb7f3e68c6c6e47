//! Tabulated cross-section data and interpolated lookups.
//!
//! Taper synthesis is driven by electromagnetic solver output: a sweep of
//! characteristic impedance versus conductor width and a sweep of
//! effective relative permittivity versus conductor width. This module
//! reads those sweeps and exposes the interpolated directions synthesis
//! needs, including the inverse map from impedance back to width.

mod read;

use serde::{Deserialize, Serialize};
use splines::{Interpolation, Key, Spline};

use crate::error::{Error, Result};

pub use read::{read_samples, SweepFormat, TableFormat, XyFormat};

/// The error type for malformed or inconsistent table data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A parameter row is missing the expected `name=value` assignment.
    #[error("line {line}: expected a `{param}=` assignment")]
    MissingParameter {
        /// One-based line number of the offending row.
        line: usize,
        /// The parameter that was not found.
        param: String,
    },
    /// A token could not be parsed as a number.
    #[error("line {line}: `{token}` is not a number")]
    InvalidNumber {
        /// One-based line number of the offending row.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// A data row has fewer columns than the format requires.
    #[error("line {line}: data row has no column {column}")]
    MissingColumn {
        /// One-based line number of the offending row.
        line: usize,
        /// The zero-based column that was requested.
        column: usize,
    },
    /// The file ended in the middle of a sweep group.
    #[error("line {line}: incomplete sweep group at end of file")]
    TruncatedGroup {
        /// One-based line number of the start of the incomplete group.
        line: usize,
    },
    /// A sample series is not strictly monotonic.
    #[error("{quantity} samples are not strictly monotonic at index {index}")]
    NonMonotonic {
        /// The offending quantity.
        quantity: &'static str,
        /// Index of the first sample violating monotonicity.
        index: usize,
    },
    /// Paired sample series have different lengths.
    #[error("sample series lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the independent series.
        left: usize,
        /// Length of the dependent series.
        right: usize,
    },
    /// A series is too short to interpolate.
    #[error("interpolation requires at least {min} samples, got {got}")]
    TooFewSamples {
        /// The minimum sample count.
        min: usize,
        /// The count that was provided.
        got: usize,
    },
    /// A sample is not a finite number.
    #[error("{quantity} sample at index {index} is not finite")]
    NonFinite {
        /// The offending quantity.
        quantity: &'static str,
        /// Index of the offending sample.
        index: usize,
    },
    /// A sample that must be positive is zero or negative.
    #[error("{quantity} sample at index {index} must be positive")]
    NonPositive {
        /// The offending quantity.
        quantity: &'static str,
        /// Index of the offending sample.
        index: usize,
    },
}

/// Interpolated view of solver-tabulated cross-section data.
///
/// Linear interpolation runs between adjacent samples in four directions:
/// impedance and permittivity as functions of width, and width and phase
/// index `sqrt(eps_eff)` as functions of impedance. Monotonicity of the
/// width and impedance series is verified at construction so the inverse
/// map is single-valued. Lookups at the exact range boundaries succeed;
/// anything beyond fails with [`Error::TableRange`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpedanceTable {
    width_lo: f64,
    width_hi: f64,
    eps_width_lo: f64,
    eps_width_hi: f64,
    z_lo: f64,
    z_hi: f64,
    z_of_width: Spline<f64, f64>,
    eps_of_width: Spline<f64, f64>,
    width_of_z: Spline<f64, f64>,
    index_of_z: Spline<f64, f64>,
}

impl ImpedanceTable {
    /// Builds a table from a width/impedance sweep and a width/permittivity
    /// sweep.
    ///
    /// The sweeps may have been exported separately, but the permittivity
    /// sweep must cover every width of the impedance sweep. Widths must be
    /// strictly monotonic in each sweep and impedance strictly monotonic in
    /// width; permittivity need not be.
    pub fn from_samples(
        z_widths: &[f64],
        z_values: &[f64],
        eps_widths: &[f64],
        eps_values: &[f64],
    ) -> Result<Self> {
        check_series(z_widths, z_values, "width", "impedance")?;
        check_series(eps_widths, eps_values, "width", "permittivity")?;
        check_monotonic(z_values, "impedance")?;
        check_positive(z_widths, "width")?;
        check_positive(z_values, "impedance")?;
        check_positive(eps_values, "permittivity")?;

        let z_of_width = build_spline(z_widths, z_values);
        let eps_of_width = build_spline(eps_widths, eps_values);
        let width_of_z = build_spline(z_values, z_widths);

        let (eps_width_lo, eps_width_hi) = bounds(eps_widths);
        let mut index_values = Vec::with_capacity(z_widths.len());
        for &w in z_widths {
            if w < eps_width_lo || w > eps_width_hi {
                return Err(Error::TableRange {
                    quantity: "width",
                    requested: w,
                    lo: eps_width_lo,
                    hi: eps_width_hi,
                });
            }
            let eps = sample(&eps_of_width, w)?;
            index_values.push(eps.sqrt());
        }
        let index_of_z = build_spline(z_values, &index_values);

        let (width_lo, width_hi) = bounds(z_widths);
        let (z_lo, z_hi) = bounds(z_values);
        Ok(Self {
            width_lo,
            width_hi,
            eps_width_lo,
            eps_width_hi,
            z_lo,
            z_hi,
            z_of_width,
            eps_of_width,
            width_of_z,
            index_of_z,
        })
    }

    /// Reads the impedance and permittivity sweeps from two files.
    pub fn load(
        impedance: impl AsRef<std::path::Path>,
        impedance_format: &TableFormat,
        permittivity: impl AsRef<std::path::Path>,
        permittivity_format: &TableFormat,
    ) -> Result<Self> {
        let (zw, zv) = read::read_samples(impedance, impedance_format)?;
        let (ew, ev) = read::read_samples(permittivity, permittivity_format)?;
        tracing::debug!(
            impedance_samples = zw.len(),
            permittivity_samples = ew.len(),
            "loaded cross-section sweeps"
        );
        Self::from_samples(&zw, &zv, &ew, &ev)
    }

    /// Interpolated characteristic impedance at conductor width `width`.
    pub fn impedance_at_width(&self, width: f64) -> Result<f64> {
        lookup(&self.z_of_width, width, self.width_lo, self.width_hi, "width")
    }

    /// Interpolated effective relative permittivity at conductor width
    /// `width`.
    pub fn permittivity_at_width(&self, width: f64) -> Result<f64> {
        lookup(
            &self.eps_of_width,
            width,
            self.eps_width_lo,
            self.eps_width_hi,
            "width",
        )
    }

    /// Conductor width that realizes characteristic impedance `z`.
    pub fn width_for_impedance(&self, z: f64) -> Result<f64> {
        lookup(&self.width_of_z, z, self.z_lo, self.z_hi, "impedance")
    }

    /// Phase index `sqrt(eps_eff)` of the cross section that realizes
    /// characteristic impedance `z`.
    pub fn index_for_impedance(&self, z: f64) -> Result<f64> {
        lookup(&self.index_of_z, z, self.z_lo, self.z_hi, "impedance")
    }

    /// The tabulated conductor width range of the impedance sweep.
    pub fn width_range(&self) -> (f64, f64) {
        (self.width_lo, self.width_hi)
    }

    /// The tabulated characteristic impedance range.
    pub fn impedance_range(&self) -> (f64, f64) {
        (self.z_lo, self.z_hi)
    }
}

fn check_series(
    xs: &[f64],
    ys: &[f64],
    x_name: &'static str,
    y_name: &'static str,
) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(TableError::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        }
        .into());
    }
    if xs.len() < 2 {
        return Err(TableError::TooFewSamples {
            min: 2,
            got: xs.len(),
        }
        .into());
    }
    check_finite(xs, x_name)?;
    check_finite(ys, y_name)?;
    check_monotonic(xs, x_name)
}

fn check_finite(xs: &[f64], quantity: &'static str) -> Result<()> {
    for (i, &x) in xs.iter().enumerate() {
        if !x.is_finite() {
            return Err(TableError::NonFinite { quantity, index: i }.into());
        }
    }
    Ok(())
}

fn check_positive(xs: &[f64], quantity: &'static str) -> Result<()> {
    for (i, &x) in xs.iter().enumerate() {
        if x <= 0.0 {
            return Err(TableError::NonPositive { quantity, index: i }.into());
        }
    }
    Ok(())
}

fn check_monotonic(xs: &[f64], quantity: &'static str) -> Result<()> {
    let increasing = xs[1] > xs[0];
    for (i, pair) in xs.windows(2).enumerate() {
        let ok = if increasing {
            pair[1] > pair[0]
        } else {
            pair[1] < pair[0]
        };
        if !ok {
            return Err(TableError::NonMonotonic {
                quantity,
                index: i + 1,
            }
            .into());
        }
    }
    Ok(())
}

/// Builds an ascending-key linear spline, reversing descending series.
fn build_spline(ts: &[f64], vs: &[f64]) -> Spline<f64, f64> {
    let pairs = ts.iter().copied().zip(vs.iter().copied());
    let keys: Vec<Key<f64, f64>> = if ts[0] <= ts[ts.len() - 1] {
        pairs
            .map(|(t, v)| Key::new(t, v, Interpolation::Linear))
            .collect()
    } else {
        pairs
            .rev()
            .map(|(t, v)| Key::new(t, v, Interpolation::Linear))
            .collect()
    };
    Spline::from_vec(keys)
}

fn bounds(xs: &[f64]) -> (f64, f64) {
    let (a, b) = (xs[0], xs[xs.len() - 1]);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn lookup(
    spline: &Spline<f64, f64>,
    at: f64,
    lo: f64,
    hi: f64,
    quantity: &'static str,
) -> Result<f64> {
    if !at.is_finite() || at < lo || at > hi {
        return Err(Error::TableRange {
            quantity,
            requested: at,
            lo,
            hi,
        });
    }
    // The unclamped sampler treats the table domain as half-open, so an
    // exact hit on the upper boundary needs the clamped variant. The bounds
    // check above already rejected everything truly out of range.
    sample(spline, at)
}

fn sample(spline: &Spline<f64, f64>, at: f64) -> Result<f64> {
    spline.clamped_sample(at).ok_or(Error::Internal)
}
