//! Error types for numerical routines.

/// A result type returning numerical errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for numerical routines.
///
/// Every variant is fatal to the computation that raised it. A failed
/// bracket or an exhausted budget means the requested quantity was never
/// computed, so callers must propagate the error rather than substitute
/// an approximation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The bracket endpoints do not straddle a sign change.
    #[error("no sign change in bracket [{a}, {b}]")]
    NoSignChange {
        /// Lower bracket endpoint.
        a: f64,
        /// Upper bracket endpoint.
        b: f64,
    },
    /// Root refinement did not converge within the iteration budget.
    #[error("root search did not converge within {limit} iterations")]
    MaxIterations {
        /// The iteration budget that was exhausted.
        limit: usize,
    },
    /// Adaptive quadrature subdivided past its depth budget without
    /// meeting the error tolerance.
    #[error("quadrature did not converge within subdivision depth {depth}")]
    DepthExceeded {
        /// The depth budget that was exhausted.
        depth: usize,
    },
}
