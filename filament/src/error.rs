//! Error types for taper synthesis and layout generation.

use std::sync::Arc;

use crate::table::TableError;

/// A result type returning filament errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for taper synthesis and layout generation.
///
/// Synthesis never substitutes defaults or clips geometry: any input or
/// intermediate state that cannot be honored exactly surfaces here.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// A design parameter is malformed or out of range.
    #[error("invalid input: {0}")]
    InputValidation(String),
    /// A numerical routine failed to converge.
    #[error("convergence failure: {0}")]
    Convergence(#[from] specfun::Error),
    /// The requested geometry cannot fit the given layout constraints.
    #[error("layout infeasible: {0}")]
    LayoutInfeasible(String),
    /// An interpolation request landed outside the tabulated range.
    #[error("{quantity} {requested} outside tabulated range [{lo}, {hi}]")]
    TableRange {
        /// The quantity being looked up.
        quantity: &'static str,
        /// The requested sample point.
        requested: f64,
        /// Lower end of the tabulated range.
        lo: f64,
        /// Upper end of the tabulated range.
        hi: f64,
    },
    /// A malformed or inconsistent table file.
    #[error(transparent)]
    Table(#[from] TableError),
    /// An I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] Arc<std::io::Error>),
    /// An internal filament error that indicates a bug in the source code.
    #[error("internal filament error")]
    Internal,
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}
