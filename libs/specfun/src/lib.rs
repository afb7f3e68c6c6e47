//! Special functions and scalar numerics for transmission-line taper
//! synthesis.
//!
//! The crate collects the handful of numerical routines that matched-taper
//! design keeps reaching for: spherical Bessel functions and tables of
//! their zeros, the modified Bessel function `I_1`, bracketed root finding,
//! and adaptive quadrature. Everything operates on `f64` scalars and fails
//! loudly through [`Error`] when a bracket or convergence budget is
//! exhausted.
#![warn(missing_docs)]

pub mod bessel;
pub mod error;
pub mod quad;
pub mod roots;

pub use error::{Error, Result};
