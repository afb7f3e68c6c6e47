//! Parametric layout synthesis for superconducting nanowire devices.
//!
//! `filament` turns an impedance-matching taper specification into chip
//! geometry. An analytic impedance profile (Klopfenstein or Erickson) is
//! discretized against tabulated transmission-line cross sections into a
//! sequence of constant-width sections, swept into five boundary curves,
//! and folded into a meander that fits a bounding box.

#![warn(missing_docs)]

pub mod coords;
pub mod discretize;
pub mod error;
pub mod meander;
pub mod ports;
pub mod prelude;
pub mod profile;
pub mod table;

pub use error::{Error, Result};

use coords::{Coords, CrossSection};
use profile::TaperSpec;
use table::ImpedanceTable;

/// Synthesizes the boundary curves of a taper in one call.
///
/// Evaluates the impedance profile of `spec`, discretizes it against
/// `table`, and sweeps `section` along the result. The returned path
/// starts at the load end and runs straight along `+x`; fold it with
/// [`meander::MeanderLayoutParams::fold`] and terminate it with
/// [`Coords::with_pigtail`] as needed.
pub fn synthesize(
    spec: &TaperSpec,
    table: &ImpedanceTable,
    section: CrossSection,
) -> Result<Coords> {
    let span = tracing::info_span!("synthesize", kind = ?spec.kind());
    let _enter = span.enter();
    let sections = discretize::discretize(spec, table)?;
    Coords::from_sections(&sections, section)
}
