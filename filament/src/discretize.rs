//! Discretization of taper profiles into physical sections.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::TaperSpec;
use crate::table::ImpedanceTable;

/// A taper discretized into physical layout sections.
///
/// Positions walk from the load end at 0 toward the source. Each of the
/// `sections + 1` samples pairs a running physical position with the
/// conductor width that realizes the profile impedance there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaperSections {
    positions: Vec<f64>,
    widths: Vec<f64>,
    squares: f64,
}

impl TaperSections {
    /// Running physical positions, in micrometers, starting at 0 at the
    /// load end.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Conductor widths, in micrometers, paired with
    /// [`positions`](Self::positions).
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Total physical length, in micrometers.
    pub fn length(&self) -> f64 {
        *self.positions.last().unwrap_or(&0.0)
    }

    /// Number of samples, one more than the section count.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the discretization has no samples.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Estimated number of squares of film along the taper.
    ///
    /// Reported for resistance estimation only; nothing downstream gates
    /// on this value.
    pub fn squares(&self) -> f64 {
        self.squares
    }

    /// Iterates over `(position, width)` samples.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.positions
            .iter()
            .copied()
            .zip(self.widths.iter().copied())
    }

    /// The same sections walked from the source end instead.
    pub fn reversed(&self) -> TaperSections {
        let total = self.length();
        TaperSections {
            positions: self.positions.iter().rev().map(|p| total - p).collect(),
            widths: self.widths.iter().rev().copied().collect(),
            squares: self.squares,
        }
    }
}

/// Converts a taper spec into physical sections using tabulated
/// cross-section data.
///
/// The taper's electrical length is split into `sections` equal pieces,
/// and each piece is divided by the phase index of its local cross
/// section, so electrically identical sections come out physically
/// unequal. Index 0 of the result is the load end. The square count of
/// the film is logged for resistance estimation but never enforced.
pub fn discretize(spec: &TaperSpec, table: &ImpedanceTable) -> Result<TaperSections> {
    spec.validate()?;
    let span = tracing::info_span!("discretize", sections = spec.sections());
    let _enter = span.enter();

    let profile = spec.impedance_profile()?;
    let electrical = spec.electrical_length()?;
    let dl = electrical / spec.sections() as f64;

    let mut widths = Vec::with_capacity(profile.len());
    let mut indices = Vec::with_capacity(profile.len());
    for &z in &profile {
        widths.push(table.width_for_impedance(z)?);
        indices.push(table.index_for_impedance(z)?);
    }

    let mut positions = Vec::with_capacity(profile.len());
    positions.push(0.0);
    for i in 1..profile.len() {
        positions.push(positions[i - 1] + dl / indices[i - 1]);
    }

    // Each section is keyed by its load-side sample.
    let squares: f64 = (0..profile.len() - 1)
        .map(|i| dl / (indices[i] * widths[i]))
        .sum();
    let length = *positions.last().unwrap_or(&0.0);
    tracing::info!(length, electrical, squares, "discretized taper");

    Ok(TaperSections {
        positions,
        widths,
        squares,
    })
}
