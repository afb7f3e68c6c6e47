//! Port extraction from boundary curves.
//!
//! Every generated path exposes two ports, one per end, for stitching
//! tapers, meanders, and external feeds together during chip assembly.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::coords::{Boundary, Coords, Point};
use crate::error::{Error, Result};

/// A connection point at one end of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// The port name.
    pub name: ArcStr,
    /// The center of the port, on the conductor center line.
    pub center: Point,
    /// The conductor width at the port, in micrometers.
    pub width: f64,
    /// The outward unit direction, pointing away from the path.
    pub direction: Point,
}

impl Coords {
    /// Extracts the two end ports of the path.
    ///
    /// Port `e1` sits at the first cut and `e2` at the last. Both
    /// directions point outward, away from the path, so mating two paths
    /// means aligning ports with opposite directions.
    pub fn ports(&self) -> Result<(Port, Port)> {
        let center = self.curve(Boundary::Center);
        let n = center.len();
        if n < 2 {
            return Err(Error::InputValidation(format!(
                "port extraction needs a path with at least 2 points, got {n}"
            )));
        }
        let start = (center[0] - center[1])
            .normalized()
            .ok_or_else(|| Error::InputValidation("first two path points coincide".to_string()))?;
        let end = (center[n - 1] - center[n - 2])
            .normalized()
            .ok_or_else(|| Error::InputValidation("last two path points coincide".to_string()))?;
        let e1 = Port {
            name: arcstr::literal!("e1"),
            center: center[0],
            width: self.width_at(0),
            direction: start,
        };
        let e2 = Port {
            name: arcstr::literal!("e2"),
            center: center[n - 1],
            width: self.width_at(n - 1),
            direction: end,
        };
        Ok((e1, e2))
    }
}
