//! Serpentine folding of straight paths.
//!
//! A synthesized taper is far longer than any practical chip dimension, so
//! it is folded into a meander: straight rows spanning most of the array
//! length, joined by half-circle turns, stacked to fill the array height.
//! Folding maps each cross-sectional cut of a straight path onto the
//! serpentine by arc position, so the five boundary curves stay aligned
//! and the center-line length is preserved.

use std::f64::consts::PI;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::coords::{Boundary, Coords, Point};
use crate::error::{Error, Result};

/// Parameters describing the bounding box and row geometry of a meander.
///
/// All dimensions are in micrometers. The conductor width and gap are the
/// nominal (widest) cross-section dimensions and set the margin reserved
/// between the outermost ground curves and the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct MeanderLayoutParams {
    /// Horizontal extent of the bounding box.
    array_length: f64,
    /// Vertical extent of the bounding box.
    array_height: f64,
    /// Nominal conductor width.
    conductor_width: f64,
    /// Nominal gap between conductor edge and ground.
    gap: f64,
    /// Minimum conductor-to-conductor clearance at turns.
    min_turn_clearance: f64,
    /// Center-to-center vertical spacing of adjacent rows.
    row_height: f64,
}

/// The local position and leftward normal at one arc position along the
/// serpentine center line.
struct Frame {
    position: Point,
    normal: Point,
    in_turn: bool,
}

impl MeanderLayoutParams {
    /// Creates a builder for [`MeanderLayoutParams`].
    pub fn builder() -> MeanderLayoutParamsBuilder {
        Default::default()
    }

    /// Horizontal extent of the bounding box.
    pub fn array_length(&self) -> f64 {
        self.array_length
    }

    /// Vertical extent of the bounding box.
    pub fn array_height(&self) -> f64 {
        self.array_height
    }

    /// Nominal conductor width.
    pub fn conductor_width(&self) -> f64 {
        self.conductor_width
    }

    /// Nominal gap between conductor edge and ground.
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Minimum conductor-to-conductor clearance at turns.
    pub fn min_turn_clearance(&self) -> f64 {
        self.min_turn_clearance
    }

    /// Center-to-center vertical spacing of adjacent rows.
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Margin reserved between the outermost ground curve and the
    /// bounding box.
    pub fn margin(&self) -> f64 {
        0.5 * self.conductor_width + self.gap
    }

    /// Checks the parameters, failing with [`Error::InputValidation`] on
    /// the first violation.
    pub fn validate(&self) -> Result<()> {
        check_positive("array length", self.array_length)?;
        check_positive("array height", self.array_height)?;
        check_positive("conductor width", self.conductor_width)?;
        check_positive("row height", self.row_height)?;
        check_nonnegative("gap", self.gap)?;
        check_nonnegative("turn clearance", self.min_turn_clearance)?;
        Ok(())
    }

    /// Folds a straight path into a serpentine filling the bounding box.
    ///
    /// The input must run along `+x` with its center line on `y = 0`, as
    /// produced by [`Coords::from_samples`]. Rows read left to right on
    /// even rows and right to left on odd rows; adjacent rows connect
    /// through half-circle turns of radius `row_height / 2`.
    ///
    /// Fails with [`Error::LayoutInfeasible`] if the folded path does not
    /// fit the bounding box or a turn would violate the minimum conductor
    /// clearance. The clearance is checked against the actual conductor
    /// width of every cut that lands in a turn, not just the nominal
    /// width.
    pub fn fold(&self, coords: &Coords) -> Result<Coords> {
        self.validate()?;
        let center = coords.curve(Boundary::Center);
        if center.len() < 2 {
            return Err(Error::InputValidation(format!(
                "meander folding needs a path with at least 2 points, got {}",
                center.len()
            )));
        }
        let x0 = center[0].x;
        let mut last_x = f64::NEG_INFINITY;
        for p in center {
            if p.y != 0.0 || p.x < last_x {
                return Err(Error::InputValidation(
                    "meander folding expects a straight path along +x centered on y = 0"
                        .to_string(),
                ));
            }
            last_x = p.x;
        }

        let margin = self.margin();
        let radius = 0.5 * self.row_height;
        let straight = self.array_length - self.row_height - 2.0 * margin;
        if straight <= 0.0 {
            return Err(Error::LayoutInfeasible(format!(
                "array length {} leaves no room for straight runs after turns and margins",
                self.array_length
            )));
        }
        if self.row_height - self.conductor_width < self.min_turn_clearance {
            return Err(Error::LayoutInfeasible(format!(
                "row height {} cannot hold a {} wide conductor with {} turn clearance",
                self.row_height, self.conductor_width, self.min_turn_clearance
            )));
        }
        let period = straight + PI * radius;
        let length = coords.path_length();
        let full = (length / period).floor();
        let remainder = length - full * period;
        let rows = full as usize + 1 + usize::from(remainder > straight);
        let height = (rows - 1) as f64 * self.row_height + 2.0 * margin;
        if height > self.array_height {
            return Err(Error::LayoutInfeasible(format!(
                "{rows} rows need a height of {height}, but only {} is available",
                self.array_height
            )));
        }

        let span = tracing::info_span!("fold", rows);
        let _enter = span.enter();

        let mut folded = Coords::with_capacity(coords.section(), coords.len());
        for i in 0..coords.len() {
            let s = center[i].x - x0;
            let frame = self.frame_at(s, straight, radius);
            if frame.in_turn {
                let width = coords.width_at(i);
                if self.row_height - width < self.min_turn_clearance {
                    return Err(Error::LayoutInfeasible(format!(
                        "conductor width {width} at arc position {s} violates the {} turn clearance",
                        self.min_turn_clearance
                    )));
                }
            }
            for boundary in Boundary::ALL {
                let offset = coords.curve(boundary)[i].y;
                folded
                    .curve_mut(boundary)
                    .push(frame.position + frame.normal * offset);
            }
        }

        tracing::info!(rows, height, length, "folded meander");

        Ok(folded)
    }

    /// The serpentine frame at arc position `s` from the path start.
    ///
    /// Even rows run `+x` with the leftward normal pointing `+y`; odd
    /// rows run `-x` with the normal flipped, so lateral offsets swap
    /// sides and the curves nest correctly through the turns.
    fn frame_at(&self, s: f64, straight: f64, radius: f64) -> Frame {
        let period = straight + PI * radius;
        let row = (s / period).floor();
        let local = s - row * period;
        let y_row = row * self.row_height;
        let start = self.margin() + radius;
        let even = (row as u64) % 2 == 0;
        if local <= straight {
            if even {
                Frame {
                    position: Point::new(start + local, y_row),
                    normal: Point::new(0.0, 1.0),
                    in_turn: false,
                }
            } else {
                Frame {
                    position: Point::new(start + straight - local, y_row),
                    normal: Point::new(0.0, -1.0),
                    in_turn: false,
                }
            }
        } else {
            let theta = (local - straight) / radius;
            let (sin, cos) = theta.sin_cos();
            if even {
                // Left half-circle at the right end of the row.
                let turn = Point::new(start + straight, y_row + radius);
                Frame {
                    position: turn + Point::new(radius * sin, -radius * cos),
                    normal: Point::new(-sin, cos),
                    in_turn: true,
                }
            } else {
                // Right half-circle at the left end of the row.
                let turn = Point::new(start, y_row + radius);
                Frame {
                    position: turn + Point::new(-radius * sin, -radius * cos),
                    normal: Point::new(-sin, -cos),
                    in_turn: true,
                }
            }
        }
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InputValidation(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

fn check_nonnegative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InputValidation(format!(
            "{name} must be nonnegative and finite, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CrossSection;
    use approx::assert_relative_eq;

    fn params() -> MeanderLayoutParams {
        MeanderLayoutParams::builder()
            .array_length(120.0)
            .array_height(200.0)
            .conductor_width(1.0)
            .gap(2.0)
            .min_turn_clearance(4.0)
            .row_height(20.0)
            .build()
            .unwrap()
    }

    fn uniform_path(samples: usize, step: f64) -> Coords {
        let samples: Vec<(f64, f64)> = (0..=samples).map(|i| (i as f64 * step, 1.0)).collect();
        Coords::from_samples(&samples, CrossSection::Cpw { gap: 2.0 }).unwrap()
    }

    #[test]
    fn folds_into_stacked_rows() {
        let folded = params().fold(&uniform_path(100, 10.0)).unwrap();
        assert_eq!(folded.len(), 101);

        // 1000 um at a period of 95 + 10 pi folds into 9 rows.
        let bounds = folded.bbox().unwrap();
        assert_relative_eq!(bounds.height(), 8.0 * 20.0 + 5.0, max_relative = 1e-12);
        assert!(bounds.min.x >= -1e-9);
        assert!(bounds.max.x <= 120.0 + 1e-9);

        // The path starts at the left end of row 0.
        let center = folded.curve(Boundary::Center);
        assert_eq!(center[0], Point::new(12.5, 0.0));

        // Sample 13 sits 3.584 um into row 1, which runs right to left.
        let period = 95.0 + 10.0 * PI;
        let local = 130.0 - period;
        assert_relative_eq!(center[13].x, 107.5 - local, max_relative = 1e-12);
        assert_relative_eq!(center[13].y, 20.0, max_relative = 1e-12);
        // Odd rows flip the normal, so the left ground turns inward.
        assert_relative_eq!(
            folded.curve(Boundary::GroundLeft)[13].y,
            20.0 - 2.5,
            max_relative = 1e-12
        );
    }

    #[test]
    fn turn_frames_follow_the_arc() {
        let folded = params().fold(&uniform_path(100, 10.0)).unwrap();
        let center = folded.curve(Boundary::Center);

        // Sample 10 sits 5 um into the first turn: theta = 0.5 rad around
        // the turn center (107.5, 10).
        let (sin, cos) = 0.5_f64.sin_cos();
        assert_relative_eq!(center[10].x, 107.5 + 10.0 * sin, max_relative = 1e-12);
        assert_relative_eq!(center[10].y, 10.0 - 10.0 * cos, max_relative = 1e-12);
        let ground = folded.curve(Boundary::GroundLeft)[10];
        let expected = Point::new(center[10].x - 2.5 * sin, center[10].y + 2.5 * cos);
        assert_relative_eq!(ground.x, expected.x, max_relative = 1e-12);
        assert_relative_eq!(ground.y, expected.y, max_relative = 1e-12);
    }

    #[test]
    fn preserves_path_length() {
        let path = uniform_path(2000, 0.5);
        let folded = params().fold(&path).unwrap();
        // Chords under-measure the turn arcs slightly at this sampling.
        assert_relative_eq!(folded.path_length(), 1000.0, max_relative = 1e-3);
    }

    #[test]
    fn single_row_is_a_translation() {
        let path = uniform_path(9, 10.0);
        let folded = params().fold(&path).unwrap();
        assert_relative_eq!(folded.path_length(), 90.0, max_relative = 1e-12);
        let bounds = folded.bbox().unwrap();
        assert_relative_eq!(bounds.height(), 5.0, max_relative = 1e-12);
        for p in folded.curve(Boundary::Center) {
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn rejects_overfull_arrays() {
        let params = MeanderLayoutParams::builder()
            .array_length(120.0)
            .array_height(30.0)
            .conductor_width(1.0)
            .gap(2.0)
            .min_turn_clearance(4.0)
            .row_height(20.0)
            .build()
            .unwrap();
        assert!(matches!(
            params.fold(&uniform_path(100, 10.0)),
            Err(Error::LayoutInfeasible(_))
        ));
    }

    #[test]
    fn rejects_tight_turns() {
        let params = MeanderLayoutParams::builder()
            .array_length(120.0)
            .array_height(200.0)
            .conductor_width(1.0)
            .gap(2.0)
            .min_turn_clearance(19.5)
            .row_height(20.0)
            .build()
            .unwrap();
        assert!(matches!(
            params.fold(&uniform_path(100, 10.0)),
            Err(Error::LayoutInfeasible(_))
        ));
    }

    #[test]
    fn checks_clearance_against_actual_widths() {
        // A cut 100 um along lands in the first turn with a 17 um wide
        // conductor, leaving only 3 um of clearance.
        let samples = [(0.0, 1.0), (90.0, 1.0), (100.0, 17.0), (110.0, 17.0)];
        let path = Coords::from_samples(&samples, CrossSection::Cpw { gap: 2.0 }).unwrap();
        assert!(matches!(
            params().fold(&path),
            Err(Error::LayoutInfeasible(_))
        ));
    }

    #[test]
    fn rejects_bent_input() {
        let path = uniform_path(9, 10.0).with_pigtail(20.0, 0).unwrap();
        assert!(matches!(
            params().fold(&path),
            Err(Error::InputValidation(_))
        ));
    }

    #[test]
    fn rejects_arrays_shorter_than_one_turn() {
        let params = MeanderLayoutParams::builder()
            .array_length(25.0)
            .array_height(200.0)
            .conductor_width(1.0)
            .gap(2.0)
            .min_turn_clearance(4.0)
            .row_height(20.0)
            .build()
            .unwrap();
        assert!(matches!(
            params.fold(&uniform_path(100, 10.0)),
            Err(Error::LayoutInfeasible(_))
        ));
    }
}
