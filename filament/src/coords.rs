//! Boundary-curve coordinate generation.
//!
//! A synthesized taper or meander is handed off as five parallel curves:
//! the conductor center line, the two conductor edges, and the two ground
//! edges. Downstream polygon emitters pair adjacent curves to form the
//! etch and ground regions, which only works while all five curves stay
//! point-for-point aligned. Everything in this module preserves that
//! alignment.

use std::f64::consts::FRAC_PI_2;

use array_map::{ArrayMap, Indexable};
use serde::{Deserialize, Serialize};

use crate::discretize::TaperSections;
use crate::error::{Error, Result};

/// Arc samples appended per pigtail quarter turn.
const PIGTAIL_POINTS: usize = 32;

/// A point in the layout plane, in micrometers.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Point {
    /// The x coordinate.
    pub x: f64,
    /// The y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new [`Point`] from (x, y) coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// The Euclidean distance to `other`.
    pub fn distance_to(&self, other: Point) -> f64 {
        (*self - other).norm()
    }

    /// The Euclidean length of `self` as a vector from the origin.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// The dot product with `other`.
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The left-hand perpendicular, `self` rotated 90 degrees
    /// counterclockwise.
    pub fn perp(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// The unit vector along `self`, or [`None`] for a zero-length vector.
    pub fn normalized(&self) -> Option<Point> {
        let n = self.norm();
        if n == 0.0 {
            None
        } else {
            Some(Point::new(self.x / n, self.y / n))
        }
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// An enumeration of the five boundary curves, left to right relative to
/// the direction of travel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Boundary {
    /// Inner edge of the left ground plane.
    GroundLeft,
    /// Left edge of the conductor.
    EdgeLeft,
    /// Center line of the conductor.
    Center,
    /// Right edge of the conductor.
    EdgeRight,
    /// Inner edge of the right ground plane.
    GroundRight,
}

impl Boundary {
    /// All five boundaries, left to right.
    pub const ALL: [Boundary; 5] = [
        Boundary::GroundLeft,
        Boundary::EdgeLeft,
        Boundary::Center,
        Boundary::EdgeRight,
        Boundary::GroundRight,
    ];
}

/// An association of a value of type `T` with each [`Boundary`].
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq)]
pub struct Curves<T> {
    inner: ArrayMap<Boundary, T, 5>,
}

impl<T> Curves<T>
where
    T: Copy,
{
    /// Creates a new [`Curves`] with `value` associated with every
    /// boundary.
    pub const fn uniform(value: T) -> Self {
        Self {
            inner: ArrayMap::new([value; 5]),
        }
    }
}

impl<T> Curves<T> {
    /// Creates a new [`Curves`] with the provided value for each boundary.
    pub const fn new(
        ground_left: T,
        edge_left: T,
        center: T,
        edge_right: T,
        ground_right: T,
    ) -> Self {
        // IMPORTANT: the ordering of array elements here must match
        // the ordering of variants in the [`Boundary`] enum.
        Self {
            inner: ArrayMap::new([ground_left, edge_left, center, edge_right, ground_right]),
        }
    }

    /// Maps a function over each boundary's value, returning a new
    /// [`Curves`].
    pub fn map<B>(self, f: impl FnMut(&Boundary, T) -> B) -> Curves<B> {
        Curves {
            inner: self.inner.map(f),
        }
    }
}

impl<T> std::ops::Index<Boundary> for Curves<T> {
    type Output = T;
    fn index(&self, index: Boundary) -> &Self::Output {
        self.inner.index(index)
    }
}

impl<T> std::ops::IndexMut<Boundary> for Curves<T> {
    fn index_mut(&mut self, index: Boundary) -> &mut Self::Output {
        self.inner.index_mut(index)
    }
}

/// The transverse conductor arrangement swept along a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CrossSection {
    /// Coplanar waveguide: a center conductor flanked by in-plane ground
    /// planes across a fixed gap.
    Cpw {
        /// Gap between each conductor edge and its ground plane, in
        /// micrometers.
        gap: f64,
    },
    /// Microstrip: a bare conductor over a ground plane below.
    Microstrip,
}

impl CrossSection {
    /// Signed lateral offsets of the five boundary curves for a conductor
    /// of width `width`, positive to the left of the direction of travel.
    ///
    /// Microstrip has no in-plane grounds; its ground curves coincide with
    /// the conductor edges so that every cross section yields the same
    /// five aligned curves.
    pub fn offsets(&self, width: f64) -> Curves<f64> {
        let half = 0.5 * width;
        let ground = match *self {
            CrossSection::Cpw { gap } => half + gap,
            CrossSection::Microstrip => half,
        };
        Curves::new(ground, half, 0.0, -half, -ground)
    }

    /// Checks the cross-section parameters, failing with
    /// [`Error::InputValidation`] on the first violation.
    pub fn validate(&self) -> Result<()> {
        if let CrossSection::Cpw { gap } = *self {
            if !gap.is_finite() || gap <= 0.0 {
                return Err(Error::InputValidation(format!(
                    "CPW gap must be positive and finite, got {gap}"
                )));
            }
        }
        Ok(())
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// The lower-left corner.
    pub min: Point,
    /// The upper-right corner.
    pub max: Point,
}

impl Bounds {
    /// The horizontal extent.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// The vertical extent.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// The five boundary curves of a path swept with a common cross section.
///
/// All five curves always hold the same number of points: the i-th point
/// of each curve describes the same cross-sectional cut through the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    section: CrossSection,
    ground_left: Vec<Point>,
    edge_left: Vec<Point>,
    center: Vec<Point>,
    edge_right: Vec<Point>,
    ground_right: Vec<Point>,
}

impl Coords {
    pub(crate) fn with_capacity(section: CrossSection, capacity: usize) -> Self {
        Self {
            section,
            ground_left: Vec::with_capacity(capacity),
            edge_left: Vec::with_capacity(capacity),
            center: Vec::with_capacity(capacity),
            edge_right: Vec::with_capacity(capacity),
            ground_right: Vec::with_capacity(capacity),
        }
    }

    /// Sweeps `section` along the x axis through `(position, width)`
    /// samples.
    ///
    /// Positions must be finite and non-decreasing, widths positive. The
    /// result is a straight path along `+x`, centered on `y = 0`,
    /// starting at the first sample.
    pub fn from_samples(samples: &[(f64, f64)], section: CrossSection) -> Result<Self> {
        section.validate()?;
        if samples.len() < 2 {
            return Err(Error::InputValidation(format!(
                "a path needs at least 2 samples, got {}",
                samples.len()
            )));
        }
        let mut coords = Self::with_capacity(section, samples.len());
        let mut last_x = f64::NEG_INFINITY;
        for &(x, width) in samples {
            if !x.is_finite() || x < last_x {
                return Err(Error::InputValidation(format!(
                    "positions must be finite and non-decreasing, got {x} after {last_x}"
                )));
            }
            if !width.is_finite() || width <= 0.0 {
                return Err(Error::InputValidation(format!(
                    "conductor width must be positive and finite, got {width}"
                )));
            }
            last_x = x;
            let offsets = section.offsets(width);
            for boundary in Boundary::ALL {
                coords
                    .curve_mut(boundary)
                    .push(Point::new(x, offsets[boundary]));
            }
        }
        Ok(coords)
    }

    /// Sweeps `section` along a discretized taper.
    ///
    /// Sample 0 of [`TaperSections`] is the load end, so the path starts
    /// at the load and runs toward the source.
    pub fn from_sections(taper: &TaperSections, section: CrossSection) -> Result<Self> {
        let samples: Vec<(f64, f64)> = taper.samples().collect();
        Self::from_samples(&samples, section)
    }

    /// The cross section swept along the path.
    pub fn section(&self) -> CrossSection {
        self.section
    }

    /// The points of one boundary curve.
    pub fn curve(&self, boundary: Boundary) -> &[Point] {
        match boundary {
            Boundary::GroundLeft => &self.ground_left,
            Boundary::EdgeLeft => &self.edge_left,
            Boundary::Center => &self.center,
            Boundary::EdgeRight => &self.edge_right,
            Boundary::GroundRight => &self.ground_right,
        }
    }

    pub(crate) fn curve_mut(&mut self, boundary: Boundary) -> &mut Vec<Point> {
        match boundary {
            Boundary::GroundLeft => &mut self.ground_left,
            Boundary::EdgeLeft => &mut self.edge_left,
            Boundary::Center => &mut self.center,
            Boundary::EdgeRight => &mut self.edge_right,
            Boundary::GroundRight => &mut self.ground_right,
        }
    }

    /// The number of cross-sectional cuts along the path.
    pub fn len(&self) -> usize {
        self.center.len()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }

    /// The conductor width at cut `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn width_at(&self, i: usize) -> f64 {
        self.edge_left[i].distance_to(self.edge_right[i])
    }

    /// The arc length of the center curve.
    pub fn path_length(&self) -> f64 {
        // Must stay function-scoped: with `Itertools` visible at module
        // scope, the iterator impls expanded by `derive(Indexable)` on
        // [`Boundary`] resolve their `get` calls to `Itertools::get`
        // instead of the generated inherent method and fail to compile.
        use itertools::Itertools;
        self.center
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.distance_to(*b))
            .sum()
    }

    /// The bounding box of all five curves, or [`None`] for an empty
    /// path.
    pub fn bbox(&self) -> Option<Bounds> {
        let mut points = Boundary::ALL.iter().flat_map(|b| self.curve(*b).iter());
        let first = *points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Bounds { min, max })
    }

    /// Appends a quarter-turn pigtail arc at the end of the path.
    ///
    /// The arc turns left after an even meander row and right after an odd
    /// one, so the pigtails of consecutive rows mirror each other. The
    /// bend radius applies to the center curve; every other curve keeps
    /// its lateral offset through the turn, so the radius must exceed the
    /// outermost offset of the final cut.
    pub fn with_pigtail(mut self, radius: f64, row: usize) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InputValidation(format!(
                "pigtail radius must be positive and finite, got {radius}"
            )));
        }
        let n = self.len();
        if n < 2 {
            return Err(Error::InputValidation(
                "a pigtail needs a path with at least 2 points".to_string(),
            ));
        }
        let end = self.center[n - 1];
        let tangent = (end - self.center[n - 2]).normalized().ok_or_else(|| {
            Error::InputValidation(
                "path end has no direction; its last two points coincide".to_string(),
            )
        })?;
        let normal = tangent.perp();
        // Recover each curve's lateral offset at the final cut.
        let offsets = Curves::new(
            normal.dot(self.ground_left[n - 1] - end),
            normal.dot(self.edge_left[n - 1] - end),
            0.0,
            normal.dot(self.edge_right[n - 1] - end),
            normal.dot(self.ground_right[n - 1] - end),
        );
        let outermost = offsets[Boundary::GroundLeft]
            .abs()
            .max(offsets[Boundary::GroundRight].abs());
        if radius <= outermost {
            return Err(Error::InputValidation(format!(
                "pigtail radius {radius} must exceed the outermost lateral offset {outermost}"
            )));
        }
        let ccw = row % 2 == 0;
        let pivot = if ccw {
            end + normal * radius
        } else {
            end - normal * radius
        };
        for step in 1..=PIGTAIL_POINTS {
            let theta = FRAC_PI_2 * step as f64 / PIGTAIL_POINTS as f64;
            for boundary in Boundary::ALL {
                let offset = offsets[boundary];
                let point = if ccw {
                    let r = radius - offset;
                    pivot + tangent * (r * theta.sin()) - normal * (r * theta.cos())
                } else {
                    let r = radius + offset;
                    pivot + tangent * (r * theta.sin()) + normal * (r * theta.cos())
                };
                self.curve_mut(boundary).push(point);
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight(section: CrossSection) -> Coords {
        let samples: Vec<(f64, f64)> = (0..=10)
            .map(|i| (i as f64 * 5.0, 1.0 + 0.1 * i as f64))
            .collect();
        Coords::from_samples(&samples, section).unwrap()
    }

    #[test]
    fn point_arithmetic() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.norm(), 5.0);
        assert_eq!(p.perp(), Point::new(-4.0, 3.0));
        assert_eq!(Point::zero().distance_to(p), 5.0);
        assert_eq!((p - p).normalized(), None);
        assert_relative_eq!(p.normalized().unwrap().norm(), 1.0, max_relative = 1e-12);
        assert_eq!(Point::new(1.0, 2.0) + Point::new(3.0, -1.0), Point::new(4.0, 1.0));
        assert_eq!(Point::new(2.0, 3.0) * 2.0, Point::new(4.0, 6.0));
    }

    #[test]
    fn curves_index_by_boundary() {
        let curves = Curves::new(2.5, 1.0, 0.0, -1.0, -2.5);
        assert_eq!(curves[Boundary::GroundLeft], 2.5);
        assert_eq!(curves[Boundary::Center], 0.0);
        let doubled = curves.map(|_, v| v * 2.0);
        assert_eq!(doubled[Boundary::GroundRight], -5.0);
        assert_eq!(Curves::uniform(1.0)[Boundary::EdgeLeft], 1.0);
    }

    #[test]
    fn five_curves_stay_parallel() {
        for section in [CrossSection::Cpw { gap: 2.0 }, CrossSection::Microstrip] {
            let coords = straight(section);
            assert_eq!(coords.len(), 11);
            for boundary in Boundary::ALL {
                assert_eq!(coords.curve(boundary).len(), coords.len());
            }
        }
    }

    #[test]
    fn cpw_grounds_sit_beyond_the_gap() {
        let coords = straight(CrossSection::Cpw { gap: 2.0 });
        let i = 4;
        let half = (1.0 + 0.1 * i as f64) / 2.0;
        assert_eq!(coords.curve(Boundary::Center)[i].y, 0.0);
        assert_relative_eq!(coords.curve(Boundary::EdgeLeft)[i].y, half);
        assert_relative_eq!(coords.curve(Boundary::GroundLeft)[i].y, half + 2.0);
        assert_relative_eq!(coords.curve(Boundary::GroundRight)[i].y, -half - 2.0);
        assert_relative_eq!(coords.width_at(i), 2.0 * half, max_relative = 1e-12);
    }

    #[test]
    fn microstrip_grounds_follow_the_edges() {
        let coords = straight(CrossSection::Microstrip);
        for i in 0..coords.len() {
            assert_eq!(
                coords.curve(Boundary::GroundLeft)[i],
                coords.curve(Boundary::EdgeLeft)[i]
            );
            assert_eq!(
                coords.curve(Boundary::GroundRight)[i],
                coords.curve(Boundary::EdgeRight)[i]
            );
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = straight(CrossSection::Cpw { gap: 2.0 });
        let b = straight(CrossSection::Cpw { gap: 2.0 });
        assert_eq!(a, b);
    }

    #[test]
    fn path_length_sums_center_segments() {
        let coords = straight(CrossSection::Microstrip);
        assert_relative_eq!(coords.path_length(), 50.0, max_relative = 1e-12);
    }

    #[test]
    fn bbox_covers_all_curves() {
        let coords = straight(CrossSection::Cpw { gap: 2.0 });
        let bounds = coords.bbox().unwrap();
        assert_eq!(bounds.min.x, 0.0);
        assert_eq!(bounds.max.x, 50.0);
        // The widest cut is the final one: w = 2, ground offset 3.
        assert_relative_eq!(bounds.max.y, 3.0, max_relative = 1e-12);
        assert_relative_eq!(bounds.min.y, -3.0, max_relative = 1e-12);
        assert_relative_eq!(bounds.height(), 6.0, max_relative = 1e-12);
        assert_relative_eq!(bounds.width(), 50.0, max_relative = 1e-12);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let microstrip = CrossSection::Microstrip;
        assert!(matches!(
            Coords::from_samples(&[(0.0, 1.0)], microstrip),
            Err(Error::InputValidation(_))
        ));
        assert!(matches!(
            Coords::from_samples(&[(0.0, 1.0), (-1.0, 1.0)], microstrip),
            Err(Error::InputValidation(_))
        ));
        assert!(matches!(
            Coords::from_samples(&[(0.0, 0.0), (1.0, 1.0)], microstrip),
            Err(Error::InputValidation(_))
        ));
        assert!(matches!(
            Coords::from_samples(&[(0.0, 1.0), (1.0, 1.0)], CrossSection::Cpw { gap: 0.0 }),
            Err(Error::InputValidation(_))
        ));
    }

    #[test]
    fn pigtail_turns_left_after_even_rows() {
        let coords = straight(CrossSection::Cpw { gap: 2.0 })
            .with_pigtail(20.0, 0)
            .unwrap();
        assert_eq!(coords.len(), 11 + 32);
        for boundary in Boundary::ALL {
            assert_eq!(coords.curve(boundary).len(), coords.len());
        }
        // A left quarter turn from (50, 0) heading +x ends at (70, 20).
        let last = *coords.curve(Boundary::Center).last().unwrap();
        assert_relative_eq!(last.x, 70.0, max_relative = 1e-9);
        assert_relative_eq!(last.y, 20.0, max_relative = 1e-9);
        // The ground curve inside the turn keeps its 3 um offset.
        let ground = *coords.curve(Boundary::GroundLeft).last().unwrap();
        assert_relative_eq!(ground.distance_to(Point::new(50.0, 20.0)), 17.0, max_relative = 1e-9);
    }

    #[test]
    fn pigtail_turns_right_after_odd_rows() {
        let coords = straight(CrossSection::Cpw { gap: 2.0 })
            .with_pigtail(20.0, 1)
            .unwrap();
        let last = *coords.curve(Boundary::Center).last().unwrap();
        assert_relative_eq!(last.x, 70.0, max_relative = 1e-9);
        assert_relative_eq!(last.y, -20.0, max_relative = 1e-9);
    }

    #[test]
    fn pigtail_radius_must_clear_the_grounds() {
        // Final cut: w = 2, gap = 2, outermost offset 3.
        let err = straight(CrossSection::Cpw { gap: 2.0 })
            .with_pigtail(2.9, 0)
            .unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
    }
}
