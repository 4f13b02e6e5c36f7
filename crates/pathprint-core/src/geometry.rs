//! Points, strokes, and the shared nanometre rounding policy.
//!
//! All coordinates are millimetres in document space (top-left origin, Y
//! growing downward). Rounding to the nanometre grid happens
//! in exactly two places: when a [`Stroke`] is constructed and when the
//! g-code emitter writes a coordinate. Both go through [`round_nm`] so that a
//! point that survived stroke construction can never collapse to a different
//! grid cell at emission time.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// One nanometre expressed in millimetres; the resolution of all emitted
/// coordinates.
pub const NANOMETRE: f64 = 1e-9;

/// Minimum total length of a stroke, in millimetres. Transform composition
/// leaves floating-point dust on authored-zero-length geometry; anything
/// shorter than this is dropped rather than printed as a stationary blob.
pub const MIN_STROKE_LENGTH: f64 = 1e-6;

/// Round a millimetre value to the nanometre grid (9 decimal places).
pub fn round_nm(value: f64) -> f64 {
    (value * 1e9).round() / 1e9
}

/// Format a millimetre value for g-code output: nanometre precision with
/// trailing zeros trimmed, so output stays compact.
pub fn format_mm(value: f64) -> String {
    let mut s = format!("{:.9}", round_nm(value));
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    // "-0" normalizes to "0".
    if s == "-0" {
        s.truncate(0);
        s.push('0');
    }
    s
}

/// A point in 2D world space, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Snap both coordinates to the nanometre grid.
    pub fn rounded(&self) -> Point2D {
        Point2D::new(round_nm(self.x), round_nm(self.y))
    }

    /// Linear interpolation towards `other` at parameter `t`.
    pub fn lerp(&self, other: &Point2D, t: f64) -> Point2D {
        Point2D::new(self.x + t * (other.x - self.x), self.y + t * (other.y - self.y))
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A single printable polyline with its line width, fully resolved into world
/// coordinates. Produced once by the document resolver and consumed read-only
/// by the orderer and the g-code compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// At least two points, deduplicated on the nanometre grid.
    pub points: Vec<Point2D>,
    /// Line width in millimetres. Zero means "use the configured default
    /// wall width"; the substitution happens in the g-code compiler.
    pub line_width: f64,
    /// Whether the last point joins back to the first (already materialized
    /// in `points`; this flag only records authoring intent).
    pub closed: bool,
    /// Whether this stroke came from a text glyph outline.
    pub from_text: bool,
}

impl Stroke {
    /// Builds a stroke from raw world-space points, applying the shared
    /// rounding policy: every point snaps to the nanometre grid, consecutive
    /// duplicates collapse, and a stroke whose *transformed* total length
    /// falls below [`MIN_STROKE_LENGTH`] is discarded entirely (returns
    /// `None`). Deciding on the transformed length rather than the authored
    /// one is what keeps degenerate geometry from turning into zero-length
    /// retraction churn downstream.
    pub fn from_points(
        points: impl IntoIterator<Item = Point2D>,
        line_width: f64,
        closed: bool,
        from_text: bool,
    ) -> Option<Stroke> {
        let mut deduped: Vec<Point2D> = Vec::new();
        for point in points {
            let point = point.rounded();
            if deduped.last() != Some(&point) {
                deduped.push(point);
            }
        }
        if deduped.len() < 2 {
            return None;
        }
        let stroke = Stroke {
            points: deduped,
            line_width,
            closed,
            from_text,
        };
        if stroke.total_length() < MIN_STROKE_LENGTH {
            return None;
        }
        Some(stroke)
    }

    /// Sum of segment lengths, in millimetres.
    pub fn total_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// First point of the polyline, or the origin for a stroke whose points
    /// were emptied out from under it.
    pub fn first_point(&self) -> Point2D {
        self.points.first().copied().unwrap_or_default()
    }

    /// Last point of the polyline, or the origin when empty.
    pub fn last_point(&self) -> Point2D {
        self.points.last().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_nm_snaps_to_grid() {
        assert_eq!(round_nm(1.00000000049), 1.0);
        assert_eq!(round_nm(0.1234567891), 0.123456789);
    }

    #[test]
    fn format_mm_trims_zeros() {
        assert_eq!(format_mm(10.0), "10");
        assert_eq!(format_mm(0.35), "0.35");
        assert_eq!(format_mm(-0.0000000001), "0");
    }

    #[test]
    fn stroke_drops_duplicate_points() {
        let stroke = Stroke::from_points(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(0.0, 1e-10),
                Point2D::new(5.0, 0.0),
            ],
            0.4,
            false,
            false,
        )
        .unwrap();
        assert_eq!(stroke.points.len(), 2);
    }

    #[test]
    fn endpoint_accessors_tolerate_an_emptied_stroke() {
        let stroke = Stroke {
            points: Vec::new(),
            line_width: 0.4,
            closed: false,
            from_text: false,
        };
        assert_eq!(stroke.first_point(), Point2D::default());
        assert_eq!(stroke.last_point(), Point2D::default());
    }

    #[test]
    fn near_zero_stroke_is_discarded() {
        let stroke = Stroke::from_points(
            vec![Point2D::new(1.0, 1.0), Point2D::new(1.0, 1.0 + 1e-8)],
            0.4,
            false,
            false,
        );
        assert!(stroke.is_none());
    }
}
