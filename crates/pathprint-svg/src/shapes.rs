//! Geometry builders for the basic shape elements.
//!
//! These work on already-resolved numbers (the resolver converts attribute
//! lengths first) and produce subpaths in user units, sharing the polyline
//! representation with the path parser.

use crate::error::SvgError;
use crate::flatten;
use crate::path_data::Subpath;
use pathprint_core::{parse_number, Point2D};
use std::f64::consts::{FRAC_PI_2, PI};

/// A rectangle outline, clockwise from the top-left corner area. Rounded
/// corners become quarter elliptical arcs. `rx`/`ry` mirror each other when
/// only one is given and clamp to half the width/height. A rectangle without
/// area yields nothing.
pub fn rect(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rx: Option<f64>,
    ry: Option<f64>,
    tolerance: f64,
) -> Option<Subpath> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let (rx, ry) = match (rx, ry) {
        (None, None) => (0.0, 0.0),
        (Some(rx), None) => (rx, rx),
        (None, Some(ry)) => (ry, ry),
        (Some(rx), Some(ry)) => (rx, ry),
    };
    let rx = rx.max(0.0).min(width / 2.0);
    let ry = ry.max(0.0).min(height / 2.0);
    let rounded = rx > 0.0 && ry > 0.0;

    let mut points = vec![Point2D::new(x + rx, y)];
    points.push(Point2D::new(x + width - rx, y));
    if rounded {
        // Corner centers sit inset by (rx, ry); each corner sweeps a quarter
        // turn in the y-down orientation of the drawing.
        flatten::ellipse_arc(
            &mut points,
            Point2D::new(x + width - rx, y + ry),
            rx,
            ry,
            -FRAC_PI_2,
            FRAC_PI_2,
            tolerance,
        );
    }
    points.push(Point2D::new(x + width, y + height - ry));
    if rounded {
        flatten::ellipse_arc(
            &mut points,
            Point2D::new(x + width - rx, y + height - ry),
            rx,
            ry,
            0.0,
            FRAC_PI_2,
            tolerance,
        );
    }
    points.push(Point2D::new(x + rx, y + height));
    if rounded {
        flatten::ellipse_arc(
            &mut points,
            Point2D::new(x + rx, y + height - ry),
            rx,
            ry,
            FRAC_PI_2,
            FRAC_PI_2,
            tolerance,
        );
    }
    points.push(Point2D::new(x, y + ry));
    if rounded {
        flatten::ellipse_arc(
            &mut points,
            Point2D::new(x + rx, y + ry),
            rx,
            ry,
            PI,
            FRAC_PI_2,
            tolerance,
        );
    }
    // Close back onto the start corner unless the outline already landed
    // there (the sharp-cornered case ends exactly on its first point).
    if points.last() != Some(&points[0]) {
        let start = points[0];
        points.push(start);
    }
    Some(Subpath {
        points,
        closed: true,
    })
}

/// A full circle starting at the rightmost point. Zero radius yields nothing.
pub fn circle(cx: f64, cy: f64, r: f64, tolerance: f64) -> Option<Subpath> {
    ellipse(cx, cy, r, r, tolerance)
}

/// A full ellipse starting at the rightmost point. Either radius at zero
/// yields nothing.
pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64, tolerance: f64) -> Option<Subpath> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let start = Point2D::new(cx + rx, cy);
    let mut points = vec![start];
    flatten::ellipse_arc(&mut points, Point2D::new(cx, cy), rx, ry, 0.0, -2.0 * PI, tolerance);
    // Close exactly on the start point rather than on sin(2π) noise.
    if let Some(last) = points.last_mut() {
        *last = start;
    }
    Some(Subpath {
        points,
        closed: true,
    })
}

/// A single straight segment.
pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Subpath {
    Subpath {
        points: vec![Point2D::new(x1, y1), Point2D::new(x2, y2)],
        closed: false,
    }
}

/// An open run of vertices from a `points` attribute.
pub fn polyline(points: Vec<Point2D>) -> Option<Subpath> {
    if points.len() < 2 {
        return None;
    }
    Some(Subpath {
        points,
        closed: false,
    })
}

/// A closed run of vertices; the first vertex is appended again at the end.
pub fn polygon(mut points: Vec<Point2D>) -> Option<Subpath> {
    if points.len() < 2 {
        return None;
    }
    let first = points[0];
    points.push(first);
    Some(Subpath {
        points,
        closed: true,
    })
}

/// Parses a polyline/polygon `points` attribute. Coordinates are separated
/// by whitespace or commas; a dangling unpaired coordinate is dropped.
pub fn parse_points(raw: &str) -> Result<Vec<Point2D>, SvgError> {
    let mut coords = Vec::new();
    for token in raw.split([' ', '\t', '\n', '\r', ',']).filter(|t| !t.is_empty()) {
        coords.push(parse_number(token)?);
    }
    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point2D::new(pair[0], pair[1]))
        .collect())
}
