//! Curve flattening.
//!
//! Curves become polylines by recursive subdivision: a segment is split at
//! its midpoint until the control polygon sits within `tolerance` of the
//! chord. The tolerance is expressed in the curve's own coordinate space;
//! callers shrink it by the surrounding transform's scale so the bound holds
//! after mapping to world space.

use pathprint_core::Point2D;

/// Hard stop for pathological control polygons.
const MAX_DEPTH: u32 = 20;

/// Appends the flattened cubic Bézier from `p0` to `p3`, excluding `p0`
/// itself (the caller has already emitted it).
pub fn cubic(out: &mut Vec<Point2D>, p0: Point2D, c1: Point2D, c2: Point2D, p3: Point2D, tolerance: f64) {
    cubic_recurse(out, p0, c1, c2, p3, tolerance.max(f64::EPSILON), 0);
    out.push(p3);
}

fn cubic_recurse(
    out: &mut Vec<Point2D>,
    p0: Point2D,
    c1: Point2D,
    c2: Point2D,
    p3: Point2D,
    tolerance: f64,
    depth: u32,
) {
    if depth >= MAX_DEPTH || flat_enough(p0, c1, c2, p3, tolerance) {
        return;
    }
    // de Casteljau split at t = 1/2.
    let m01 = p0.lerp(&c1, 0.5);
    let m12 = c1.lerp(&c2, 0.5);
    let m23 = c2.lerp(&p3, 0.5);
    let m012 = m01.lerp(&m12, 0.5);
    let m123 = m12.lerp(&m23, 0.5);
    let mid = m012.lerp(&m123, 0.5);

    cubic_recurse(out, p0, m01, m012, mid, tolerance, depth + 1);
    out.push(mid);
    cubic_recurse(out, mid, m123, m23, p3, tolerance, depth + 1);
}

/// Whether both control points lie within `tolerance` of the chord. The
/// curve is contained in its control polygon's hull, so this bounds the
/// chordal deviation.
fn flat_enough(p0: Point2D, c1: Point2D, c2: Point2D, p3: Point2D, tolerance: f64) -> bool {
    distance_to_chord(c1, p0, p3) <= tolerance && distance_to_chord(c2, p0, p3) <= tolerance
}

fn distance_to_chord(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let chord = b - a;
    let len = chord.x.hypot(chord.y);
    if len < f64::EPSILON {
        return p.distance_to(&a);
    }
    ((p.x - a.x) * chord.y - (p.y - a.y) * chord.x).abs() / len
}

/// Appends the flattened quadratic Bézier from `p0` to `p2`, excluding `p0`.
/// Elevates to cubic, which shares the subdivision machinery.
pub fn quadratic(out: &mut Vec<Point2D>, p0: Point2D, c: Point2D, p2: Point2D, tolerance: f64) {
    let c1 = p0.lerp(&c, 2.0 / 3.0);
    let c2 = p2.lerp(&c, 2.0 / 3.0);
    cubic(out, p0, c1, c2, p2, tolerance);
}

/// An elliptical arc as written in path data: radii, x-axis rotation in
/// degrees, and the two choice flags.
#[derive(Debug, Clone, Copy)]
pub struct ArcParams {
    pub rx: f64,
    pub ry: f64,
    pub rotation_deg: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

/// Appends the flattened arc from `from` to `to`, excluding `from`.
///
/// Endpoint parameters are converted to a center parameterization per the
/// W3C implementation notes (F.6.5), including the radius scale-up when the
/// endpoints are too far apart for the given radii (F.6.6). A zero radius
/// degrades to a straight line; identical endpoints emit nothing.
pub fn arc(out: &mut Vec<Point2D>, from: Point2D, params: ArcParams, to: Point2D, tolerance: f64) {
    if from.distance_to(&to) < f64::EPSILON {
        return;
    }
    let mut rx = params.rx.abs();
    let mut ry = params.ry.abs();
    if rx < f64::EPSILON || ry < f64::EPSILON {
        out.push(to);
        return;
    }

    let phi = params.rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Midpoint form of the endpoints in the rotated frame.
    let dx = (from.x - to.x) / 2.0;
    let dy = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx + sin_phi * dy;
    let y1p = -sin_phi * dx + cos_phi * dy;

    // Scale the radii up when no ellipse with the requested radii can pass
    // through both endpoints.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let num = (rx * rx) * (ry * ry) - (rx * rx) * (y1p * y1p) - (ry * ry) * (x1p * x1p);
    let den = (rx * rx) * (y1p * y1p) + (ry * ry) * (x1p * x1p);
    let radicand = (num / den).max(0.0);
    let mut coeff = radicand.sqrt();
    if params.large_arc == params.sweep {
        coeff = -coeff;
    }
    let cxp = coeff * rx * y1p / ry;
    let cyp = -coeff * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

    let start_angle = angle_of((x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = angle_of((-x1p - cxp) / rx, (-y1p - cyp) / ry) - start_angle;
    if params.sweep && delta < 0.0 {
        delta += 2.0 * std::f64::consts::PI;
    } else if !params.sweep && delta > 0.0 {
        delta -= 2.0 * std::f64::consts::PI;
    }

    sample_ellipse(
        out,
        Point2D { x: cx, y: cy },
        rx,
        ry,
        phi,
        start_angle,
        delta,
        tolerance,
    );
    // Land exactly on the requested endpoint; the parameterization can be
    // off by the rounding in the center reconstruction.
    if let Some(last) = out.last_mut() {
        *last = to;
    } else {
        out.push(to);
    }
}

fn angle_of(x: f64, y: f64) -> f64 {
    y.atan2(x)
}

/// Appends points along an axis-aligned elliptical sweep around `center`
/// from `start_angle` over `delta` radians, excluding the start point. Used
/// directly for circles, ellipses and rounded-rectangle corners.
pub fn ellipse_arc(
    out: &mut Vec<Point2D>,
    center: Point2D,
    rx: f64,
    ry: f64,
    start_angle: f64,
    delta: f64,
    tolerance: f64,
) {
    sample_ellipse(out, center, rx, ry, 0.0, start_angle, delta, tolerance);
}

#[allow(clippy::too_many_arguments)]
fn sample_ellipse(
    out: &mut Vec<Point2D>,
    center: Point2D,
    rx: f64,
    ry: f64,
    phi: f64,
    start_angle: f64,
    delta: f64,
    tolerance: f64,
) {
    // Step so that the sagitta of each chord stays within tolerance:
    // s = r (1 - cos(dθ/2)) ≤ tol, bounded by the larger radius.
    let r = rx.max(ry);
    let tol = tolerance.max(f64::EPSILON).min(r);
    let max_step = 2.0 * (1.0 - tol / r).acos().max(1e-3);
    let steps = ((delta.abs() / max_step).ceil() as usize).max(1);

    let (sin_phi, cos_phi) = phi.sin_cos();
    for i in 1..=steps {
        let theta = start_angle + delta * (i as f64) / (steps as f64);
        let ex = rx * theta.cos();
        let ey = ry * theta.sin();
        out.push(Point2D {
            x: center.x + cos_phi * ex - sin_phi * ey,
            y: center.y + sin_phi * ex + cos_phi * ey,
        });
    }
}
