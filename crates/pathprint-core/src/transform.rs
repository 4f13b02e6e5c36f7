//! 2D affine transform algebra and the SVG `transform` attribute grammar.
//!
//! A transform is the usual 2×3 matrix; composition follows SVG semantics:
//! within one attribute the rightmost function is applied to points first,
//! and a child's own transform is applied before its inherited ancestor
//! transform (`world = ancestor ∘ element ∘ local`).

use crate::error::ParseError;
use crate::geometry::Point2D;
use crate::units::parse_number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Affine transform `[[a, c, e], [b, d, f]]`, mapping
/// `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub const fn identity() -> Self {
        Self::matrix(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::matrix(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self::matrix(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation around the origin, angle in degrees (SVG convention:
    /// positive angles rotate towards positive Y).
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::matrix(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation around a pivot: `translate(cx,cy) rotate(a) translate(-cx,-cy)`.
    pub fn rotation_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translation(cx, cy)
            .compose(&Self::rotation(degrees))
            .compose(&Self::translation(-cx, -cy))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::matrix(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::matrix(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Matrix product `self * rhs`: the resulting transform applies `rhs`
    /// to points first, then `self`.
    pub fn compose(&self, rhs: &Transform2D) -> Transform2D {
        Transform2D {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    pub fn apply(&self, p: Point2D) -> Point2D {
        Point2D::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Largest singular value of the linear part: how much this transform
    /// can stretch a distance. Used to carry flattening tolerances across
    /// a transform.
    pub fn max_scale(&self) -> f64 {
        // Singular values of [[a, c], [b, d]] via the eigenvalues of M^T M.
        let t = self.a * self.a + self.b * self.b + self.c * self.c + self.d * self.d;
        let det = self.a * self.d - self.b * self.c;
        let s = ((t * t / 4.0 - det * det).max(0.0)).sqrt();
        (t / 2.0 + s).max(0.0).sqrt()
    }
}

impl fmt::Display for Transform2D {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmtr,
            "matrix({},{},{},{},{},{})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// Parses a `transform` attribute list into one composed matrix.
///
/// Grammar: whitespace/comma separated function calls. Supported functions
/// are `matrix`, `translate`, `translateX`, `translateY`, `scale`, `scaleX`,
/// `scaleY`, `rotate`, `rotateZ`, `skew`, `skewX`, `skewY`, plus the CSS
/// keywords `none` (no-op) and `initial` (reset to identity). The list
/// composes in document order, so the leftmost function ends up outermost
/// (rightmost applied to points first).
pub fn parse_transform_list(raw: &str) -> Result<Transform2D, ParseError> {
    let mut result = Transform2D::identity();
    let mut rest = raw.trim_start_matches(|c: char| c.is_whitespace() || c == ',');

    while !rest.is_empty() {
        let ident_len = rest
            .find(|c: char| !(c.is_ascii_alphabetic()))
            .unwrap_or(rest.len());
        let ident = &rest[..ident_len];
        if ident.is_empty() {
            return Err(ParseError::UnknownTransformFunction(
                rest.chars().take(16).collect(),
            ));
        }
        rest = rest[ident_len..].trim_start();

        match ident.to_ascii_lowercase().as_str() {
            "none" => {}
            "initial" => result = Transform2D::identity(),
            name => {
                let Some(args_rest) = rest.strip_prefix('(') else {
                    return Err(ParseError::UnknownTransformFunction(ident.to_string()));
                };
                let close = args_rest.find(')').ok_or_else(|| {
                    ParseError::UnknownTransformFunction(ident.to_string())
                })?;
                let args = parse_arguments(&args_rest[..close])?;
                rest = &args_rest[close + 1..];
                result = result.compose(&build_function(name, &args)?);
            }
        }
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Ok(result)
}

fn parse_arguments(raw: &str) -> Result<Vec<f64>, ParseError> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(parse_number)
        .collect()
}

fn build_function(name: &str, args: &[f64]) -> Result<Transform2D, ParseError> {
    let arity = |expected: &'static str| ParseError::TransformArity {
        function: name.to_string(),
        expected,
        got: args.len(),
    };
    match name {
        "matrix" => match args {
            [a, b, c, d, e, f] => Ok(Transform2D::matrix(*a, *b, *c, *d, *e, *f)),
            _ => Err(arity("6")),
        },
        "translate" => match args {
            [tx] => Ok(Transform2D::translation(*tx, 0.0)),
            [tx, ty] => Ok(Transform2D::translation(*tx, *ty)),
            _ => Err(arity("1 or 2")),
        },
        "translatex" => match args {
            [tx] => Ok(Transform2D::translation(*tx, 0.0)),
            _ => Err(arity("1")),
        },
        "translatey" => match args {
            [ty] => Ok(Transform2D::translation(0.0, *ty)),
            _ => Err(arity("1")),
        },
        "scale" => match args {
            [s] => Ok(Transform2D::scaling(*s, *s)),
            [sx, sy] => Ok(Transform2D::scaling(*sx, *sy)),
            _ => Err(arity("1 or 2")),
        },
        "scalex" => match args {
            [sx] => Ok(Transform2D::scaling(*sx, 1.0)),
            _ => Err(arity("1")),
        },
        "scaley" => match args {
            [sy] => Ok(Transform2D::scaling(1.0, *sy)),
            _ => Err(arity("1")),
        },
        // rotateZ rotates the plane exactly like the 2D rotate.
        "rotate" | "rotatez" => match args {
            [angle] => Ok(Transform2D::rotation(*angle)),
            [angle, cx, cy] => Ok(Transform2D::rotation_about(*angle, *cx, *cy)),
            _ => Err(arity("1 or 3")),
        },
        "skew" => match args {
            [ax, ay] => Ok(Transform2D::skew_x(*ax).compose(&Transform2D::skew_y(*ay))),
            _ => Err(arity("2")),
        },
        "skewx" => match args {
            [angle] => Ok(Transform2D::skew_x(*angle)),
            _ => Err(arity("1")),
        },
        "skewy" => match args {
            [angle] => Ok(Transform2D::skew_y(*angle)),
            _ => Err(arity("1")),
        },
        other => Err(ParseError::UnknownTransformFunction(other.to_string())),
    }
}
