//! The path `d` attribute mini-language.
//!
//! Parsing and flattening happen in one pass: curve commands go straight
//! through the subdivision in [`crate::flatten`], so the output is a list of
//! polyline subpaths in user units. Transforms and stroke construction are
//! the caller's business.

use crate::error::SvgError;
use crate::flatten::{self, ArcParams};
use pathprint_core::{lex_number, Point2D};

/// One continuous run of a path, between `M`/`m` commands (or `Z`).
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point2D>,
    pub closed: bool,
}

/// Parses a `d` attribute into flattened subpaths. `tolerance` bounds the
/// chordal deviation of curve flattening, in user units.
///
/// Unknown command letters, short parameter groups and unlexable numbers are
/// all hard errors; an empty or whitespace-only attribute yields no subpaths.
pub fn parse_path_data(d: &str, tolerance: f64) -> Result<Vec<Subpath>, SvgError> {
    let mut lexer = Lexer { src: d, pos: 0 };
    let mut builder = PathBuilder::new(tolerance);

    while let Some(command) = lexer.next_command()? {
        match command {
            'M' | 'm' => {
                let relative = command == 'm';
                let p = lexer.point(command)?;
                builder.move_to(p, relative);
                // Further coordinate pairs are implicit line-to commands.
                while lexer.at_number() {
                    let p = lexer.point(command)?;
                    builder.line_to(p, relative);
                }
            }
            'L' | 'l' => {
                let relative = command == 'l';
                loop {
                    let p = lexer.point(command)?;
                    builder.line_to(p, relative);
                    if !lexer.at_number() {
                        break;
                    }
                }
            }
            'H' | 'h' => loop {
                let v = lexer.number(command)?;
                builder.horizontal_to(v, command == 'h');
                if !lexer.at_number() {
                    break;
                }
            },
            'V' | 'v' => loop {
                let v = lexer.number(command)?;
                builder.vertical_to(v, command == 'v');
                if !lexer.at_number() {
                    break;
                }
            },
            'C' | 'c' => {
                let relative = command == 'c';
                loop {
                    let c1 = lexer.point(command)?;
                    let c2 = lexer.point(command)?;
                    let end = lexer.point(command)?;
                    builder.cubic_to(c1, c2, end, relative);
                    if !lexer.at_number() {
                        break;
                    }
                }
            }
            'S' | 's' => {
                let relative = command == 's';
                loop {
                    let c2 = lexer.point(command)?;
                    let end = lexer.point(command)?;
                    builder.smooth_cubic_to(c2, end, relative);
                    if !lexer.at_number() {
                        break;
                    }
                }
            }
            'Q' | 'q' => {
                let relative = command == 'q';
                loop {
                    let c = lexer.point(command)?;
                    let end = lexer.point(command)?;
                    builder.quadratic_to(c, end, relative);
                    if !lexer.at_number() {
                        break;
                    }
                }
            }
            'T' | 't' => {
                let relative = command == 't';
                loop {
                    let end = lexer.point(command)?;
                    builder.smooth_quadratic_to(end, relative);
                    if !lexer.at_number() {
                        break;
                    }
                }
            }
            'A' | 'a' => {
                let relative = command == 'a';
                loop {
                    let rx = lexer.number(command)?;
                    let ry = lexer.number(command)?;
                    let rotation_deg = lexer.number(command)?;
                    let large_arc = lexer.flag(command)?;
                    let sweep = lexer.flag(command)?;
                    let end = lexer.point(command)?;
                    builder.arc_to(
                        ArcParams {
                            rx,
                            ry,
                            rotation_deg,
                            large_arc,
                            sweep,
                        },
                        end,
                        relative,
                    );
                    if !lexer.at_number() {
                        break;
                    }
                }
            }
            'Z' | 'z' => builder.close(),
            other => {
                return Err(SvgError::MalformedPathData(format!(
                    "unknown path command '{other}'"
                )));
            }
        }
    }

    Ok(builder.finish())
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn skip_separators(&mut self) {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        self.pos = self.src.len() - trimmed.len();
    }

    fn next_command(&mut self) -> Result<Option<char>, SvgError> {
        self.skip_separators();
        let Some(c) = self.src[self.pos..].chars().next() else {
            return Ok(None);
        };
        if c.is_ascii_alphabetic() {
            self.pos += c.len_utf8();
            Ok(Some(c))
        } else {
            Err(SvgError::MalformedPathData(format!(
                "expected a command letter, found '{c}'"
            )))
        }
    }

    fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.src[self.pos..].chars().next(),
            Some('+' | '-' | '.' | '0'..='9')
        )
    }

    fn number(&mut self, command: char) -> Result<f64, SvgError> {
        self.skip_separators();
        match lex_number(&self.src[self.pos..]) {
            Some((value, consumed)) => {
                self.pos += consumed;
                Ok(value)
            }
            None => Err(SvgError::MalformedPathData(format!(
                "missing parameter for '{command}'"
            ))),
        }
    }

    fn point(&mut self, command: char) -> Result<Point2D, SvgError> {
        let x = self.number(command)?;
        let y = self.number(command)?;
        Ok(Point2D::new(x, y))
    }

    /// Arc flags are a single `0` or `1` digit, which may be followed
    /// immediately by the next number ("0110" is flag 0, flag 1, then 10).
    fn flag(&mut self, command: char) -> Result<bool, SvgError> {
        self.skip_separators();
        match self.src[self.pos..].chars().next() {
            Some('0') => {
                self.pos += 1;
                Ok(false)
            }
            Some('1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(SvgError::MalformedPathData(format!(
                "arc flag for '{command}' must be 0 or 1"
            ))),
        }
    }
}

struct PathBuilder {
    tolerance: f64,
    subpaths: Vec<Subpath>,
    points: Vec<Point2D>,
    current: Point2D,
    start: Point2D,
    // Previous control points, always absolute, for S/T reflection.
    prev_cubic: Point2D,
    prev_quadratic: Point2D,
}

impl PathBuilder {
    fn new(tolerance: f64) -> Self {
        let origin = Point2D::default();
        PathBuilder {
            tolerance,
            subpaths: Vec::new(),
            points: Vec::new(),
            current: origin,
            start: origin,
            prev_cubic: origin,
            prev_quadratic: origin,
        }
    }

    fn resolve(&self, p: Point2D, relative: bool) -> Point2D {
        if relative {
            self.current + p
        } else {
            p
        }
    }

    fn flush(&mut self, closed: bool) {
        if self.points.len() >= 2 {
            let points = std::mem::take(&mut self.points);
            self.subpaths.push(Subpath { points, closed });
        } else {
            self.points.clear();
        }
    }

    /// Makes sure a subpath is underway; drawing commands without a leading
    /// move start from the origin.
    fn ensure_started(&mut self) {
        if self.points.is_empty() {
            self.points.push(self.current);
            self.start = self.current;
        }
    }

    fn settle(&mut self, reset_cubic: bool, reset_quadratic: bool) {
        if reset_cubic {
            self.prev_cubic = self.current;
        }
        if reset_quadratic {
            self.prev_quadratic = self.current;
        }
    }

    fn move_to(&mut self, p: Point2D, relative: bool) {
        self.flush(false);
        self.current = self.resolve(p, relative);
        self.start = self.current;
        self.points.push(self.current);
        self.settle(true, true);
    }

    fn line_to(&mut self, p: Point2D, relative: bool) {
        self.ensure_started();
        self.current = self.resolve(p, relative);
        self.points.push(self.current);
        self.settle(true, true);
    }

    fn horizontal_to(&mut self, v: f64, relative: bool) {
        self.ensure_started();
        self.current.x = if relative { self.current.x + v } else { v };
        self.points.push(self.current);
        self.settle(true, true);
    }

    fn vertical_to(&mut self, v: f64, relative: bool) {
        self.ensure_started();
        self.current.y = if relative { self.current.y + v } else { v };
        self.points.push(self.current);
        self.settle(true, true);
    }

    fn cubic_to(&mut self, c1: Point2D, c2: Point2D, end: Point2D, relative: bool) {
        self.ensure_started();
        let c1 = self.resolve(c1, relative);
        let c2 = self.resolve(c2, relative);
        let end = self.resolve(end, relative);
        flatten::cubic(&mut self.points, self.current, c1, c2, end, self.tolerance);
        self.current = end;
        self.prev_cubic = c2;
        self.settle(false, true);
    }

    fn smooth_cubic_to(&mut self, c2: Point2D, end: Point2D, relative: bool) {
        // First handle mirrors the previous second handle around the
        // current point.
        let c1 = self.current + (self.current - self.prev_cubic);
        self.ensure_started();
        let c2 = self.resolve(c2, relative);
        let end = self.resolve(end, relative);
        flatten::cubic(&mut self.points, self.current, c1, c2, end, self.tolerance);
        self.current = end;
        self.prev_cubic = c2;
        self.settle(false, true);
    }

    fn quadratic_to(&mut self, c: Point2D, end: Point2D, relative: bool) {
        self.ensure_started();
        let c = self.resolve(c, relative);
        let end = self.resolve(end, relative);
        flatten::quadratic(&mut self.points, self.current, c, end, self.tolerance);
        self.current = end;
        self.prev_quadratic = c;
        self.settle(true, false);
    }

    fn smooth_quadratic_to(&mut self, end: Point2D, relative: bool) {
        let c = self.current + (self.current - self.prev_quadratic);
        self.ensure_started();
        let end = self.resolve(end, relative);
        flatten::quadratic(&mut self.points, self.current, c, end, self.tolerance);
        self.current = end;
        self.prev_quadratic = c;
        self.settle(true, false);
    }

    fn arc_to(&mut self, params: ArcParams, end: Point2D, relative: bool) {
        self.ensure_started();
        let end = self.resolve(end, relative);
        flatten::arc(&mut self.points, self.current, params, end, self.tolerance);
        self.current = end;
        self.settle(true, true);
    }

    fn close(&mut self) {
        self.ensure_started();
        self.current = self.start;
        self.points.push(self.current);
        self.flush(true);
        // Drawing after Z continues from the subpath start.
        self.settle(true, true);
    }

    fn finish(mut self) -> Vec<Subpath> {
        self.flush(false);
        self.subpaths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(d: &str) -> Vec<Point2D> {
        let subpaths = parse_path_data(d, 0.01).unwrap();
        assert_eq!(subpaths.len(), 1, "expected one subpath");
        subpaths.into_iter().next().unwrap().points
    }

    #[test]
    fn absolute_and_relative_lines() {
        assert_eq!(
            points("M 10 10 L 20 10 l 0 5"),
            vec![
                Point2D::new(10.0, 10.0),
                Point2D::new(20.0, 10.0),
                Point2D::new(20.0, 15.0),
            ]
        );
    }

    #[test]
    fn implicit_line_to_after_move() {
        assert_eq!(
            points("m 1 1 2 0 0 2"),
            vec![
                Point2D::new(1.0, 1.0),
                Point2D::new(3.0, 1.0),
                Point2D::new(3.0, 3.0),
            ]
        );
    }

    #[test]
    fn horizontal_vertical_and_close() {
        let subpaths = parse_path_data("M 0 0 H 10 V 5 H 0 Z", 0.01).unwrap();
        assert_eq!(subpaths.len(), 1);
        assert!(subpaths[0].closed);
        assert_eq!(
            subpaths[0].points,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 5.0),
                Point2D::new(0.0, 5.0),
                Point2D::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn multiple_subpaths() {
        let subpaths = parse_path_data("M 0 0 L 1 0 M 5 5 L 6 5", 0.01).unwrap();
        assert_eq!(subpaths.len(), 2);
        assert_eq!(subpaths[1].points[0], Point2D::new(5.0, 5.0));
    }

    #[test]
    fn smooth_cubic_reflects_handle() {
        // S after C mirrors the second handle; the joint must be smooth, so
        // the polyline should pass well above the chord on both halves.
        let pts = points("M 0 0 C 0 4 4 4 4 0 S 8 -4 8 0");
        let first_peak = pts
            .iter()
            .filter(|p| p.x < 4.0)
            .map(|p| p.y)
            .fold(f64::MIN, f64::max);
        let second_dip = pts
            .iter()
            .filter(|p| p.x > 4.0)
            .map(|p| p.y)
            .fold(f64::MAX, f64::min);
        assert!(first_peak > 2.0);
        assert!(second_dip < -2.0);
    }

    #[test]
    fn compact_arc_flags() {
        // "0 1" flags written without separation from the end coordinates.
        let subpaths = parse_path_data("M 0 0 a5 5 0 0110 0", 0.01).unwrap();
        let last = *subpaths[0].points.last().unwrap();
        assert_eq!(last, Point2D::new(10.0, 0.0));
    }

    #[test]
    fn drawing_without_move_starts_at_origin() {
        assert_eq!(
            points("L 3 4"),
            vec![Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)]
        );
    }

    #[test]
    fn short_parameter_group_is_rejected() {
        assert!(parse_path_data("M 0 0 L 1", 0.01).is_err());
        assert!(parse_path_data("M 0 0 X 1 2", 0.01).is_err());
        assert!(parse_path_data("M 0 0 A 5 5 0 2 0 10 0", 0.01).is_err());
    }

    #[test]
    fn scientific_notation_coordinates() {
        assert_eq!(
            points("M 1e1 0 L 1e-5 0"),
            vec![Point2D::new(10.0, 0.0), Point2D::new(0.00001, 0.0)]
        );
    }
}
