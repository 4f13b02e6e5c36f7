//! CSS length and number parsing, resolved against the document viewport.
//!
//! The number grammar is the standard floating-point lexical grammar with an
//! optional exponent; the exponent's `e` must not be confused with a unit
//! suffix, so `1e-5` is one number and `1empty` is a number followed by the
//! (unknown) suffix `empty`.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// Which viewport dimension a length resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    /// Percentages on diagonal lengths resolve against
    /// `sqrt(vw² + vh²) / sqrt(2)` per the CSS/SVG rules.
    Diagonal,
}

/// The resolved document viewport: physical size in millimetres plus the
/// user-unit scale derived from the `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Physical width of the image, in millimetres.
    pub width: f64,
    /// Physical height of the image, in millimetres.
    pub height: f64,
    /// Millimetres per user unit along X (`width / viewBox width`).
    pub unit_w: f64,
    /// Millimetres per user unit along Y (`height / viewBox height`).
    pub unit_h: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, viewbox_w: f64, viewbox_h: f64) -> Self {
        Self {
            width,
            height,
            unit_w: if viewbox_w > 0.0 { width / viewbox_w } else { 1.0 },
            unit_h: if viewbox_h > 0.0 { height / viewbox_h } else { 1.0 },
        }
    }

    /// A viewport whose user units are already millimetres.
    pub fn mm(width: f64, height: f64) -> Self {
        Self::new(width, height, width, height)
    }

    fn percent_base(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Diagonal => (self.width.hypot(self.height)) / std::f64::consts::SQRT_2,
        }
    }

    /// Millimetres per user unit for the given axis.
    pub fn unit_scale(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.unit_w,
            Axis::Y => self.unit_h,
            Axis::Diagonal => self.unit_w.hypot(self.unit_h) / std::f64::consts::SQRT_2,
        }
    }
}

/// Lexes a floating-point number prefix; returns the value and how many
/// bytes it consumed. Exposed for the path-data tokenizer, which interleaves
/// numbers with single-letter commands.
pub fn lex_number(raw: &str) -> Option<(f64, usize)> {
    let bytes = raw.as_bytes();
    let mut pos = 0;

    if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        pos += 1;
    }
    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;
    let mut frac_digits = 0;
    if pos < bytes.len() && bytes[pos] == b'.' {
        frac_digits = count_digits(&bytes[pos + 1..]);
        if int_digits + frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // Exponent: only consumed if a complete `e[+-]digits` follows.
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_pos = pos + 1;
        if exp_pos < bytes.len() && (bytes[exp_pos] == b'+' || bytes[exp_pos] == b'-') {
            exp_pos += 1;
        }
        let exp_digits = count_digits(&bytes[exp_pos..]);
        if exp_digits > 0 {
            pos = exp_pos + exp_digits;
        }
    }

    raw[..pos].parse::<f64>().ok().map(|value| (value, pos))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parses a string that must be exactly one number (no unit suffix).
pub fn parse_number(raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    match lex_number(trimmed) {
        Some((value, len)) if len == trimmed.len() => Ok(value),
        _ => Err(ParseError::MalformedNumber(raw.to_string())),
    }
}

/// Parses a CSS length, returning millimetres.
///
/// Absolute units convert directly (`px` assumes 96 dpi); `%` and the
/// viewport units resolve against the physical viewport size; unitless
/// values are user units and map through the viewport's unit scale for the
/// given axis.
pub fn parse_length(raw: &str, axis: Axis, viewport: &Viewport) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    let (number, consumed) =
        lex_number(trimmed).ok_or_else(|| ParseError::MalformedNumber(raw.to_string()))?;
    let unit = trimmed[consumed..].trim().to_ascii_lowercase();

    let mm = match unit.as_str() {
        "mm" => number,
        "cm" => number * 10.0,
        "q" => number / 4.0,
        "in" => number * 25.4,
        "pc" => number * 12.0 / 72.0 * 25.4,
        "pt" => number / 72.0 * 25.4,
        "px" => number / 96.0 * 25.4,
        "%" => number / 100.0 * viewport.percent_base(axis),
        "vw" | "vi" => number / 100.0 * viewport.width,
        "vh" | "vb" => number / 100.0 * viewport.height,
        "vmin" => number / 100.0 * viewport.width.min(viewport.height),
        "vmax" => number / 100.0 * viewport.width.max(viewport.height),
        "" => number * viewport.unit_scale(axis),
        _ => return Err(ParseError::MalformedNumber(raw.to_string())),
    };
    Ok(mm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport::mm(100.0, 50.0)
    }

    #[test]
    fn scientific_notation_is_a_number_not_a_unit() {
        assert_eq!(parse_number("1e-5").unwrap(), 0.00001);
        assert_eq!(parse_length("1e-5", Axis::X, &vp()).unwrap(), 0.00001);
        assert_eq!(parse_length("2E3", Axis::X, &vp()).unwrap(), 2000.0);
    }

    #[test]
    fn absolute_units() {
        let vp = vp();
        assert_eq!(parse_length("10mm", Axis::X, &vp).unwrap(), 10.0);
        assert_eq!(parse_length("1cm", Axis::X, &vp).unwrap(), 10.0);
        assert_eq!(parse_length("1in", Axis::X, &vp).unwrap(), 25.4);
        assert_eq!(parse_length("72pt", Axis::X, &vp).unwrap(), 25.4);
        assert_eq!(parse_length("96px", Axis::X, &vp).unwrap(), 25.4);
        assert_eq!(parse_length("4Q", Axis::X, &vp).unwrap(), 1.0);
    }

    #[test]
    fn percentages_resolve_per_axis() {
        let vp = vp();
        assert_eq!(parse_length("50%", Axis::X, &vp).unwrap(), 50.0);
        assert_eq!(parse_length("50%", Axis::Y, &vp).unwrap(), 25.0);
        let diagonal = parse_length("100%", Axis::Diagonal, &vp).unwrap();
        assert!((diagonal - (100.0f64.hypot(50.0) / std::f64::consts::SQRT_2)).abs() < 1e-9);
    }

    #[test]
    fn unitless_maps_through_viewbox_scale() {
        // 200 user units wide viewBox on a 100mm image: 1 unit = 0.5mm.
        let vp = Viewport::new(100.0, 50.0, 200.0, 50.0);
        assert_eq!(parse_length("10", Axis::X, &vp).unwrap(), 5.0);
        assert_eq!(parse_length("10", Axis::Y, &vp).unwrap(), 10.0);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse_length("", Axis::X, &vp()).is_err());
        assert!(parse_length("abc", Axis::X, &vp()).is_err());
        assert!(parse_length("10parsecs", Axis::X, &vp()).is_err());
        assert!(parse_number("1.2.3").is_err());
    }

    #[test]
    fn signs_and_decimals() {
        assert_eq!(parse_number("-.5").unwrap(), -0.5);
        assert_eq!(parse_number("+3.").unwrap(), 3.0);
    }
}
