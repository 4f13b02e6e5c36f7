//! # Pathprint Core
//!
//! Core types and numerics shared by the pathprint crates: 2D points and
//! strokes, affine transform algebra, CSS length parsing, and the rounding
//! policy that keeps emitted coordinates on the nanometre grid.

pub mod error;
pub mod geometry;
pub mod transform;
pub mod units;

pub use error::ParseError;
pub use geometry::{format_mm, round_nm, Point2D, Stroke};
pub use transform::Transform2D;
pub use transform::parse_transform_list;
pub use units::{lex_number, parse_length, parse_number, Axis, Viewport};
