//! # Pathprint SVG
//!
//! Parses an SVG document into an element tree and resolves it into a flat,
//! transform-flattened list of printable strokes.
//!
//! The pipeline inside this crate: [`tree`] parses the markup into a tagged
//! element tree, [`css`] merges style declarations, [`shapes`] turns each
//! leaf element into local-coordinate polylines (flattening curves via
//! [`flatten`] and the path mini-language via [`path_data`]), [`text`]
//! supplies glyph outlines behind a trait, and [`resolver`] walks the tree,
//! composes transforms, and emits world-space [`Stroke`]s.
//!
//! [`Stroke`]: pathprint_core::Stroke

pub mod css;
pub mod error;
pub mod flatten;
pub mod path_data;
pub mod resolver;
pub mod shapes;
pub mod text;
pub mod tree;

pub use error::SvgError;
pub use resolver::{resolve_document, ResolveOptions};
pub use text::{FontDescriptor, GlyphOutline, GlyphSource, OutlineSegment, SystemFontSource};
pub use tree::{Element, ElementKind};
