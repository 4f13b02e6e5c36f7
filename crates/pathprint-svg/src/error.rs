//! Error types for SVG parsing and stroke resolution.
//!
//! Only [`SvgError::InvalidDocument`] aborts a load. Every other variant is
//! element-scoped: the resolver logs it, skips the element, and continues
//! with the rest of the document.

use pathprint_core::ParseError;
use thiserror::Error;

/// Errors that can occur while resolving an SVG document into strokes.
#[derive(Error, Debug)]
pub enum SvgError {
    /// The document is not well-formed markup. Fatal for the whole load.
    #[error("invalid SVG document: {0}")]
    InvalidDocument(#[from] roxmltree::Error),

    /// The document has no `<svg>` root element.
    #[error("document root is not an <svg> element")]
    NotSvg,

    /// An element kind we do not print.
    #[error("unsupported element <{0}>")]
    UnsupportedElement(String),

    /// A `<use>` reference to a missing id, or a reference cycle.
    #[error("reference to unknown or cyclic element id {0:?}")]
    MissingReference(String),

    /// A path `d` attribute that cannot be tokenized. The path element is
    /// dropped; the rest of the document still prints.
    #[error("malformed path data: {0}")]
    MalformedPathData(String),

    /// A numeric attribute failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
