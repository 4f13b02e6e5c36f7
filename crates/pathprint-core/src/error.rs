//! Parse-level error types shared across the pathprint crates.

use thiserror::Error;

/// Errors raised while parsing numeric attribute values and transform lists.
///
/// These are element-scoped: a caller that hits one of these drops the
/// offending element and continues with the rest of the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A string did not match the floating-point lexical grammar, or carried
    /// an unrecognized unit suffix.
    #[error("malformed number: {0:?}")]
    MalformedNumber(String),

    /// A transform list contained a function we do not implement.
    #[error("unknown transform function: {0:?}")]
    UnknownTransformFunction(String),

    /// A transform function was called with the wrong number of arguments.
    #[error("transform function {function:?} takes {expected} argument(s), got {got}")]
    TransformArity {
        function: String,
        expected: &'static str,
        got: usize,
    },
}
