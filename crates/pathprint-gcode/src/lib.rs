//! G-code generation: orders resolved strokes for minimal travel and
//! compiles them into a typed command list plus its text rendering.

pub mod commands;
pub mod emitter;
pub mod order;

pub use commands::{serialize_commands, GcodeCommand};
pub use emitter::ToolpathCompiler;
pub use order::{order_strokes, OrientedStroke};
