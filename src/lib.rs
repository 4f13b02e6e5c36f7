//! pathprint: print SVG documents directly.
//!
//! The member crates do the work; this root crate hosts the binary and the
//! pieces shared between it and the integration tests.

pub use pathprint_core as core;
pub use pathprint_gcode as gcode;
pub use pathprint_settings as settings;
pub use pathprint_svg as svg;

/// Initializes tracing with an `RUST_LOG`-controlled filter, defaulting to
/// `info`. Logs go to stderr so g-code written to stdout stays clean.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
    Ok(())
}
