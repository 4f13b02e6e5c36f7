use anyhow::{Context, Result};
use clap::Parser;
use pathprint::init_logging;
use pathprint_gcode::{serialize_commands, ToolpathCompiler};
use pathprint_settings::{JobOptions, PrintConfig};
use pathprint_svg::{resolve_document, ResolveOptions, SystemFontSource};
use std::path::PathBuf;
use tracing::info;

/// Converts an SVG document into single-tool FDM g-code, treating the
/// document's strokes as the toolpath instead of slicing a mesh.
#[derive(Parser)]
#[command(name = "pathprint", version, about)]
struct Cli {
    /// SVG file to print.
    input: PathBuf,

    /// Where to write the g-code. Defaults to the input path with a .gcode
    /// extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Total object height in millimetres; at least one layer always prints.
    #[arg(long, default_value_t = 0.0)]
    height: f64,

    /// Center the print on the bed instead of keeping document coordinates.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    center: bool,

    /// Printer config file (.toml or .json). Defaults to the per-user
    /// config, or built-in defaults when no file exists.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PrintConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PrintConfig::load_default().context("loading per-user config")?,
    };
    let job = JobOptions {
        target_height: cli.height,
        center_on_bed: cli.center,
    };
    job.validate()?;

    let xml = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let options = ResolveOptions {
        max_resolution: config.process.max_resolution,
        bed_width: config.machine.bed_width,
        bed_depth: config.machine.bed_depth,
    };
    let fonts = SystemFontSource::new();
    let strokes = resolve_document(&xml, &options, &fonts)
        .with_context(|| format!("parsing {}", cli.input.display()))?;
    info!(strokes = strokes.len(), "document resolved");

    let commands = ToolpathCompiler::new(&config, &job).compile(&strokes);
    let gcode = serialize_commands(&commands);

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("gcode"));
    std::fs::write(&output, gcode).with_context(|| format!("writing {}", output.display()))?;
    info!(path = %output.display(), commands = commands.len(), "g-code written");
    Ok(())
}
