//! Typed g-code commands and their text form.
//!
//! The compiler builds a `Vec<GcodeCommand>` first; serialization to text is
//! a separate, dumb step. Tests assert against the typed form, the file on
//! disk is just its rendering.

use pathprint_core::format_mm;
use std::fmt::Write;

/// Marlin-flavoured commands, one per output line. Motion commands carry
/// only the words that changed; the compiler owns that decision, not the
/// serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum GcodeCommand {
    /// `;text`
    Comment(String),
    /// `T<n>`
    SelectTool(u8),
    /// `M82`
    AbsoluteExtrusion,
    /// `G92 E0`
    ResetExtruder,
    /// `M104 S` / `M109 S`
    HeatHotend { celsius: f64, wait: bool },
    /// `M140 S` / `M190 S`
    HeatBed { celsius: f64, wait: bool },
    /// `M107`
    FanOff,
    /// `M204 S`
    SetAcceleration { accel: f64 },
    /// `M205 X Y`
    SetJerk { jerk: f64 },
    /// `G280`
    PrimeBlob,
    /// `G0` rapid move; omitted words did not change. Feed is mm/min.
    Travel {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        feed: Option<f64>,
    },
    /// `G1` printing move with an absolute E word.
    Extrude {
        x: Option<f64>,
        y: Option<f64>,
        feed: Option<f64>,
        e: f64,
    },
    /// `G0 F<feed> E<e>`: retract or unretract in place.
    MoveExtruder { feed: f64, e: f64 },
}

impl GcodeCommand {
    fn write_line(&self, out: &mut String) {
        match self {
            GcodeCommand::Comment(text) => _ = write!(out, ";{text}"),
            GcodeCommand::SelectTool(tool) => _ = write!(out, "T{tool}"),
            GcodeCommand::AbsoluteExtrusion => out.push_str("M82"),
            GcodeCommand::ResetExtruder => out.push_str("G92 E0"),
            GcodeCommand::HeatHotend { celsius, wait } => {
                let code = if *wait { "M109" } else { "M104" };
                _ = write!(out, "{code} S{}", format_mm(*celsius));
            }
            GcodeCommand::HeatBed { celsius, wait } => {
                let code = if *wait { "M190" } else { "M140" };
                _ = write!(out, "{code} S{}", format_mm(*celsius));
            }
            GcodeCommand::FanOff => out.push_str("M107"),
            GcodeCommand::SetAcceleration { accel } => {
                _ = write!(out, "M204 S{}", format_mm(*accel));
            }
            GcodeCommand::SetJerk { jerk } => {
                let jerk = format_mm(*jerk);
                _ = write!(out, "M205 X{jerk} Y{jerk}");
            }
            GcodeCommand::PrimeBlob => out.push_str("G280"),
            GcodeCommand::Travel { x, y, z, feed } => {
                out.push_str("G0");
                if let Some(feed) = feed {
                    _ = write!(out, " F{}", format_mm(*feed));
                }
                if let Some(x) = x {
                    _ = write!(out, " X{}", format_mm(*x));
                }
                if let Some(y) = y {
                    _ = write!(out, " Y{}", format_mm(*y));
                }
                if let Some(z) = z {
                    _ = write!(out, " Z{}", format_mm(*z));
                }
            }
            GcodeCommand::Extrude { x, y, feed, e } => {
                out.push_str("G1");
                if let Some(feed) = feed {
                    _ = write!(out, " F{}", format_mm(*feed));
                }
                if let Some(x) = x {
                    _ = write!(out, " X{}", format_mm(*x));
                }
                if let Some(y) = y {
                    _ = write!(out, " Y{}", format_mm(*y));
                }
                _ = write!(out, " E{}", format_mm(*e));
            }
            GcodeCommand::MoveExtruder { feed, e } => {
                _ = write!(out, "G0 F{} E{}", format_mm(*feed), format_mm(*e));
            }
        }
    }
}

/// Renders commands as a g-code file body, one command per line, trailing
/// newline included.
pub fn serialize_commands(commands: &[GcodeCommand]) -> String {
    let mut out = String::new();
    for command in commands {
        command.write_line(&mut out);
        out.push('\n');
    }
    out
}
