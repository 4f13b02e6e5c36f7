//! Whole-program compilation: strokes in, serialized g-code out.

use pathprint_core::{Point2D, Stroke};
use pathprint_gcode::{serialize_commands, ToolpathCompiler};
use pathprint_settings::{JobOptions, PrintConfig};

fn stroke(points: &[(f64, f64)]) -> Stroke {
    Stroke::from_points(
        points.iter().map(|&(x, y)| Point2D::new(x, y)),
        0.4,
        false,
        false,
    )
    .unwrap()
}

fn config() -> PrintConfig {
    let mut config = PrintConfig::default();
    config.machine.bed_depth = 200.0;
    config.process.initial_layer_height = 0.3;
    config.process.layer_height = 0.2;
    config
}

#[test]
fn single_line_program_end_to_end() {
    let job = JobOptions {
        target_height: 0.0,
        center_on_bed: false,
    };
    let strokes = vec![stroke(&[(10.0, 50.0), (40.0, 50.0)])];
    let commands = ToolpathCompiler::new(&config(), &job).compile(&strokes);
    let gcode = serialize_commands(&commands);

    let expected = "\
T0
M82
G92 E0
M109 S215
M190 S60
G0 F1500 E-6.5
M107
M204 S500
M205 X10 Y10
;LAYER:0
G0 F15000 Z0.3
G0 F4500 X10 Y150
G0 F1500 E0
";
    assert!(gcode.starts_with(expected), "got:\n{gcode}");
    // One printing move follows, then the cooldown.
    assert!(gcode.contains("\nG1 F1200 X40 E"));
    assert!(gcode.ends_with("M140 S0\nM104 S0\nM107\n"));
}

#[test]
fn travel_between_strokes_retracts_and_unretracts() {
    let job = JobOptions {
        target_height: 0.0,
        center_on_bed: false,
    };
    let strokes = vec![
        stroke(&[(0.0, 10.0), (10.0, 10.0)]),
        stroke(&[(50.0, 10.0), (60.0, 10.0)]),
    ];
    let commands = ToolpathCompiler::new(&config(), &job).compile(&strokes);
    let gcode = serialize_commands(&commands);

    // The mid-print travel is bracketed: retract to e - 6.5, travel, then
    // unretract back to the absolute filament position.
    let lines: Vec<&str> = gcode.lines().collect();
    let travel = lines
        .iter()
        .position(|l| l.starts_with("G0 ") && l.contains("X50"))
        .expect("travel to the second stroke");
    assert!(lines[travel - 1].contains("E-"), "retract before travel: {}", lines[travel - 1]);
    assert!(
        lines[travel + 1].starts_with("G0 F1500 E"),
        "unretract after travel: {}",
        lines[travel + 1]
    );
}

#[test]
fn retraction_disabled_emits_no_extruder_only_moves() {
    let mut config = config();
    config.retraction.enabled = false;
    let job = JobOptions {
        target_height: 0.0,
        center_on_bed: false,
    };
    let strokes = vec![
        stroke(&[(0.0, 10.0), (10.0, 10.0)]),
        stroke(&[(50.0, 10.0), (60.0, 10.0)]),
    ];
    let gcode = serialize_commands(&ToolpathCompiler::new(&config, &job).compile(&strokes));

    for line in gcode.lines() {
        let extruder_only = line.starts_with("G0 ") && line.contains(" E");
        assert!(!extruder_only, "unexpected extruder-only move: {line}");
    }
}

#[test]
fn every_layer_repeats_the_same_xy_geometry() {
    let job = JobOptions {
        target_height: 0.7,
        center_on_bed: false,
    };
    let strokes = vec![stroke(&[(10.0, 10.0), (20.0, 10.0)])];
    let commands = ToolpathCompiler::new(&config(), &job).compile(&strokes);
    let gcode = serialize_commands(&commands);

    // 0.3 + 2 * 0.2 = 0.7: three layers.
    assert!(gcode.contains("Z0.3\n"));
    assert!(gcode.contains("Z0.5\n"));
    assert!(gcode.contains("Z0.7\n"));
    let printing_moves = gcode
        .lines()
        .filter(|l| l.starts_with("G1 ") && l.contains("X20"))
        .count();
    assert_eq!(printing_moves, 3);
}
