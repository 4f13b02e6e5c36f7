//! End-to-end runs of the whole pipeline: SVG text in, g-code text out.

use pathprint::gcode::{serialize_commands, ToolpathCompiler};
use pathprint::settings::{JobOptions, PrintConfig};
use pathprint::svg::{
    resolve_document, FontDescriptor, GlyphOutline, GlyphSource, OutlineSegment, ResolveOptions,
};
use pathprint_core::Point2D;

/// Every character renders as a half-em square sitting on the baseline,
/// advancing by one em. Deterministic, so travel and extrusion distances in
/// the output are exact.
struct SquareGlyphs;

impl GlyphSource for SquareGlyphs {
    fn outline(&self, descriptor: &FontDescriptor, _character: char) -> Option<GlyphOutline> {
        let s = descriptor.size_mm / 2.0;
        Some(GlyphOutline {
            segments: vec![
                OutlineSegment::MoveTo(Point2D::new(0.0, 0.0)),
                OutlineSegment::LineTo(Point2D::new(s, 0.0)),
                OutlineSegment::LineTo(Point2D::new(s, s)),
                OutlineSegment::LineTo(Point2D::new(0.0, s)),
                OutlineSegment::Close,
            ],
            advance: descriptor.size_mm,
        })
    }
}

fn options() -> ResolveOptions {
    ResolveOptions {
        max_resolution: 0.1,
        bed_width: 200.0,
        bed_depth: 200.0,
    }
}

fn compile(svg: &str, target_height: f64, center: bool) -> String {
    let strokes = resolve_document(svg, &options(), &SquareGlyphs).unwrap();
    let config = PrintConfig::default();
    let job = JobOptions {
        target_height,
        center_on_bed: center,
    };
    let commands = ToolpathCompiler::new(&config, &job).compile(&strokes);
    serialize_commands(&commands)
}

#[test]
fn rectangle_prints_as_one_closed_wall() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <rect x="10" y="10" width="20" height="10" stroke-width="0.4"/>
    </svg>"#;

    let strokes = resolve_document(svg, &options(), &SquareGlyphs).unwrap();
    assert_eq!(strokes.len(), 1);
    assert!(strokes[0].closed);
    assert_eq!(strokes[0].line_width, 0.4);
    assert_eq!(strokes[0].points.len(), 5);
    assert_eq!(strokes[0].points[0], strokes[0].points[4]);
}

#[test]
fn gcode_program_has_preamble_layers_and_cooldown() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <line x1="10" y1="50" x2="40" y2="50"/>
    </svg>"#;
    let gcode = compile(svg, 0.0, false);

    let lines: Vec<&str> = gcode.lines().collect();
    assert_eq!(lines[0], "T0");
    assert_eq!(lines[1], "M82");
    assert_eq!(lines[2], "G92 E0");
    assert!(lines.contains(&";LAYER:0"));
    // Cooldown tail: bed off, hotend off, fan off.
    assert_eq!(&lines[lines.len() - 3..], ["M140 S0", "M104 S0", "M107"]);
    // Exactly one extrusion move for a single straight line.
    assert_eq!(lines.iter().filter(|l| l.starts_with("G1 ") && l.contains(" E")).count(), 1);
}

#[test]
fn layers_stack_to_the_requested_height() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <line x1="0" y1="0" x2="10" y2="0"/>
    </svg>"#;
    // Defaults: 0.27mm first layer then 0.1mm layers.
    let gcode = compile(svg, 1.0, false);

    // round((1.0 - 0.27) / 0.1) = 7 layers above the first.
    let layer_count = gcode.lines().filter(|l| l.starts_with(";LAYER:")).count();
    assert_eq!(layer_count, 8);
    assert!(gcode.contains(";LAYER:0\n"));
    assert!(gcode.contains(";LAYER:7\n"));
}

#[test]
fn use_renders_the_definition_translated() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <defs><line id="bar" x1="0" y1="0" x2="10" y2="0"/></defs>
        <use href="#bar" x="5" y="7"/>
    </svg>"##;

    let strokes = resolve_document(svg, &options(), &SquareGlyphs).unwrap();
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].points[0], Point2D::new(5.0, 7.0));
    assert_eq!(strokes[0].points[1], Point2D::new(15.0, 7.0));
}

#[test]
fn unknown_use_target_is_skipped() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
        <use href="#nowhere"/>
        <line x1="0" y1="0" x2="10" y2="0"/>
    </svg>"##;
    let strokes = resolve_document(svg, &options(), &SquareGlyphs).unwrap();
    assert_eq!(strokes.len(), 1);
}

#[test]
fn text_renders_glyph_boxes_on_the_baseline() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <text x="10" y="50" style="font-size:8mm">ab</text>
    </svg>"#;

    let strokes = resolve_document(svg, &options(), &SquareGlyphs).unwrap();
    assert_eq!(strokes.len(), 2);
    assert!(strokes.iter().all(|s| s.from_text && s.closed));
    // First box at the anchor, second one em (8mm) further along.
    assert_eq!(strokes[0].points[0], Point2D::new(10.0, 50.0));
    assert_eq!(strokes[1].points[0], Point2D::new(18.0, 50.0));
    // Glyphs extend up from the baseline, which is -y in document space.
    assert_eq!(strokes[0].points[2], Point2D::new(14.0, 46.0));
}

#[test]
fn transforms_compose_through_groups() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <g transform="translate(10 20)">
            <line x1="0" y1="0" x2="5" y2="0" transform="scale(2)"/>
        </g>
    </svg>"#;

    let strokes = resolve_document(svg, &options(), &SquareGlyphs).unwrap();
    assert_eq!(strokes[0].points[0], Point2D::new(10.0, 20.0));
    assert_eq!(strokes[0].points[1], Point2D::new(20.0, 20.0));
}

#[test]
fn malformed_markup_is_rejected() {
    let svg = "<svg><rect";
    assert!(resolve_document(svg, &options(), &SquareGlyphs).is_err());
}

#[test]
fn centered_print_lands_in_the_bed_middle() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
        viewBox="0 0 100 100">
        <line x1="0" y1="0" x2="10" y2="0"/>
    </svg>"#;
    let gcode = compile(svg, 0.0, true);

    // Bed is 223mm square by default: a 10mm line centers at X106.5..116.5,
    // and document y=0 maps to the bed's Y center after the flip.
    assert!(gcode.contains("X106.5"), "{gcode}");
    assert!(gcode.contains("X116.5"), "{gcode}");
    assert!(gcode.contains("Y111.5"), "{gcode}");
}
