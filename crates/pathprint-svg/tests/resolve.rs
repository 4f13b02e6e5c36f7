//! Document-level resolution behavior: containment of per-element failures,
//! conditional rendering, and coordinate mapping.

use pathprint_core::Point2D;
use pathprint_svg::{
    resolve_document, FontDescriptor, GlyphOutline, GlyphSource, ResolveOptions,
};

/// No fonts at all; documents without text never touch this.
struct NoGlyphs;

impl GlyphSource for NoGlyphs {
    fn outline(&self, _descriptor: &FontDescriptor, _character: char) -> Option<GlyphOutline> {
        None
    }
}

fn resolve(svg: &str) -> Vec<pathprint_core::Stroke> {
    let options = ResolveOptions {
        max_resolution: 0.1,
        bed_width: 200.0,
        bed_depth: 200.0,
    };
    resolve_document(svg, &options, &NoGlyphs).unwrap()
}

#[test]
fn bad_transform_drops_only_that_element() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <line x1="0" y1="0" x2="10" y2="0" transform="wobble(3)"/>
             <line x1="0" y1="5" x2="10" y2="5"/>
           </svg>"#,
    );
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].points[0], Point2D::new(0.0, 5.0));
}

#[test]
fn bad_path_data_drops_only_that_path() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <path d="M 0 0 L"/>
             <path d="M 0 0 L 10 0"/>
           </svg>"#,
    );
    assert_eq!(strokes.len(), 1);
}

#[test]
fn bad_transform_on_a_group_drops_the_subtree() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <g transform="rotate(90,5)">
               <line x1="0" y1="0" x2="10" y2="0"/>
             </g>
           </svg>"#,
    );
    assert!(strokes.is_empty());
}

#[test]
fn switch_renders_first_supported_child() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <switch>
               <line requiredFeatures="http://example.com/feature#Unknown"
                     x1="0" y1="0" x2="1" y2="0"/>
               <line requiredFeatures="http://www.w3.org/TR/SVG11/feature#Shape"
                     x1="0" y1="7" x2="1" y2="7"/>
               <line x1="0" y1="9" x2="1" y2="9"/>
             </switch>
           </svg>"#,
    );
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].points[0], Point2D::new(0.0, 7.0));
}

#[test]
fn viewbox_scales_user_units_to_millimetres() {
    // 200 user units across a 100mm image: everything halves.
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
              viewBox="0 0 200 200">
             <line x1="0" y1="0" x2="40" y2="0"/>
             <path d="M 0 20 L 40 20"/>
           </svg>"#,
    );
    assert_eq!(strokes[0].points[1], Point2D::new(20.0, 0.0));
    assert_eq!(strokes[1].points, vec![Point2D::new(0.0, 10.0), Point2D::new(20.0, 10.0)]);
}

#[test]
fn stroke_width_inherits_through_groups() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <g stroke-width="0.8">
               <line x1="0" y1="0" x2="10" y2="0"/>
               <line x1="0" y1="5" x2="10" y2="5" stroke-width="0.2"/>
             </g>
           </svg>"#,
    );
    assert_eq!(strokes[0].line_width, 0.8);
    assert_eq!(strokes[1].line_width, 0.2);
}

#[test]
fn cyclic_use_is_skipped_without_recursing() {
    let strokes = resolve(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <defs>
               <g id="a"><use href="#a"/></g>
             </defs>
             <use href="#a"/>
             <line x1="0" y1="0" x2="10" y2="0"/>
           </svg>"##,
    );
    assert_eq!(strokes.len(), 1);
}

#[test]
fn css_transform_wins_over_the_attribute() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <line x1="0" y1="0" x2="10" y2="0"
                   transform="translate(50 0)" style="transform: translate(0 30)"/>
           </svg>"#,
    );
    assert_eq!(strokes[0].points[0], Point2D::new(0.0, 30.0));
}

#[test]
fn degenerate_geometry_is_silently_omitted() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <circle cx="5" cy="5" r="0"/>
             <rect x="0" y="0" width="0" height="5"/>
             <line x1="3" y1="3" x2="3" y2="3"/>
           </svg>"#,
    );
    assert!(strokes.is_empty());
}

#[test]
fn unknown_elements_are_ignored() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <filter id="f"/>
             <line x1="0" y1="0" x2="10" y2="0"/>
           </svg>"#,
    );
    assert_eq!(strokes.len(), 1);
}

#[test]
fn root_style_sheet_reaches_every_element() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <style>stroke-width: 2</style>
             <line x1="0" y1="0" x2="10" y2="0"/>
           </svg>"#,
    );
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].line_width, 2.0);
}

#[test]
fn root_transform_shifts_the_whole_document() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm"
                transform="translate(10 0)">
             <line x1="0" y1="0" x2="10" y2="0"/>
           </svg>"#,
    );
    assert_eq!(strokes[0].points[0], Point2D::new(10.0, 0.0));
    assert_eq!(strokes[0].points[1], Point2D::new(20.0, 0.0));
}

#[test]
fn unspecified_stroke_width_comes_through_as_zero() {
    let strokes = resolve(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
             <line x1="0" y1="0" x2="10" y2="0"/>
           </svg>"#,
    );
    assert_eq!(strokes[0].line_width, 0.0);
}
