//! Walks the element tree and produces world-space strokes.
//!
//! Inherited state (transform stack, style) travels down the recursion;
//! every leaf shape is flattened in its own coordinate space with a
//! tolerance shrunk by the surrounding transform's scale, then mapped to
//! millimetre world space and funnelled through the shared stroke
//! construction, where nanometre rounding and degenerate-stroke dropping
//! happen exactly once.

use crate::css::Style;
use crate::error::SvgError;
use crate::flatten;
use crate::path_data::{parse_path_data, Subpath};
use crate::shapes;
use crate::text::{FontDescriptor, GlyphSource, OutlineSegment};
use crate::tree::{Element, ElementKind};
use pathprint_core::{parse_length, parse_number, parse_transform_list, Axis, Point2D, Stroke, Transform2D, Viewport};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Feature URLs a `<switch>` may require and still be printed. Mirrors what
/// this reader actually implements, plus features that are meaningless on a
/// printer (color, gradients) and therefore harmless to claim.
const SUPPORTED_FEATURES: &[&str] = &[
    "",
    "http://www.w3.org/TR/SVG11/feature#SVG",
    "http://www.w3.org/TR/SVG11/feature#SVGDOM",
    "http://www.w3.org/TR/SVG11/feature#SVG-static",
    "http://www.w3.org/TR/SVG11/feature#SVGDOM-static",
    "http://www.w3.org/TR/SVG11/feature#Structure",
    "http://www.w3.org/TR/SVG11/feature#BasicStructure",
    "http://www.w3.org/TR/SVG11/feature#ConditionalProcessing",
    "http://www.w3.org/TR/SVG11/feature#Shape",
    "http://www.w3.org/TR/SVG11/feature#PaintAttribute",
    "http://www.w3.org/TR/SVG11/feature#BasicPaintAttribute",
    "http://www.w3.org/TR/SVG11/feature#ColorProfile",
    "http://www.w3.org/TR/SVG11/feature#Gradient",
];

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Maximum chordal deviation when flattening curves, in millimetres of
    /// world space.
    pub max_resolution: f64,
    /// Bed width in millimetres; the fallback base for a root `width` given
    /// as a percentage (or omitted).
    pub bed_width: f64,
    /// Bed depth in millimetres, same role for the root `height`.
    pub bed_depth: f64,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            max_resolution: 0.1,
            bed_width: 223.0,
            bed_depth: 223.0,
        }
    }
}

/// Parses an SVG document and resolves it into printable strokes, in
/// millimetres, y-down, origin at the document's top-left.
pub fn resolve_document(
    xml: &str,
    options: &ResolveOptions,
    glyphs: &dyn GlyphSource,
) -> Result<Vec<Stroke>, SvgError> {
    let root = Element::parse_document(xml)?;

    // Root width/height may be percentages; those resolve against the bed.
    // A malformed dimension falls back to the bed size rather than failing
    // the load.
    let bootstrap = Viewport::mm(options.bed_width, options.bed_depth);
    let image_w = root
        .attr("width")
        .and_then(|raw| parse_length(raw, Axis::X, &bootstrap).ok())
        .unwrap_or(options.bed_width);
    let image_h = root
        .attr("height")
        .and_then(|raw| parse_length(raw, Axis::Y, &bootstrap).ok())
        .unwrap_or(options.bed_depth);
    let (viewbox_w, viewbox_h) = parse_viewbox(&root).unwrap_or((image_w, image_h));
    let viewport = Viewport::new(image_w, image_h, viewbox_w, viewbox_h);

    let mut definitions = HashMap::new();
    root.collect_definitions(&mut definitions);
    let definitions: HashMap<String, Element> = definitions
        .into_iter()
        .map(|(id, element)| (id, element.clone()))
        .collect();

    let mut resolver = Resolver {
        options,
        glyphs,
        viewport,
        definitions,
        strokes: Vec::new(),
        use_stack: Vec::new(),
    };
    let ctx = Context {
        transform: Transform2D::identity(),
        style: Style::default(),
    };
    // The root <svg> cascades like any other container: its presentation
    // attributes, style sheets and transform apply to the whole tree.
    resolver.walk_contained(&root, &ctx);
    debug!(strokes = resolver.strokes.len(), "document resolved");
    Ok(resolver.strokes)
}

/// The last two numbers of a `viewBox`; the offset is not honoured. Invalid
/// boxes are ignored, falling back to a 1:1 unit scale.
fn parse_viewbox(root: &Element) -> Option<(f64, f64)> {
    let raw = root.attr("viewBox")?;
    let parts: Vec<f64> = raw
        .split([' ', '\t', '\n', '\r', ','])
        .filter(|t| !t.is_empty())
        .map(parse_number)
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() == 4 {
        Some((parts[2], parts[3]))
    } else {
        None
    }
}

#[derive(Clone)]
struct Context {
    transform: Transform2D,
    style: Style,
}

struct Resolver<'a> {
    options: &'a ResolveOptions,
    glyphs: &'a dyn GlyphSource,
    viewport: Viewport,
    definitions: HashMap<String, Element>,
    strokes: Vec<Stroke>,
    use_stack: Vec<String>,
}

impl Resolver<'_> {
    /// Walks one element, containing its failures: any element-scoped error
    /// drops that element (and its subtree) with a warning while the rest of
    /// the document keeps resolving.
    fn walk_contained(&mut self, element: &Element, inherited: &Context) {
        if let Err(err) = self.walk(element, inherited) {
            warn!(%err, "skipping element");
        }
    }

    fn walk(&mut self, element: &Element, inherited: &Context) -> Result<(), SvgError> {
        let mut style = inherited.style.cascade(element);
        // A transform declared through CSS replaces the attribute form.
        let raw_transform = style
            .transform
            .take()
            .or_else(|| element.attr("transform").map(str::to_string));
        let mut transform = inherited.transform;
        if let Some(raw) = raw_transform {
            transform = transform.compose(&parse_transform_list(&raw)?);
        }
        let ctx = Context { transform, style };

        match &element.kind {
            ElementKind::Svg | ElementKind::Group => {
                for child in &element.children {
                    self.walk_contained(child, &ctx);
                }
                Ok(())
            }
            // Definitions only render through <use>; style sheets were
            // already folded in by the cascade.
            ElementKind::Defs | ElementKind::Style => Ok(()),
            ElementKind::Switch => self.walk_switch(element, &ctx),
            ElementKind::Use => self.walk_use(element, &ctx),
            ElementKind::Rect => self.walk_rect(element, &ctx),
            ElementKind::Circle => self.walk_circle(element, &ctx),
            ElementKind::Ellipse => self.walk_ellipse(element, &ctx),
            ElementKind::Line => self.walk_line(element, &ctx),
            ElementKind::Polyline => self.walk_poly(element, &ctx, false),
            ElementKind::Polygon => self.walk_poly(element, &ctx, true),
            ElementKind::Path => self.walk_path(element, &ctx),
            ElementKind::Text => self.walk_text(element, &ctx),
            ElementKind::Unknown(tag) => Err(SvgError::UnsupportedElement(tag.clone())),
        }
    }

    /// Renders the first child whose `requiredFeatures` are all supported.
    fn walk_switch(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        for child in &element.children {
            let required = child.attr("requiredFeatures").unwrap_or("");
            let supported = required
                .split(',')
                .map(str::trim)
                .all(|feature| SUPPORTED_FEATURES.contains(&feature));
            if supported {
                return self.walk(child, ctx);
            }
        }
        Ok(())
    }

    fn walk_use(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let Some(href) = element.attr("href") else {
            warn!("<use> without an href");
            return Ok(());
        };
        let Some(id) = href.strip_prefix('#') else {
            warn!(href, "<use> references outside this document");
            return Ok(());
        };
        if self.use_stack.iter().any(|active| active == id) {
            return Err(SvgError::MissingReference(format!(
                "circular <use> reference through '{id}'"
            )));
        }
        let Some(target) = self.definitions.get(id).cloned() else {
            return Err(SvgError::MissingReference(id.to_string()));
        };

        // The target renders as if copied in place, shifted by x/y.
        let x = self.length_attr(element, "x", Axis::X)?.unwrap_or(0.0);
        let y = self.length_attr(element, "y", Axis::Y)?.unwrap_or(0.0);
        let ctx = Context {
            transform: ctx.transform.compose(&Transform2D::translation(x, y)),
            style: ctx.style.clone(),
        };
        self.use_stack.push(id.to_string());
        let result = self.walk(&target, &ctx);
        self.use_stack.pop();
        result
    }

    fn walk_rect(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let x = self.length_attr(element, "x", Axis::X)?.unwrap_or(0.0);
        let y = self.length_attr(element, "y", Axis::Y)?.unwrap_or(0.0);
        let width = self.length_attr(element, "width", Axis::X)?.unwrap_or(0.0);
        let height = self.length_attr(element, "height", Axis::Y)?.unwrap_or(0.0);
        let rx = self.length_attr(element, "rx", Axis::X)?;
        let ry = self.length_attr(element, "ry", Axis::Y)?;

        let tolerance = self.local_tolerance(&ctx.transform);
        if let Some(subpath) = shapes::rect(x, y, width, height, rx, ry, tolerance) {
            self.emit(&subpath, ctx, false)?;
        }
        Ok(())
    }

    fn walk_circle(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let cx = self.length_attr(element, "cx", Axis::X)?.unwrap_or(0.0);
        let cy = self.length_attr(element, "cy", Axis::Y)?.unwrap_or(0.0);
        let r = self.length_attr(element, "r", Axis::Diagonal)?.unwrap_or(0.0);

        let tolerance = self.local_tolerance(&ctx.transform);
        if let Some(subpath) = shapes::circle(cx, cy, r, tolerance) {
            self.emit(&subpath, ctx, false)?;
        }
        Ok(())
    }

    fn walk_ellipse(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let cx = self.length_attr(element, "cx", Axis::X)?.unwrap_or(0.0);
        let cy = self.length_attr(element, "cy", Axis::Y)?.unwrap_or(0.0);
        let rx = self.length_attr(element, "rx", Axis::X)?.unwrap_or(0.0);
        let ry = self.length_attr(element, "ry", Axis::Y)?.unwrap_or(0.0);

        let tolerance = self.local_tolerance(&ctx.transform);
        if let Some(subpath) = shapes::ellipse(cx, cy, rx, ry, tolerance) {
            self.emit(&subpath, ctx, false)?;
        }
        Ok(())
    }

    fn walk_line(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let x1 = self.length_attr(element, "x1", Axis::X)?.unwrap_or(0.0);
        let y1 = self.length_attr(element, "y1", Axis::Y)?.unwrap_or(0.0);
        let x2 = self.length_attr(element, "x2", Axis::X)?.unwrap_or(0.0);
        let y2 = self.length_attr(element, "y2", Axis::Y)?.unwrap_or(0.0);
        self.emit(&shapes::line(x1, y1, x2, y2), ctx, false)
    }

    fn walk_poly(&mut self, element: &Element, ctx: &Context, close: bool) -> Result<(), SvgError> {
        let points = shapes::parse_points(element.attr("points").unwrap_or(""))?;
        // Poly vertices are user units; scale them onto the millimetre grid
        // the way path data is scaled.
        let map = ctx
            .transform
            .compose(&Transform2D::scaling(self.viewport.unit_w, self.viewport.unit_h));
        let subpath = if close {
            shapes::polygon(points)
        } else {
            shapes::polyline(points)
        };
        if let Some(subpath) = subpath {
            self.emit_mapped(&subpath, &map, ctx, false)?;
        }
        Ok(())
    }

    fn walk_path(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let map = ctx
            .transform
            .compose(&Transform2D::scaling(self.viewport.unit_w, self.viewport.unit_h));
        let tolerance = self.local_tolerance(&map);
        let subpaths = parse_path_data(element.attr("d").unwrap_or(""), tolerance)?;
        for subpath in &subpaths {
            self.emit_mapped(subpath, &map, ctx, false)?;
        }
        Ok(())
    }

    fn walk_text(&mut self, element: &Element, ctx: &Context) -> Result<(), SvgError> {
        let Some(raw_text) = &element.text else {
            return Ok(());
        };
        // Collapse whitespace runs, then apply text-transform.
        let collapsed = raw_text.split_whitespace().collect::<Vec<_>>().join(" ");
        let text = ctx.style.text_transform.apply(&collapsed);
        if text.is_empty() {
            return Ok(());
        }

        let mut x = self.length_attr(element, "x", Axis::X)?.unwrap_or(0.0);
        let mut y = self.length_attr(element, "y", Axis::Y)?.unwrap_or(0.0);
        x += self.length_attr(element, "dx", Axis::X)?.unwrap_or(0.0);
        y += self.length_attr(element, "dy", Axis::Y)?.unwrap_or(0.0);
        let glyph_rotation = match element.attr("rotate") {
            Some(raw) => parse_number(raw).unwrap_or(0.0),
            None => 0.0,
        };

        let descriptor = FontDescriptor {
            family: ctx.style.font_family.clone(),
            size_mm: parse_length(&ctx.style.font_size, Axis::Y, &self.viewport)?,
            bold: is_bold(&ctx.style.font_weight),
            italic: is_italic(&ctx.style.font_style),
        };

        let tolerance = self.local_tolerance(&ctx.transform);
        let mut advance = 0.0;
        let mut previous: Option<char> = None;
        for character in text.chars() {
            if let Some(prev) = previous {
                advance += self.glyphs.kerning(&descriptor, prev, character);
            }
            previous = Some(character);
            let Some(outline) = self.glyphs.outline(&descriptor, character) else {
                warn!(%character, "no glyph outline, skipping character");
                continue;
            };

            // Glyph anchor on the baseline, before the per-glyph rotation.
            let anchor = Point2D::new(x + advance, y);
            let glyph_map = if glyph_rotation != 0.0 {
                ctx.transform
                    .compose(&Transform2D::rotation_about(glyph_rotation, anchor.x, anchor.y))
            } else {
                ctx.transform
            };
            for subpath in flatten_glyph(&outline.segments, anchor, tolerance) {
                self.emit_mapped(&subpath, &glyph_map, ctx, true)?;
            }
            advance += outline.advance;
        }

        let (underline, overline, line_through) = ctx.style.decorations();
        let size = descriptor.size_mm;
        let mut decoration = |offset_mm: f64| -> Result<(), SvgError> {
            let line = shapes::line(x, y + offset_mm, x + advance, y + offset_mm);
            self.emit_mapped(&line, &ctx.transform, ctx, true)
        };
        if underline {
            decoration(size * 0.1)?;
        }
        if overline {
            decoration(-size * 0.9)?;
        }
        if line_through {
            decoration(-size * 0.3)?;
        }
        Ok(())
    }

    /// World tolerance shrunk into the local frame of a transform.
    fn local_tolerance(&self, map: &Transform2D) -> f64 {
        let scale = map.max_scale();
        if scale > f64::EPSILON {
            self.options.max_resolution / scale
        } else {
            self.options.max_resolution
        }
    }

    fn length_attr(
        &self,
        element: &Element,
        name: &str,
        axis: Axis,
    ) -> Result<Option<f64>, SvgError> {
        match element.attr(name) {
            Some(raw) => Ok(Some(parse_length(raw, axis, &self.viewport)?)),
            None => Ok(None),
        }
    }

    fn stroke_width(&self, ctx: &Context) -> Result<f64, SvgError> {
        Ok(parse_length(&ctx.style.stroke_width, Axis::X, &self.viewport)?)
    }

    /// Emits a subpath whose points are already millimetres.
    fn emit(&mut self, subpath: &Subpath, ctx: &Context, from_text: bool) -> Result<(), SvgError> {
        self.emit_mapped(subpath, &ctx.transform, ctx, from_text)
    }

    fn emit_mapped(
        &mut self,
        subpath: &Subpath,
        map: &Transform2D,
        ctx: &Context,
        from_text: bool,
    ) -> Result<(), SvgError> {
        let line_width = self.stroke_width(ctx)?;
        let points: Vec<Point2D> = subpath.points.iter().map(|p| map.apply(*p)).collect();
        if let Some(stroke) = Stroke::from_points(points, line_width, subpath.closed, from_text) {
            self.strokes.push(stroke);
        }
        Ok(())
    }
}

fn is_bold(font_weight: &str) -> bool {
    match font_weight.trim() {
        "bold" | "bolder" => true,
        other => parse_number(other).map(|w| w >= 600.0).unwrap_or(false),
    }
}

fn is_italic(font_style: &str) -> bool {
    matches!(font_style.trim(), "italic" | "oblique")
}

/// Flattens glyph outline segments (y-up, baseline origin) into document
/// space subpaths anchored at `anchor`.
fn flatten_glyph(segments: &[OutlineSegment], anchor: Point2D, tolerance: f64) -> Vec<Subpath> {
    let to_doc = |p: Point2D| Point2D::new(anchor.x + p.x, anchor.y - p.y);
    let mut subpaths = Vec::new();
    let mut points: Vec<Point2D> = Vec::new();
    let mut start = anchor;

    let mut flush = |points: &mut Vec<Point2D>, closed: bool| {
        if points.len() >= 2 {
            subpaths.push(Subpath {
                points: std::mem::take(points),
                closed,
            });
        } else {
            points.clear();
        }
    };

    for segment in segments {
        match *segment {
            OutlineSegment::MoveTo(p) => {
                flush(&mut points, false);
                start = to_doc(p);
                points.push(start);
            }
            OutlineSegment::LineTo(p) => points.push(to_doc(p)),
            OutlineSegment::QuadTo(c, p) => {
                let from = points.last().copied().unwrap_or(start);
                flatten::quadratic(&mut points, from, to_doc(c), to_doc(p), tolerance);
            }
            OutlineSegment::CubicTo(c1, c2, p) => {
                let from = points.last().copied().unwrap_or(start);
                flatten::cubic(&mut points, from, to_doc(c1), to_doc(c2), to_doc(p), tolerance);
            }
            OutlineSegment::Close => {
                if points.last() != Some(&start) {
                    points.push(start);
                }
                flush(&mut points, true);
            }
        }
    }
    flush(&mut points, false);
    subpaths
}
