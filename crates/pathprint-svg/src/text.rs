//! Glyph outlines for `<text>` elements.
//!
//! Font lookup sits behind [`GlyphSource`] so the resolver can be tested
//! with a deterministic source while the binary plugs in the system fonts.

use pathprint_core::Point2D;
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use std::collections::HashMap;
use std::fs;
use std::sync::{Mutex, OnceLock};
use tracing::warn;

/// What the document asked for: the raw `font-family` list plus the resolved
/// size in millimetres and the weight/style toggles.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub family: String,
    pub size_mm: f64,
    pub bold: bool,
    pub italic: bool,
}

/// One drawing step of a glyph contour. Coordinates are millimetres in a
/// y-up frame whose origin is the glyph's position on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineSegment {
    MoveTo(Point2D),
    LineTo(Point2D),
    /// Control point, then end point.
    QuadTo(Point2D, Point2D),
    /// Two control points, then end point.
    CubicTo(Point2D, Point2D, Point2D),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphOutline {
    pub segments: Vec<OutlineSegment>,
    /// Horizontal advance to the next glyph, in millimetres.
    pub advance: f64,
}

/// Provides glyph outlines for characters. Outline coordinates are y-up
/// relative to the baseline origin; the resolver flips them into document
/// space.
pub trait GlyphSource {
    fn outline(&self, descriptor: &FontDescriptor, character: char) -> Option<GlyphOutline>;

    /// Kerning adjustment between two adjacent characters, in millimetres.
    fn kerning(&self, _descriptor: &FontDescriptor, _left: char, _right: char) -> f64 {
        0.0
    }
}

fn db() -> &'static fontdb::Database {
    static DB: OnceLock<fontdb::Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        db
    })
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Glyphs from the fonts installed on this machine, looked up through
/// fontdb and outlined with rusttype. Loaded faces are leaked and cached;
/// a handful of faces per document is the expected shape of the workload.
#[derive(Default)]
pub struct SystemFontSource {
    cache: Mutex<HashMap<FontKey, Option<&'static Font<'static>>>>,
}

impl SystemFontSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn font_for(&self, descriptor: &FontDescriptor) -> Option<&'static Font<'static>> {
        let key = FontKey {
            family: descriptor.family.clone(),
            bold: descriptor.bold,
            italic: descriptor.italic,
        };
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        *cache.entry(key).or_insert_with(|| {
            let loaded = load_font(descriptor);
            if loaded.is_none() {
                warn!(family = %descriptor.family, "no system font matches the requested family");
            }
            loaded.map(|font| &*Box::leak(Box::new(font)))
        })
    }
}

fn load_font(descriptor: &FontDescriptor) -> Option<Font<'static>> {
    // Each comma-separated candidate is tried in turn; generic family names
    // map to fontdb's notion of them. A serif fallback is always appended,
    // matching how browsers bottom out the list.
    let mut families: Vec<fontdb::Family<'_>> = descriptor
        .family
        .split(',')
        .map(|name| name.trim().trim_matches(['"', '\'']))
        .filter(|name| !name.is_empty())
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "serif" => fontdb::Family::Serif,
            "sans-serif" => fontdb::Family::SansSerif,
            "monospace" => fontdb::Family::Monospace,
            "cursive" => fontdb::Family::Cursive,
            "fantasy" => fontdb::Family::Fantasy,
            _ => fontdb::Family::Name(name),
        })
        .collect();
    families.push(fontdb::Family::Serif);

    let query = fontdb::Query {
        families: &families,
        weight: if descriptor.bold {
            fontdb::Weight::BOLD
        } else {
            fontdb::Weight::NORMAL
        },
        stretch: fontdb::Stretch::Normal,
        style: if descriptor.italic {
            fontdb::Style::Italic
        } else {
            fontdb::Style::Normal
        },
    };

    let id = db().query(&query)?;
    let face = db().face(id)?;
    match &face.source {
        fontdb::Source::File(path) => {
            let bytes = fs::read(path).ok()?;
            Font::try_from_vec(bytes)
        }
        fontdb::Source::SharedFile(path, _) => {
            let bytes = fs::read(path).ok()?;
            Font::try_from_vec(bytes)
        }
        fontdb::Source::Binary(bytes) => Font::try_from_vec(bytes.as_ref().as_ref().to_vec()),
    }
}

impl GlyphSource for SystemFontSource {
    fn outline(&self, descriptor: &FontDescriptor, character: char) -> Option<GlyphOutline> {
        let font = self.font_for(descriptor)?;
        let scale = Scale::uniform(descriptor.size_mm as f32);
        let glyph = font
            .glyph(character)
            .scaled(scale)
            .positioned(rt_point(0.0, 0.0));
        let advance = glyph.unpositioned().h_metrics().advance_width as f64;

        let mut builder = SegmentCollector::default();
        glyph.build_outline(&mut builder);
        Some(GlyphOutline {
            segments: builder.segments,
            advance,
        })
    }

    fn kerning(&self, descriptor: &FontDescriptor, left: char, right: char) -> f64 {
        let Some(font) = self.font_for(descriptor) else {
            return 0.0;
        };
        let scale = Scale::uniform(descriptor.size_mm as f32);
        font.pair_kerning(scale, font.glyph(left).id(), font.glyph(right).id()) as f64
    }
}

/// Collects rusttype's y-down outline callbacks into y-up segments.
#[derive(Default)]
struct SegmentCollector {
    segments: Vec<OutlineSegment>,
}

impl SegmentCollector {
    fn flip(x: f32, y: f32) -> Point2D {
        Point2D::new(x as f64, -(y as f64))
    }
}

impl OutlineBuilder for SegmentCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(OutlineSegment::MoveTo(Self::flip(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(OutlineSegment::LineTo(Self::flip(x, y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.segments
            .push(OutlineSegment::QuadTo(Self::flip(x1, y1), Self::flip(x, y)));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.segments.push(OutlineSegment::CubicTo(
            Self::flip(x1, y1),
            Self::flip(x2, y2),
            Self::flip(x, y),
        ));
    }

    fn close(&mut self) {
        self.segments.push(OutlineSegment::Close);
    }
}
