//! Style properties and declaration parsing.
//!
//! Selectors are out of scope: a `<style>` child applies its declarations to
//! the enclosing scope as if they were written inline, and the `style`
//! attribute wins over presentation attributes. That matches how far these
//! documents actually use CSS in practice.

use crate::tree::Element;
use pathprint_core::lex_number;

/// The style properties we track through inheritance. Values stay as raw
/// strings where resolution needs the viewport (lengths) or the font system
/// (families); the resolver converts them at the point of use.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub stroke_width: String,
    pub stroke_dasharray: String,
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration_line: String,
    pub text_transform: TextTransform,
    /// A transform declared through CSS rather than the `transform`
    /// attribute. Consumed (not inherited) by the resolver, which composes it
    /// onto the transform stack.
    pub transform: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            // Zero flags "no width given" so the toolpath stage can fall
            // back to its configured line width.
            stroke_width: String::from("0"),
            stroke_dasharray: String::new(),
            font_family: String::from("serif"),
            font_size: String::from("12pt"),
            font_weight: String::from("400"),
            font_style: String::from("normal"),
            text_decoration_line: String::new(),
            text_transform: TextTransform::None,
            transform: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    fn parse(raw: &str) -> TextTransform {
        match raw.trim() {
            "uppercase" => TextTransform::Uppercase,
            "lowercase" => TextTransform::Lowercase,
            "capitalize" => TextTransform::Capitalize,
            _ => TextTransform::None,
        }
    }

    /// Applies the transform to a run of text. `Capitalize` upcases the first
    /// letter of every whitespace-separated word.
    pub fn apply(self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for ch in text.chars() {
                    if ch.is_whitespace() {
                        at_word_start = true;
                        out.push(ch);
                    } else if at_word_start {
                        at_word_start = false;
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

impl Style {
    /// Folds one element's styling onto an inherited base, in cascade order:
    /// presentation attributes, then `<style>` children, then the `style`
    /// attribute.
    pub fn cascade(&self, element: &Element) -> Style {
        let mut style = self.clone();
        // The CSS transform never inherits; the attribute form is composed
        // onto the transform stack by the caller instead.
        style.transform = None;

        for name in [
            "stroke-width",
            "stroke-dasharray",
            "font-family",
            "font-size",
            "font-weight",
            "font-style",
            "text-decoration",
            "text-decoration-line",
            "text-transform",
        ] {
            if let Some(value) = element.attr(name) {
                style.set_property(name, value);
            }
        }
        for child in &element.children {
            if child.kind == crate::tree::ElementKind::Style {
                if let Some(sheet) = &child.text {
                    style.apply_declarations(sheet);
                }
            }
        }
        if let Some(inline) = element.attr("style") {
            style.apply_declarations(inline);
        }
        style
    }

    /// Parses a `key: value; key: value` declaration block. Unknown
    /// properties and malformed values are ignored.
    pub fn apply_declarations(&mut self, declarations: &str) {
        for piece in declarations.split(';') {
            let Some((name, value)) = piece.split_once(':') else {
                continue;
            };
            self.set_property(name.trim(), value.trim());
        }
    }

    fn set_property(&mut self, name: &str, value: &str) {
        match name {
            // Only keep stroke widths that at least start with a number.
            "stroke-width" if lex_number(value).is_some() => {
                self.stroke_width = value.to_string();
            }
            "stroke-dasharray" => self.stroke_dasharray = value.to_string(),
            "font-family" => self.font_family = value.to_string(),
            "font-size" => self.font_size = value.to_string(),
            "font-weight" => self.font_weight = value.to_string(),
            "font-style" => self.font_style = value.to_string(),
            "text-decoration" | "text-decoration-line" => {
                self.text_decoration_line = value.to_string();
            }
            "text-transform" => self.text_transform = TextTransform::parse(value),
            "transform" => self.transform = Some(value.to_string()),
            _ => {}
        }
    }

    /// The decoration lines requested, as predicates over the shorthand.
    pub fn decorations(&self) -> (bool, bool, bool) {
        let line = self.text_decoration_line.as_str();
        (
            line.contains("underline"),
            line.contains("overline"),
            line.contains("line-through"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_style_overrides_attribute() {
        let doc = Element::parse_document(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <rect stroke-width="1mm" style="stroke-width: 2mm" width="1" height="1"/>
               </svg>"#,
        )
        .unwrap();
        let style = Style::default().cascade(&doc.children[0]);
        assert_eq!(style.stroke_width, "2mm");
    }

    #[test]
    fn style_child_applies_to_scope() {
        let doc = Element::parse_document(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <style>stroke-width: 0.8; font-family: monospace</style>
               </svg>"#,
        )
        .unwrap();
        let style = Style::default().cascade(&doc);
        assert_eq!(style.stroke_width, "0.8");
        assert_eq!(style.font_family, "monospace");
    }

    #[test]
    fn malformed_stroke_width_is_ignored() {
        let mut style = Style::default();
        style.apply_declarations("stroke-width: wide");
        assert_eq!(style.stroke_width, "0");
    }

    #[test]
    fn capitalize_upcases_word_starts() {
        assert_eq!(
            TextTransform::Capitalize.apply("hello brave world"),
            "Hello Brave World"
        );
        assert_eq!(TextTransform::Uppercase.apply("abc"), "ABC");
    }
}
