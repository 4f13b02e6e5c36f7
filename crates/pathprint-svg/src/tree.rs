//! The parsed element tree.
//!
//! Elements are a tagged variant rather than trait objects so the geometry
//! builder can match exhaustively; adding an element kind is then a
//! compile-time-checked change everywhere it matters.

use crate::error::SvgError;
use std::collections::HashMap;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Every element kind we recognize. Anything else parses as `Unknown` and is
/// skipped (with a warning) during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Svg,
    Group,
    Defs,
    Style,
    Switch,
    Use,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
    Path,
    Text,
    Unknown(String),
}

impl ElementKind {
    fn from_tag(tag: &str) -> ElementKind {
        match tag.to_ascii_lowercase().as_str() {
            "svg" => ElementKind::Svg,
            "g" => ElementKind::Group,
            "defs" => ElementKind::Defs,
            "style" => ElementKind::Style,
            "switch" => ElementKind::Switch,
            "use" => ElementKind::Use,
            "rect" => ElementKind::Rect,
            "circle" => ElementKind::Circle,
            "ellipse" => ElementKind::Ellipse,
            "line" => ElementKind::Line,
            "polyline" => ElementKind::Polyline,
            "polygon" => ElementKind::Polygon,
            "path" => ElementKind::Path,
            "text" => ElementKind::Text,
            other => ElementKind::Unknown(other.to_string()),
        }
    }
}

/// One node of the parsed document. Built once per load, read-only during
/// resolution; `<use>` instantiation clones the referenced subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub attrs: HashMap<String, String>,
    pub children: Vec<Element>,
    /// Character data, kept for `<text>` content and `<style>` sheets.
    pub text: Option<String>,
}

impl Element {
    /// Parses a whole document. Only structural (markup-level) failures are
    /// fatal; unknown elements are carried as [`ElementKind::Unknown`].
    pub fn parse_document(xml: &str) -> Result<Element, SvgError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        let element = Element::from_node(root);
        if element.kind != ElementKind::Svg {
            return Err(SvgError::NotSvg);
        }
        Ok(element)
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Element {
        let kind = match node.tag_name().namespace() {
            None | Some(SVG_NS) => ElementKind::from_tag(node.tag_name().name()),
            Some(other) => ElementKind::Unknown(format!("{{{other}}}{}", node.tag_name().name())),
        };

        let mut attrs = HashMap::new();
        for attr in node.attributes() {
            // xlink:href folds onto plain href. Un-namespaced attributes
            // always win; the xlink form only fills the gap.
            if attr.namespace().is_none() {
                attrs.insert(attr.name().to_string(), attr.value().to_string());
            } else if attr.namespace() == Some(XLINK_NS) && attr.name() == "href" {
                attrs
                    .entry(String::from("href"))
                    .or_insert_with(|| attr.value().to_string());
            }
        }

        let children = node
            .children()
            .filter(|child| child.is_element())
            .map(Element::from_node)
            .collect();

        let text = node
            .children()
            .filter_map(|child| child.text())
            .collect::<String>();
        let text = if text.trim().is_empty() { None } else { Some(text) };

        Element {
            kind,
            attrs,
            children,
            text,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Collects every descendant carrying an `id`, for `<use>` dereferencing.
    /// This is a plain identifier table, not ownership: the resolver clones
    /// out of it on instantiation.
    pub fn collect_definitions<'a>(&'a self, table: &mut HashMap<String, &'a Element>) {
        if let Some(id) = self.id() {
            table.entry(id.to_string()).or_insert(self);
        }
        for child in &self.children {
            child.collect_definitions(table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_document() {
        let doc = Element::parse_document(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
                 <g><rect x="1" y="1" width="2" height="2"/></g>
               </svg>"#,
        )
        .unwrap();
        assert_eq!(doc.kind, ElementKind::Svg);
        assert_eq!(doc.children[0].kind, ElementKind::Group);
        assert_eq!(doc.children[0].children[0].kind, ElementKind::Rect);
    }

    #[test]
    fn xlink_href_normalizes() {
        let doc = Element::parse_document(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
                 <use xlink:href="#shape"/>
               </svg>"##,
        )
        .unwrap();
        assert_eq!(doc.children[0].attr("href"), Some("#shape"));
    }

    #[test]
    fn plain_href_beats_the_xlink_form() {
        let doc = Element::parse_document(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
                 <use xlink:href="#stale" href="#current"/>
               </svg>"##,
        )
        .unwrap();
        assert_eq!(doc.children[0].attr("href"), Some("#current"));
    }

    #[test]
    fn definitions_table_spans_whole_tree() {
        let doc = Element::parse_document(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <defs><circle id="dot" r="1"/></defs>
                 <rect id="box" width="1" height="1"/>
               </svg>"#,
        )
        .unwrap();
        let mut table = HashMap::new();
        doc.collect_definitions(&mut table);
        assert!(table.contains_key("dot"));
        assert!(table.contains_key("box"));
    }

    #[test]
    fn garbage_is_fatal() {
        assert!(Element::parse_document("this is not markup").is_err());
    }
}
