//! Parsing of the handful of CSS values the geometry engine interprets:
//! `clip: rect()`, `clip-path: inset()`, overflow axes, position, and
//! background image URLs.
//!
//! Every parser is fail-open: a value that cannot be understood yields `None`,
//! which callers treat as "this property does not clip".

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use crate::dom::{NodeId, RenderTree};
use crate::geom::Rect;

/// Computed `position` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" => Self::Sticky,
            _ => Self::Static,
        }
    }

    /// Anything but `static` establishes a containing block for absolute boxes.
    #[must_use]
    pub fn is_positioned(self) -> bool {
        self != Self::Static
    }

    /// Out-of-flow boxes, the only ones `clip` applies to.
    #[must_use]
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// Which axes an element's overflow clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverflowAxes {
    pub x: bool,
    pub y: bool,
}

impl OverflowAxes {
    #[must_use]
    pub fn any(self) -> bool {
        self.x || self.y
    }
}

#[must_use]
pub fn position(tree: &dyn RenderTree, node: NodeId) -> Position {
    Position::parse(tree.computed_style(node, "position"))
}

/// Clipping overflow axes, honoring the `overflow` shorthand when the
/// longhands were not reported.
#[must_use]
pub fn overflow_axes(tree: &dyn RenderTree, node: NodeId) -> OverflowAxes {
    let shorthand = tree.computed_style(node, "overflow");
    let mut parts = shorthand.split_whitespace();
    let short_x = parts.next().unwrap_or("visible");
    let short_y = parts.next().unwrap_or(short_x);
    let x = tree.style(node, "overflow-x").map_or(short_x, str::trim);
    let y = tree.style(node, "overflow-y").map_or(short_y, str::trim);
    OverflowAxes { x: clips_overflow(x), y: clips_overflow(y) }
}

fn clips_overflow(value: &str) -> bool {
    matches!(value, "hidden" | "scroll" | "auto" | "clip" | "overlay")
}

/// The `clip` rect for `node`, only when it applies (absolute or fixed
/// boxes with a parseable `rect()`).
#[must_use]
pub fn applied_clip(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    if !position(tree, node).is_out_of_flow() {
        return None;
    }
    parse_clip_rect(tree.computed_style(node, "clip"), &tree.bounding_rect(node))
}

/// The reduced box for a `clip-path` other than `none`.
#[must_use]
pub fn applied_clip_path(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    parse_clip_path(tree.computed_style(node, "clip-path"), &tree.bounding_rect(node))
}

/// Intersection of the applicable `clip` and `clip-path` boxes, if either
/// applies. An empty intersection is a zero-size rect, not `None`.
#[must_use]
pub fn own_clip(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    match (applied_clip(tree, node), applied_clip_path(tree, node)) {
        (Some(a), Some(b)) => Some(a.intersect(&b).unwrap_or(Rect::new(a.x, a.y, 0.0, 0.0))),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// Parse `rect(top, right, bottom, left)` (commas optional) against `bounds`.
///
/// `auto` edges fall on the box edge. Lengths other than `px` or unitless
/// zero cannot be resolved here and resolve to the box itself.
#[must_use]
pub fn parse_clip_rect(raw: &str, bounds: &Rect) -> Option<Rect> {
    let inner = function_args(raw.trim(), "rect")?;
    let parts: Vec<&str> = inner.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty()).collect();
    if parts.len() != 4 {
        return None;
    }
    let mut edges = [0.0; 4];
    let defaults = [0.0, bounds.width, bounds.height, 0.0];
    for (i, part) in parts.iter().enumerate() {
        edges[i] = match Length::parse(part)? {
            Length::Auto => defaults[i],
            Length::Px(v) => v,
            Length::Percent(_) | Length::Unresolved => return Some(*bounds),
        };
    }
    let [top, right, bottom, left] = edges;
    Some(Rect::from_edges(bounds.x + left, bounds.y + top, bounds.x + right, bounds.y + bottom))
}

/// Parse a `clip-path` value against `bounds`.
///
/// `inset()` shrinks the box; other basic shapes and references are
/// approximated by the box itself; `none` and malformed values yield `None`.
#[must_use]
pub fn parse_clip_path(raw: &str, bounds: &Rect) -> Option<Rect> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "none" {
        return None;
    }
    if let Some(args) = function_args(raw, "inset") {
        return parse_inset(args, bounds);
    }
    let shape = raw.split('(').next().unwrap_or_default().trim();
    if matches!(shape, "circle" | "ellipse" | "polygon" | "path" | "url" | "xywh" | "rect") && raw.ends_with(')') {
        return Some(*bounds);
    }
    None
}

fn parse_inset(args: &str, bounds: &Rect) -> Option<Rect> {
    let offsets = args.split(" round ").next().unwrap_or_default();
    let values: Vec<Length> = offsets.split_whitespace().map(Length::parse).collect::<Option<_>>()?;
    let [top, right, bottom, left] = match values.as_slice() {
        [a] => [*a, *a, *a, *a],
        [a, b] => [*a, *b, *a, *b],
        [a, b, c] => [*a, *b, *c, *b],
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return None,
    };
    let top = top.resolve(bounds.height)?;
    let bottom = bottom.resolve(bounds.height)?;
    let left = left.resolve(bounds.width)?;
    let right = right.resolve(bounds.width)?;
    Some(Rect::from_edges(bounds.x + left, bounds.y + top, bounds.right() - right, bounds.bottom() - bottom))
}

/// The first `url(...)` in `background-image` or `background`, unquoted.
#[must_use]
pub fn background_url(tree: &dyn RenderTree, node: NodeId) -> Option<String> {
    ["background-image", "background"]
        .into_iter()
        .find_map(|prop| extract_url(tree.computed_style(node, prop)))
}

/// Extract the target of the first `url(...)` token in a CSS value.
#[must_use]
pub fn extract_url(value: &str) -> Option<String> {
    let start = value.find("url(")? + 4;
    let end = start + value[start..].find(')')?;
    let url = value[start..end].trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    if url.is_empty() { None } else { Some(url.to_string()) }
}

fn function_args<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Length {
    Auto,
    Px(f64),
    Percent(f64),
    /// A valid length whose unit needs font or viewport metrics.
    Unresolved,
}

impl Length {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == "auto" {
            return Some(Self::Auto);
        }
        if let Some(n) = raw.strip_suffix("px") {
            return n.parse::<f64>().map_or(None, |v| Some(Self::Px(v)));
        }
        if let Some(n) = raw.strip_suffix('%') {
            return n.parse::<f64>().map_or(None, |v| Some(Self::Percent(v)));
        }
        if let Ok(v) = raw.parse::<f64>() {
            return (v == 0.0).then_some(Self::Px(0.0));
        }
        let split = raw.find(|c: char| c.is_ascii_alphabetic())?;
        let (number, unit) = raw.split_at(split);
        if number.parse::<f64>().is_err() || !unit.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self::Unresolved)
    }

    /// Pixel value against a reference length; unresolvable units count as 0.
    fn resolve(self, reference: f64) -> Option<f64> {
        match self {
            Self::Px(v) => Some(v),
            Self::Percent(p) => Some(reference * p / 100.0),
            Self::Unresolved => Some(0.0),
            Self::Auto => None,
        }
    }
}
