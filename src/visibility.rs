//! Visibility and clipping evaluation for single elements.
//!
//! All functions are pure queries against a [`RenderTree`].

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use crate::dom::{NodeId, RenderTree};
use crate::geom::{ClipArea, Rect};
use crate::style::{self, Position};

/// Whether `node` renders anything at all.
///
/// Disconnected nodes, `display: none`, `visibility: hidden|collapse`, and
/// boxes whose visible area (after their own `clip`/`clip-path`) is zero are
/// invisible.
#[must_use]
pub fn is_visible(tree: &dyn RenderTree, node: NodeId) -> bool {
    if !tree.is_connected(node) {
        return false;
    }
    if tree.is_text(node) {
        return !tree.bounding_rect(node).is_empty();
    }
    if tree.computed_style(node, "display") == "none" {
        return false;
    }
    if matches!(tree.computed_style(node, "visibility"), "hidden" | "collapse") {
        return false;
    }
    visible_rect(tree, node).is_some()
}

/// The element's box reduced by its own `clip` and `clip-path`, or `None`
/// when nothing of it remains.
#[must_use]
pub fn visible_rect(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    let rect = tree.bounding_rect(node);
    if rect.is_empty() {
        return None;
    }
    match style::own_clip(tree, node) {
        Some(clip) => rect.intersect(&clip),
        None => Some(rect),
    }
}

/// Whether `node` contributes a clip of its own to descendants or itself.
fn clips(tree: &dyn RenderTree, node: NodeId) -> bool {
    has_own_clip(tree, node) || style::overflow_axes(tree, node).any()
}

fn has_own_clip(tree: &dyn RenderTree, node: NodeId) -> bool {
    style::own_clip(tree, node).is_some()
}

/// What the current containing block lets the walk skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    /// In-flow: every overflow ancestor clips.
    None,
    /// Absolute: overflow ancestors clip only from the nearest positioned one up.
    UntilPositioned,
    /// Fixed: no overflow ancestor clips.
    All,
}

impl Escape {
    fn from_position(position: Position) -> Self {
        match position {
            Position::Absolute => Self::UntilPositioned,
            Position::Fixed => Self::All,
            _ => Self::None,
        }
    }
}

/// Elements whose clips bound `node`, innermost first.
///
/// Includes `node` itself when it clips. The walk ends at `<body>`/`<html>`.
/// Overflow ancestors escaped by absolute/fixed positioning are skipped;
/// ancestors with their own `clip` or `clip-path` are never skipped.
#[must_use]
pub fn clipping_elements(tree: &dyn RenderTree, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    if tree.is_element(node) && clips(tree, node) {
        out.push(node);
    }
    let mut escape = Escape::from_position(style::position(tree, node));
    for ancestor in tree.ancestors(node) {
        if tree.is_document_root(ancestor) {
            break;
        }
        let position = style::position(tree, ancestor);
        let included = match escape {
            Escape::None => clips(tree, ancestor),
            Escape::UntilPositioned if position.is_positioned() => clips(tree, ancestor),
            Escape::UntilPositioned | Escape::All => has_own_clip(tree, ancestor),
        };
        if included {
            out.push(ancestor);
        }
        escape = match escape {
            Escape::None => Escape::from_position(position),
            Escape::UntilPositioned if position.is_positioned() => Escape::from_position(position),
            other => other,
        };
    }
    out
}

/// Intersection of the clip contributed by each element.
///
/// An element's own `clip`/`clip-path` takes precedence over its overflow.
/// Overflow on one axis yields a band unbounded along the other.
#[must_use]
pub fn clipping_area(tree: &dyn RenderTree, elements: &[NodeId]) -> ClipArea {
    elements
        .iter()
        .fold(ClipArea::UNBOUNDED, |area, &el| area.intersect(&element_clip(tree, el)))
}

fn element_clip(tree: &dyn RenderTree, node: NodeId) -> ClipArea {
    if let Some(own) = style::own_clip(tree, node) {
        return ClipArea::from_rect(&own);
    }
    let rect = tree.bounding_rect(node);
    let axes = style::overflow_axes(tree, node);
    match (axes.x, axes.y) {
        (true, true) => ClipArea::from_rect(&rect),
        (true, false) => ClipArea::horizontal(&rect),
        (false, true) => ClipArea::vertical(&rect),
        (false, false) => ClipArea::UNBOUNDED,
    }
}
