//! Content bounds: the on-screen rect an element's meaningful content covers.
//!
//! Overlays must hug content rather than wrapper boxes, so bounds are the
//! union of meaningful descendants, clipped by every effective clip.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::consts::{LARGE_SUBTREE_LIMIT, MARKUP_CHARS};
use crate::dom::{NodeId, NodeKind, RenderTree};
use crate::geom::Rect;
use crate::style;
use crate::visibility::{clipping_area, clipping_elements, is_visible, visible_rect};

/// Whether a text run carries content.
///
/// Whitespace-only runs and runs that are exactly one decoration character
/// (bullets, pipes, dashes) are not meaningful.
#[must_use]
pub fn is_meaningful_text(text: &str) -> bool {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(c), None) => !MARKUP_CHARS.contains(&c),
        _ => true,
    }
}

/// Elements that are content without any text: media tags and boxes
/// painted with a background image.
#[must_use]
pub fn is_meaningful_leaf(tree: &dyn RenderTree, node: NodeId) -> bool {
    matches!(tree.tag_name(node), Some("img" | "svg" | "video" | "audio"))
        || style::background_url(tree, node).is_some()
}

/// Bounds of `node`'s meaningful content, or `None` when it is invisible,
/// has no meaningful content, or is clipped away entirely.
#[must_use]
pub fn element_bounds(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    element_bounds_limited(tree, node, LARGE_SUBTREE_LIMIT)
}

/// [`element_bounds`] with an explicit large-subtree cutoff: elements with
/// more direct children than `limit` use their own visible box.
#[must_use]
pub fn element_bounds_limited(tree: &dyn RenderTree, node: NodeId, limit: usize) -> Option<Rect> {
    if tree.is_text(node) {
        return text_bounds(tree, node);
    }
    if !is_visible(tree, node) {
        return None;
    }
    let content = if is_meaningful_leaf(tree, node) || tree.children(node).len() > limit {
        visible_rect(tree, node)?
    } else {
        children_bounds(tree, node, limit)?
    };
    clipping_area(tree, &clipping_elements(tree, node)).clip(&content)
}

fn children_bounds(tree: &dyn RenderTree, node: NodeId, limit: usize) -> Option<Rect> {
    tree.children(node)
        .iter()
        .filter_map(|&child| match tree.kind(child)? {
            NodeKind::Text => meaningful_text_rect(tree, child),
            NodeKind::Element => element_bounds_limited(tree, child, limit),
        })
        .reduce(|acc, r| acc.union(&r))
}

fn meaningful_text_rect(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    if !tree.is_connected(node) || !is_meaningful_text(tree.text(node)?) {
        return None;
    }
    let rect = tree.bounding_rect(node);
    if rect.is_empty() { None } else { Some(rect) }
}

/// A lone text node clipped by its parent's clipping chain.
fn text_bounds(tree: &dyn RenderTree, node: NodeId) -> Option<Rect> {
    let rect = meaningful_text_rect(tree, node)?;
    let parent = tree.parent(node)?;
    if !is_visible(tree, parent) {
        return None;
    }
    clipping_area(tree, &clipping_elements(tree, parent)).clip(&rect)
}
