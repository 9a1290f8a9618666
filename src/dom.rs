//! Render tree access: the seam between the engine and the rendering engine.
//!
//! The engine never owns a DOM. It asks a [`RenderTree`] for computed style,
//! layout rectangles, and tree structure through plain [`NodeId`] handles.
//! [`DomStore`] is an in-memory arena implementation that hosts hydrate from a
//! serialized snapshot and that the tests use as a fixture.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bounds::is_meaningful_text;
use crate::error::SnapshotError;
use crate::geom::Rect;

/// Non-owning handle to a node in a [`RenderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Whether a node is an element or a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Text,
}

/// Read-only view of a rendered document.
///
/// Unknown ids must never panic: implementations answer `None`, an empty
/// slice, a zero rect, or `false`.
pub trait RenderTree {
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Lowercase tag name for elements.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Raw character data for text nodes.
    fn text(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// All attributes in a stable order, used for serialization.
    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)>;

    /// Computed style value as reported by the rendering engine, if any.
    fn style(&self, node: NodeId, property: &str) -> Option<&str>;

    /// Border box in the node's own frame viewport. For text nodes this is
    /// the box of the text run.
    fn bounding_rect(&self, node: NodeId) -> Rect;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Whether the node is still attached to the document.
    fn is_connected(&self, node: NodeId) -> bool;

    // --- Provided ---

    /// Computed style, falling back to the CSS initial value when the
    /// rendering engine did not report the property.
    fn computed_style(&self, node: NodeId, property: &str) -> &str {
        self.style(node, property).map_or_else(|| initial_value(property), str::trim)
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Element)
    }

    fn is_text(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Text)
    }

    /// `<html>` and `<body>` bound every upward walk.
    fn is_document_root(&self, node: NodeId) -> bool {
        matches!(self.tag_name(node), Some("html" | "body"))
    }

    /// Ancestors from the parent upward, excluding `node`. Stops at the
    /// first repeated node.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == node || out.contains(&id) {
                break;
            }
            out.push(id);
            current = self.parent(id);
        }
        out
    }

    /// Inclusive descendant test.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).contains(&ancestor)
    }

    /// Concatenated text of the subtree.
    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        collect_text(self, node, &mut out);
        out
    }

    /// Serialize the subtree as HTML.
    fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_html(self, node, &mut out);
        out
    }

    /// Nodes in document order from `start` through the end of `end`'s
    /// subtree. Empty when `end` does not follow `start`.
    fn nodes_between(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
        let root = self.ancestors(start).last().copied().unwrap_or(start);
        let mut stack = vec![root];
        let mut out = Vec::new();
        let mut started = false;
        let mut reached_end = false;
        while let Some(id) = stack.pop() {
            if id == start {
                started = true;
            }
            if reached_end && !self.contains(end, id) {
                break;
            }
            if started {
                out.push(id);
            }
            if id == end {
                if !started {
                    return Vec::new();
                }
                reached_end = true;
            }
            stack.extend(self.children(id).iter().rev());
        }
        if reached_end { out } else { Vec::new() }
    }

    /// Rects of the meaningful text runs between `start` and `end`.
    fn range_rects(&self, start: NodeId, end: NodeId) -> Vec<Rect> {
        self.nodes_between(start, end)
            .into_iter()
            .filter(|&id| self.text(id).is_some_and(is_meaningful_text))
            .map(|id| self.bounding_rect(id))
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// HTML of the range: each outermost node between `start` and `end`,
    /// serialized in document order.
    fn range_html(&self, start: NodeId, end: NodeId) -> String {
        let nodes = self.nodes_between(start, end);
        let mut out = String::new();
        for &id in &nodes {
            if self.parent(id).is_some_and(|p| nodes.contains(&p)) {
                continue;
            }
            write_html(self, id, &mut out);
        }
        out
    }
}

/// CSS initial values for the properties the engine consults.
#[must_use]
pub fn initial_value(property: &str) -> &'static str {
    match property {
        "display" => "inline",
        "visibility" => "visible",
        "position" => "static",
        "overflow" | "overflow-x" | "overflow-y" => "visible",
        "clip" => "auto",
        "clip-path" | "background" | "background-image" => "none",
        _ => "",
    }
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

fn collect_text<T: RenderTree + ?Sized>(tree: &T, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        Some(NodeKind::Text) => out.push_str(tree.text(node).unwrap_or_default()),
        Some(NodeKind::Element) => {
            for &child in tree.children(node) {
                collect_text(tree, child, out);
            }
        }
        None => {}
    }
}

fn write_html<T: RenderTree + ?Sized>(tree: &T, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        Some(NodeKind::Text) => out.push_str(&escape(tree.text(node).unwrap_or_default(), false)),
        Some(NodeKind::Element) => {
            let tag = tree.tag_name(node).unwrap_or("div");
            out.push('<');
            out.push_str(tag);
            for (name, value) in tree.attributes(node) {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value, true));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            for &child in tree.children(node) {
                write_html(tree, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

// =============================================================================
// ARENA STORE
// =============================================================================

/// Payload of a stored node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeData {
    Element {
        tag: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(default)]
        style: BTreeMap<String, String>,
    },
    Text {
        text: String,
    },
}

/// One node in a [`DomStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    #[serde(flatten)]
    pub data: NodeData,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default = "connected_by_default")]
    pub connected: bool,
}

fn connected_by_default() -> bool {
    true
}

/// Arena-backed [`RenderTree`]. Node ids are indices and are never reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomStore {
    nodes: Vec<DomNode>,
}

impl DomStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from a `{ "nodes": [...] }` snapshot. Parent and child links
    /// must agree with each other and every parent chain must end at a root.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let store: Self = serde_json::from_str(raw)?;
        store.check_links()?;
        store.check_acyclic()?;
        Ok(store)
    }

    fn check_links(&self) -> Result<(), SnapshotError> {
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            let orphaned = node.parent.filter(|&parent| !self.node(parent).is_some_and(|p| p.children.contains(&id)));
            if let Some(parent) = orphaned {
                return Err(SnapshotError::Link { node: index, other: parent.0 });
            }
            if let Some(&child) = node.children.iter().find(|&&c| self.parent_of(c) != Some(id)) {
                return Err(SnapshotError::Link { node: index, other: child.0 });
            }
        }
        Ok(())
    }

    /// Walks each parent chain once; `walked[i]` holds the start of the
    /// walk that first reached node `i`.
    fn check_acyclic(&self) -> Result<(), SnapshotError> {
        let mut walked: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for start in 0..self.nodes.len() {
            let mut current = Some(NodeId(start));
            while let Some(id) = current {
                match walked.get(id.0).copied().flatten() {
                    Some(seen) if seen == start => return Err(SnapshotError::Cycle { node: id.0 }),
                    Some(_) => break,
                    None => {}
                }
                if let Some(slot) = walked.get_mut(id.0) {
                    *slot = Some(start);
                }
                current = self.parent_of(id);
            }
        }
        Ok(())
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Append an element under `parent` (or as a root).
    pub fn add_element(&mut self, parent: Option<NodeId>, tag: &str, rect: Rect) -> NodeId {
        let data = NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
        };
        self.push(parent, data, rect)
    }

    /// Append a text run under `parent`.
    pub fn add_text(&mut self, parent: NodeId, text: &str, rect: Rect) -> NodeId {
        self.push(Some(parent), NodeData::Text { text: text.to_string() }, rect)
    }

    fn push(&mut self, parent: Option<NodeId>, data: NodeData, rect: Rect) -> NodeId {
        let id = NodeId(self.nodes.len());
        let connected = parent.and_then(|p| self.node(p)).map_or(true, |p| p.connected);
        self.nodes.push(DomNode { data, rect, parent, children: Vec::new(), connected });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            p.children.push(id);
        }
        id
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(NodeData::Element { style, .. }) = self.nodes.get_mut(node.0).map(|n| &mut n.data) {
            style.insert(property.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(NodeData::Element { attributes, .. }) = self.nodes.get_mut(node.0).map(|n| &mut n.data) {
            attributes.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.rect = rect;
        }
    }

    /// Shift every rect as the rendering engine would after the viewport
    /// scrolled by `(dx, dy)`.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        for n in &mut self.nodes {
            n.rect = n.rect.translate(-dx, -dy);
        }
    }

    /// Remove `node` from its parent and mark its subtree disconnected.
    pub fn detach(&mut self, node: NodeId) {
        let parent = self.node(node).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            p.children.retain(|&c| c != node);
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.get_mut(id.0) {
                n.connected = false;
                stack.extend(n.children.iter().copied());
            }
        }
    }
}

impl RenderTree for DomStore {
    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|n| match n.data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text { .. } => NodeKind::Text,
        })
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text { .. } => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.data {
            NodeData::Text { text } => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node)?.data {
            NodeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeData::Text { .. } => None,
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        match self.node(node).map(|n| &n.data) {
            Some(NodeData::Element { attributes, .. }) => {
                attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
            }
            _ => Vec::new(),
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        match &self.node(node)?.data {
            NodeData::Element { style, .. } => style.get(property).map(String::as_str),
            NodeData::Text { .. } => None,
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.node(node).map(|n| n.rect).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.connected)
    }
}
