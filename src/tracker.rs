//! Frame-side bookkeeping of pointed and shot elements and selection ranges.
//!
//! A `FrameTracker` lives next to one frame's render tree. It never holds
//! node references beyond ids, recomputes bounds on demand, and turns the
//! result into [`Notification`]s for the host, skipping payloads identical to
//! the ones it sent last.

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tracker_test;

use std::collections::HashMap;

use crate::bounds::{element_bounds_limited, is_meaningful_text};
use crate::config::EngineConfig;
use crate::consts::LARGE_SUBTREE_LIMIT;
use crate::dom::{NodeId, RenderTree};
use crate::geom::{Point, Rect};
use crate::notification::{Notification, RangeBounds};
use crate::target::{Target, new_id};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tracked {
    id: String,
    node: NodeId,
}

/// A selection range between two nodes, inclusive of `end`'s subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RangeGroup {
    id: String,
    start: NodeId,
    end: NodeId,
}

pub struct FrameTracker {
    href: String,
    point: Option<Tracked>,
    shoots: Vec<Tracked>,
    selections: Vec<RangeGroup>,
    selection_id: String,
    has_selection: bool,
    typing: bool,
    mouse: Point,
    /// Scroll offset as origin, viewport size as extent.
    viewport: Option<Rect>,
    large_subtree_limit: usize,
    last_sent: HashMap<&'static str, String>,
}

impl FrameTracker {
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self::with_subtree_limit(href, LARGE_SUBTREE_LIMIT)
    }

    /// Tracker using the configured large-subtree limit.
    #[must_use]
    pub fn from_config(href: impl Into<String>, config: &EngineConfig) -> Self {
        Self::with_subtree_limit(href, config.large_subtree_limit)
    }

    #[must_use]
    pub fn with_subtree_limit(href: impl Into<String>, large_subtree_limit: usize) -> Self {
        Self {
            href: href.into(),
            point: None,
            shoots: Vec::new(),
            selections: Vec::new(),
            selection_id: new_id(),
            has_selection: false,
            typing: false,
            mouse: Point::default(),
            viewport: None,
            large_subtree_limit,
            last_sent: HashMap::new(),
        }
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Id the next or current selection range is reported under.
    #[must_use]
    pub fn selection_id(&self) -> &str {
        &self.selection_id
    }

    #[must_use]
    pub fn pointed(&self) -> Option<NodeId> {
        self.point.as_ref().map(|p| p.node)
    }

    /// `(id, node)` of every shot element, in shot order.
    #[must_use]
    pub fn shoots(&self) -> Vec<(&str, NodeId)> {
        self.shoots.iter().map(|s| (s.id.as_str(), s.node)).collect()
    }

    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.selections.len()
    }

    // --- Input ---

    pub fn set_mouse(&mut self, mouse: Point) {
        self.mouse = mouse;
    }

    /// Record the frame's scroll offset and viewport size, reported with
    /// the next [`FrameTracker::send_bounds`].
    pub fn set_viewport(&mut self, scroll_x: f64, scroll_y: f64, width: f64, height: f64) {
        self.viewport = Some(Rect::new(scroll_x, scroll_y, width, height));
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    /// Hover `node`. Re-pointing the same node keeps its id.
    pub fn point(&mut self, node: NodeId) {
        if self.pointed() != Some(node) {
            self.point = Some(Tracked { id: new_id(), node });
        }
    }

    pub fn unpoint(&mut self) {
        self.point = None;
    }

    /// Shoot `node`, returning its shoot id. Shooting a node twice returns
    /// the existing id.
    pub fn shoot(&mut self, node: NodeId) -> String {
        if let Some(existing) = self.shoots.iter().find(|s| s.node == node) {
            return existing.id.clone();
        }
        let id = new_id();
        self.shoots.push(Tracked { id: id.clone(), node });
        id
    }

    /// Record the live selection range under the current selection id.
    pub fn select(&mut self, start: NodeId, end: NodeId) {
        self.has_selection = true;
        let range = RangeGroup { id: self.selection_id.clone(), start, end };
        match self.selections.iter_mut().find(|r| r.id == range.id) {
            Some(existing) => *existing = range,
            None => self.selections.push(range),
        }
    }

    /// The selection collapsed: forget it and start a fresh selection id.
    pub fn collapse_selection(&mut self) -> Option<Notification> {
        self.has_selection = false;
        let id = std::mem::replace(&mut self.selection_id, new_id());
        let before = self.selections.len();
        self.selections.retain(|r| r.id != id);
        (self.selections.len() != before).then_some(Notification::ClearSelection { id })
    }

    /// Remove the pointed target, shot element, or range with `id` from the
    /// one collection that holds it.
    pub fn remove_target(&mut self, id: &str) -> bool {
        if self.point.as_ref().is_some_and(|p| p.id == id) {
            self.point = None;
            return true;
        }
        if let Some(i) = self.shoots.iter().position(|s| s.id == id) {
            self.shoots.remove(i);
            return true;
        }
        if let Some(i) = self.selections.iter().position(|r| r.id == id) {
            self.selections.remove(i);
            return true;
        }
        false
    }

    /// Drop everything whose node left the document, returning the ids of
    /// dropped shoots.
    pub fn refresh_bounds(&mut self, tree: &dyn RenderTree) -> Vec<String> {
        if self.point.as_ref().is_some_and(|p| !tree.is_connected(p.node)) {
            self.point = None;
        }
        let (kept, dropped): (Vec<Tracked>, Vec<Tracked>) =
            std::mem::take(&mut self.shoots).into_iter().partition(|s| tree.is_connected(s.node));
        self.shoots = kept;
        self.selections
            .retain(|r| tree.is_connected(r.start) && tree.is_connected(r.end));
        dropped.into_iter().map(|s| s.id).collect()
    }

    // --- Output ---

    /// Current state as notifications, minus anything identical to what was
    /// last sent. Shot elements that left the document or lost their bounds
    /// are dropped and reported with `DismissShootGroup`.
    pub fn send_bounds(&mut self, tree: &dyn RenderTree) -> Vec<Notification> {
        let detached = self.refresh_bounds(tree);
        let mut out: Vec<Notification> = self
            .viewport
            .map(|v| Notification::Scroll { x: v.x, y: v.y, width: v.width, height: v.height })
            .into_iter()
            .collect();
        out.extend([
            Notification::HasSelection(self.has_selection),
            Notification::TypingOnActiveSurface(self.typing),
            self.point_bounds(tree),
        ]);
        let (shoot_groups, vanished) = self.shoot_bounds(tree);
        self.shoots.retain(|s| !vanished.contains(&s.id));
        out.push(Notification::ShootBounds { groups: shoot_groups });
        out.extend(detached.into_iter().chain(vanished).map(|id| Notification::DismissShootGroup { id }));
        out.push(Notification::SelectBounds { groups: self.select_bounds(tree) });
        out.into_iter().filter(|n| self.should_send(n)).collect()
    }

    fn should_send(&mut self, notification: &Notification) -> bool {
        if notification.is_event() {
            return true;
        }
        let payload = match serde_json::to_string(notification) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, name = notification.name(), "notification not serializable");
                return true;
            }
        };
        if self.last_sent.get(notification.name()) == Some(&payload) {
            return false;
        }
        self.last_sent.insert(notification.name(), payload);
        true
    }

    fn target_for(&self, tree: &dyn RenderTree, id: &str, node: NodeId) -> Option<Target> {
        let rect = element_bounds_limited(tree, node, self.large_subtree_limit)?;
        Some(Target::new(id, rect, self.mouse, tree.outer_html(node)))
    }

    fn point_bounds(&self, tree: &dyn RenderTree) -> Notification {
        let pointed = self
            .point
            .as_ref()
            .and_then(|p| Some((self.target_for(tree, &p.id, p.node)?, tree.text_content(p.node))));
        match pointed {
            Some((target, text)) => Notification::PointBounds { target: Some(target), text },
            None => Notification::PointBounds { target: None, text: String::new() },
        }
    }

    fn shoot_bounds(&self, tree: &dyn RenderTree) -> (Vec<RangeBounds>, Vec<String>) {
        let mut groups = Vec::new();
        let mut vanished = Vec::new();
        for shot in &self.shoots {
            match self.target_for(tree, &shot.id, shot.node) {
                Some(target) => groups.push(RangeBounds::new(&shot.id, vec![target], tree.text_content(shot.node))),
                None => {
                    tracing::debug!(shoot_id = %shot.id, href = %self.href, "shot element has no bounds");
                    vanished.push(shot.id.clone());
                }
            }
        }
        (groups, vanished)
    }

    /// One target per meaningful, visible text run inside each range.
    fn select_bounds(&self, tree: &dyn RenderTree) -> Vec<RangeBounds> {
        self.selections
            .iter()
            .filter_map(|range| {
                let mut targets = Vec::new();
                let mut text = Vec::new();
                for node in tree.nodes_between(range.start, range.end) {
                    let Some(raw) = tree.text(node).filter(|t| is_meaningful_text(t)) else {
                        continue;
                    };
                    let id = format!("{}-{}", range.id, targets.len());
                    if let Some(target) = self.target_for(tree, &id, node) {
                        targets.push(target);
                        text.push(raw.trim());
                    }
                }
                (!targets.is_empty()).then(|| RangeBounds::new(&range.id, targets, text.join(" ")))
            })
            .collect()
    }
}
