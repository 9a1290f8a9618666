//! Frame registry and coordinate translation from nested frames into the
//! root frame's viewport.
//!
//! Each frame reports its own geometry keyed by `href`. Translating a rect
//! reported inside a frame adds the offset of every non-root frame on the
//! path to the root, then subtracts the root's scroll exactly once. Scroll
//! offsets of intermediate frames are already baked into the rects those
//! frames report, so they are not applied again.

#[cfg(test)]
#[path = "frames_test.rs"]
mod frames_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DEPTH;
use crate::geom::{Point, Rect};
use crate::target::Target;

/// Position, scroll, and size of one frame within its parent's viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    pub href: String,
    /// Equal to `href` for the root window.
    pub parent_href: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    /// `-1` when unknown.
    #[serde(default = "unknown_size")]
    pub width: f64,
    #[serde(default = "unknown_size")]
    pub height: f64,
}

fn unknown_size() -> f64 {
    -1.0
}

impl FrameInfo {
    /// The top-level window.
    #[must_use]
    pub fn root(href: &str) -> Self {
        Self::child(href, href, 0.0, 0.0)
    }

    /// A frame placed at `(x, y)` inside `parent_href`.
    #[must_use]
    pub fn child(href: &str, parent_href: &str, x: f64, y: f64) -> Self {
        Self {
            href: href.to_string(),
            parent_href: parent_href.to_string(),
            x,
            y,
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: unknown_size(),
            height: unknown_size(),
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.href == self.parent_href
    }
}

/// All known frames for the current page, keyed by `href`.
#[derive(Debug, Clone)]
pub struct FrameRegistry {
    frames: HashMap<String, FrameInfo>,
    max_depth: usize,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new(MAX_FRAME_DEPTH)
    }
}

impl FrameRegistry {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { frames: HashMap::new(), max_depth }
    }

    // --- Mutation ---

    /// Record a frame. Child frames always overwrite their entry; the root
    /// is only recorded once so a late re-announcement cannot reset its
    /// scroll. Returns whether the registry changed.
    pub fn register_frame(&mut self, info: FrameInfo) -> bool {
        let exists = self.frames.contains_key(&info.href);
        if exists && info.is_root() {
            return false;
        }
        if self.frames.get(&info.href) == Some(&info) {
            return false;
        }
        tracing::debug!(href = %info.href, parent = %info.parent_href, "frame registered");
        self.frames.insert(info.href.clone(), info);
        true
    }

    /// Update a frame's scroll offset. Unknown hrefs are ignored.
    pub fn update_scroll(&mut self, href: &str, scroll_x: f64, scroll_y: f64) -> bool {
        match self.frames.get_mut(href) {
            Some(frame) if frame.scroll_x != scroll_x || frame.scroll_y != scroll_y => {
                frame.scroll_x = scroll_x;
                frame.scroll_y = scroll_y;
                true
            }
            _ => false,
        }
    }

    /// Update a frame's size. Unknown hrefs are ignored.
    pub fn update_size(&mut self, href: &str, width: f64, height: f64) -> bool {
        match self.frames.get_mut(href) {
            Some(frame) if frame.width != width || frame.height != height => {
                frame.width = width;
                frame.height = height;
                true
            }
            _ => false,
        }
    }

    pub fn remove_frame(&mut self, href: &str) -> bool {
        self.frames.remove(href).is_some()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    // --- Queries ---

    #[must_use]
    pub fn get(&self, href: &str) -> Option<&FrameInfo> {
        self.frames.get(href)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn root(&self) -> Option<&FrameInfo> {
        self.frames.values().find(|f| f.is_root())
    }

    /// Snapshot of every frame, sorted by `href` for stable broadcasts.
    #[must_use]
    pub fn all(&self) -> Vec<FrameInfo> {
        let mut frames: Vec<FrameInfo> = self.frames.values().cloned().collect();
        frames.sort_by(|a, b| a.href.cmp(&b.href));
        frames
    }

    /// Frames from `href` up to and including the root. Empty when the chain
    /// is broken or deeper than the configured limit.
    #[must_use]
    pub fn frames_in_path(&self, href: &str) -> Vec<&FrameInfo> {
        let mut path = Vec::new();
        let mut current = self.frames.get(href);
        while let Some(frame) = current {
            path.push(frame);
            if frame.is_root() {
                return path;
            }
            if path.len() > self.max_depth {
                tracing::warn!(%href, max_depth = self.max_depth, "frame chain too deep");
                return Vec::new();
            }
            current = self.frames.get(&frame.parent_href);
        }
        Vec::new()
    }

    /// Offset to add to coordinates reported inside `href`, or `None` when
    /// `href` is the root or cannot be resolved.
    #[must_use]
    pub fn offset(&self, href: &str) -> Option<(f64, f64)> {
        let path = self.frames_in_path(href);
        let (root, children) = path.split_last()?;
        if children.is_empty() {
            return None;
        }
        let (dx, dy) = children.iter().fold((0.0, 0.0), |(dx, dy), f| (dx + f.x, dy + f.y));
        Some((dx - root.scroll_x, dy - root.scroll_y))
    }

    /// Map a rect from `href`'s viewport into the root viewport.
    #[must_use]
    pub fn translate_rect(&self, rect: &Rect, href: &str) -> Rect {
        match self.offset(href) {
            Some((dx, dy)) => rect.translate(dx, dy),
            None => *rect,
        }
    }

    /// Map a point from `href`'s viewport into the root viewport.
    #[must_use]
    pub fn translate_point(&self, point: Point, href: &str) -> Point {
        match self.offset(href) {
            Some((dx, dy)) => point.translate(dx, dy),
            None => point,
        }
    }

    /// Map a target's rect and mouse location from `href`'s viewport into
    /// the root viewport, rigidly.
    #[must_use]
    pub fn translate_target(&self, target: &Target, href: &str) -> Target {
        match self.offset(href) {
            Some((dx, dy)) => target.translated(dx, dy),
            None => target.clone(),
        }
    }
}
