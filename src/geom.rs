//! Geometry primitives: points, rectangles, and unbounded clip areas.
//!
//! All coordinates are CSS pixels in some frame's viewport space. Which frame
//! is tracked by the caller (see [`crate::frames`]), never by these types.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rigidly shift the point.
    #[must_use]
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from edges, clamping inverted edges to a zero-size rect.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { x: left, y: top, width: (right - left).max(0.0), height: (bottom - top).max(0.0) }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True when either dimension is zero or negative.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Smallest rect covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Overlap of both rects, `None` when they do not overlap with positive area.
    #[must_use]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        );
        if r.is_empty() { None } else { Some(r) }
    }

    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Same width and height, ignoring position.
    #[must_use]
    pub fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// A clipping region whose edges may be infinite.
///
/// `overflow-x: hidden` alone clips horizontally but leaves the vertical axis
/// open, which a plain [`Rect`] cannot express without NaN arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for ClipArea {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl ClipArea {
    pub const UNBOUNDED: ClipArea = ClipArea {
        left: f64::NEG_INFINITY,
        top: f64::NEG_INFINITY,
        right: f64::INFINITY,
        bottom: f64::INFINITY,
    };

    #[must_use]
    pub fn from_rect(rect: &Rect) -> Self {
        Self { left: rect.x, top: rect.y, right: rect.right(), bottom: rect.bottom() }
    }

    /// Clip horizontally to `rect`, unbounded vertically.
    #[must_use]
    pub fn horizontal(rect: &Rect) -> Self {
        Self { left: rect.x, right: rect.right(), ..Self::UNBOUNDED }
    }

    /// Clip vertically to `rect`, unbounded horizontally.
    #[must_use]
    pub fn vertical(rect: &Rect) -> Self {
        Self { top: rect.y, bottom: rect.bottom(), ..Self::UNBOUNDED }
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        *self == Self::UNBOUNDED
    }

    #[must_use]
    pub fn intersect(&self, other: &ClipArea) -> ClipArea {
        ClipArea {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// Restrict `rect` to this area.
    #[must_use]
    pub fn clip(&self, rect: &Rect) -> Option<Rect> {
        let r = Rect::from_edges(
            rect.x.max(self.left),
            rect.y.max(self.top),
            rect.right().min(self.right),
            rect.bottom().min(self.bottom),
        );
        if r.is_empty() { None } else { Some(r) }
    }
}
