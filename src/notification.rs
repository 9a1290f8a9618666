//! One-way messages from a frame to the host state machine.
//!
//! Serialized as `{ "name": "pointBounds", "payload": ... }` so an
//! out-of-process renderer can decode them without sharing types.

#[cfg(test)]
#[path = "notification_test.rs"]
mod notification_test;

use serde::{Deserialize, Serialize};

use crate::frames::FrameInfo;
use crate::target::Target;

/// Targets of one selection range or shot element, in frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub id: String,
    pub targets: Vec<Target>,
    #[serde(default)]
    pub text: String,
}

impl RangeBounds {
    #[must_use]
    pub fn new(id: impl Into<String>, targets: Vec<Target>, text: impl Into<String>) -> Self {
        Self { id: id.into(), targets, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "payload", rename_all = "camelCase")]
pub enum Notification {
    /// The hovered element's bounds, or `None` when nothing is pointed.
    PointBounds { target: Option<Target>, text: String },
    SelectBounds { groups: Vec<RangeBounds> },
    ShootBounds { groups: Vec<RangeBounds> },
    HasSelection(bool),
    /// The selection with this id collapsed.
    ClearSelection { id: String },
    TypingOnActiveSurface(bool),
    FramesInfo(Vec<FrameInfo>),
    /// The sending frame's viewport scrolled to `(x, y)` or resized.
    Scroll { x: f64, y: f64, width: f64, height: f64 },
    /// A shot element's content vanished.
    DismissShootGroup { id: String },
}

impl Notification {
    /// Wire name, also the dedupe key for state-like notifications.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointBounds { .. } => "pointBounds",
            Self::SelectBounds { .. } => "selectBounds",
            Self::ShootBounds { .. } => "shootBounds",
            Self::HasSelection(_) => "hasSelection",
            Self::ClearSelection { .. } => "clearSelection",
            Self::TypingOnActiveSurface(_) => "typingOnActiveSurface",
            Self::FramesInfo(_) => "framesInfo",
            Self::Scroll { .. } => "scroll",
            Self::DismissShootGroup { .. } => "dismissShootGroup",
        }
    }

    /// Events are always delivered; everything else reports a current state
    /// and may be suppressed when unchanged.
    #[must_use]
    pub fn is_event(&self) -> bool {
        matches!(self, Self::ClearSelection { .. } | Self::DismissShootGroup { .. })
    }
}
