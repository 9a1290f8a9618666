//! Targets and shoot groups: the units the state machine moves around.

#[cfg(test)]
#[path = "target_test.rs"]
mod target_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::{Point, Rect};

/// Fresh random id for targets and groups.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// One rectangle of capturable content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub rect: Rect,
    /// Cursor position when the target was created, kept at the same
    /// offset inside `rect` as the rect moves.
    pub mouse_location: Point,
    pub html: String,
    #[serde(default)]
    pub animated: bool,
}

impl Target {
    #[must_use]
    pub fn new(id: impl Into<String>, rect: Rect, mouse_location: Point, html: impl Into<String>) -> Self {
        Self { id: id.into(), rect, mouse_location, html: html.into(), animated: false }
    }

    /// Take `update`'s geometry, shifting the mouse location by the same
    /// delta the rect origin moved. `html` is never overwritten once set.
    /// Returns whether anything changed.
    pub fn apply_update(&mut self, update: &Target) -> bool {
        let dx = update.rect.x - self.rect.x;
        let dy = update.rect.y - self.rect.y;
        let changed = self.rect != update.rect || self.animated != update.animated;
        self.rect = update.rect;
        self.mouse_location = self.mouse_location.translate(dx, dy);
        self.animated = update.animated;
        if self.html.is_empty() && !update.html.is_empty() {
            self.html.clone_from(&update.html);
            return true;
        }
        changed
    }

    /// Same target moved rigidly by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Target {
        Target {
            rect: self.rect.translate(dx, dy),
            mouse_location: self.mouse_location.translate(dx, dy),
            ..self.clone()
        }
    }
}

/// Outcome of a finished capture, shown to the user briefly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confirmation {
    Success,
    Failure,
}

/// The note a group was captured into.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteInfo {
    pub id: Option<String>,
    pub title: String,
}

/// A named collection of targets captured or selected together.
///
/// Target ids are unique within a group: a later duplicate replaces the
/// earlier one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootGroup {
    pub id: String,
    targets: Vec<Target>,
    pub text: String,
    /// Owning frame.
    pub href: String,
    #[serde(default)]
    pub confirmation: Option<Confirmation>,
    #[serde(default)]
    pub note_info: Option<NoteInfo>,
}

impl ShootGroup {
    #[must_use]
    pub fn new(id: impl Into<String>, targets: Vec<Target>, text: impl Into<String>, href: impl Into<String>) -> Self {
        let mut unique: Vec<Target> = Vec::with_capacity(targets.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(targets.len());
        for t in targets {
            match index.get(&t.id) {
                Some(&i) => unique[i] = t,
                None => {
                    index.insert(t.id.clone(), unique.len());
                    unique.push(t);
                }
            }
        }
        Self { id: id.into(), targets: unique, text: text.into(), href: href.into(), confirmation: None, note_info: None }
    }

    fn index(&self) -> HashMap<&str, usize> {
        self.targets.iter().enumerate().map(|(i, t)| (t.id.as_str(), i)).collect()
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    #[must_use]
    pub fn target(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn target_ids(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.id.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Insert or replace in place by id.
    pub fn upsert(&mut self, target: Target) {
        match self.targets.iter_mut().find(|t| t.id == target.id) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
    }

    /// Apply a geometry update to the matching target. Unknown ids are
    /// ignored.
    pub fn update_target(&mut self, update: &Target) -> bool {
        self.targets
            .iter_mut()
            .find(|t| t.id == update.id)
            .is_some_and(|t| t.apply_update(update))
    }

    /// Apply every update; returns whether any target changed.
    pub fn update_targets(&mut self, updates: &[Target]) -> bool {
        let positions: Vec<Option<usize>> = {
            let index = self.index();
            updates.iter().map(|u| index.get(u.id.as_str()).copied()).collect()
        };
        let mut changed = false;
        for (update, pos) in updates.iter().zip(positions) {
            if let Some(t) = pos.and_then(|i| self.targets.get_mut(i)) {
                changed |= t.apply_update(update);
            }
        }
        changed
    }

    pub fn remove_target(&mut self, id: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        self.targets.len() != before
    }

    /// Precise hit test against the target rects (not their bounding box).
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.targets.iter().any(|t| t.rect.contains(point))
    }

    /// Bounding box of all targets.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.targets.iter().map(|t| t.rect).reduce(|a, b| a.union(&b))
    }

    /// HTML of every target in order.
    #[must_use]
    pub fn html_fragments(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.html.clone()).collect()
    }
}
