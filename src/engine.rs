//! Point/select/shoot state machine.
//!
//! `EngineCore` owns every piece of interaction state for one page: the
//! active point, select and shoot groups, the groups already collected or
//! dismissed, the frame registry used to translate frame-local geometry, and
//! the injected shape cache. All mutation is serial; handlers return an
//! [`Action`] for the host to act on.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::Duration;

use crate::config::EngineConfig;
use crate::frames::{FrameInfo, FrameRegistry};
use crate::geom::{Point, Rect};
use crate::input::Modifiers;
use crate::notification::{Notification, RangeBounds};
use crate::shape::{GroupPath, MemoShapeCache, ShapeCache};
use crate::target::{Confirmation, NoteInfo, ShootGroup, Target, new_id};

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    RenderNeeded,
    /// A point or select group became the shoot group.
    ShootActivated { group_id: String },
    /// A click landed inside the shoot group; the host should capture it.
    ShootConfirmed { group_id: String },
    ShootDismissed { group_id: String },
    /// A capture finished; show `confirmation` for `duration`, then call
    /// [`EngineCore::clear_confirmation`].
    ConfirmationShown { group_id: String, confirmation: Confirmation, duration: Duration },
}

/// Coarse interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Pointing,
    Selecting,
    Shooting,
}

/// Snapshot of a shoot group handed to the capture pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub group_id: String,
    pub html: Vec<String>,
    pub text: String,
    pub href: String,
    /// Page generation at capture start; results from an older page are
    /// discarded.
    pub generation: u64,
}

/// Core engine state, independent of any rendering host.
pub struct EngineCore {
    config: EngineConfig,
    frames: FrameRegistry,
    shape_cache: Box<dyn ShapeCache>,
    point: Option<ShootGroup>,
    select: Option<ShootGroup>,
    shoot: Option<ShootGroup>,
    confirmation: Option<ShootGroup>,
    collected: Vec<ShootGroup>,
    dismissed: Vec<ShootGroup>,
    is_modifier_key_down: bool,
    has_active_selection: bool,
    is_typing_on_active_surface: bool,
    mouse_location: Point,
    capture_generation: u64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineCore {
    /// Engine with a memoizing shape cache.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_shape_cache(config, Box::new(MemoShapeCache::new()))
    }

    #[must_use]
    pub fn with_shape_cache(config: EngineConfig, shape_cache: Box<dyn ShapeCache>) -> Self {
        let frames = FrameRegistry::new(config.max_frame_depth);
        Self {
            config,
            frames,
            shape_cache,
            point: None,
            select: None,
            shoot: None,
            confirmation: None,
            collected: Vec::new(),
            dismissed: Vec::new(),
            is_modifier_key_down: false,
            has_active_selection: false,
            is_typing_on_active_surface: false,
            mouse_location: Point::default(),
            capture_generation: 0,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn frames(&self) -> &FrameRegistry {
        &self.frames
    }

    #[must_use]
    pub fn status(&self) -> Status {
        if self.shoot.is_some() {
            Status::Shooting
        } else if self.select.is_some() {
            Status::Selecting
        } else if self.point.is_some() {
            Status::Pointing
        } else {
            Status::Idle
        }
    }

    #[must_use]
    pub fn point_group(&self) -> Option<&ShootGroup> {
        self.point.as_ref()
    }

    #[must_use]
    pub fn select_group(&self) -> Option<&ShootGroup> {
        self.select.as_ref()
    }

    #[must_use]
    pub fn shoot_group(&self) -> Option<&ShootGroup> {
        self.shoot.as_ref()
    }

    #[must_use]
    pub fn confirmation_group(&self) -> Option<&ShootGroup> {
        self.confirmation.as_ref()
    }

    #[must_use]
    pub fn collected_groups(&self) -> &[ShootGroup] {
        &self.collected
    }

    #[must_use]
    pub fn dismissed_groups(&self) -> &[ShootGroup] {
        &self.dismissed
    }

    #[must_use]
    pub fn is_modifier_key_down(&self) -> bool {
        self.is_modifier_key_down
    }

    #[must_use]
    pub fn has_active_selection(&self) -> bool {
        self.has_active_selection
    }

    #[must_use]
    pub fn is_typing_on_active_surface(&self) -> bool {
        self.is_typing_on_active_surface
    }

    #[must_use]
    pub fn mouse_location(&self) -> Point {
        self.mouse_location
    }

    #[must_use]
    pub fn capture_generation(&self) -> u64 {
        self.capture_generation
    }

    /// Union path of a live group, served through the shape cache.
    pub fn group_path(&mut self, group_id: &str) -> Option<GroupPath> {
        let group = [&self.shoot, &self.select, &self.point, &self.confirmation]
            .into_iter()
            .flatten()
            .chain(&self.collected)
            .find(|g| g.id == group_id)?;
        Some(self.shape_cache.group_path(group))
    }

    // --- Targets ---

    /// Target with a fresh id, mapped from `href`'s viewport into root
    /// coordinates.
    #[must_use]
    pub fn create_target(&self, rect: Rect, mouse: Point, html: &str, href: &str) -> Target {
        self.frames.translate_target(&Target::new(new_id(), rect, mouse, html), href)
    }

    /// Square target centred on the cursor, used when nothing meaningful is
    /// under it.
    #[must_use]
    pub fn cursor_target(&self, mouse: Point, href: &str) -> Target {
        let size = self.config.cursor_size;
        let rect = Rect::new(mouse.x - size / 2.0, mouse.y - size / 2.0, size, size);
        self.create_target(rect, mouse, "", href)
    }

    fn all_to_root(&self, targets: &[Target], href: &str) -> Vec<Target> {
        targets.iter().map(|t| self.frames.translate_target(t, href)).collect()
    }

    // --- Pointing and selecting ---

    /// Replace the point group with a single-target group.
    pub fn point(&mut self, target: Target, text: &str, href: &str) -> Action {
        let previous = self.point.replace(ShootGroup::new(new_id(), vec![target], text, href));
        self.forget(previous);
        Action::RenderNeeded
    }

    pub fn unpoint(&mut self) -> Action {
        let previous = self.point.take();
        let action = render_if(previous.is_some());
        self.forget(previous);
        action
    }

    pub fn set_has_active_selection(&mut self, active: bool) {
        self.has_active_selection = active;
    }

    pub fn set_typing_on_active_surface(&mut self, typing: bool) {
        self.is_typing_on_active_surface = typing;
    }

    /// Record the targets of selection `id`. Dropped unless a selection is
    /// active.
    pub fn select(&mut self, id: &str, targets: Vec<Target>, text: &str, href: &str) -> Action {
        if !self.has_active_selection || targets.is_empty() {
            return Action::None;
        }
        if let Some(group) = self.collected.iter_mut().find(|g| g.id == id) {
            return render_if(group.update_targets(&targets));
        }
        if self.dismissed.iter().any(|g| g.id == id) {
            return Action::None;
        }
        if let Some(group) = self.shoot.as_mut().filter(|g| g.id == id) {
            return render_if(group.update_targets(&targets));
        }
        if let Some(group) = self.select.as_mut().filter(|g| g.id == id) {
            return render_if(group.update_targets(&targets));
        }
        tracing::debug!(group_id = %id, targets = targets.len(), "selection started");
        let previous = self.select.replace(ShootGroup::new(id, targets, text, href));
        self.forget(previous);
        Action::RenderNeeded
    }

    /// The selection `id` collapsed.
    pub fn clear_selection(&mut self, id: &str) -> Action {
        self.has_active_selection = false;
        match self.select.take_if(|g| g.id == id) {
            Some(group) => {
                self.dismiss(group);
                Action::RenderNeeded
            }
            None => Action::None,
        }
    }

    // --- Shooting ---

    /// Promote the select group (preferred) or point group to the shoot
    /// group when the designated modifier is held.
    pub fn refresh(&mut self, mouse: Point, modifiers: Modifiers) -> Action {
        self.mouse_location = mouse;
        self.is_modifier_key_down = self.config.modifier.is_down(modifiers);
        if !self.is_modifier_key_down || self.shoot.is_some() || self.is_typing_on_active_surface {
            return Action::None;
        }
        let Some(group) = self.select.take().or_else(|| self.point.take()) else {
            return Action::None;
        };
        let stale = self.point.take();
        self.forget(stale);
        let group_id = group.id.clone();
        tracing::debug!(group_id = %group_id, targets = group.targets().len(), "shoot activated");
        self.shoot = Some(group);
        Action::ShootActivated { group_id }
    }

    /// Shoot `target` into `group_id`: added to that group when it is the
    /// active one, or starting it when nothing is being shot.
    pub fn point_shoot(&mut self, group_id: &str, target: Target, text: &str, href: &str) -> Action {
        if self.is_typing_on_active_surface {
            return Action::None;
        }
        match self.shoot.as_mut() {
            Some(group) if group.id == group_id => {
                group.upsert(target);
                Action::RenderNeeded
            }
            Some(group) => {
                tracing::debug!(active = %group.id, ignored = %group_id, "shoot already active");
                Action::None
            }
            None => {
                let stale = [self.point.take(), self.select.take()];
                for group in stale {
                    self.forget(group);
                }
                self.shoot = Some(ShootGroup::new(group_id, vec![target], text, href));
                Action::ShootActivated { group_id: group_id.to_string() }
            }
        }
    }

    // --- Geometry updates ---

    fn live_groups_mut(&mut self) -> impl Iterator<Item = &mut ShootGroup> {
        [&mut self.point, &mut self.select, &mut self.shoot, &mut self.confirmation]
            .into_iter()
            .flatten()
            .chain(self.collected.iter_mut())
    }

    /// Apply new geometry to the target with the same id in every live group.
    pub fn update_target(&mut self, target: &Target) -> Action {
        let mut changed = false;
        for group in self.live_groups_mut() {
            changed |= group.update_target(target);
        }
        render_if(changed)
    }

    /// Apply new geometry to the targets of one group.
    pub fn update_targets(&mut self, group_id: &str, targets: &[Target]) -> Action {
        let changed = self
            .live_groups_mut()
            .find(|g| g.id == group_id)
            .is_some_and(|g| g.update_targets(targets));
        render_if(changed)
    }

    /// Fan frame-local target updates from `href` out to every live group.
    pub fn update_shoots(&mut self, targets: &[Target], href: &str) -> Action {
        let translated = self.all_to_root(targets, href);
        let mut changed = false;
        for group in self.live_groups_mut() {
            changed |= group.update_targets(&translated);
        }
        render_if(changed)
    }

    // --- Ending a shoot ---

    /// A click inside the shoot group's region confirms it; anywhere else
    /// dismisses it.
    pub fn handle_mouse_click(&mut self, point: Point) -> Action {
        let Some(group) = self.shoot.as_ref() else {
            return Action::None;
        };
        if self.shape_cache.group_path(group).contains(point) {
            return Action::ShootConfirmed { group_id: group.id.clone() };
        }
        match self.shoot.take() {
            Some(group) => {
                let group_id = group.id.clone();
                self.dismiss(group);
                Action::ShootDismissed { group_id }
            }
            None => Action::None,
        }
    }

    /// Dismiss the select and shoot groups and hide any confirmation.
    pub fn cancel_shoot(&mut self) -> Action {
        self.confirmation = None;
        if let Some(group) = self.select.take() {
            self.dismiss(group);
        }
        match self.shoot.take() {
            Some(group) => {
                let group_id = group.id.clone();
                self.dismiss(group);
                Action::ShootDismissed { group_id }
            }
            None => Action::RenderNeeded,
        }
    }

    /// Remove one target from whichever active group holds it. A group left
    /// empty is dismissed.
    pub fn remove_target(&mut self, target_id: &str) -> Action {
        for slot in [&mut self.shoot, &mut self.select, &mut self.point] {
            let Some(group) = slot.as_mut() else { continue };
            if !group.remove_target(target_id) {
                continue;
            }
            if let Some(empty) = slot.take_if(|g| g.is_empty()) {
                self.shape_cache.invalidate(&empty.id);
                self.dismissed.push(empty);
            }
            return Action::RenderNeeded;
        }
        Action::None
    }

    /// Reset everything for a new page. In-flight captures are not aborted;
    /// their results are discarded on arrival.
    pub fn leave_page(&mut self) -> Action {
        tracing::debug!(generation = self.capture_generation, "leaving page");
        self.point = None;
        self.select = None;
        self.shoot = None;
        self.confirmation = None;
        self.collected.clear();
        self.dismissed.clear();
        self.is_modifier_key_down = false;
        self.has_active_selection = false;
        self.is_typing_on_active_surface = false;
        self.mouse_location = Point::default();
        self.frames.clear();
        self.shape_cache.clear();
        self.capture_generation += 1;
        Action::RenderNeeded
    }

    /// Drop the cached path of a group discarded without being dismissed.
    fn forget(&mut self, group: Option<ShootGroup>) {
        if let Some(group) = group {
            self.shape_cache.invalidate(&group.id);
        }
    }

    fn dismiss(&mut self, group: ShootGroup) {
        tracing::debug!(group_id = %group.id, "group dismissed");
        self.shape_cache.invalidate(&group.id);
        self.dismissed.push(group);
    }

    // --- Capture lifecycle ---

    /// Snapshot the shoot group for the capture pipeline.
    #[must_use]
    pub fn begin_capture(&self) -> Option<CaptureRequest> {
        self.shoot.as_ref().map(|g| CaptureRequest {
            group_id: g.id.clone(),
            html: g.html_fragments(),
            text: g.text.clone(),
            href: g.href.clone(),
            generation: self.capture_generation,
        })
    }

    /// Land a finished capture. Results for a group that is no longer the
    /// shoot group, or from before a page change, are discarded.
    pub fn finish_capture(
        &mut self,
        request: &CaptureRequest,
        confirmation: Confirmation,
        note_info: Option<NoteInfo>,
    ) -> Action {
        if request.generation != self.capture_generation {
            tracing::debug!(group_id = %request.group_id, "capture from previous page discarded");
            return Action::None;
        }
        let Some(mut group) = self.shoot.take_if(|g| g.id == request.group_id) else {
            tracing::debug!(group_id = %request.group_id, "capture for inactive group discarded");
            return Action::None;
        };
        group.confirmation = Some(confirmation);
        group.note_info = note_info;
        self.confirmation = Some(group.clone());
        match confirmation {
            Confirmation::Success => {
                tracing::info!(group_id = %group.id, targets = group.targets().len(), "group collected");
                self.collected.push(group);
            }
            Confirmation::Failure => self.dismiss(group),
        }
        Action::ConfirmationShown {
            group_id: request.group_id.clone(),
            confirmation,
            duration: self.config.confirmation(),
        }
    }

    pub fn clear_confirmation(&mut self) -> Action {
        render_if(self.confirmation.take().is_some())
    }

    // --- Frame messages ---

    pub fn register_frame(&mut self, info: FrameInfo) -> Action {
        render_if(self.frames.register_frame(info))
    }

    /// Record a frame's scroll offset. Scrolling the root moves every
    /// translated child-frame target.
    pub fn update_scroll(&mut self, href: &str, scroll_x: f64, scroll_y: f64) -> Action {
        render_if(self.frames.update_scroll(href, scroll_x, scroll_y))
    }

    /// Apply a notification sent by the frame at `href`.
    pub fn on_message(&mut self, href: &str, notification: Notification) -> Vec<Action> {
        match notification {
            Notification::PointBounds { target: Some(target), text } => {
                let target = self.frames.translate_target(&target, href);
                vec![self.point(target, &text, href)]
            }
            Notification::PointBounds { target: None, .. } => vec![self.unpoint()],
            Notification::SelectBounds { groups } => groups
                .into_iter()
                .map(|g| {
                    let targets = self.all_to_root(&g.targets, href);
                    self.select(&g.id, targets, &g.text, href)
                })
                .collect(),
            Notification::ShootBounds { groups } => {
                groups.into_iter().map(|g| self.apply_shoot_bounds(g, href)).collect()
            }
            Notification::HasSelection(active) => {
                self.set_has_active_selection(active);
                vec![Action::None]
            }
            Notification::ClearSelection { id } => vec![self.clear_selection(&id)],
            Notification::TypingOnActiveSurface(typing) => {
                self.set_typing_on_active_surface(typing);
                vec![Action::None]
            }
            Notification::FramesInfo(frames) => {
                let changed = frames.into_iter().fold(false, |acc, f| self.frames.register_frame(f) | acc);
                vec![render_if(changed)]
            }
            Notification::Scroll { x, y, width, height } => {
                let scrolled = self.frames.update_scroll(href, x, y);
                let resized = self.frames.update_size(href, width, height);
                vec![render_if(scrolled | resized)]
            }
            Notification::DismissShootGroup { id } => match self.shoot.take_if(|g| g.id == id) {
                Some(group) => {
                    self.dismiss(group);
                    vec![Action::ShootDismissed { group_id: id }]
                }
                None => vec![Action::None],
            },
        }
    }

    /// Known groups take the new geometry; an unknown group is a fresh shot.
    fn apply_shoot_bounds(&mut self, group: RangeBounds, href: &str) -> Action {
        let targets = self.all_to_root(&group.targets, href);
        if self.dismissed.iter().any(|g| g.id == group.id) {
            return Action::None;
        }
        let known = self.shoot.iter().chain(&self.confirmation).chain(&self.collected).any(|g| g.id == group.id);
        if known {
            return self.update_targets(&group.id, &targets);
        }
        let mut action = Action::None;
        for target in targets {
            action = self.point_shoot(&group.id, target, &group.text, href);
        }
        action
    }
}

fn render_if(changed: bool) -> Action {
    if changed { Action::RenderNeeded } else { Action::None }
}
