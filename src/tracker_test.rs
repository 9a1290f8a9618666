#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::dom::DomStore;
use crate::geom::Rect;

const HREF: &str = "https://example.com/";

struct Page {
    dom: DomStore,
    first: NodeId,
    first_text: NodeId,
    bullet_text: NodeId,
    second: NodeId,
    second_text: NodeId,
}

fn page() -> Page {
    let mut dom = DomStore::new();
    let body = dom.add_element(None, "body", Rect::new(0.0, 0.0, 1000.0, 1000.0));
    let first = dom.add_element(Some(body), "p", Rect::new(10.0, 10.0, 400.0, 20.0));
    let first_text = dom.add_text(first, "Hello", Rect::new(10.0, 10.0, 50.0, 20.0));
    let bullet = dom.add_element(Some(body), "span", Rect::new(10.0, 40.0, 10.0, 20.0));
    let bullet_text = dom.add_text(bullet, "•", Rect::new(10.0, 40.0, 8.0, 20.0));
    let second = dom.add_element(Some(body), "p", Rect::new(10.0, 70.0, 400.0, 20.0));
    let second_text = dom.add_text(second, "World", Rect::new(10.0, 70.0, 60.0, 20.0));
    Page { dom, first, first_text, bullet_text, second, second_text }
}

fn find<'a>(out: &'a [Notification], name: &str) -> Option<&'a Notification> {
    out.iter().find(|n| n.name() == name)
}

// =============================================================================
// SEND / DEDUPE
// =============================================================================

#[test]
fn first_send_reports_full_state_then_nothing() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    let out = tracker.send_bounds(&p.dom);
    let names: Vec<&str> = out.iter().map(Notification::name).collect();
    assert_eq!(names, vec!["hasSelection", "typingOnActiveSurface", "pointBounds", "shootBounds", "selectBounds"]);
    assert!(tracker.send_bounds(&p.dom).is_empty());
}

#[test]
fn viewport_is_reported_as_scroll() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.set_viewport(0.0, 300.0, 800.0, 600.0);
    let out = tracker.send_bounds(&p.dom);
    assert_eq!(out[0], Notification::Scroll { x: 0.0, y: 300.0, width: 800.0, height: 600.0 });
    assert!(tracker.send_bounds(&p.dom).is_empty());

    tracker.set_viewport(0.0, 320.0, 800.0, 600.0);
    let out = tracker.send_bounds(&p.dom);
    assert_eq!(out, vec![Notification::Scroll { x: 0.0, y: 320.0, width: 800.0, height: 600.0 }]);
}

#[test]
fn configured_subtree_limit_bounds_large_elements_by_their_box() {
    let mut dom = DomStore::new();
    let body = dom.add_element(None, "body", Rect::new(0.0, 0.0, 1000.0, 1000.0));
    let list = dom.add_element(Some(body), "div", Rect::new(0.0, 0.0, 500.0, 500.0));
    let a = dom.add_element(Some(list), "p", Rect::new(10.0, 10.0, 400.0, 20.0));
    dom.add_text(a, "Hello", Rect::new(10.0, 10.0, 50.0, 20.0));
    let b = dom.add_element(Some(list), "p", Rect::new(10.0, 40.0, 400.0, 20.0));
    dom.add_text(b, "World", Rect::new(10.0, 40.0, 60.0, 20.0));

    let pointed_rect = |tracker: &mut FrameTracker| match find(&tracker.send_bounds(&dom), "pointBounds") {
        Some(Notification::PointBounds { target: Some(t), .. }) => t.rect,
        other => panic!("unexpected {other:?}"),
    };

    let mut tracker = FrameTracker::new(HREF);
    tracker.point(list);
    assert_eq!(pointed_rect(&mut tracker), Rect::new(10.0, 10.0, 60.0, 50.0));

    let config = EngineConfig { large_subtree_limit: 1, ..EngineConfig::default() };
    let mut tracker = FrameTracker::from_config(HREF, &config);
    tracker.point(list);
    assert_eq!(pointed_rect(&mut tracker), Rect::new(0.0, 0.0, 500.0, 500.0));
}

#[test]
fn changed_state_is_sent_again() {
    let mut p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.point(p.first);
    tracker.send_bounds(&p.dom);
    p.dom.scroll_by(0.0, 5.0);
    let out = tracker.send_bounds(&p.dom);
    assert_eq!(out.len(), 1);
    match &out[0] {
        Notification::PointBounds { target: Some(t), .. } => assert_eq!(t.rect, Rect::new(10.0, 5.0, 50.0, 20.0)),
        other => panic!("unexpected {other:?}"),
    }
    tracker.set_typing(true);
    let out = tracker.send_bounds(&p.dom);
    assert_eq!(out, vec![Notification::TypingOnActiveSurface(true)]);
}

// =============================================================================
// POINT / SHOOT
// =============================================================================

#[test]
fn point_reports_content_bounds_and_html() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.set_mouse(Point::new(20.0, 15.0));
    tracker.point(p.first);
    let out = tracker.send_bounds(&p.dom);
    let Some(Notification::PointBounds { target: Some(t), text }) = find(&out, "pointBounds") else {
        panic!("no point bounds in {out:?}");
    };
    assert_eq!(t.rect, Rect::new(10.0, 10.0, 50.0, 20.0));
    assert_eq!(t.html, "<p>Hello</p>");
    assert_eq!(t.mouse_location, Point::new(20.0, 15.0));
    assert_eq!(text, "Hello");
}

#[test]
fn repointing_same_node_keeps_id() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.point(p.first);
    let first = tracker.point.clone().unwrap().id;
    tracker.point(p.first);
    assert_eq!(tracker.point.clone().unwrap().id, first);
    tracker.point(p.second);
    assert_ne!(tracker.point.clone().unwrap().id, first);
}

#[test]
fn shooting_a_node_twice_returns_same_id() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    let a = tracker.shoot(p.first);
    let b = tracker.shoot(p.second);
    assert_ne!(a, b);
    assert_eq!(tracker.shoot(p.first), a);
    assert_eq!(tracker.shoots().len(), 2);
}

#[test]
fn shoot_without_bounds_is_dismissed() {
    let mut p = page();
    let mut tracker = FrameTracker::new(HREF);
    let kept = tracker.shoot(p.first);
    let gone = tracker.shoot(p.second);
    p.dom.set_style(p.second, "display", "none");
    let out = tracker.send_bounds(&p.dom);
    let Some(Notification::ShootBounds { groups }) = find(&out, "shootBounds") else {
        panic!("no shoot bounds in {out:?}");
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, kept);
    assert!(out.contains(&Notification::DismissShootGroup { id: gone }));
    assert_eq!(tracker.shoots(), vec![(kept.as_str(), p.first)]);
}

#[test]
fn refresh_drops_disconnected_nodes() {
    let mut p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.point(p.second);
    let gone = tracker.shoot(p.second);
    tracker.shoot(p.first);
    tracker.select(p.first_text, p.second_text);
    p.dom.detach(p.second);
    assert_eq!(tracker.refresh_bounds(&p.dom), vec![gone]);
    assert_eq!(tracker.pointed(), None);
    assert_eq!(tracker.shoots().len(), 1);
    assert_eq!(tracker.selection_count(), 0);
}

#[test]
fn detached_shoot_is_dismissed_on_send() {
    let mut p = page();
    let mut tracker = FrameTracker::new(HREF);
    let gone = tracker.shoot(p.second);
    tracker.send_bounds(&p.dom);
    p.dom.detach(p.second);
    let out = tracker.send_bounds(&p.dom);
    assert!(out.contains(&Notification::DismissShootGroup { id: gone }));
    assert!(tracker.shoots().is_empty());
}

// =============================================================================
// SELECTION
// =============================================================================

#[test]
fn selection_reports_one_target_per_meaningful_run() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.select(p.first_text, p.second_text);
    let out = tracker.send_bounds(&p.dom);
    assert!(out.contains(&Notification::HasSelection(true)));
    let Some(Notification::SelectBounds { groups }) = find(&out, "selectBounds") else {
        panic!("no select bounds in {out:?}");
    };
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.id, tracker.selection_id());
    assert_eq!(group.text, "Hello World");
    let ids: Vec<String> = group.targets.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![format!("{}-0", group.id), format!("{}-1", group.id)]);
    assert_eq!(group.targets[1].rect, Rect::new(10.0, 70.0, 60.0, 20.0));
    assert!(tracker.target_for(&p.dom, "bullet", p.bullet_text).is_none());
}

#[test]
fn reselect_replaces_range_under_same_id() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.select(p.first_text, p.second_text);
    tracker.select(p.second_text, p.second_text);
    assert_eq!(tracker.selection_count(), 1);
    let out = tracker.send_bounds(&p.dom);
    let Some(Notification::SelectBounds { groups }) = find(&out, "selectBounds") else {
        panic!("no select bounds in {out:?}");
    };
    assert_eq!(groups[0].text, "World");
}

#[test]
fn collapse_emits_clear_and_rotates_id() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    let id = tracker.selection_id().to_string();
    tracker.select(p.first_text, p.first_text);
    assert_eq!(tracker.collapse_selection(), Some(Notification::ClearSelection { id: id.clone() }));
    assert_ne!(tracker.selection_id(), id);
    assert_eq!(tracker.collapse_selection(), None);
}

// =============================================================================
// REMOVE
// =============================================================================

#[test]
fn remove_target_touches_only_the_owning_collection() {
    let p = page();
    let mut tracker = FrameTracker::new(HREF);
    tracker.point(p.first);
    let shot = tracker.shoot(p.first);
    tracker.select(p.first_text, p.second_text);
    assert!(tracker.remove_target(&shot));
    assert_eq!(tracker.pointed(), Some(p.first));
    assert_eq!(tracker.selection_count(), 1);
    assert!(!tracker.remove_target("unknown"));
    let range = tracker.selection_id().to_string();
    assert!(tracker.remove_target(&range));
    assert_eq!(tracker.selection_count(), 0);
    assert_eq!(tracker.pointed(), Some(p.first));
}
