#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

// --- Point ---

#[test]
fn point_translate_is_rigid() {
    let p = Point::new(3.0, 4.0).translate(10.0, -2.0);
    assert_eq!(p, Point::new(13.0, 2.0));
}

// --- Rect ---

#[test]
fn rect_edges() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.right(), 40.0);
    assert_eq!(r.bottom(), 60.0);
    assert_eq!(r.origin(), Point::new(10.0, 20.0));
}

#[test]
fn rect_from_inverted_edges_is_empty() {
    let r = Rect::from_edges(50.0, 50.0, 10.0, 10.0);
    assert!(r.is_empty());
    assert_eq!(r.width, 0.0);
}

#[test]
fn rect_contains_is_inclusive() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(!r.contains(Point::new(10.1, 5.0)));
}

#[test]
fn rect_union_covers_both() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, 5.0, 10.0, 10.0);
    assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 30.0, 15.0));
}

#[test]
fn rect_intersect_overlap() {
    let a = Rect::new(10.0, 10.0, 100.0, 100.0);
    let b = Rect::new(20.0, 20.0, 200.0, 200.0);
    assert_eq!(a.intersect(&b), Some(Rect::new(20.0, 20.0, 90.0, 90.0)));
}

#[test]
fn rect_intersect_touching_edges_is_none() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 0.0, 10.0, 10.0);
    assert_eq!(a.intersect(&b), None);
}

// --- ClipArea ---

#[test]
fn unbounded_clip_leaves_rect_alone() {
    let r = Rect::new(-500.0, 3.0, 1e6, 2.0);
    assert_eq!(ClipArea::UNBOUNDED.clip(&r), Some(r));
    assert!(ClipArea::default().is_unbounded());
}

#[test]
fn horizontal_clip_only_limits_x() {
    let area = ClipArea::horizontal(&Rect::new(0.0, 0.0, 50.0, 50.0));
    let clipped = area.clip(&Rect::new(-10.0, -100.0, 100.0, 500.0));
    assert_eq!(clipped, Some(Rect::new(0.0, -100.0, 50.0, 500.0)));
}

#[test]
fn vertical_clip_only_limits_y() {
    let area = ClipArea::vertical(&Rect::new(0.0, 0.0, 50.0, 50.0));
    let clipped = area.clip(&Rect::new(-10.0, -100.0, 100.0, 500.0));
    assert_eq!(clipped, Some(Rect::new(-10.0, 0.0, 100.0, 50.0)));
}

#[test]
fn clip_intersection_of_bands_is_a_box() {
    let r = Rect::new(0.0, 0.0, 50.0, 50.0);
    let area = ClipArea::horizontal(&r).intersect(&ClipArea::vertical(&r));
    assert_eq!(area, ClipArea::from_rect(&r));
}

#[test]
fn clip_disjoint_is_none() {
    let area = ClipArea::from_rect(&Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(area.clip(&Rect::new(20.0, 20.0, 5.0, 5.0)), None);
}
