//! Union paths for groups of target rects, and the caches that keep them.
//!
//! A [`GroupPath`] is the true geometric union of a group's rects stored as
//! horizontal bands of disjoint spans, so hit testing never falls back to a
//! bounding box. [`MemoShapeCache`] rebuilds a path only when a group's
//! membership or geometry changed, and translates the cached path when every
//! target moved by the same delta (the scroll case).

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::collections::HashMap;

use crate::geom::{Point, Rect};
use crate::target::ShootGroup;

/// One horizontal strip of the union with its covered x-intervals.
#[derive(Debug, Clone, PartialEq)]
struct Band {
    top: f64,
    bottom: f64,
    spans: Vec<(f64, f64)>,
}

/// Union of a set of rects as disjoint bands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupPath {
    bands: Vec<Band>,
}

impl GroupPath {
    /// Sweep the rects top to bottom, merging x-intervals per band and
    /// coalescing vertically adjacent bands with identical spans.
    #[must_use]
    pub fn from_rects(rects: &[Rect]) -> Self {
        let mut sorted: Vec<Rect> = rects.iter().filter(|r| !r.is_empty()).copied().collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));

        let mut edges: Vec<f64> = sorted.iter().flat_map(|r| [r.y, r.bottom()]).collect();
        edges.sort_by(f64::total_cmp);
        edges.dedup();

        let mut bands: Vec<Band> = Vec::new();
        let mut active: Vec<Rect> = Vec::new();
        let mut next = 0;
        for pair in edges.windows(2) {
            let (top, bottom) = (pair[0], pair[1]);
            while next < sorted.len() && sorted[next].y <= top {
                active.push(sorted[next]);
                next += 1;
            }
            active.retain(|r| r.bottom() > top);
            let spans = merge_spans(active.iter().map(|r| (r.x, r.right())).collect());
            if spans.is_empty() {
                continue;
            }
            match bands.last_mut() {
                Some(last) if last.bottom == top && last.spans == spans => last.bottom = bottom,
                _ => bands.push(Band { top, bottom, spans }),
            }
        }
        Self { bands }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Disjoint rects covering exactly the union.
    #[must_use]
    pub fn rects(&self) -> Vec<Rect> {
        self.bands
            .iter()
            .flat_map(|b| b.spans.iter().map(|&(l, r)| Rect::from_edges(l, b.top, r, b.bottom)))
            .collect()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.bands.first()?;
        let last = self.bands.last()?;
        let left = self.bands.iter().filter_map(|b| b.spans.first()).map(|s| s.0).fold(f64::INFINITY, f64::min);
        let right = self.bands.iter().filter_map(|b| b.spans.last()).map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
        Some(Rect::from_edges(left, first.top, right, last.bottom))
    }

    /// Covered area; overlaps are counted once.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| (b.bottom - b.top) * b.spans.iter().map(|(l, r)| r - l).sum::<f64>())
            .sum()
    }

    /// Inclusive point-in-union test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let idx = self.bands.partition_point(|b| b.bottom < p.y);
        self.bands[idx..]
            .iter()
            .take_while(|b| b.top <= p.y)
            .any(|b| b.spans.iter().any(|&(l, r)| p.x >= l && p.x <= r))
    }

    /// Shift the whole path without recomputing the union.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let bands = self
            .bands
            .iter()
            .map(|b| Band {
                top: b.top + dy,
                bottom: b.bottom + dy,
                spans: b.spans.iter().map(|&(l, r)| (l + dx, r + dx)).collect(),
            })
            .collect();
        Self { bands }
    }
}

fn merge_spans(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (l, r) in spans {
        match out.last_mut() {
            Some(last) if l <= last.1 => last.1 = last.1.max(r),
            _ => out.push((l, r)),
        }
    }
    out
}

// =============================================================================
// CACHES
// =============================================================================

/// Source of group paths. Callers inject the strategy they need.
pub trait ShapeCache: Send {
    fn group_path(&mut self, group: &ShootGroup) -> GroupPath;

    /// Forget whatever is cached for `group_id`.
    fn invalidate(&mut self, group_id: &str);

    fn clear(&mut self);
}

/// Recompute on every access.
#[derive(Debug, Default)]
pub struct RecomputeShapeCache;

impl ShapeCache for RecomputeShapeCache {
    fn group_path(&mut self, group: &ShootGroup) -> GroupPath {
        let rects: Vec<Rect> = group.targets().iter().map(|t| t.rect).collect();
        GroupPath::from_rects(&rects)
    }

    fn invalidate(&mut self, _group_id: &str) {}

    fn clear(&mut self) {}
}

#[derive(Debug)]
struct Entry {
    /// `(target id, rect)` as of the last build, in group order.
    snapshot: Vec<(String, Rect)>,
    path: GroupPath,
}

/// How the cache satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Translated,
    Rebuilt,
}

/// Memoizing cache keyed by group id.
#[derive(Debug, Default)]
pub struct MemoShapeCache {
    entries: HashMap<String, Entry>,
    last_outcome: Option<CacheOutcome>,
}

impl MemoShapeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome of the most recent lookup.
    #[must_use]
    pub fn last_outcome(&self) -> Option<CacheOutcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const DELTA_EPSILON: f64 = 1e-9;

/// Common delta when every rect moved rigidly by the same amount.
fn rigid_delta(old: &[(String, Rect)], group: &ShootGroup) -> Option<(f64, f64)> {
    let targets = group.targets();
    if old.len() != targets.len() {
        return None;
    }
    let (first_old, first_new) = (old.first()?, targets.first()?);
    let dx = first_new.rect.x - first_old.1.x;
    let dy = first_new.rect.y - first_old.1.y;
    let rigid = old.iter().zip(targets).all(|((id, o), t)| {
        *id == t.id
            && o.same_size(&t.rect)
            && (t.rect.x - o.x - dx).abs() < DELTA_EPSILON
            && (t.rect.y - o.y - dy).abs() < DELTA_EPSILON
    });
    rigid.then_some((dx, dy))
}

impl ShapeCache for MemoShapeCache {
    fn group_path(&mut self, group: &ShootGroup) -> GroupPath {
        let outcome = match self.entries.get_mut(&group.id) {
            Some(entry) => match rigid_delta(&entry.snapshot, group) {
                Some((dx, dy)) if dx == 0.0 && dy == 0.0 => CacheOutcome::Hit,
                Some((dx, dy)) => {
                    entry.path = entry.path.translated(dx, dy);
                    CacheOutcome::Translated
                }
                None => CacheOutcome::Rebuilt,
            },
            None => CacheOutcome::Rebuilt,
        };
        let snapshot: Vec<(String, Rect)> = group.targets().iter().map(|t| (t.id.clone(), t.rect)).collect();
        let entry = self.entries.entry(group.id.clone()).or_insert_with(|| Entry {
            snapshot: Vec::new(),
            path: GroupPath::default(),
        });
        if outcome == CacheOutcome::Rebuilt {
            let rects: Vec<Rect> = snapshot.iter().map(|(_, r)| *r).collect();
            entry.path = GroupPath::from_rects(&rects);
        }
        entry.snapshot = snapshot;
        self.last_outcome = Some(outcome);
        entry.path.clone()
    }

    fn invalidate(&mut self, group_id: &str) {
        self.entries.remove(group_id);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.last_outcome = None;
    }
}
