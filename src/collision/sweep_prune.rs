//! Sweep-and-prune broad phase.
//!
//! Every tracked body contributes a min and a max endpoint per axis. Each
//! update refreshes the endpoint values, restores order with an insertion
//! sort (the lists are nearly sorted between steps) and sweeps every axis
//! with an active list. A pair becomes a candidate once it overlaps on both
//! axes.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::math::Vec2;
use crate::objects::{BodyId, BodySet};

const AXES: usize = 2;

/// Pair flag once overlap has been confirmed on every axis.
const FULL_OVERLAP: u32 = 1 << 1 << AXES;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Endpoint {
    value: f64,
    body: BodyId,
    is_max: bool,
}

impl Endpoint {
    /// Whether this endpoint must sort after `other`. Equal-valued mins come
    /// before maxes so touching boxes still register as overlapping.
    fn sorts_after(&self, other: &Endpoint) -> bool {
        self.value > other.value || (self.value == other.value && self.is_max && !other.is_max)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pair {
    a: BodyId,
    b: BodyId,
    flag: u32,
}

/// Order-independent key for a pair of bodies.
pub fn pair_key(a: BodyId, b: BodyId) -> u64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    ((lo.raw() as u64) << 32) | hi.raw() as u64
}

#[derive(Debug, Default)]
pub struct SweepAndPrune {
    tracked: FxHashSet<BodyId>,
    intervals: [Vec<Endpoint>; AXES],
    pairs: FxHashMap<u64, Pair>,
    candidates: Vec<(BodyId, BodyId)>,
    active: Vec<BodyId>,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `id`. Its endpoints are positioned on the next update.
    pub fn track(&mut self, id: BodyId) {
        if !self.tracked.insert(id) {
            return;
        }
        for list in &mut self.intervals {
            let value = list.last().map_or(0.0, |e| e.value);
            list.push(Endpoint {
                value,
                body: id,
                is_max: false,
            });
            list.push(Endpoint {
                value,
                body: id,
                is_max: true,
            });
        }
    }

    /// Stops tracking `id` and forgets every pair it belonged to.
    pub fn untrack(&mut self, id: BodyId) {
        if !self.tracked.remove(&id) {
            return;
        }
        for list in &mut self.intervals {
            list.retain(|e| e.body != id);
        }
        self.pairs.retain(|_, pair| pair.a != id && pair.b != id);
        self.candidates.retain(|&(a, b)| a != id && b != id);
    }

    pub fn is_tracked(&self, id: BodyId) -> bool {
        self.tracked.contains(&id)
    }

    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    /// Candidates produced by the last update.
    pub fn candidates(&self) -> &[(BodyId, BodyId)] {
        &self.candidates
    }

    /// Refreshes the intervals from the bodies' current AABBs and returns the
    /// candidate pairs, in the order the sweep confirmed them.
    pub fn update(&mut self, bodies: &BodySet) -> &[(BodyId, BodyId)] {
        self.update_intervals(bodies);
        for list in &mut self.intervals {
            insertion_sort(list);
        }
        self.check_overlaps();
        debug!(
            tracked = self.tracked.len(),
            pairs = self.pairs.len(),
            candidates = self.candidates.len(),
            "broad phase updated"
        );
        &self.candidates
    }

    fn update_intervals(&mut self, bodies: &BodySet) {
        let bounds: FxHashMap<BodyId, (Vec2, Vec2)> = bodies
            .iter()
            .filter(|(id, _)| self.tracked.contains(id))
            .map(|(id, body)| {
                let aabb = body.aabb();
                (id, (aabb.min(), aabb.max()))
            })
            .collect();
        for (axis, list) in self.intervals.iter_mut().enumerate() {
            for endpoint in list.iter_mut() {
                if let Some(&(min, max)) = bounds.get(&endpoint.body) {
                    endpoint.value = if endpoint.is_max {
                        max.axis(axis)
                    } else {
                        min.axis(axis)
                    };
                }
            }
        }
    }

    fn check_overlaps(&mut self) {
        for pair in self.pairs.values_mut() {
            pair.flag = 0;
        }
        self.candidates.clear();

        for axis in 0..AXES {
            self.active.clear();
            for endpoint in &self.intervals[axis] {
                if !endpoint.is_max {
                    self.active.push(endpoint.body);
                    continue;
                }
                if let Some(pos) = self.active.iter().position(|&b| b == endpoint.body) {
                    self.active.swap_remove(pos);
                }
                for &other in &self.active {
                    let key = pair_key(endpoint.body, other);
                    let pair = if axis == 0 {
                        let (a, b) = if other < endpoint.body {
                            (other, endpoint.body)
                        } else {
                            (endpoint.body, other)
                        };
                        let pair = self.pairs.entry(key).or_insert(Pair { a, b, flag: 0 });
                        pair.flag = 1;
                        pair
                    } else {
                        match self.pairs.get_mut(&key) {
                            Some(pair) => pair,
                            None => continue,
                        }
                    };
                    if pair.flag < FULL_OVERLAP {
                        pair.flag <<= axis + 1;
                        if pair.flag == FULL_OVERLAP {
                            self.candidates.push((pair.a, pair.b));
                        }
                    }
                }
            }
        }
    }
}

fn insertion_sort(list: &mut [Endpoint]) {
    for i in 1..list.len() {
        let bound = list[i];
        let mut j = i;
        while j > 0 && list[j - 1].sorts_after(&bound) {
            list[j] = list[j - 1];
            j -= 1;
        }
        list[j] = bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::RigidBody;
    use crate::shapes::{Polygon, Shape};

    fn square_at(x: f64, y: f64, half: f64) -> RigidBody {
        RigidBody::new(1.0, Shape::Polygon(Polygon::rectangle(2.0 * half, 2.0 * half).unwrap()))
            .unwrap()
            .with_position(Vec2::new(x, y))
    }

    fn tracked(bodies: &BodySet) -> SweepAndPrune {
        let mut sap = SweepAndPrune::new();
        for id in bodies.ids() {
            sap.track(id);
        }
        sap
    }

    #[test]
    fn test_three_bodies_on_a_line() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(square_at(0.0, 0.0, 3.0));
        let b = bodies.insert(square_at(5.0, 0.0, 3.0));
        let _c = bodies.insert(square_at(20.0, 0.0, 3.0));
        let mut sap = tracked(&bodies);
        // [-3, 3] and [2, 8] overlap; [17, 23] overlaps neither.
        assert_eq!(sap.update(&bodies), &[(a, b)]);
    }

    #[test]
    fn test_touching_boxes_are_candidates() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(square_at(0.0, 0.0, 1.0));
        let b = bodies.insert(square_at(2.0, 2.0, 1.0));
        let mut sap = tracked(&bodies);
        assert_eq!(sap.update(&bodies), &[(a, b)]);
    }

    #[test]
    fn test_overlap_on_one_axis_only_is_not_a_candidate() {
        let mut bodies = BodySet::new();
        bodies.insert(square_at(0.0, 0.0, 1.0));
        bodies.insert(square_at(0.5, 10.0, 1.0));
        let mut sap = tracked(&bodies);
        assert!(sap.update(&bodies).is_empty());
    }

    #[test]
    fn test_candidates_follow_motion_between_updates() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(square_at(0.0, 0.0, 1.0));
        let b = bodies.insert(square_at(10.0, 0.0, 1.0));
        let mut sap = tracked(&bodies);
        assert!(sap.update(&bodies).is_empty());

        bodies.get_mut(b).unwrap().position = Vec2::new(1.5, 0.5);
        assert_eq!(sap.update(&bodies), &[(a, b)]);

        // Moving apart again clears the stale flag.
        bodies.get_mut(b).unwrap().position = Vec2::new(1.5, 5.0);
        assert!(sap.update(&bodies).is_empty());
    }

    #[test]
    fn test_untrack_drops_pairs() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(square_at(0.0, 0.0, 1.0));
        let b = bodies.insert(square_at(1.0, 0.0, 1.0));
        let mut sap = tracked(&bodies);
        assert_eq!(sap.update(&bodies).len(), 1);
        sap.untrack(b);
        assert!(!sap.is_tracked(b));
        assert!(sap.candidates().is_empty());
        assert!(sap.update(&bodies).is_empty());
        assert!(sap.is_tracked(a));
        assert_eq!(sap.tracked_len(), 1);
    }

    #[test]
    fn test_insertion_sort_puts_mins_before_maxes() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(RigidBody::new(1.0, Shape::Point).unwrap());
        let mut list = vec![
            Endpoint { value: 1.0, body: a, is_max: true },
            Endpoint { value: 1.0, body: a, is_max: false },
            Endpoint { value: 0.0, body: a, is_max: true },
        ];
        insertion_sort(&mut list);
        assert_eq!(list[0].value, 0.0);
        assert!(!list[1].is_max);
        assert!(list[2].is_max);
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(RigidBody::new(1.0, Shape::Point).unwrap());
        let b = bodies.insert(RigidBody::new(1.0, Shape::Point).unwrap());
        assert_eq!(pair_key(a, b), pair_key(b, a));
        assert_ne!(pair_key(a, a), pair_key(a, b));
    }
}
