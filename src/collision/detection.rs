//! Narrow phase: exact pair tests producing collision manifolds.

use tracing::trace;

use super::aabb::Aabb;
use super::gjk::{gjk, Support, SupportPoint};
use super::manifold::CollisionManifold;
use crate::common::PhysicsConfig;
use crate::math::{Transform, Vec2};
use crate::objects::{BodyId, RigidBody, Treatment};
use crate::shapes::{Circle, Compound, CompoundChild, Shape};

/// A shape placed in the world on behalf of a registered body.
///
/// Compound children are tested through views that carry the compound's id,
/// treatment and position, so every manifold they produce names the compound
/// and measures its contact point from the compound's center.
#[derive(Debug, Clone, Copy)]
pub struct Collider<'a> {
    pub id: BodyId,
    pub shape: &'a Shape,
    /// Shape-local to world.
    pub transform: Transform,
    /// Reference point that contact points are measured from.
    pub position: Vec2,
    pub treatment: Treatment,
}

impl<'a> Collider<'a> {
    pub fn from_body(id: BodyId, body: &'a RigidBody) -> Self {
        Self {
            id,
            shape: &body.shape,
            transform: body.transform(),
            position: body.position,
            treatment: body.treatment,
        }
    }

    /// View of a compound child at its place in the world.
    pub fn child(&self, child: &'a CompoundChild) -> Self {
        Self {
            id: self.id,
            shape: &child.body.shape,
            transform: self.transform.compose(&child.local_transform()),
            position: self.position,
            treatment: self.treatment,
        }
    }

    /// World position of the shape's local origin.
    pub fn center(&self) -> Vec2 {
        self.transform.apply(Vec2::ZERO)
    }

    pub fn aabb(&self) -> Aabb {
        let local = self.shape.local_aabb(self.transform.angle());
        Aabb::from_center_half_extents(self.center() + local.center, local.half_extents)
    }
}

/// Support mapping of `A - B` for two placed shapes, optionally on their
/// cores shrunk by per-shape margins.
#[derive(Debug, Clone, Copy)]
pub struct MinkowskiSupport<'c, 'a> {
    pub a: &'c Collider<'a>,
    pub b: &'c Collider<'a>,
    pub use_core: bool,
    pub margin_a: f64,
    pub margin_b: f64,
}

impl<'c, 'a> MinkowskiSupport<'c, 'a> {
    pub fn new(a: &'c Collider<'a>, b: &'c Collider<'a>) -> Self {
        Self {
            a,
            b,
            use_core: false,
            margin_a: 0.0,
            margin_b: 0.0,
        }
    }

    fn farthest(&self, collider: &Collider<'_>, dir: Vec2, margin: f64) -> Vec2 {
        let local_dir = collider.transform.rotate_inverse(dir);
        let local = if self.use_core {
            collider.shape.farthest_core_point(local_dir, margin)
        } else {
            collider.shape.farthest_hull_point(local_dir)
        };
        collider.transform.apply(local)
    }
}

impl Support for MinkowskiSupport<'_, '_> {
    fn support(&self, dir: Vec2) -> SupportPoint {
        SupportPoint::new(
            self.farthest(self.a, dir, self.margin_a),
            self.farthest(self.b, -dir, self.margin_b),
        )
    }
}

/// Checks for collision between two circles.
/// Returns a CollisionManifold if they overlap; merely touching circles do not collide.
pub fn check_circle_circle(
    a: &Collider<'_>,
    circle_a: &Circle,
    b: &Collider<'_>,
    circle_b: &Circle,
) -> Option<CollisionManifold> {
    let center_a = a.center();
    let dist_vec = b.center() - center_a;
    let distance = dist_vec.magnitude();
    let overlap = circle_a.radius + circle_b.radius - distance;
    if overlap <= 0.0 {
        return None;
    }

    // Coincident centers get a canonical normal.
    let normal = if distance > 0.0 {
        dist_vec / distance
    } else {
        Vec2::X_AXIS
    };

    Some(CollisionManifold {
        body_a: a.id,
        body_b: b.id,
        normal,
        mtv: normal * overlap,
        contact: center_a + normal * circle_a.radius - a.position,
        overlap,
        collided_previously: false,
    })
}

/// Counters for the conditions the narrow phase survives without a manifold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NarrowPhaseStats {
    /// Pairs that reached a geometry test.
    pub pairs_tested: usize,
    /// Pairs skipped because neither body is dynamic.
    pub pairs_filtered: usize,
    /// GJK runs cut off by the iteration cap.
    pub gjk_cap_hits: usize,
    /// Overlaps declined because growing the core margins never separated the cores.
    pub margin_exhausted: usize,
    /// Distance GJK runs made while growing core margins.
    pub margin_refinements: usize,
}

/// Pair tester bound to one configuration; accumulates [`NarrowPhaseStats`].
#[derive(Debug)]
pub struct NarrowPhase<'c> {
    config: &'c PhysicsConfig,
    pub stats: NarrowPhaseStats,
}

impl<'c> NarrowPhase<'c> {
    pub fn new(config: &'c PhysicsConfig) -> Self {
        Self {
            config,
            stats: NarrowPhaseStats::default(),
        }
    }

    /// Tests one pair and appends any manifolds to `out`.
    ///
    /// Pairs with no dynamic body are skipped before any geometry is touched.
    /// Compounds may contribute one manifold per overlapping child.
    pub fn check_pair(
        &mut self,
        a: &Collider<'_>,
        b: &Collider<'_>,
        out: &mut Vec<CollisionManifold>,
    ) {
        if a.treatment.is_fixed() && b.treatment.is_fixed() {
            self.stats.pairs_filtered += 1;
            trace!(a = %a.id, b = %b.id, "pair skipped: no dynamic body");
            return;
        }
        self.test_pair(a, b, out);
    }

    fn test_pair(&mut self, a: &Collider<'_>, b: &Collider<'_>, out: &mut Vec<CollisionManifold>) {
        match (a.shape, b.shape) {
            (Shape::Compound(compound), _) => self.check_compound(a, compound, b, true, out),
            (_, Shape::Compound(compound)) => self.check_compound(b, compound, a, false, out),
            (Shape::Circle(circle_a), Shape::Circle(circle_b)) => {
                self.stats.pairs_tested += 1;
                out.extend(check_circle_circle(a, circle_a, b, circle_b));
            }
            _ => {
                self.stats.pairs_tested += 1;
                out.extend(self.check_gjk(a, b));
            }
        }
    }

    /// Tests every child of `compound` whose bounds touch `other`.
    fn check_compound(
        &mut self,
        owner: &Collider<'_>,
        compound: &Compound,
        other: &Collider<'_>,
        owner_is_a: bool,
        out: &mut Vec<CollisionManifold>,
    ) {
        let other_aabb = other.aabb();
        for child in compound.children() {
            let placed = owner.child(child);
            if !placed.aabb().overlaps(&other_aabb) {
                continue;
            }
            if owner_is_a {
                self.test_pair(&placed, other, out);
            } else {
                self.test_pair(other, &placed, out);
            }
        }
    }

    /// General convex test: boolean GJK on the hulls, then distance GJK on
    /// progressively shrunk cores to find the contact normal.
    ///
    /// Each body's margin grows in steps of `margin_step_fraction` of its own
    /// [`Shape::max_core_margin`] and stops at that limit, so refinement runs
    /// at most about `1 / margin_step_fraction` times. The depth is the
    /// overlap of the two hulls measured along the normal.
    pub fn check_gjk(&mut self, a: &Collider<'_>, b: &Collider<'_>) -> Option<CollisionManifold> {
        let seed = a.center() - b.center();
        let mut support = MinkowskiSupport::new(a, b);
        let mut result = gjk(&support, seed, true, self.config);
        if result.max_iterations_reached {
            self.stats.gjk_cap_hits += 1;
            return None;
        }
        if !result.overlap {
            return None;
        }

        let limit_a = a.shape.max_core_margin();
        let limit_b = b.shape.max_core_margin();
        let step_a = self.config.margin_step_fraction * limit_a;
        let step_b = self.config.margin_step_fraction * limit_b;
        support.use_core = true;

        while (result.overlap || result.distance == Some(0.0))
            && (support.margin_a < limit_a || support.margin_b < limit_b)
        {
            support.margin_a = (support.margin_a + step_a).min(limit_a);
            support.margin_b = (support.margin_b + step_b).min(limit_b);
            self.stats.margin_refinements += 1;
            result = gjk(&support, seed, false, self.config);
            if result.max_iterations_reached {
                self.stats.gjk_cap_hits += 1;
                return None;
            }
        }

        let (Some(_), Some(closest)) = (result.distance, result.closest) else {
            self.stats.margin_exhausted += 1;
            trace!(a = %a.id, b = %b.id, "core margins exhausted; contact declined");
            return None;
        };

        let normal = (closest.b - closest.a)
            .normalize_or((b.center() - a.center()).normalize_or(Vec2::X_AXIS));
        // The hulls overlap, so B's deepest point along the normal lies inside A's reach.
        let overlap = MinkowskiSupport::new(a, b).support(normal).pt.dot(normal);
        if overlap <= 0.0 {
            return None;
        }
        Some(CollisionManifold {
            body_a: a.id,
            body_b: b.id,
            normal,
            mtv: normal * overlap,
            contact: closest.a + normal * support.margin_a - a.position,
            overlap,
            collided_previously: false,
        })
    }
}
