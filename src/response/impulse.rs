//! Impulse-based contact response with accumulated positional correction.

use tracing::{debug, trace};

use crate::collision::CollisionManifold;
use crate::common::PhysicsConfig;
use crate::math::vec2::Vec2;
use crate::objects::BodySet;

/// Impulses applied for one manifold, both measured on body B.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactImpulse {
    /// Magnitude along the contact normal. Never negative.
    pub normal: f64,
    /// Signed magnitude along the tangent `normal.perpendicular()`.
    pub tangent: f64,
}

/// Portion of `mtv` not yet covered by the correction `total` already
/// accumulated along the same direction.
pub fn clamp_mtv(total: Vec2, mtv: Vec2) -> Vec2 {
    let norm = mtv.magnitude();
    if norm == 0.0 {
        return Vec2::ZERO;
    }
    let remaining = (norm - total.project(mtv)).clamp(0.0, norm);
    mtv * (remaining / norm)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImpulseResolver {
    config: PhysicsConfig,
}

impl ImpulseResolver {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Resolves every manifold in order, then applies the accumulated
    /// positional corrections once per body.
    pub fn resolve(&self, bodies: &mut BodySet, manifolds: &[CollisionManifold]) -> Vec<ContactImpulse> {
        let impulses: Vec<ContactImpulse> = manifolds
            .iter()
            .filter_map(|m| self.collide_bodies(bodies, m))
            .collect();
        self.apply_corrections(bodies);
        debug!(manifolds = manifolds.len(), impulses = impulses.len(), "contacts resolved");
        impulses
    }

    /// Accumulates the pair's positional correction and applies the normal
    /// and friction impulses for one manifold.
    ///
    /// Returns `None` when nothing was applied: unknown or fixed bodies, or
    /// bodies already separating.
    pub fn collide_bodies(&self, bodies: &mut BodySet, manifold: &CollisionManifold) -> Option<ContactImpulse> {
        let (body_a, body_b) = bodies.pair_mut(manifold.body_a, manifold.body_b)?;
        let fixed_a = body_a.treatment.is_fixed();
        let fixed_b = body_b.treatment.is_fixed();
        if fixed_a && fixed_b {
            return None;
        }

        // Push the bodies apart along the MTV, sharing it when both can move.
        if fixed_a {
            body_b.mtv_total += clamp_mtv(body_b.mtv_total, manifold.mtv);
        } else if fixed_b {
            body_a.mtv_total += clamp_mtv(body_a.mtv_total, -manifold.mtv);
        } else {
            let half = manifold.mtv * 0.5;
            body_b.mtv_total += clamp_mtv(body_b.mtv_total, half);
            body_a.mtv_total += clamp_mtv(body_a.mtv_total, -half);
        }

        let normal = manifold.normal;
        let r_a = manifold.contact; // From CoM A to the contact
        let r_b = manifold.contact + body_a.position - body_b.position; // From CoM B to the contact

        let relative_velocity = body_b.velocity_at(r_b) - body_a.velocity_at(r_a);
        let relative_velocity_normal = relative_velocity.dot(normal);
        if relative_velocity_normal >= 0.0 {
            trace!(a = %manifold.body_a, b = %manifold.body_b, "bodies separating, no impulse");
            return None;
        }

        let (restitution, friction) = body_a.material.combine(&body_b.material);
        // Resting contacts are resolved inelastically so stacked bodies do not bounce.
        let e = if manifold.collided_previously { 0.0 } else { restitution };

        let (inv_mass_a, inv_mass_b) = (body_a.inv_mass(), body_b.inv_mass());
        let (inv_inertia_a, inv_inertia_b) = (body_a.inv_inertia(), body_b.inv_inertia());

        let ra_perp_dot_n = r_a.cross(normal);
        let rb_perp_dot_n = r_b.cross(normal);
        let effective_mass_normal = inv_mass_a
            + inv_mass_b
            + ra_perp_dot_n * ra_perp_dot_n * inv_inertia_a
            + rb_perp_dot_n * rb_perp_dot_n * inv_inertia_b;
        let j = -(1.0 + e) * relative_velocity_normal / effective_mass_normal;

        let impulse = normal * j;
        body_a.apply_impulse(-impulse, r_a);
        body_b.apply_impulse(impulse, r_b);
        body_a.wake();
        body_b.wake();

        // Coulomb friction, bounded by the cone and by what stops the sliding.
        let tangent = normal.perpendicular();
        let relative_velocity = body_b.velocity_at(r_b) - body_a.velocity_at(r_a);
        let relative_velocity_tangent = relative_velocity.dot(tangent);
        let mut jt = 0.0;
        if friction > 0.0 && relative_velocity_tangent != 0.0 {
            let ra_perp_dot_t = r_a.cross(tangent);
            let rb_perp_dot_t = r_b.cross(tangent);
            let effective_mass_tangent = inv_mass_a
                + inv_mass_b
                + ra_perp_dot_t * ra_perp_dot_t * inv_inertia_a
                + rb_perp_dot_t * rb_perp_dot_t * inv_inertia_b;
            let stopping = relative_velocity_tangent.abs() / effective_mass_tangent;
            jt = -relative_velocity_tangent.signum() * (friction * j.abs()).min(stopping);
            let friction_impulse = tangent * jt;
            body_a.apply_impulse(-friction_impulse, r_a);
            body_b.apply_impulse(friction_impulse, r_b);
        }

        trace!(
            a = %manifold.body_a,
            b = %manifold.body_b,
            normal_impulse = j,
            friction_impulse = jt,
            "impulse applied"
        );
        Some(ContactImpulse {
            normal: j,
            tangent: jt,
        })
    }

    /// Moves every body by the correction accumulated this step and resets
    /// the accumulator. Small corrections are damped; large ones wake the body.
    pub fn apply_corrections(&self, bodies: &mut BodySet) {
        for (_, body) in bodies.iter_mut() {
            if body.mtv_total.magnitude() < self.config.mtv_threshold {
                body.mtv_total *= self.config.body_extract_dropoff;
            } else if self.config.force_wakeup_above_overlap_threshold {
                body.wake();
            }
            let correction = body.mtv_total;
            body.position += correction;
            body.previous_position += correction;
            body.mtv_total.swap(&mut body.previous_mtv_total);
            body.mtv_total = Vec2::ZERO;
        }
    }
}
