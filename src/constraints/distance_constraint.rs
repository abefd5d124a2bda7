use tracing::trace;

use super::{dynamic_mass, mass_shares, Constraint};
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::vec2::Vec2;
use crate::objects::{BodyId, BodySet};

/// Keeps the centres of two bodies at a fixed distance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceConstraint {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Fraction of the error removed per solve, in `[0, 1]`.
    pub stiffness: f64,
    /// The target distance to maintain between the body centres.
    pub target_length: f64,
}

impl DistanceConstraint {
    pub fn new(body_a: BodyId, body_b: BodyId, stiffness: f64, target_length: f64) -> PhysicsResult<Self> {
        if body_a == body_b {
            return Err(PhysicsError::InvalidConstraint {
                reason: "a distance constraint needs two different bodies",
            });
        }
        if !(0.0..=1.0).contains(&stiffness) {
            return Err(PhysicsError::InvalidConstraint {
                reason: "stiffness must lie in [0, 1]",
            });
        }
        if !(target_length >= 0.0 && target_length.is_finite()) {
            return Err(PhysicsError::InvalidConstraint {
                reason: "target length must be non-negative and finite",
            });
        }
        Ok(Self {
            body_a,
            body_b,
            stiffness,
            target_length,
        })
    }

    /// Current distance between the two bodies, if both exist.
    pub fn current_length(&self, bodies: &BodySet) -> Option<f64> {
        let a = bodies.get(self.body_a)?;
        let b = bodies.get(self.body_b)?;
        Some(a.position.distance(b.position))
    }
}

impl Constraint for DistanceConstraint {
    fn solve_position(&self, bodies: &mut BodySet, coefficient: f64) {
        let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) else {
            trace!(a = %self.body_a, b = %self.body_b, "distance constraint refers to a missing body");
            return;
        };
        let Some([share_a, share_b]) = mass_shares([dynamic_mass(body_a), dynamic_mass(body_b)]) else {
            return;
        };

        let delta = body_b.position - body_a.position;
        let current_dist = delta.magnitude();
        let direction = if current_dist > f64::EPSILON {
            delta / current_dist
        } else {
            Vec2::X_AXIS
        };

        let error = current_dist - self.target_length;
        let correction = direction * (coefficient * self.stiffness * error);

        // A stretched constraint pulls A towards B and B towards A.
        body_a.position += correction * share_a;
        body_b.position -= correction * share_b;
    }

    fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}
