use tracing::trace;

use super::{dynamic_mass, mass_shares, Constraint};
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::wrap_angle;
use crate::objects::{BodyId, BodySet};

/// Holds the angle at `body_b` between the arms towards `body_a` and
/// `body_c`, measured counter-clockwise from A to C.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngleConstraint {
    pub body_a: BodyId,
    /// The vertex of the angle.
    pub body_b: BodyId,
    pub body_c: BodyId,
    pub stiffness: f64,
    /// Target angle in `(-π, π]`.
    pub target_angle: f64,
}

impl AngleConstraint {
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        body_c: BodyId,
        stiffness: f64,
        target_angle: f64,
    ) -> PhysicsResult<Self> {
        if body_a == body_b || body_b == body_c || body_a == body_c {
            return Err(PhysicsError::InvalidConstraint {
                reason: "an angle constraint needs three different bodies",
            });
        }
        if !(0.0..=1.0).contains(&stiffness) {
            return Err(PhysicsError::InvalidConstraint {
                reason: "stiffness must lie in [0, 1]",
            });
        }
        if !target_angle.is_finite() {
            return Err(PhysicsError::InvalidConstraint {
                reason: "target angle must be finite",
            });
        }
        Ok(Self {
            body_a,
            body_b,
            body_c,
            stiffness,
            target_angle: wrap_angle(target_angle),
        })
    }

    /// Current angle at the vertex body, if all three bodies exist.
    pub fn current_angle(&self, bodies: &BodySet) -> Option<f64> {
        let a = bodies.get(self.body_a)?.position;
        let b = bodies.get(self.body_b)?.position;
        let c = bodies.get(self.body_c)?.position;
        Some(b.angle_between(a, c))
    }
}

impl Constraint for AngleConstraint {
    fn solve_position(&self, bodies: &mut BodySet, coefficient: f64) {
        let (Some(a), Some(b), Some(c)) = (
            bodies.get(self.body_a),
            bodies.get(self.body_b),
            bodies.get(self.body_c),
        ) else {
            trace!(vertex = %self.body_b, "angle constraint refers to a missing body");
            return;
        };
        let Some([share_a, share_b, share_c]) =
            mass_shares([dynamic_mass(a), dynamic_mass(b), dynamic_mass(c)])
        else {
            return;
        };
        let (pos_a, pos_b, pos_c) = (a.position, b.position, c.position);

        let error = wrap_angle(pos_b.angle_between(pos_a, pos_c) - self.target_angle);
        let correction = coefficient * self.stiffness * error;
        if correction == 0.0 {
            return;
        }

        // Opening A towards C shrinks the angle, so A turns forward and C back.
        if share_a > 0.0 {
            if let Some(body) = bodies.get_mut(self.body_a) {
                body.position = pos_a.rotate_about(pos_b, share_a * correction);
            }
        }
        if share_c > 0.0 {
            if let Some(body) = bodies.get_mut(self.body_c) {
                body.position = pos_c.rotate_about(pos_b, -share_c * correction);
            }
        }
        if share_b > 0.0 {
            // Gradient of the angle with respect to the vertex position.
            let u = pos_a - pos_b;
            let v = pos_c - pos_b;
            let (len_u, len_v) = (u.magnitude_squared(), v.magnitude_squared());
            if len_u < f64::EPSILON || len_v < f64::EPSILON {
                return;
            }
            let gradient = u.perpendicular() / len_u - v.perpendicular() / len_v;
            let gradient_sq = gradient.magnitude_squared();
            if gradient_sq < f64::EPSILON {
                return;
            }
            if let Some(body) = bodies.get_mut(self.body_b) {
                body.position -= gradient * (share_b * correction / gradient_sq);
            }
        }
    }

    fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id || self.body_c == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec2::Vec2;
    use crate::objects::{RigidBody, Treatment};
    use crate::shapes::{Circle, Shape};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
    const EPSILON: f64 = 1e-9;

    fn body(position: Vec2) -> RigidBody {
        RigidBody::new(1.0, Shape::Circle(Circle::new(0.5).unwrap()))
            .unwrap()
            .with_position(position)
    }

    fn right_angle(vertex: Treatment) -> (BodySet, [BodyId; 3]) {
        let mut bodies = BodySet::new();
        let a = bodies.insert(body(Vec2::new(1.0, 0.0)));
        let b = bodies.insert(body(Vec2::ZERO).with_treatment(vertex));
        let c = bodies.insert(body(Vec2::new(0.0, 1.0)));
        (bodies, [a, b, c])
    }

    #[test]
    fn test_angle_constraint_new() {
        let (bodies, [a, b, c]) = right_angle(Treatment::Dynamic);
        let constraint = AngleConstraint::new(a, b, c, 0.5, 2.0 * PI + FRAC_PI_4).unwrap();
        assert!((constraint.target_angle - FRAC_PI_4).abs() < EPSILON);
        assert!((constraint.current_angle(&bodies).unwrap() - FRAC_PI_2).abs() < EPSILON);
        assert!(AngleConstraint::new(a, b, a, 0.5, 0.0).is_err());
        assert!(AngleConstraint::new(a, b, c, -0.1, 0.0).is_err());
    }

    #[test]
    fn test_fixed_vertex_rotates_both_arms() {
        let (mut bodies, [a, b, c]) = right_angle(Treatment::Static);
        let constraint = AngleConstraint::new(a, b, c, 1.0, FRAC_PI_4).unwrap();
        constraint.solve_position(&mut bodies, 1.0);

        assert_eq!(bodies.get(b).unwrap().position, Vec2::ZERO);
        assert!((constraint.current_angle(&bodies).unwrap() - FRAC_PI_4).abs() < EPSILON);
        // Each arm turns by half of the error and keeps its length.
        let pos_a = bodies.get(a).unwrap().position;
        assert!((pos_a.angle() - PI / 8.0).abs() < EPSILON);
        assert!((pos_a.magnitude() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_partial_correction() {
        let (mut bodies, [a, b, c]) = right_angle(Treatment::Static);
        let constraint = AngleConstraint::new(a, b, c, 0.5, FRAC_PI_4).unwrap();
        constraint.solve_position(&mut bodies, 0.5);
        let error = constraint.current_angle(&bodies).unwrap() - FRAC_PI_4;
        assert!((error - 0.75 * FRAC_PI_4).abs() < EPSILON);
    }

    #[test]
    fn test_error_wraps_across_pi() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(body(Vec2::new(1.0, 0.0)));
        let b = bodies.insert(body(Vec2::ZERO).with_treatment(Treatment::Static));
        let c = bodies.insert(body(Vec2::new(-1.0, -0.1)));
        let constraint = AngleConstraint::new(a, b, c, 1.0, PI).unwrap();
        let before = constraint.current_angle(&bodies).unwrap();
        assert!(before < 0.0);

        constraint.solve_position(&mut bodies, 1.0);
        // The short way round: C moves by about 0.1 rad, not by nearly 2π.
        let after = constraint.current_angle(&bodies).unwrap();
        assert!((after.abs() - PI).abs() < EPSILON);
        assert!(bodies.get(c).unwrap().position.distance(Vec2::new(-1.0, -0.1)) < 0.1);
    }

    #[test]
    fn test_dynamic_vertex_converges() {
        let (mut bodies, [a, b, c]) = right_angle(Treatment::Dynamic);
        let constraint = AngleConstraint::new(a, b, c, 1.0, FRAC_PI_4).unwrap();
        for _ in 0..200 {
            constraint.solve_position(&mut bodies, 0.25);
        }
        let error = constraint.current_angle(&bodies).unwrap() - FRAC_PI_4;
        assert!(error.abs() < 1e-6);
        assert!(bodies.get(b).unwrap().position != Vec2::ZERO);
    }

    #[test]
    fn test_all_fixed_is_skipped() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(body(Vec2::new(1.0, 0.0)).with_treatment(Treatment::Static));
        let b = bodies.insert(body(Vec2::ZERO).with_treatment(Treatment::Kinematic));
        let c = bodies.insert(body(Vec2::new(0.0, 1.0)).with_treatment(Treatment::Static));
        let constraint = AngleConstraint::new(a, b, c, 1.0, 0.1).unwrap();
        constraint.solve_position(&mut bodies, 1.0);
        assert_eq!(bodies.get(a).unwrap().position, Vec2::new(1.0, 0.0));
        assert_eq!(bodies.get(c).unwrap().position, Vec2::new(0.0, 1.0));
    }
}
