use crate::collision::Aabb;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    /// Creates a circle. The radius must be finite and non-negative.
    pub fn new(radius: f64) -> PhysicsResult<Self> {
        if !(radius >= 0.0 && radius.is_finite()) {
            return Err(PhysicsError::InvalidRadius { radius });
        }
        Ok(Self { radius })
    }

    /// Local bounding box; rotation does not change it.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(Vec2::ZERO, Vec2::new(self.radius, self.radius))
    }

    /// Point on the circle farthest along `dir`. A zero direction yields the center.
    pub fn farthest_hull_point(&self, dir: Vec2) -> Vec2 {
        dir.normalize() * self.radius
    }

    /// Like [`Circle::farthest_hull_point`] on a circle shrunk by `margin`.
    /// Margins past the radius leave only the center.
    pub fn farthest_core_point(&self, dir: Vec2, margin: f64) -> Vec2 {
        dir.normalize() * (self.radius - margin).max(0.0)
    }

    /// The core shrinks to the center once the margin reaches the radius.
    pub fn max_core_margin(&self) -> f64 {
        self.radius
    }

    /// Moment of inertia of a solid disc about its center.
    pub fn inertia(&self, mass: f64) -> f64 {
        0.5 * mass * self.radius * self.radius
    }
}
