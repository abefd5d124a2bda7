pub mod circle;
pub mod compound;
pub mod polygon;

// Re-export the specific shape types
pub use circle::Circle;
pub use compound::{Compound, CompoundChild};
pub use polygon::Polygon;

use crate::collision::Aabb;
use crate::math::vec2::Vec2;

/// Enum representing the geometric shape of a rigid body.
///
/// All queries take and return shape-local coordinates; callers move
/// directions and points between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
    Compound(Compound),
    Point,
}

impl Shape {
    /// Bounding box relative to the body origin with the shape rotated by `angle`.
    pub fn local_aabb(&self, angle: f64) -> Aabb {
        match self {
            Shape::Circle(circle) => circle.local_aabb(),
            Shape::Polygon(polygon) => polygon.local_aabb(angle),
            Shape::Compound(compound) => compound.local_aabb(angle),
            Shape::Point => Aabb::point(Vec2::ZERO),
        }
    }

    /// Farthest point of the shape along `dir`.
    pub fn farthest_hull_point(&self, dir: Vec2) -> Vec2 {
        match self {
            Shape::Circle(circle) => circle.farthest_hull_point(dir),
            Shape::Polygon(polygon) => polygon.farthest_hull_point(dir),
            Shape::Compound(compound) => compound.farthest_hull_point(dir),
            Shape::Point => Vec2::ZERO,
        }
    }

    /// Farthest point along `dir` of the shape's core, the hull moved inward by `margin`.
    pub fn farthest_core_point(&self, dir: Vec2, margin: f64) -> Vec2 {
        match self {
            Shape::Circle(circle) => circle.farthest_core_point(dir, margin),
            Shape::Polygon(polygon) => polygon.farthest_core_point(dir, margin),
            Shape::Compound(compound) => compound.farthest_core_point(dir, margin),
            Shape::Point => Vec2::ZERO,
        }
    }

    /// Largest margin the core can be shrunk by before it degenerates.
    pub fn max_core_margin(&self) -> f64 {
        match self {
            Shape::Circle(circle) => circle.max_core_margin(),
            Shape::Polygon(polygon) => polygon.inradius(),
            Shape::Compound(compound) => compound.max_core_margin(),
            Shape::Point => 0.0,
        }
    }

    /// Moment of inertia about the local origin for a body of `mass`.
    pub fn inertia(&self, mass: f64) -> f64 {
        match self {
            Shape::Circle(circle) => circle.inertia(mass),
            Shape::Polygon(polygon) => polygon.calculate_inertia(mass),
            Shape::Compound(compound) => compound.inertia(mass),
            Shape::Point => 0.0,
        }
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Polygon> for Shape {
    fn from(polygon: Polygon) -> Self {
        Shape::Polygon(polygon)
    }
}

impl From<Compound> for Shape {
    fn from(compound: Compound) -> Self {
        Shape::Compound(compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_shape_is_degenerate() {
        let shape = Shape::Point;
        assert_eq!(shape.farthest_hull_point(Vec2::new(1.0, 1.0)), Vec2::ZERO);
        assert_eq!(shape.farthest_core_point(Vec2::new(1.0, 1.0), 0.5), Vec2::ZERO);
        assert_eq!(shape.local_aabb(1.0).half_extents, Vec2::ZERO);
        assert_eq!(shape.inertia(3.0), 0.0);
        assert_eq!(shape.max_core_margin(), 0.0);
    }

    #[test]
    fn test_shape_dispatch_matches_variant() {
        let shape: Shape = Circle::new(2.0).unwrap().into();
        assert_eq!(shape.farthest_hull_point(Vec2::new(0.0, -1.0)), Vec2::new(0.0, -2.0));
        let shape: Shape = Polygon::rectangle(2.0, 2.0).unwrap().into();
        assert_eq!(shape.farthest_hull_point(Vec2::new(1.0, 1.0)), Vec2::new(1.0, 1.0));
    }
}
