// Defines an Axis-Aligned Bounding Box

use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Transform, Vec2};

/// An Axis-Aligned Bounding Box stored as a center and non-negative half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    /// Half-width and half-height. Always non-negative.
    pub half_extents: Vec2,
}

impl Aabb {
    /// Creates an AABB from its minimum and maximum corners.
    ///
    /// Fails if a bound is not finite or `min` exceeds `max` on any axis.
    pub fn from_bounds(min: Vec2, max: Vec2) -> PhysicsResult<Self> {
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return Err(PhysicsError::InvalidAabb {
                reason: "bounds must be finite",
            });
        }
        if min.x > max.x || min.y > max.y {
            return Err(PhysicsError::InvalidAabb {
                reason: "min corner exceeds max corner",
            });
        }
        Ok(Self::from_min_max(min, max))
    }

    /// Builds an AABB centered at `center`; negative extents are mirrored.
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Aabb {
            center,
            half_extents: Vec2::new(half_extents.x.abs(), half_extents.y.abs()),
        }
    }

    /// A degenerate box around a single point.
    pub fn point(center: Vec2) -> Self {
        Aabb {
            center,
            half_extents: Vec2::ZERO,
        }
    }

    // Callers guarantee min <= max component-wise.
    pub(crate) fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Aabb {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn half_width(&self) -> f64 {
        self.half_extents.x
    }

    pub fn half_height(&self) -> f64 {
        self.half_extents.y
    }

    /// Checks if this AABB overlaps with another AABB.
    /// Touching faces count as overlapping.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = self.center - other.center;
        d.x.abs() <= self.half_extents.x + other.half_extents.x
            && d.y.abs() <= self.half_extents.y + other.half_extents.y
    }

    /// Returns `true` if `point` lies inside or on the boundary.
    pub fn contains(&self, point: Vec2) -> bool {
        let d = point - self.center;
        d.x.abs() <= self.half_extents.x && d.y.abs() <= self.half_extents.y
    }

    /// Returns the smallest AABB containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        Self::from_min_max(
            Vec2::new(a_min.x.min(b_min.x), a_min.y.min(b_min.y)),
            Vec2::new(a_max.x.max(b_max.x), a_max.y.max(b_max.y)),
        )
    }

    /// Grows the box uniformly by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Aabb {
        Self::from_center_half_extents(self.center, self.half_extents + Vec2::new(margin, margin))
    }

    /// Returns an axis-aligned box containing this box after `transform`.
    ///
    /// The result bounds the rotated corners, so it is conservative (never
    /// smaller than the transformed box) rather than tight.
    pub fn transformed(&self, transform: &Transform) -> Aabb {
        let center = transform.apply(self.center);
        let ex = transform.rotate(Vec2::new(self.half_extents.x, 0.0));
        let ey = transform.rotate(Vec2::new(0.0, self.half_extents.y));
        Aabb {
            center,
            half_extents: Vec2::new(ex.x.abs() + ey.x.abs(), ex.y.abs() + ey.y.abs()),
        }
    }

    /// Creates an AABB that encompasses a set of points.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min_pt = *first;
        let mut max_pt = *first;
        for point in rest {
            min_pt.x = min_pt.x.min(point.x);
            min_pt.y = min_pt.y.min(point.y);
            max_pt.x = max_pt.x.max(point.x);
            max_pt.y = max_pt.y.max(point.y);
        }
        Some(Self::from_min_max(min_pt, max_pt))
    }
}
