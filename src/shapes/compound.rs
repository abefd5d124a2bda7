use crate::collision::Aabb;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Transform, Vec2};
use crate::objects::RigidBody;

/// A child body rigidly attached to a compound at a local offset and rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundChild {
    pub body: RigidBody,
    pub offset: Vec2,
    pub angle: f64,
}

impl CompoundChild {
    pub fn new(body: RigidBody, offset: Vec2, angle: f64) -> Self {
        Self { body, offset, angle }
    }

    /// Maps child-local coordinates into the compound's frame.
    pub fn local_transform(&self) -> Transform {
        Transform::new(self.offset, self.angle)
    }
}

/// A rigid assembly of child bodies treated as one body by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    children: Vec<CompoundChild>,
}

impl Compound {
    /// Builds a compound and moves its origin to the mass-weighted center of
    /// the children.
    pub fn new(mut children: Vec<CompoundChild>) -> PhysicsResult<Self> {
        if children.is_empty() {
            return Err(PhysicsError::EmptyCompound);
        }
        let total_mass: f64 = children.iter().map(|c| c.body.mass).sum();
        let center = children
            .iter()
            .fold(Vec2::ZERO, |acc, c| acc + c.offset * c.body.mass)
            / total_mass;
        for child in &mut children {
            child.offset -= center;
        }
        Ok(Self { children })
    }

    pub fn children(&self) -> &[CompoundChild] {
        &self.children
    }

    /// Sum of the children's masses.
    pub fn total_mass(&self) -> f64 {
        self.children.iter().map(|c| c.body.mass).sum()
    }

    /// Moment of inertia about the compound origin for a compound of `mass`.
    ///
    /// The children's masses set the distribution; `mass` scales it.
    pub fn inertia(&self, mass: f64) -> f64 {
        let about_center: f64 = self
            .children
            .iter()
            .map(|c| c.body.inertia + c.body.mass * c.offset.magnitude_squared())
            .sum();
        about_center * mass / self.total_mass()
    }

    /// Union of the children's bounds with the compound rotated by `angle`.
    pub fn local_aabb(&self, angle: f64) -> Aabb {
        let rotation = Transform::new(Vec2::ZERO, angle);
        let mut bounds: Option<Aabb> = None;
        for child in &self.children {
            let placed = rotation.compose(&child.local_transform());
            let child_aabb = child.body.shape.local_aabb(placed.angle());
            let moved = Aabb::from_center_half_extents(
                placed.translation + child_aabb.center,
                child_aabb.half_extents,
            );
            bounds = Some(match bounds {
                Some(acc) => acc.union(&moved),
                None => moved,
            });
        }
        bounds.unwrap_or_else(|| Aabb::point(Vec2::ZERO))
    }

    /// Farthest point along `dir` over all children's hulls.
    pub fn farthest_hull_point(&self, dir: Vec2) -> Vec2 {
        let mut best = Vec2::ZERO;
        let mut best_dot = f64::NEG_INFINITY;
        for child in &self.children {
            let t = child.local_transform();
            let p = t.apply(child.body.shape.farthest_hull_point(t.rotate_inverse(dir)));
            let d = p.dot(dir);
            if d > best_dot {
                best_dot = d;
                best = p;
            }
        }
        best
    }

    /// Largest margin every child's core can take.
    pub fn max_core_margin(&self) -> f64 {
        self.children
            .iter()
            .map(|c| c.body.shape.max_core_margin())
            .fold(f64::INFINITY, f64::min)
    }

    /// Hull point pulled back along `dir` by `margin`.
    pub fn farthest_core_point(&self, dir: Vec2, margin: f64) -> Vec2 {
        self.farthest_hull_point(dir) - dir.normalize() * margin
    }
}
