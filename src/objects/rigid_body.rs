use crate::collision::Aabb;
use crate::common::Material;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Transform, Vec2};
use crate::shapes::Shape;

/// How the pipeline is allowed to move a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Treatment {
    /// Fully simulated: receives impulses, corrections and constraint pulls.
    #[default]
    Dynamic,
    /// Moved only by the caller; behaves as infinitely heavy in contacts.
    Kinematic,
    /// Never moves.
    Static,
}

impl Treatment {
    pub fn is_dynamic(self) -> bool {
        self == Treatment::Dynamic
    }

    /// Kinematic and static bodies have infinite effective mass.
    pub fn is_fixed(self) -> bool {
        !self.is_dynamic()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    // Geometry
    pub shape: Shape,
    pub material: Material,
    pub treatment: Treatment,

    // Primary state
    pub position: Vec2, // World position of the center of mass
    /// Position before the last integration step; moved together with
    /// `position` by overlap correction.
    pub previous_position: Vec2,
    pub rotation: f64, // Radians
    pub linear_velocity: Vec2,
    pub angular_velocity: f64, // Radians per second

    // Physical properties
    pub mass: f64,
    pub inertia: f64, // Moment of inertia about the center of mass
    pub asleep: bool,

    // Overlap correction accumulated during the current step, and the one
    // applied during the last step.
    pub(crate) mtv_total: Vec2,
    pub(crate) previous_mtv_total: Vec2,
}

impl RigidBody {
    /// Creates a new dynamic RigidBody with the given mass and shape.
    /// The moment of inertia is derived from the shape. The body starts at rest at the origin.
    pub fn new(mass: f64, shape: Shape) -> PhysicsResult<Self> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::NonPositiveMass { mass });
        }
        let inertia = shape.inertia(mass);
        Ok(Self {
            shape,
            material: Material::default(),
            treatment: Treatment::Dynamic,
            position: Vec2::ZERO,
            previous_position: Vec2::ZERO,
            rotation: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass,
            inertia,
            asleep: false,
            mtv_total: Vec2::ZERO,
            previous_mtv_total: Vec2::ZERO,
        })
    }

    /// Creates a new static RigidBody with the given shape at `position` and `rotation`.
    /// The unit mass is nominal: fixed bodies expose zero inverse mass.
    pub fn new_static(shape: Shape, position: Vec2, rotation: f64) -> Self {
        let inertia = shape.inertia(1.0);
        Self {
            shape,
            material: Material::default(),
            treatment: Treatment::Static,
            position,
            previous_position: position,
            rotation,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            inertia,
            asleep: false,
            mtv_total: Vec2::ZERO,
            previous_mtv_total: Vec2::ZERO,
        }
    }

    /// Places the body, resetting its previous position as well.
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self.previous_position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_treatment(mut self, treatment: Treatment) -> Self {
        self.treatment = treatment;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.treatment.is_dynamic()
    }

    /// 1 / mass for dynamic bodies, 0 for fixed ones.
    pub fn inv_mass(&self) -> f64 {
        if self.is_dynamic() {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// 1 / inertia for dynamic bodies that can rotate, 0 otherwise.
    pub fn inv_inertia(&self) -> f64 {
        if self.is_dynamic() && self.inertia > 0.0 {
            1.0 / self.inertia
        } else {
            0.0
        }
    }

    /// Transform from shape-local coordinates to world space.
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    /// Calculates the world-space Axis-Aligned Bounding Box (AABB) for this body.
    pub fn aabb(&self) -> Aabb {
        let local = self.shape.local_aabb(self.rotation);
        Aabb::from_center_half_extents(self.position + local.center, local.half_extents)
    }

    /// Velocity of the material point at offset `r` from the center of mass.
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.linear_velocity + r.perpendicular() * self.angular_velocity
    }

    /// Applies an impulse at offset `r` (world orientation) from the center of mass.
    /// Fixed bodies are unaffected.
    pub fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.linear_velocity += impulse * self.inv_mass();
        self.angular_velocity += r.cross(impulse) * self.inv_inertia();
    }

    pub fn wake(&mut self) {
        self.asleep = false;
    }

    pub fn sleep(&mut self) {
        self.asleep = true;
    }

    /// Correction applied to this body at the end of the last step.
    pub fn last_correction(&self) -> Vec2 {
        self.previous_mtv_total
    }

    pub fn linear_momentum(&self) -> Vec2 {
        self.linear_velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.linear_velocity.magnitude_squared()
            + 0.5 * self.inertia * self.angular_velocity * self.angular_velocity
    }
}
