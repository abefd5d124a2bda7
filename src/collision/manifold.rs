use crate::math::vec2::Vec2;
use crate::objects::BodyId;

/// Stores information about a collision between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionManifold {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Unit collision normal, pointing from body A towards body B.
    pub normal: Vec2,
    /// Minimum translation vector, `normal * overlap`. Moving B by `mtv`
    /// (or A by `-mtv`) separates the bodies.
    pub mtv: Vec2,
    /// Contact point relative to body A's position.
    pub contact: Vec2,
    /// The amount of penetration between the shapes. Always positive.
    pub overlap: f64,
    /// The same pair was in contact during the previous step.
    pub collided_previously: bool,
}

impl CollisionManifold {
    /// World-space contact point given body A's position.
    pub fn world_contact(&self, pos_a: Vec2) -> Vec2 {
        pos_a + self.contact
    }
}
