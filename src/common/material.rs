//! Defines physical material properties.

/// Represents the physical properties of a rigid body affecting collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Coefficient of restitution (bounciness). Range [0, 1].
    /// 0 = perfectly inelastic (no bounce), 1 = perfectly elastic.
    pub restitution: f64,
    /// Coefficient of friction. Range [0, infinity).
    pub friction: f64,
}

impl Material {
    /// Creates a new material with the given restitution and friction.
    pub fn new(restitution: f64, friction: f64) -> Self {
        Material {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.max(0.0),
        }
    }

    /// Combined `(restitution, friction)` for a contact between two materials.
    ///
    /// Both coefficients combine multiplicatively, so a perfectly elastic pair
    /// stays elastic and a frictionless surface cancels friction entirely.
    pub fn combine(&self, other: &Material) -> (f64, f64) {
        (
            self.restitution * other.restitution,
            self.friction * other.friction,
        )
    }
}

impl Default for Material {
    /// Default material properties (moderate restitution, moderate friction).
    fn default() -> Self {
        Material {
            restitution: 0.2,
            friction: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_new_clamps() {
        let m = Material::new(1.5, -1.0);
        assert_eq!(m.restitution, 1.0);
        assert_eq!(m.friction, 0.0);
    }

    #[test]
    fn test_material_combine() {
        let a = Material::new(1.0, 0.5);
        let b = Material::new(0.5, 0.4);
        let (cor, cof) = a.combine(&b);
        assert!((cor - 0.5).abs() < 1e-12);
        assert!((cof - 0.2).abs() < 1e-12);
    }
}
