use crate::objects::{BodyId, BodySet, RigidBody};

pub mod angle_constraint;
pub mod distance_constraint;
pub mod solver;

// Re-export the constraint types for easier access
pub use angle_constraint::AngleConstraint;
pub use distance_constraint::DistanceConstraint;
pub use solver::{ConstraintHandle, ConstraintSolver};

/// A positional constraint between bodies.
pub trait Constraint {
    /// Removes `coefficient * stiffness` of the current error by moving body
    /// positions. Missing and non-dynamic bodies are left untouched.
    fn solve_position(&self, bodies: &mut BodySet, coefficient: f64);

    /// Whether the constraint references `id`.
    fn involves(&self, id: BodyId) -> bool;
}

/// Mass of a body that constraints may move, `None` for fixed bodies.
pub(crate) fn dynamic_mass(body: &RigidBody) -> Option<f64> {
    body.is_dynamic().then_some(body.mass)
}

/// Splits a correction between participants so that heavier bodies move
/// less: each dynamic body gets `(M - m_i) / ((n - 1) * M)`, a lone dynamic
/// body gets everything and fixed bodies get nothing. Returns `None` when no
/// participant can move.
pub(crate) fn mass_shares<const N: usize>(masses: [Option<f64>; N]) -> Option<[f64; N]> {
    let dynamic = masses.iter().flatten().count();
    let total: f64 = masses.iter().flatten().sum();
    match dynamic {
        0 => None,
        1 => Some(masses.map(|m| if m.is_some() { 1.0 } else { 0.0 })),
        n => {
            let denominator = (n - 1) as f64 * total;
            Some(masses.map(|m| m.map_or(0.0, |m| (total - m) / denominator)))
        }
    }
}
