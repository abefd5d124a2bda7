//! A 2D rigid-body collision pipeline.
//!
//! Each [`PhysicsWorld::step`] runs a sweep-and-prune broad phase, a GJK
//! narrow phase with closed-form circle and compound paths, an impulse
//! resolver with friction and damped positional correction, and an
//! iterative distance/angle constraint solver. Integration of velocities
//! into positions is left to the caller.

pub mod collision;
pub mod common;
pub mod constraints;
pub mod error;
pub mod math;
pub mod objects;
pub mod response;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use collision::{Aabb, CollisionDetector, CollisionManifold, SweepAndPrune};
pub use common::{Material, PhysicsConfig};
pub use constraints::{AngleConstraint, Constraint, ConstraintHandle, ConstraintSolver, DistanceConstraint};
pub use error::{PhysicsError, PhysicsResult};
pub use math::{Transform, Vec2};
pub use objects::{BodyId, BodySet, RigidBody, Treatment};
pub use response::{ContactImpulse, ImpulseResolver};
pub use shapes::{Circle, Compound, CompoundChild, Polygon, Shape};
pub use world::{PhysicsWorld, StepStats};
