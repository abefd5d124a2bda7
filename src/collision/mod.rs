pub mod aabb;
pub mod detection;
pub mod detector;
pub mod gjk;
pub mod manifold;
pub mod sweep_prune;

// Re-export key types
pub use aabb::Aabb;
pub use detection::{check_circle_circle, Collider, MinkowskiSupport, NarrowPhase, NarrowPhaseStats};
pub use detector::CollisionDetector;
pub use gjk::{gjk, ClosestPoints, GjkResult, Simplex, Support, SupportPoint};
pub use manifold::CollisionManifold;
pub use sweep_prune::{pair_key, SweepAndPrune};
