pub mod body_set;
pub mod rigid_body;

pub use body_set::{BodyId, BodySet};
pub use rigid_body::{RigidBody, Treatment};
