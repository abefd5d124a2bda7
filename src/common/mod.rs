pub mod config;
pub mod material;

pub use config::PhysicsConfig;
pub use material::Material;
