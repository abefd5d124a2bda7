pub mod impulse;

pub use impulse::{clamp_mtv, ContactImpulse, ImpulseResolver};
