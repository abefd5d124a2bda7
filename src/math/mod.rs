pub mod transform;
pub mod vec2;

pub use transform::Transform;
pub use vec2::Vec2;

use std::f64::consts::PI;

/// Wraps an angle in radians into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}
