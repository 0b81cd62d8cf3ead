mod quat;
mod vec;

pub use quat::Quat;
pub use vec::Vec3;

use std::f64::consts::TAU;

/// Converts revolutions per minute to radians per second.
pub fn rpm_to_rad_per_sec(rpm: f64) -> f64 {
    rpm / 60. * TAU
}
