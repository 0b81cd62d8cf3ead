use super::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Unit quaternion describing an orientation, `w` being the scalar part.
#[derive(Deserialize, Serialize, PartialEq, Clone, Copy, Debug)]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    pub const fn identity() -> Self {
        Self {
            w: 1.,
            x: 0.,
            y: 0.,
            z: 0.,
        }
    }

    /// Rotation of `angle` radians around `axis` (normalized here).
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let axis = axis.normalized();
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self {
            w: cos,
            x: axis.x * sin,
            y: axis.y * sin,
            z: axis.z * sin,
        }
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalized(&self) -> Self {
        let n = self.norm();
        Self {
            w: self.w / n,
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        }
    }

    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.;
        v + t * self.w + u.cross(t)
    }
}

impl Mul for Quat {
    type Output = Quat;

    /// `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self::Output {
        Quat {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.distance_to(b) < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn quarter_turn_around_y() {
        let q = Quat::from_axis_angle(Vec3::new(0., 1., 0.), FRAC_PI_2);
        assert_close(q.rotate(Vec3::new(1., 0., 0.)), Vec3::new(0., 0., -1.));
    }

    #[test]
    fn two_half_rotations_compose() {
        let axis = Vec3::new(0.3, 0., 0.9);
        let half = Quat::from_axis_angle(axis, 0.7);
        let full = Quat::from_axis_angle(axis, 1.4);
        let v = Vec3::new(0.2, -1., 3.);
        assert_close((half * half).rotate(v), full.rotate(v));
    }
}
