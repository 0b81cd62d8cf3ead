use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A vector in the world frame, in feet (or feet/s, feet/s² depending on context).
#[derive(Deserialize, Serialize, PartialEq, Clone, Copy, Debug, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn norm(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Returns the unit vector pointing the same way.
    /// A zero vector stays zero instead of turning into NaNs.
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm == 0. {
            return *self;
        }
        *self / norm
    }

    pub fn dot(&self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(&self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn distance_to(&self, rhs: Self) -> f64 {
        (rhs - *self).norm()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizing_zero_stays_zero() {
        assert_eq!(Vec3::zero().normalized(), Vec3::zero());
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vec3::new(1., 0., 0.);
        let y = Vec3::new(0., 1., 0.);
        assert_eq!(x.cross(y), Vec3::new(0., 0., 1.));
    }

    #[test]
    fn norm_of_3_4_12() {
        assert_eq!(Vec3::new(3., 4., 12.).norm(), 13.);
    }
}
