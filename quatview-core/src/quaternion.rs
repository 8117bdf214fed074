/// Quaternions for camera orientation
use std::ops::{Add, Mul};

use approx::{AbsDiffEq, RelativeEq};
use nalgebra::Matrix3;

use crate::error::{Error, Result};
use crate::vector::Vector3;

/// A quaternion with scalar part `r` and vector part `c`.
///
/// A rotation by `theta` about the unit axis `v` is `(cos(theta/2), v * sin(theta/2))`.
/// Only unit quaternions represent pure rotations, so anything built up by
/// repeated multiplication must go through [`Quaternion::normalize`] before it
/// is used as an orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub r: f64,
    pub c: Vector3,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        r: 1.0,
        c: Vector3::ZERO,
    };

    pub const fn from_parts(r: f64, c: Vector3) -> Self {
        Self { r, c }
    }

    pub const fn from_components(r: f64, i: f64, j: f64, k: f64) -> Self {
        Self {
            r,
            c: Vector3::new(i, j, k),
        }
    }

    /// Rotation of `theta` radians about `axis`. The axis does not need to be unit length.
    pub fn from_axis_angle(axis: Vector3, theta: f64) -> Result<Self> {
        let axis = axis.normalize()?;
        Ok(Self::from_unit_axis_angle(axis, theta))
    }

    pub(crate) fn from_unit_axis_angle(axis: Vector3, theta: f64) -> Self {
        let half = theta / 2.0;
        Self::from_parts(half.cos(), axis.scale(half.sin()))
    }

    pub fn add(self, other: Self) -> Self {
        Self::from_parts(self.r + other.r, self.c + other.c)
    }

    /// Hamilton product `self * other`.
    pub fn multiply(self, other: Self) -> Self {
        let (p, q) = (self, other);
        Self::from_parts(
            p.r * q.r - p.c.dot(q.c),
            q.c.scale(p.r) + p.c.scale(q.r) + p.c.cross(q.c),
        )
    }

    pub fn conjugate(self) -> Self {
        Self::from_parts(self.r, -self.c)
    }

    pub fn magnitude(self) -> f64 {
        (self.r * self.r + self.c.dot(self.c)).sqrt()
    }

    pub fn normalize(self) -> Result<Self> {
        let mag = self.magnitude();
        if mag == 0.0 || !mag.is_finite() {
            return Err(Error::ZeroMagnitude("quaternion"));
        }
        Ok(Self::from_parts(self.r / mag, self.c.scale(1.0 / mag)))
    }

    /// Rotate `v` by this (unit) quaternion, i.e. the vector part of `q * v * q̄`.
    pub fn rotate(self, v: Vector3) -> Vector3 {
        let Self { r, c } = self;
        v.scale(r * r - c.dot(c)) + c.scale(2.0 * c.dot(v)) + c.cross(v).scale(2.0 * r)
    }

    /// Rotation matrix of this (unit) quaternion.
    ///
    /// Column `i` is the image of world basis vector `e_i`, so for a camera
    /// orientation the columns are its right, up and forward axes in world space.
    pub fn rotation_matrix(self) -> Matrix3<f64> {
        let (r, x, y, z) = (self.r, self.c.x, self.c.y, self.c.z);
        Matrix3::new(
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - r * z),
            2.0 * (x * z + r * y),
            2.0 * (x * y + r * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - r * x),
            2.0 * (x * z - r * y),
            2.0 * (y * z + r * x),
            1.0 - 2.0 * (x * x + y * y),
        )
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Quaternion::add(self, rhs)
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.r.abs_diff_eq(&other.r, epsilon) && self.c.abs_diff_eq(&other.c, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.r.relative_eq(&other.r, epsilon, max_relative)
            && self.c.relative_eq(&other.c, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn samples() -> Vec<Quaternion> {
        vec![
            Quaternion::from_components(1.0, 2.0, 3.0, 4.0),
            Quaternion::from_components(-0.3, 0.01, 5.0, -2.0),
            Quaternion::from_components(1e-4, 0.0, 0.0, 3e-4),
            Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 0.7).unwrap(),
        ]
    }

    #[test]
    fn test_normalize_gives_unit_magnitude() {
        for q in samples() {
            assert_abs_diff_eq!(q.normalize().unwrap().magnitude(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_normalize_rejects_zero() {
        let zero = Quaternion::from_components(0.0, 0.0, 0.0, 0.0);
        assert_eq!(zero.normalize(), Err(Error::ZeroMagnitude("quaternion")));
    }

    #[test]
    fn test_multiplication_is_not_commutative() {
        let qx = Quaternion::from_axis_angle(Vector3::X, FRAC_PI_2).unwrap();
        let qy = Quaternion::from_axis_angle(Vector3::Y, FRAC_PI_2).unwrap();
        let xy = qx * qy;
        let yx = qy * qx;
        assert!(!xy.abs_diff_eq(&yx, 1e-6));
    }

    #[test]
    fn test_add_is_componentwise() {
        let p = Quaternion::from_components(1.0, 2.0, 3.0, 4.0);
        let q = Quaternion::from_components(-0.5, 0.0, 1.5, -4.0);
        let sum = Quaternion::from_components(0.5, 2.0, 4.5, 0.0);
        assert_eq!(p.add(q), sum);
        assert_eq!(p + q, sum);
        assert_eq!(p + Quaternion::from_components(0.0, 0.0, 0.0, 0.0), p);
    }

    #[test]
    fn test_product_with_conjugate() {
        for q in samples() {
            let p = q * q.conjugate();
            let mag = q.magnitude();
            assert_abs_diff_eq!(p.c, Vector3::ZERO, epsilon = 1e-9);
            assert_abs_diff_eq!(p.r, mag * mag, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_identity_leaves_vectors_unchanged() {
        let v = Vector3::new(0.5, -4.0, 12.0);
        assert_eq!(Quaternion::IDENTITY.rotate(v), v);
        assert_eq!(Quaternion::IDENTITY.rotation_matrix(), Matrix3::identity());
    }

    #[test]
    fn test_rotate_matches_sandwich_product() {
        let q = Quaternion::from_axis_angle(Vector3::new(0.2, -1.0, 0.4), 1.3).unwrap();
        let v = Vector3::new(1.0, 2.0, 3.0);
        let sandwich = q * Quaternion::from_parts(0.0, v) * q.conjugate();
        assert_abs_diff_eq!(sandwich.r, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.rotate(v), sandwich.c, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_matrix_matches_rotate() {
        let q = Quaternion::from_axis_angle(Vector3::new(-3.0, 1.0, 2.0), 2.1).unwrap();
        let m = q.rotation_matrix();
        for v in [Vector3::X, Vector3::Y, Vector3::Z, Vector3::new(4.0, -1.0, 0.5)] {
            let by_matrix = Vector3::from(m * nalgebra::Vector3::from(v));
            assert_abs_diff_eq!(by_matrix, q.rotate(v), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(m.transpose() * m, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_turn_about_y_takes_z_to_x() {
        let q = Quaternion::from_axis_angle(Vector3::Y, FRAC_PI_2).unwrap();
        assert_abs_diff_eq!(q.rotate(Vector3::Z), Vector3::X, epsilon = 1e-12);
        assert_abs_diff_eq!(q.rotate(Vector3::X), -Vector3::Z, epsilon = 1e-12);
    }

    #[test]
    fn test_half_turn_angles_compose() {
        let half = Quaternion::from_axis_angle(Vector3::Z, PI / 2.0).unwrap();
        let full = Quaternion::from_axis_angle(Vector3::Z, PI).unwrap();
        assert_abs_diff_eq!(half * half, full, epsilon = 1e-12);
    }

    #[test]
    fn test_from_axis_angle_rejects_zero_axis() {
        assert!(Quaternion::from_axis_angle(Vector3::ZERO, 1.0).is_err());
    }
}
