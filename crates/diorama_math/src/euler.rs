//! Euler-angle rotation
//!
//! Rotations are stored as XYZ Euler angles in radians, matching how prop
//! templates describe them. The composed matrix is `Rx * Ry * Rz`.

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};

use crate::Vec3;

/// Rotation as XYZ Euler angles (radians)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    /// No rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a rotation from per-axis angles
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation about the vertical (z) axis only
    #[inline]
    pub const fn yaw(angle: f32) -> Self {
        Self::new(0.0, 0.0, angle)
    }

    /// Add per-axis angles on top of this rotation
    ///
    /// This is how jitter is layered over a template's base rotation: the
    /// angles are summed axis by axis, not composed as matrices.
    #[inline]
    pub fn offset_by(self, delta: Euler) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// Row-major rotation matrix
    pub fn to_matrix(self) -> [[f32; 3]; 3] {
        let (b, a) = self.x.sin_cos();
        let (d, c) = self.y.sin_cos();
        let (f, e) = self.z.sin_cos();

        let ae = a * e;
        let af = a * f;
        let be = b * e;
        let bf = b * f;

        [
            [c * e, -c * f, d],
            [af + be * d, ae - bf * d, -b * c],
            [bf - ae * d, be + af * d, a * c],
        ]
    }

    /// Rotate a vector by this rotation
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let m = self.to_matrix();
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// True when every angle is finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(Euler::IDENTITY.rotate(v), v));
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let r = Euler::yaw(PI / 2.0);
        let rotated = r.rotate(Vec3::X);
        assert!(vec_approx_eq(rotated, Vec3::Y), "Expected Y, got {:?}", rotated);
    }

    #[test]
    fn test_pitch_quarter_turn() {
        // Ball props are laid on their side with a quarter turn about x
        let r = Euler::new(PI / 2.0, 0.0, 0.0);
        let rotated = r.rotate(Vec3::Y);
        assert!(vec_approx_eq(rotated, Vec3::Z), "Expected Z, got {:?}", rotated);
    }

    #[test]
    fn test_offset_by_sums_angles() {
        let base = Euler::new(0.1, 0.2, 0.3);
        let jitter = Euler::new(0.0, -0.2, 0.5);
        assert_eq!(base.offset_by(jitter), Euler::new(0.1, 0.0, 0.8));
    }

    #[test]
    fn test_rotation_preserves_length() {
        let r = Euler::new(0.4, -1.1, 2.3);
        let v = Vec3::new(1.0, -2.0, 0.5);
        assert!((r.rotate(v).length() - v.length()).abs() < EPSILON);
    }
}
