//! World transform of a placed prop
//!
//! Props are not scaled, so a transform is just a position and an Euler
//! rotation.

use diorama_math::{Euler, Vec3};
use serde::{Deserialize, Serialize};

/// Position and rotation of a prop in world space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as XYZ Euler angles
    #[serde(default)]
    pub rotation: Euler,
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Euler::IDENTITY,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Euler::IDENTITY,
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Euler) -> Self {
        Self { position, rotation }
    }

    /// Transform a point from local space to world space
    ///
    /// Applies rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.position
    }

    /// Transform a direction from local space to world space
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate(d)
    }

    /// True if every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 0.0001
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(approx_eq(t.transform_point(p), p));
    }

    #[test]
    fn test_translation() {
        let t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        assert!(approx_eq(t.transform_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(11.0, 0.0, 0.0)));
    }

    #[test]
    fn test_transform_order() {
        // Rotate a quarter turn about Z, then translate
        let t = Transform::from_position_rotation(Vec3::new(0.0, 0.0, 1.0), Euler::yaw(FRAC_PI_2));
        let p = t.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_eq(p, Vec3::new(0.0, 1.0, 1.0)));
        assert!(approx_eq(t.transform_direction(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_non_finite() {
        let t = Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!t.is_finite());
        assert!(Transform::default().is_finite());
    }
}
