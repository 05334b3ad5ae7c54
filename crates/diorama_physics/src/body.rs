//! Rigid body types

use crate::material::PhysicsMaterial;
use crate::shapes::{Aabb, Collider, Plane, Sphere};
use diorama_math::{Euler, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Generational: once a body is removed its key resolves to `None`, even
    /// if the slot is reused.
    pub struct BodyKey;
}

/// How a body participates in the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    /// Never moves (mass 0 props, floor pieces)
    Static,
    /// Integrated with gravity and contacts
    Dynamic,
}

/// A rigid body with a spawn transform it can be reset to
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position in world space
    pub position: Vec3,
    /// Orientation (carried for rendering; the reference solver does not spin bodies)
    pub rotation: Euler,
    /// Linear velocity (units per second)
    pub velocity: Vec3,
    /// Mass, used to split contact corrections
    pub mass: f32,
    /// Collision shape in world space
    pub collider: Collider,
    /// Surface material
    pub material: PhysicsMaterial,
    body_type: BodyType,
    can_sleep: bool,
    sleeping: bool,
    still_time: f32,
    spawn_position: Vec3,
    spawn_rotation: Euler,
}

impl RigidBody {
    fn with_collider(position: Vec3, collider: Collider) -> Self {
        Self {
            position,
            rotation: Euler::IDENTITY,
            velocity: Vec3::ZERO,
            mass: 1.0,
            collider,
            material: PhysicsMaterial::default(),
            body_type: BodyType::Dynamic,
            can_sleep: true,
            sleeping: false,
            still_time: 0.0,
            spawn_position: position,
            spawn_rotation: Euler::IDENTITY,
        }
    }

    /// Create a dynamic body with a sphere collider
    pub fn new_sphere(position: Vec3, radius: f32) -> Self {
        Self::with_collider(position, Collider::Sphere(Sphere::new(position, radius)))
    }

    /// Create a dynamic body with an AABB collider
    pub fn new_aabb(position: Vec3, half_extents: Vec3) -> Self {
        Self::with_collider(
            position,
            Collider::Aabb(Aabb::from_center_half_extents(position, half_extents)),
        )
    }

    /// Create a body from an already-placed collider
    ///
    /// `position` is the body origin; the collider keeps its offset from it.
    pub fn from_collider(position: Vec3, collider: Collider) -> Self {
        Self::with_collider(position, collider)
    }

    /// Set the mass; a mass of zero makes the body static
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self.body_type = if mass > 0.0 { BodyType::Dynamic } else { BodyType::Static };
        self
    }

    /// Set the orientation; also becomes the spawn orientation
    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.rotation = rotation;
        self.spawn_rotation = rotation;
        self
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the surface material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Allow or forbid the body from going dormant
    pub fn with_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Get the body type
    #[inline]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Check if this body is static
    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Check if this body is dormant
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Whether the body is allowed to go dormant
    #[inline]
    pub fn can_sleep(&self) -> bool {
        self.can_sleep
    }

    /// Position the body was created at
    #[inline]
    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    /// Orientation the body was created with
    #[inline]
    pub fn spawn_rotation(&self) -> Euler {
        self.spawn_rotation
    }

    /// True if the body moves or can be moved
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_static() && !self.sleeping
    }

    /// Update the position and sync the collider
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.collider = self.collider.translated(delta);
    }

    /// Apply a positional correction (e.g., from collision resolution)
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.position += correction;
        self.collider = self.collider.translated(correction);
    }

    /// Restore the spawn transform, zero velocity and wake the body
    pub fn reset(&mut self) {
        self.set_position(self.spawn_position);
        self.rotation = self.spawn_rotation;
        self.velocity = Vec3::ZERO;
        self.wake();
    }

    /// Wake a dormant body
    pub fn wake(&mut self) {
        self.sleeping = false;
        self.still_time = 0.0;
    }

    /// Advance the sleep timer; returns true if the body just fell asleep
    pub(crate) fn update_sleep(&mut self, dt: f32, speed_limit: f32, time_limit: f32) -> bool {
        if !self.can_sleep || !self.is_active() {
            return false;
        }
        if self.velocity.length() < speed_limit {
            self.still_time += dt;
            if self.still_time >= time_limit {
                self.sleeping = true;
                self.velocity = Vec3::ZERO;
                return true;
            }
        } else {
            self.still_time = 0.0;
        }
        false
    }
}

/// A static collider (floor, invisible boundary)
#[derive(Clone, Debug)]
pub struct StaticCollider {
    /// The collision shape
    pub collider: Collider,
    /// Surface material
    pub material: PhysicsMaterial,
}

impl StaticCollider {
    /// Horizontal ground plane at height `z`
    pub fn floor(z: f32, material: PhysicsMaterial) -> Self {
        Self {
            collider: Collider::Plane(Plane::floor(z)),
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sphere_body() {
        let pos = Vec3::new(1.0, 2.0, 3.0);
        let body = RigidBody::new_sphere(pos, 0.5);

        assert_eq!(body.position, pos);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.body_type(), BodyType::Dynamic);
        assert_eq!(body.collider.center(), pos);
        assert_eq!(body.spawn_position(), pos);
    }

    #[test]
    fn test_zero_mass_is_static() {
        let body = RigidBody::new_aabb(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)).with_mass(0.0);
        assert!(body.is_static());
        assert!(!body.is_active());
    }

    #[test]
    fn test_reset_restores_spawn() {
        let mut body = RigidBody::new_sphere(Vec3::new(0.0, 0.0, 1.0), 0.5)
            .with_rotation(Euler::yaw(0.3));
        body.set_position(Vec3::new(40.0, -3.0, 0.5));
        body.rotation = Euler::new(1.0, 1.0, 1.0);
        body.velocity = Vec3::new(5.0, 0.0, 0.0);

        body.reset();

        assert_eq!(body.position, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(body.collider.center(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(body.rotation, Euler::yaw(0.3));
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_sleep_after_rest() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.5);
        assert!(!body.update_sleep(0.3, 0.1, 0.5));
        assert!(body.update_sleep(0.3, 0.1, 0.5));
        assert!(body.is_sleeping());

        body.wake();
        assert!(!body.is_sleeping());
    }

    #[test]
    fn test_sleep_disabled() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.5).with_sleep(false);
        for _ in 0..10 {
            assert!(!body.update_sleep(1.0, 0.1, 0.5));
        }
        assert!(!body.is_sleeping());
    }

    #[test]
    fn test_apply_correction() {
        let mut body = RigidBody::new_sphere(Vec3::new(1.0, 0.0, 0.0), 1.0);
        body.apply_correction(Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(body.position, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(body.collider.center(), Vec3::new(1.0, 0.0, 0.5));
    }
}
