//! Rigid-body physics for Diorama props
//!
//! A small Z-up simulation standing in for a full physics engine:
//! - Collision shapes (spheres, AABBs, planes)
//! - Gravity, floor and body-body contacts
//! - Spawn transforms with `reset()` for gameplay resets
//! - Sleep policy for bodies that have come to rest
//! - Contact events carrying impact speed (drives impact sounds)

pub mod body;
pub mod collision;
pub mod material;
pub mod shapes;
pub mod world;

pub use body::{BodyKey, BodyType, RigidBody, StaticCollider};
pub use collision::{aabb_vs_aabb, aabb_vs_plane, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, Contact};
pub use material::PhysicsMaterial;
pub use shapes::{Aabb, Collider, Plane, Sphere};
pub use world::{ContactEvent, PhysicsConfig, PhysicsWorld};
