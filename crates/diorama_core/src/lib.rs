//! Core placement engine for Diorama
//!
//! This crate turns declarative scene data into live, physics-backed props:
//!
//! - [`AssetCache`] - Named visual, collision and texture resources
//! - [`PropTemplate`] - Immutable description of a placeable prop
//! - [`ShapeDescriptor`] - Brick and triangle structures, expanded by [`compile`]
//! - [`ObjectRegistry`] - Places single props and owns their bodies, shadows and sounds
//! - [`WallRegistry`] - Places a whole structure atomically
//! - [`AreaRegistry`] - Edge-triggered 2D trigger areas
//! - [`MaterialSlots`] - Placeholder materials swapped in when textures load
//! - [`SectionLayout`] - RON description of a section's props, walls and areas

mod area;
mod asset_cache;
mod error;
mod layout;
mod materials;
mod object;
mod prop;
mod shape;
mod transform;
mod wall;

pub use area::{ActorId, AreaKey, AreaRegistry, AreaSpec, Interaction};
pub use asset_cache::{Asset, AssetCache, AssetManifest, CollisionAsset, CollisionShape, TextureAsset, VisualAsset};
pub use error::{AssetError, LayoutError, PlacementError};
pub use layout::{LayoutArea, LayoutInstance, LayoutWall, SectionLayout};
pub use materials::{LoadedTexture, MaterialKey, MaterialSlot, MaterialSlots, TextureRequest};
pub use object::{DirtyFlags, Geometry, ImpactSound, ObjectKey, ObjectRegistry, PlacedObject, ShadowDecal};
pub use prop::{PropTemplate, ShadowSpec, SoundKind};
pub use shape::{
    compile, compile_seeded, BrickShape, PlacedInstance, ShapeDescriptor, TriangleShape, MAX_SHAPE_INSTANCES,
};
pub use transform::Transform;
pub use wall::{WallHandle, WallRegistry, WallSpec};

// Re-export commonly used types from the lower crates for convenience
pub use diorama_math::{Euler, Vec2, Vec3};
pub use diorama_physics::{BodyKey, PhysicsConfig, PhysicsWorld};
