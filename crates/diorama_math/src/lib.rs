//! Math value types for Diorama
//!
//! The world is Z-up: props stand on the XY floor plane and trigger areas
//! are rectangles on that plane.
//!
//! - [`Vec2`] - floor-plane position or extent
//! - [`Vec3`] - world-space position, offset or per-axis range
//! - [`Euler`] - rotation as XYZ Euler angles in radians

mod vec2;
mod vec3;
mod euler;

pub use vec2::Vec2;
pub use vec3::Vec3;
pub use euler::Euler;
