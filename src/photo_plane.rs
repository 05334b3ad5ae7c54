//! Textured photo planes
//!
//! A flat image laid on the floor (the playground, the school logo). The
//! plane is invisible until its texture arrives; there is no placeholder
//! color, so a failed load simply leaves nothing drawn.

use diorama_core::{MaterialKey, MaterialSlots, Vec3};

/// Height above the floor, to avoid z-fighting
pub const PLANE_LIFT: f32 = 0.01;

/// An image plane backed by a material slot
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoPlane {
    pub source: String,
    pub width: f32,
    pub height: f32,
    pub position: Vec3,
    pub material: MaterialKey,
}

impl PhotoPlane {
    /// Create a plane and queue its texture load
    pub fn new(materials: &mut MaterialSlots, source: impl Into<String>, width: f32, height: f32, position: Vec3) -> Self {
        let source = source.into();
        let material = materials.request(source.clone());
        log::debug!("Photo plane '{}' {}x{} at {:?}", source, width, height, position);
        Self {
            source,
            width,
            height,
            position,
            material,
        }
    }

    /// True once the texture has loaded
    pub fn is_visible(&self, materials: &MaterialSlots) -> bool {
        materials.get(self.material).is_some_and(|slot| !slot.is_placeholder())
    }
}
