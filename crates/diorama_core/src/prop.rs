//! Prop templates
//!
//! A [`PropTemplate`] describes one placeable prop: which assets it uses,
//! where it spawns, how heavy it is and which optional extras (shadow
//! decal, baked floor shadow, impact sound) it carries. Templates are
//! immutable values; the `with_*` builders return modified copies so a
//! shared base template is never changed by a variant derived from it.

use diorama_math::{Euler, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;

/// Footprint of the soft shadow decal that follows a dynamic prop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowSpec {
    /// Width of the decal along X
    pub size_x: f32,
    /// Depth of the decal along Y
    pub size_y: f32,
    /// Vertical offset of the decal relative to the prop
    pub offset_z: f32,
    /// Opacity (0.0 - 1.0)
    pub alpha: f32,
}

impl ShadowSpec {
    /// Create a shadow footprint
    pub const fn new(size_x: f32, size_y: f32, offset_z: f32, alpha: f32) -> Self {
        Self {
            size_x,
            size_y,
            offset_z,
            alpha,
        }
    }
}

/// Impact sound category played when a prop is hit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    Brick,
    Horn,
    BowlingPin,
    BowlingBall,
}

fn default_sleep() -> bool {
    true
}

/// Immutable description of a placeable prop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropTemplate {
    /// Visual asset id
    pub visual: String,
    /// Collision asset id
    pub collision: String,
    /// Spawn position when placed alone; added to compiled positions in a wall
    #[serde(default)]
    pub offset: Vec3,
    /// Base rotation
    #[serde(default)]
    pub rotation: Euler,
    /// Mass (0 = static, never moves)
    #[serde(default)]
    pub mass: f32,
    /// Soft shadow decal following the body
    #[serde(default)]
    pub shadow: Option<ShadowSpec>,
    /// Baked floor shadow texture id (static props)
    #[serde(default)]
    pub floor_shadow: Option<String>,
    /// Impact sound
    #[serde(default)]
    pub sound: Option<SoundKind>,
    /// Share geometry with every other prop using the same assets
    #[serde(default)]
    pub duplicated: bool,
    /// Whether the body may go dormant when at rest
    #[serde(default = "default_sleep")]
    pub sleep: bool,
}

impl PropTemplate {
    /// Create a static template at the origin using the given assets
    pub fn new(visual: impl Into<String>, collision: impl Into<String>) -> Self {
        Self {
            visual: visual.into(),
            collision: collision.into(),
            offset: Vec3::ZERO,
            rotation: Euler::IDENTITY,
            mass: 0.0,
            shadow: None,
            floor_shadow: None,
            sound: None,
            duplicated: false,
            sleep: true,
        }
    }

    /// Set the offset (spawn position)
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Set the base rotation
    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Attach a shadow decal
    pub fn with_shadow(mut self, shadow: ShadowSpec) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Attach a baked floor shadow texture
    pub fn with_floor_shadow(mut self, texture: impl Into<String>) -> Self {
        self.floor_shadow = Some(texture.into());
        self
    }

    /// Attach an impact sound
    pub fn with_sound(mut self, sound: SoundKind) -> Self {
        self.sound = Some(sound);
        self
    }

    /// Mark the template's geometry as shared between instances
    pub fn duplicated(mut self) -> Self {
        self.duplicated = true;
        self
    }

    /// Allow or forbid sleeping
    pub fn with_sleep(mut self, sleep: bool) -> Self {
        self.sleep = sleep;
        self
    }

    /// True if props built from this template never move
    #[inline]
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    /// Check the template for values no prop can be built from
    pub fn validate(&self) -> Result<(), PlacementError> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PlacementError::InvalidTemplate(format!(
                "prop '{}' has invalid mass {}",
                self.visual, self.mass
            )));
        }
        if !self.offset.is_finite() || !self.rotation.is_finite() {
            return Err(PlacementError::InvalidTemplate(format!(
                "prop '{}' has a non-finite offset or rotation",
                self.visual
            )));
        }
        if let Some(shadow) = &self.shadow {
            let sizes_ok = shadow.size_x.is_finite() && shadow.size_y.is_finite() && shadow.size_x > 0.0 && shadow.size_y > 0.0;
            if !sizes_ok || !(0.0..=1.0).contains(&shadow.alpha) {
                return Err(PlacementError::InvalidTemplate(format!(
                    "prop '{}' has an invalid shadow {:?}",
                    self.visual, shadow
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_template_is_static() {
        let t = PropTemplate::new("base", "base");
        assert!(t.is_static());
        assert!(t.sleep);
        assert!(!t.duplicated);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_with_builders_leave_base_untouched() {
        let base = PropTemplate::new("arrow", "arrow").with_mass(1.5).duplicated();
        let rotated = base.clone().with_rotation(Euler::yaw(std::f32::consts::PI));

        assert_eq!(base.rotation, Euler::IDENTITY);
        assert_eq!(rotated.rotation.z, std::f32::consts::PI);
        assert_eq!(rotated.mass, 1.5);
        assert!(rotated.duplicated);
    }

    #[test]
    fn test_negative_mass_rejected() {
        let t = PropTemplate::new("a", "a").with_mass(-1.0);
        assert!(matches!(t.validate(), Err(PlacementError::InvalidTemplate(_))));
    }

    #[test]
    fn test_nan_offset_rejected() {
        let t = PropTemplate::new("a", "a").with_offset(Vec3::new(0.0, f32::NAN, 0.0));
        assert!(matches!(t.validate(), Err(PlacementError::InvalidTemplate(_))));
    }

    #[test]
    fn test_bad_shadow_rejected() {
        let t = PropTemplate::new("a", "a").with_shadow(ShadowSpec::new(0.0, 1.0, 0.0, 0.5));
        assert!(t.validate().is_err());
        let t = PropTemplate::new("a", "a").with_shadow(ShadowSpec::new(1.0, 1.0, 0.0, 1.5));
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let t: PropTemplate = ron::from_str(
            r#"(visual: "brick", collision: "brick", mass: 0.5, sound: Some(Brick), duplicated: true)"#,
        )
        .unwrap();
        assert_eq!(t.mass, 0.5);
        assert_eq!(t.sound, Some(SoundKind::Brick));
        assert!(t.sleep);
        assert_eq!(t.offset, Vec3::ZERO);
    }
}
