//! Object registry
//!
//! Places single props. Every placement resolves the template's assets,
//! creates a rigid body in the physics world and attaches the optional
//! extras (shadow decal, baked floor shadow, impact sound). The registry
//! then keeps each object's transform in sync with its body and turns
//! physics contacts into impact sounds.

use std::collections::HashMap;
use std::sync::Arc;

use bitflags::bitflags;
use diorama_math::{Euler, Vec2, Vec3};
use diorama_physics::{BodyKey, PhysicsWorld, RigidBody};
use slotmap::{new_key_type, SlotMap};

use crate::asset_cache::{AssetCache, CollisionAsset, TextureAsset, VisualAsset};
use crate::error::PlacementError;
use crate::prop::{PropTemplate, ShadowSpec, SoundKind};
use crate::transform::Transform;

/// Slowest impact that still makes a sound
const MIN_IMPACT_SPEED: f32 = 1.0;
/// Impact speed at which a sound plays at full volume
const FULL_VOLUME_SPEED: f32 = 10.0;

new_key_type! {
    /// Generational key to a placed object
    pub struct ObjectKey;
}

bitflags! {
    /// Flags indicating which parts of an object changed since the renderer
    /// last looked at it
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Position or rotation changed
        const TRANSFORM = 1 << 0;
        /// Shadow decal moved
        const SHADOW = 1 << 1;
        /// Geometry was (re)assigned
        const MESH = 1 << 2;
        /// All flags set - object needs a full rebuild
        const ALL = Self::TRANSFORM.bits() | Self::SHADOW.bits() | Self::MESH.bits();
    }
}

/// Resolved geometry of a prop
///
/// Duplicated props share one `Arc<Geometry>`; other props own a deep copy.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub visual: Arc<VisualAsset>,
    pub collision: Arc<CollisionAsset>,
}

/// Soft shadow decal under a prop, following its body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowDecal {
    /// Center of the decal
    pub position: Vec3,
    /// Footprint size
    pub size: Vec2,
    /// Heading of the decal (follows the body's yaw)
    pub yaw: f32,
    /// Opacity
    pub alpha: f32,
    offset_z: f32,
}

impl ShadowDecal {
    fn new(spec: &ShadowSpec, transform: &Transform) -> Self {
        let mut decal = Self {
            position: Vec3::ZERO,
            size: Vec2::new(spec.size_x, spec.size_y),
            yaw: 0.0,
            alpha: spec.alpha,
            offset_z: spec.offset_z,
        };
        decal.follow(transform);
        decal
    }

    fn follow(&mut self, transform: &Transform) {
        self.position = transform.position + Vec3::new(0.0, 0.0, self.offset_z);
        self.yaw = transform.rotation.z;
    }
}

/// An impact sound to be played by the audio layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactSound {
    pub object: ObjectKey,
    pub kind: SoundKind,
    /// Volume in (0.0, 1.0], scaled by impact speed
    pub volume: f32,
}

/// A live, placed prop
#[derive(Debug)]
pub struct PlacedObject {
    /// Template the object was placed from
    pub template: Arc<PropTemplate>,
    /// Current world transform (synced from the body)
    pub transform: Transform,
    /// Geometry, shared when the template is duplicated
    pub geometry: Arc<Geometry>,
    /// Rigid body in the physics world
    pub body: BodyKey,
    /// Soft shadow decal
    pub shadow: Option<ShadowDecal>,
    /// Baked floor shadow texture
    pub floor_shadow: Option<Arc<TextureAsset>>,
    dirty: DirtyFlags,
}

impl PlacedObject {
    /// Check if this object has any dirty flags set
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Mark this object as dirty with the given flags
    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Clear all dirty flags
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// Impact sound bound to this object
    pub fn sound(&self) -> Option<SoundKind> {
        self.template.sound
    }

    fn set_transform(&mut self, transform: Transform) {
        if self.transform == transform {
            return;
        }
        self.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM);
        if let Some(shadow) = &mut self.shadow {
            shadow.follow(&transform);
            self.dirty |= DirtyFlags::SHADOW;
        }
    }
}

/// Registry of placed props and their physics bodies
pub struct ObjectRegistry {
    assets: Arc<AssetCache>,
    physics: PhysicsWorld,
    objects: SlotMap<ObjectKey, PlacedObject>,
    by_body: HashMap<BodyKey, ObjectKey>,
    shared_geometry: HashMap<(String, String), Arc<Geometry>>,
    max_objects: Option<usize>,
    sounds: Vec<ImpactSound>,
}

impl ObjectRegistry {
    /// Create a registry resolving assets from `assets` and simulating in `physics`
    pub fn new(assets: Arc<AssetCache>, physics: PhysicsWorld) -> Self {
        Self {
            assets,
            physics,
            objects: SlotMap::with_key(),
            by_body: HashMap::new(),
            shared_geometry: HashMap::new(),
            max_objects: None,
            sounds: Vec::new(),
        }
    }

    /// Limit the number of live objects
    pub fn with_max_objects(mut self, limit: usize) -> Self {
        self.max_objects = Some(limit);
        self
    }

    /// Place a prop at its template's own offset and rotation
    pub fn spawn(&mut self, template: &Arc<PropTemplate>) -> Result<ObjectKey, PlacementError> {
        let transform = Transform::from_position_rotation(template.offset, template.rotation);
        self.add(template, transform)
    }

    /// Place a prop at `transform`
    ///
    /// # Errors
    ///
    /// Fails without side effects if the registry is full, the template or
    /// transform is invalid, or one of the template's assets does not
    /// resolve.
    pub fn add(&mut self, template: &Arc<PropTemplate>, transform: Transform) -> Result<ObjectKey, PlacementError> {
        if let Some(limit) = self.max_objects {
            if self.objects.len() >= limit {
                return Err(PlacementError::CapacityExceeded { limit });
            }
        }
        template.validate()?;
        if !transform.is_finite() {
            return Err(PlacementError::InvalidTemplate(format!(
                "non-finite transform for prop '{}'",
                template.visual
            )));
        }

        let floor_shadow = match &template.floor_shadow {
            Some(id) => Some(self.assets.resolve::<TextureAsset>(id)?),
            None => None,
        };
        let geometry = self.geometry_for(template)?;

        let collision = &geometry.collision;
        let body = RigidBody::from_collider(transform.position, collision.collider_at(transform.position))
            .with_rotation(transform.rotation)
            .with_mass(template.mass)
            .with_material(collision.material)
            .with_sleep(template.sleep);
        let body_key = self.physics.add_body(body);

        let shadow = template.shadow.as_ref().map(|spec| ShadowDecal::new(spec, &transform));
        let key = self.objects.insert(PlacedObject {
            template: Arc::clone(template),
            transform,
            geometry,
            body: body_key,
            shadow,
            floor_shadow,
            dirty: DirtyFlags::ALL,
        });
        self.by_body.insert(body_key, key);

        log::debug!(
            "Placed '{}' at ({:.2}, {:.2}, {:.2})",
            template.visual,
            transform.position.x,
            transform.position.y,
            transform.position.z
        );
        Ok(key)
    }

    fn geometry_for(&mut self, template: &PropTemplate) -> Result<Arc<Geometry>, PlacementError> {
        let cache_key = (template.visual.clone(), template.collision.clone());
        if template.duplicated {
            if let Some(shared) = self.shared_geometry.get(&cache_key) {
                return Ok(Arc::clone(shared));
            }
        }

        let visual = self.assets.resolve::<VisualAsset>(&template.visual)?;
        let collision = self.assets.resolve::<CollisionAsset>(&template.collision)?;

        if template.duplicated {
            let shared = Arc::new(Geometry { visual, collision });
            self.shared_geometry.insert(cache_key, Arc::clone(&shared));
            Ok(shared)
        } else {
            Ok(Arc::new(Geometry {
                visual: Arc::new(VisualAsset::clone(&visual)),
                collision: Arc::new(CollisionAsset::clone(&collision)),
            }))
        }
    }

    /// Get an object by key
    pub fn get(&self, key: ObjectKey) -> Option<&PlacedObject> {
        self.objects.get(key)
    }

    /// Get a mutable object by key
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut PlacedObject> {
        self.objects.get_mut(key)
    }

    /// Check whether a key still refers to a live object
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Current transform of an object
    pub fn transform(&self, key: ObjectKey) -> Option<Transform> {
        self.objects.get(key).map(|o| o.transform)
    }

    /// Restore an object to its spawn transform, zero its velocity and wake it
    ///
    /// Returns false if the key is stale.
    pub fn reset(&mut self, key: ObjectKey) -> bool {
        let Some(object) = self.objects.get_mut(key) else {
            return false;
        };
        if !self.physics.reset_body(object.body) {
            return false;
        }
        if let Some(body) = self.physics.get_body(object.body) {
            object.set_transform(Transform::from_position_rotation(body.position, body.rotation));
        }
        true
    }

    /// Remove an object together with its body, shadow and sound binding
    ///
    /// Returns false if the key is stale.
    pub fn remove(&mut self, key: ObjectKey) -> bool {
        let Some(object) = self.objects.remove(key) else {
            return false;
        };
        self.physics.remove_body(object.body);
        self.by_body.remove(&object.body);

        // Drop pooled geometry nobody uses any more
        if object.template.duplicated {
            let cache_key = (object.template.visual.clone(), object.template.collision.clone());
            drop(object);
            if self
                .shared_geometry
                .get(&cache_key)
                .is_some_and(|g| Arc::strong_count(g) == 1)
            {
                self.shared_geometry.remove(&cache_key);
            }
        }
        true
    }

    /// Step physics, sync transforms and collect impact sounds
    pub fn update(&mut self, dt: f32) {
        self.physics.step(dt);

        let mut loudest: Vec<(ObjectKey, SoundKind, f32)> = Vec::new();
        for contact in self.physics.drain_contacts() {
            if contact.impact_speed < MIN_IMPACT_SPEED {
                continue;
            }
            let Some(&key) = self.by_body.get(&contact.body) else {
                continue;
            };
            let Some(kind) = self.objects.get(key).and_then(PlacedObject::sound) else {
                continue;
            };
            match loudest.iter_mut().find(|(k, _, _)| *k == key) {
                Some(entry) => entry.2 = entry.2.max(contact.impact_speed),
                None => loudest.push((key, kind, contact.impact_speed)),
            }
        }
        self.sounds.extend(loudest.into_iter().map(|(object, kind, speed)| ImpactSound {
            object,
            kind,
            volume: (speed / FULL_VOLUME_SPEED).min(1.0),
        }));

        for (_key, object) in &mut self.objects {
            if let Some(body) = self.physics.get_body(object.body) {
                object.set_transform(Transform::from_position_rotation(body.position, body.rotation));
            }
        }
    }

    /// Take the impact sounds collected since the last call
    pub fn drain_sounds(&mut self) -> Vec<ImpactSound> {
        std::mem::take(&mut self.sounds)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if no objects are placed
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects with their keys
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &PlacedObject)> {
        self.objects.iter()
    }

    /// Object limit, `None` when unbounded
    pub fn max_objects(&self) -> Option<usize> {
        self.max_objects
    }

    /// How many more objects fit, `None` when unbounded
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.max_objects.map(|limit| limit.saturating_sub(self.objects.len()))
    }

    /// Clear dirty flags on every object
    pub fn clear_all_dirty(&mut self) {
        for (_key, object) in &mut self.objects {
            object.clear_dirty();
        }
    }

    /// Number of distinct pooled geometries
    pub fn shared_geometry_count(&self) -> usize {
        self.shared_geometry.len()
    }

    /// The asset cache used for resolution
    pub fn assets(&self) -> &Arc<AssetCache> {
        &self.assets
    }

    /// The physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Mutable access to the physics world
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Move an object's body, as if pushed by gameplay
    pub fn teleport(&mut self, key: ObjectKey, position: Vec3, rotation: Euler) -> bool {
        let Some(object) = self.objects.get_mut(key) else {
            return false;
        };
        let Some(body) = self.physics.get_body_mut(object.body) else {
            return false;
        };
        body.set_position(position);
        body.rotation = rotation;
        body.wake();
        object.set_transform(Transform::from_position_rotation(position, rotation));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_physics::{PhysicsConfig, PhysicsMaterial, StaticCollider};

    fn assets() -> Arc<AssetCache> {
        Arc::new(
            AssetCache::new()
                .with("brick", VisualAsset { mesh: "brick".to_string(), size: Vec3::new(1.0, 0.5, 0.5) })
                .with("brick", CollisionAsset::cuboid(Vec3::new(0.5, 0.25, 0.25)))
                .with("base", VisualAsset { mesh: "base".to_string(), size: Vec3::new(10.0, 10.0, 1.0) })
                .with("base", CollisionAsset::cuboid(Vec3::new(5.0, 5.0, 0.5)))
                .with("base_shadow", TextureAsset { source: "base_shadow.png".to_string() }),
        )
    }

    fn registry() -> ObjectRegistry {
        let mut physics = PhysicsWorld::with_config(PhysicsConfig::new(-20.0));
        physics.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::CONCRETE));
        ObjectRegistry::new(assets(), physics)
    }

    fn brick() -> Arc<PropTemplate> {
        Arc::new(
            PropTemplate::new("brick", "brick")
                .with_mass(0.5)
                .with_shadow(ShadowSpec::new(1.2, 1.8, -0.15, 0.35))
                .with_sound(SoundKind::Brick)
                .duplicated(),
        )
    }

    #[test]
    fn test_add_creates_body() {
        let mut objects = registry();
        let key = objects.add(&brick(), Transform::from_position(Vec3::new(1.0, 2.0, 0.25))).unwrap();

        let object = objects.get(key).unwrap();
        assert_eq!(object.transform.position, Vec3::new(1.0, 2.0, 0.25));
        assert_eq!(object.dirty_flags(), DirtyFlags::ALL);
        assert_eq!(objects.physics().body_count(), 1);
        assert!(!objects.physics().get_body(object.body).unwrap().is_static());
    }

    #[test]
    fn test_spawn_uses_template_offset() {
        let mut objects = registry();
        let template = Arc::new(
            PropTemplate::new("base", "base")
                .with_offset(Vec3::new(0.0, 0.0, 0.5))
                .with_floor_shadow("base_shadow"),
        );
        let key = objects.spawn(&template).unwrap();

        let object = objects.get(key).unwrap();
        assert_eq!(object.transform.position, Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(object.floor_shadow.as_ref().unwrap().source, "base_shadow.png");
        assert!(objects.physics().get_body(object.body).unwrap().is_static());
    }

    #[test]
    fn test_unresolved_asset_fails_cleanly() {
        let mut objects = registry();
        let template = Arc::new(PropTemplate::new("horn", "horn").with_mass(1.0));
        let result = objects.spawn(&template);

        assert!(matches!(result, Err(PlacementError::Asset(_))));
        assert!(objects.is_empty());
        assert_eq!(objects.physics().body_count(), 0);
    }

    #[test]
    fn test_unresolved_floor_shadow_fails() {
        let mut objects = registry();
        let template = Arc::new(PropTemplate::new("base", "base").with_floor_shadow("missing"));
        assert!(matches!(objects.spawn(&template), Err(PlacementError::Asset(_))));
        assert_eq!(objects.physics().body_count(), 0);
    }

    #[test]
    fn test_capacity_limit() {
        let mut objects = registry().with_max_objects(2);
        objects.spawn(&brick()).unwrap();
        objects.spawn(&brick()).unwrap();
        assert!(matches!(
            objects.spawn(&brick()),
            Err(PlacementError::CapacityExceeded { limit: 2 })
        ));
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn test_remaining_capacity() {
        let mut objects = registry();
        assert_eq!(objects.remaining_capacity(), None);

        objects = objects.with_max_objects(3);
        let key = objects.spawn(&brick()).unwrap();
        assert_eq!(objects.remaining_capacity(), Some(2));
        objects.remove(key);
        assert_eq!(objects.remaining_capacity(), Some(3));
    }

    #[test]
    fn test_duplicated_geometry_is_shared() {
        let mut objects = registry();
        let template = brick();
        let a = objects.spawn(&template).unwrap();
        let b = objects.spawn(&template).unwrap();

        let (ga, gb) = (&objects.get(a).unwrap().geometry, &objects.get(b).unwrap().geometry);
        assert!(Arc::ptr_eq(ga, gb));
        assert_eq!(objects.shared_geometry_count(), 1);
    }

    #[test]
    fn test_unique_geometry_is_copied() {
        let mut objects = registry();
        let template = Arc::new(PropTemplate::new("brick", "brick").with_mass(0.5));
        let a = objects.spawn(&template).unwrap();
        let b = objects.spawn(&template).unwrap();

        let (ga, gb) = (&objects.get(a).unwrap().geometry, &objects.get(b).unwrap().geometry);
        assert!(!Arc::ptr_eq(ga, gb));
        assert!(!Arc::ptr_eq(&ga.visual, &gb.visual));
        assert_eq!(objects.shared_geometry_count(), 0);
    }

    #[test]
    fn test_falling_object_syncs_transform_and_shadow() {
        let mut objects = registry();
        let key = objects.add(&brick(), Transform::from_position(Vec3::new(0.0, 0.0, 3.0))).unwrap();
        objects.clear_all_dirty();
        assert!(!objects.get(key).unwrap().is_dirty());

        objects.update(1.0 / 60.0);

        let object = objects.get(key).unwrap();
        assert!(object.transform.position.z < 3.0);
        assert!(object.dirty_flags().contains(DirtyFlags::TRANSFORM | DirtyFlags::SHADOW));
        let shadow = object.shadow.unwrap();
        assert!((shadow.position.z - (object.transform.position.z - 0.15)).abs() < 0.0001);
        assert_eq!(shadow.size, Vec2::new(1.2, 1.8));
    }

    #[test]
    fn test_reset_restores_spawn() {
        let mut objects = registry();
        let spawn = Vec3::new(4.0, 4.0, 2.0);
        let key = objects.add(&brick(), Transform::from_position(spawn)).unwrap();
        for _ in 0..30 {
            objects.update(1.0 / 60.0);
        }
        assert_ne!(objects.transform(key).unwrap().position, spawn);

        assert!(objects.reset(key));

        assert_eq!(objects.transform(key).unwrap().position, spawn);
        let body = objects.physics().get_body(objects.get(key).unwrap().body).unwrap();
        assert_eq!(body.velocity, Vec3::ZERO);
        assert!(!body.is_sleeping());
    }

    #[test]
    fn test_impact_sound_on_landing() {
        let mut objects = registry();
        let key = objects.add(&brick(), Transform::from_position(Vec3::new(0.0, 0.0, 2.0))).unwrap();

        let mut sounds = Vec::new();
        for _ in 0..60 {
            objects.update(1.0 / 60.0);
            sounds.extend(objects.drain_sounds());
        }

        assert!(!sounds.is_empty());
        assert_eq!(sounds[0].object, key);
        assert_eq!(sounds[0].kind, SoundKind::Brick);
        assert!(sounds[0].volume > 0.0 && sounds[0].volume <= 1.0);
    }

    #[test]
    fn test_silent_prop_makes_no_sound() {
        let mut objects = registry();
        let template = Arc::new(PropTemplate::new("brick", "brick").with_mass(0.5));
        objects.add(&template, Transform::from_position(Vec3::new(0.0, 0.0, 2.0))).unwrap();
        for _ in 0..60 {
            objects.update(1.0 / 60.0);
        }
        assert!(objects.drain_sounds().is_empty());
    }

    #[test]
    fn test_remove_disposes_everything() {
        let mut objects = registry();
        let key = objects.spawn(&brick()).unwrap();
        assert!(objects.remove(key));

        assert!(!objects.contains(key));
        assert_eq!(objects.physics().body_count(), 0);
        assert_eq!(objects.shared_geometry_count(), 0);
        assert!(!objects.remove(key));
        assert!(!objects.reset(key));
        assert!(objects.transform(key).is_none());
    }

    #[test]
    fn test_remove_keeps_pool_while_shared() {
        let mut objects = registry();
        let a = objects.spawn(&brick()).unwrap();
        objects.spawn(&brick()).unwrap();
        objects.remove(a);
        assert_eq!(objects.shared_geometry_count(), 1);
    }

    #[test]
    fn test_invalid_template_rejected() {
        let mut objects = registry();
        let template = Arc::new(PropTemplate::new("brick", "brick").with_mass(f32::NAN));
        assert!(matches!(objects.spawn(&template), Err(PlacementError::InvalidTemplate(_))));
    }

    #[test]
    fn test_teleport_moves_body() {
        let mut objects = registry();
        let key = objects.spawn(&brick()).unwrap();
        assert!(objects.teleport(key, Vec3::new(40.0, -3.0, 0.25), Euler::yaw(1.0)));
        assert_eq!(objects.transform(key).unwrap().position, Vec3::new(40.0, -3.0, 0.25));
    }
}
