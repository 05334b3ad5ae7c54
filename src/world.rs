//! World composition
//!
//! The [`World`] owns the mutable state sections build into (the
//! [`Stage`]) and the trigger areas whose listeners act on it. Sections are
//! loaded through a [`SectionBuilder`] that records every key they create,
//! so a section can be torn down again, and a section that fails halfway
//! is rolled back.

use std::sync::Arc;

use diorama_core::{
    ActorId, AreaKey, AreaRegistry, AreaSpec, AssetCache, AssetError, ImpactSound, Interaction, LayoutError,
    LayoutInstance, LoadedTexture, MaterialKey, MaterialSlots, ObjectKey, ObjectRegistry, PhysicsWorld,
    PlacementError, PropTemplate, SectionLayout, TextureRequest, Vec2, Vec3, WallHandle, WallRegistry, WallSpec,
};
use diorama_physics::{PhysicsMaterial, StaticCollider};
use thiserror::Error;

use crate::config::AppConfig;
use crate::media::MediaOverlay;
use crate::photo_plane::PhotoPlane;

/// Errors from loading sections
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Section '{0}' is already loaded")]
    DuplicateSection(String),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Everything area listeners may act on
pub struct Stage {
    pub objects: ObjectRegistry,
    pub walls: WallRegistry,
    pub materials: MaterialSlots,
    pub media: Box<dyn MediaOverlay>,
    triggers: Vec<String>,
}

impl Stage {
    /// Create a stage from its parts
    pub fn new(objects: ObjectRegistry, walls: WallRegistry, media: Box<dyn MediaOverlay>) -> Self {
        Self {
            objects,
            walls,
            materials: MaterialSlots::new(),
            media,
            triggers: Vec::new(),
        }
    }

    /// Note that a named area was entered
    pub fn record_trigger(&mut self, name: impl Into<String>) {
        self.triggers.push(name.into());
    }

    /// Take the named areas entered since the last call
    pub fn drain_triggers(&mut self) -> Vec<String> {
        std::mem::take(&mut self.triggers)
    }
}

/// Keys created by one section
#[derive(Clone, Debug, Default)]
pub struct SectionRecord {
    pub name: String,
    pub objects: Vec<ObjectKey>,
    pub walls: Vec<WallHandle>,
    pub areas: Vec<AreaKey>,
    pub materials: Vec<MaterialKey>,
}

impl SectionRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Props owned by the section, including wall items
    pub fn object_count(&self) -> usize {
        self.objects.len() + self.walls.iter().map(WallHandle::len).sum::<usize>()
    }
}

/// Recording front end to the stage, handed to section build functions
pub struct SectionBuilder<'a> {
    stage: &'a mut Stage,
    areas: &'a mut AreaRegistry<Stage>,
    record: SectionRecord,
}

impl SectionBuilder<'_> {
    /// Assets available to this section
    pub fn assets(&self) -> &Arc<AssetCache> {
        self.stage.objects.assets()
    }

    /// Read access to the stage
    pub fn stage(&self) -> &Stage {
        &*self.stage
    }

    /// Place a single prop at its template offset
    pub fn spawn(&mut self, template: &Arc<PropTemplate>) -> Result<ObjectKey, PlacementError> {
        let key = self.stage.objects.spawn(template)?;
        self.record.objects.push(key);
        Ok(key)
    }

    /// Place a whole structure
    pub fn add_wall(&mut self, spec: &WallSpec) -> Result<WallHandle, PlacementError> {
        let handle = self.stage.walls.add(&mut self.stage.objects, spec)?;
        self.record.walls.push(handle.clone());
        Ok(handle)
    }

    /// Add a trigger area
    pub fn add_area(&mut self, spec: AreaSpec) -> AreaKey {
        let key = self.areas.add(spec);
        self.record.areas.push(key);
        key
    }

    /// Attach a listener to an area
    pub fn on_interact<F>(&mut self, key: AreaKey, listener: F) -> bool
    where
        F: FnMut(&Interaction, &mut Stage) + 'static,
    {
        self.areas.on_interact(key, listener)
    }

    /// Create a placeholder material and queue its texture
    pub fn request_material(&mut self, source: impl Into<String>) -> MaterialKey {
        let key = self.stage.materials.request(source);
        self.record.materials.push(key);
        key
    }

    /// Create a photo plane
    pub fn photo_plane(&mut self, source: impl Into<String>, width: f32, height: f32, position: Vec3) -> PhotoPlane {
        let plane = PhotoPlane::new(&mut self.stage.materials, source, width, height, position);
        self.record.materials.push(plane.material);
        plane
    }

    /// Instantiate a data layout; entering one of its areas records the
    /// area name on the stage
    pub fn layout(&mut self, layout: &SectionLayout, origin: Vec3) -> Result<LayoutInstance, LayoutError> {
        let instance = layout.instantiate(origin, &mut self.stage.objects, &mut self.stage.walls, &mut *self.areas)?;

        self.record.objects.extend(instance.props.iter().copied());
        self.record.walls.extend(instance.walls.iter().cloned());
        for (name, key) in &instance.areas {
            self.record.areas.push(*key);
            let name = name.clone();
            self.areas.on_interact(*key, move |_, stage: &mut Stage| {
                log::info!("Entered area '{}'", name);
                stage.record_trigger(name.clone());
            });
        }
        Ok(instance)
    }
}

/// Sections plus the stage they live on
pub struct World {
    stage: Stage,
    areas: AreaRegistry<Stage>,
    sections: Vec<SectionRecord>,
}

impl World {
    /// Create an empty world around a stage
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            areas: AreaRegistry::new(),
            sections: Vec::new(),
        }
    }

    /// Build the stage from configuration: a concrete floor at z = 0,
    /// configured gravity and sleeping, optional jitter seed and object cap
    pub fn from_config(config: &AppConfig, assets: Arc<AssetCache>, media: Box<dyn MediaOverlay>) -> Self {
        let mut physics = PhysicsWorld::with_config(config.physics.to_physics_config());
        physics.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::CONCRETE));

        let mut objects = ObjectRegistry::new(assets, physics);
        if let Some(limit) = config.world.max_objects {
            objects = objects.with_max_objects(limit);
        }
        let walls = match config.world.seed {
            Some(seed) => WallRegistry::with_seed(seed),
            None => WallRegistry::new(),
        };

        Self::new(Stage::new(objects, walls, media))
    }

    /// Build a section, recording everything it creates under `name`
    ///
    /// # Errors
    ///
    /// Fails if a section with that name is loaded, or if `build` fails;
    /// in the latter case everything the section created so far is removed.
    pub fn load_section<T, F>(&mut self, name: &str, build: F) -> Result<T, WorldError>
    where
        F: FnOnce(&mut SectionBuilder<'_>) -> Result<T, WorldError>,
    {
        if self.section(name).is_some() {
            return Err(WorldError::DuplicateSection(name.to_string()));
        }

        let mut builder = SectionBuilder {
            stage: &mut self.stage,
            areas: &mut self.areas,
            record: SectionRecord::new(name),
        };
        let result = build(&mut builder);
        let record = builder.record;

        match result {
            Ok(value) => {
                log::info!(
                    "Loaded section '{}': {} props, {} areas, {} materials",
                    name,
                    record.object_count(),
                    record.areas.len(),
                    record.materials.len()
                );
                self.sections.push(record);
                Ok(value)
            }
            Err(err) => {
                log::warn!("Section '{}' failed: {}; rolling back", name, err);
                self.discard(record);
                Err(err)
            }
        }
    }

    /// Load a RON layout as its own section
    pub fn load_layout(&mut self, layout: &SectionLayout, origin: Vec3) -> Result<LayoutInstance, WorldError> {
        let name = layout.name.clone();
        self.load_section(&name, |builder| Ok(builder.layout(layout, origin)?))
    }

    /// Tear a section down; returns false if it isn't loaded
    pub fn unload_section(&mut self, name: &str) -> bool {
        let Some(index) = self.sections.iter().position(|s| s.name == name) else {
            return false;
        };
        let record = self.sections.remove(index);
        log::info!("Unloading section '{}'", name);
        self.discard(record);
        self.stage.media.close();
        true
    }

    fn discard(&mut self, record: SectionRecord) {
        for key in record.objects {
            self.stage.objects.remove(key);
        }
        for wall in record.walls {
            wall.remove(&mut self.stage.objects);
        }
        for key in record.areas {
            self.areas.remove(key);
        }
        for key in record.materials {
            self.stage.materials.remove(key);
        }
    }

    /// Advance one frame: physics and props, then material fades, then
    /// trigger areas. Returns the number of area entries this frame.
    pub fn update(&mut self, dt: f32, actors: &[(ActorId, Vec2)]) -> usize {
        self.stage.objects.update(dt);
        self.stage.materials.update(dt);
        self.areas.update(actors, &mut self.stage)
    }

    /// Take the impact sounds produced since the last call
    pub fn drain_sounds(&mut self) -> Vec<ImpactSound> {
        self.stage.objects.drain_sounds()
    }

    /// Take the texture loads queued since the last call
    pub fn take_texture_requests(&mut self) -> Vec<TextureRequest> {
        self.stage.materials.take_requests()
    }

    /// Hand a finished texture load back to its slot
    pub fn complete_texture(&mut self, key: MaterialKey, result: Result<LoadedTexture, String>) -> bool {
        self.stage.materials.complete(key, result)
    }

    /// A loaded section by name
    pub fn section(&self, name: &str) -> Option<&SectionRecord> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Loaded sections in load order
    pub fn sections(&self) -> &[SectionRecord] {
        &self.sections
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn areas(&self) -> &AreaRegistry<Stage> {
        &self.areas
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.stage.media.close();
    }
}
