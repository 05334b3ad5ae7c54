//! Named resource cache
//!
//! Props refer to their visual, collision and texture resources by string
//! id. The [`AssetCache`] maps those ids to loaded data, stored type-erased
//! as `Arc<dyn Any + Send + Sync>` so one cache can hold every asset kind.
//!
//! Assets are registered directly or loaded in bulk from a RON
//! [`AssetManifest`]. Loading the same manifest path twice is a no-op.
//!
//! ```ignore
//! let mut cache = AssetCache::new();
//! cache.load_manifest("assets/manifest.ron")?;
//! let brick: Arc<VisualAsset> = cache.resolve("brick")?;
//! ```

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diorama_math::Vec3;
use diorama_physics::{Aabb, Collider, PhysicsMaterial, Sphere};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Trait for types that can be stored in the cache.
///
/// `KIND` names the asset kind in error messages, so a texture id used where
/// a collision shape is expected reports both kinds.
pub trait Asset: Sized + Send + Sync + 'static {
    /// Human-readable kind name ("visual", "collision", ...)
    const KIND: &'static str;

    /// Load this asset from the given file path.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] if the file cannot be read or parsed.
    fn load_from_file(path: &Path) -> Result<Self, AssetError>;
}

fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let text = fs::read_to_string(path)?;
    Ok(ron::from_str(&text)?)
}

/// Renderable geometry of a prop
///
/// The cache only tracks which mesh a prop uses and its bounding size; the
/// renderer owns the actual vertex data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualAsset {
    /// Mesh identifier understood by the renderer
    pub mesh: String,
    /// Bounding box size
    #[serde(default)]
    pub size: Vec3,
}

impl Asset for VisualAsset {
    const KIND: &'static str = "visual";

    fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        load_ron(path)
    }
}

/// Collision primitive of a prop, in the prop's local space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Axis-aligned box
    Box { half_extents: Vec3 },
    /// Sphere
    Sphere { radius: f32 },
}

/// Collision description of a prop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionAsset {
    /// Primitive shape
    pub shape: CollisionShape,
    /// Offset of the shape's center from the prop origin
    #[serde(default)]
    pub center: Vec3,
    /// Surface material
    #[serde(default)]
    pub material: PhysicsMaterial,
}

impl CollisionAsset {
    /// Create a box collision asset centered on the prop origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: CollisionShape::Box { half_extents },
            center: Vec3::ZERO,
            material: PhysicsMaterial::default(),
        }
    }

    /// Create a sphere collision asset centered on the prop origin
    pub fn ball(radius: f32) -> Self {
        Self {
            shape: CollisionShape::Sphere { radius },
            center: Vec3::ZERO,
            material: PhysicsMaterial::default(),
        }
    }

    /// Build a world-space collider for a prop whose origin is at `position`
    pub fn collider_at(&self, position: Vec3) -> Collider {
        let center = position + self.center;
        match self.shape {
            CollisionShape::Box { half_extents } => {
                Collider::Aabb(Aabb::from_center_half_extents(center, half_extents))
            }
            CollisionShape::Sphere { radius } => Collider::Sphere(Sphere::new(center, radius)),
        }
    }
}

impl Asset for CollisionAsset {
    const KIND: &'static str = "collision";

    fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        load_ron(path)
    }
}

/// An image resource (floor shadows, photo planes)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureAsset {
    /// Source path or URL of the image
    pub source: String,
}

impl Asset for TextureAsset {
    const KIND: &'static str = "texture";

    fn load_from_file(path: &Path) -> Result<Self, AssetError> {
        load_ron(path)
    }
}

/// A RON document listing assets by id
///
/// ```ron
/// (
///     visuals: { "brick": (mesh: "brick", size: (x: 1.0, y: 0.5, z: 0.5)) },
///     collisions: { "brick": (shape: Box(half_extents: (x: 0.5, y: 0.25, z: 0.25))) },
///     textures: { "intro_shadow": (source: "textures/intro/shadow.png") },
/// )
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub visuals: HashMap<String, VisualAsset>,
    #[serde(default)]
    pub collisions: HashMap<String, CollisionAsset>,
    #[serde(default)]
    pub textures: HashMap<String, TextureAsset>,
}

impl AssetManifest {
    /// Parse a manifest from a RON string
    pub fn from_ron(text: &str) -> Result<Self, AssetError> {
        Ok(ron::from_str(text)?)
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.visuals.len() + self.collisions.len() + self.textures.len()
    }

    /// True if the manifest lists nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct CachedEntry {
    data: Arc<dyn Any + Send + Sync>,
    kind: &'static str,
}

/// A type-erased cache of named assets.
///
/// Ids live in a single namespace per kind: a visual and a collision asset
/// may share the id `"brick"`, but registering a second visual `"brick"`
/// replaces the first.
#[derive(Default)]
pub struct AssetCache {
    assets: HashMap<(&'static str, String), CachedEntry>,
    /// Manifest and asset files already loaded (for deduplication)
    loaded_paths: HashSet<PathBuf>,
}

impl AssetCache {
    /// Create a new empty asset cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset under `id`, replacing any asset of the same kind.
    ///
    /// Returns true if an existing asset was replaced.
    pub fn insert<T: Asset>(&mut self, id: impl Into<String>, asset: T) -> bool {
        let id = id.into();
        let entry = CachedEntry {
            data: Arc::new(asset),
            kind: T::KIND,
        };
        let replaced = self.assets.insert((T::KIND, id.clone()), entry).is_some();
        if replaced {
            log::debug!("Replaced {} asset '{}'", T::KIND, id);
        }
        replaced
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with<T: Asset>(mut self, id: impl Into<String>, asset: T) -> Self {
        self.insert(id, asset);
        self
    }

    /// Retrieve an asset by id, or `None` if no asset of this kind exists.
    pub fn get<T: Asset>(&self, id: &str) -> Option<Arc<T>> {
        let entry = self.assets.get(&(T::KIND, id.to_string()))?;
        entry.data.clone().downcast::<T>().ok()
    }

    /// Resolve an asset by id.
    ///
    /// # Errors
    ///
    /// [`AssetError::WrongType`] if the id exists only under another kind,
    /// [`AssetError::NotFound`] otherwise.
    pub fn resolve<T: Asset>(&self, id: &str) -> Result<Arc<T>, AssetError> {
        if let Some(asset) = self.get::<T>(id) {
            return Ok(asset);
        }
        match self.assets.iter().find(|((_, key), _)| key == id) {
            Some((_, entry)) => Err(AssetError::WrongType {
                id: id.to_string(),
                expected: T::KIND,
                found: entry.kind,
            }),
            None => Err(AssetError::NotFound(id.to_string())),
        }
    }

    /// Check whether an asset of kind `T` is registered under `id`.
    pub fn contains<T: Asset>(&self, id: &str) -> bool {
        self.assets.contains_key(&(T::KIND, id.to_string()))
    }

    /// Remove an asset; returns true if it existed.
    pub fn remove<T: Asset>(&mut self, id: &str) -> bool {
        self.assets.remove(&(T::KIND, id.to_string())).is_some()
    }

    /// Load a single asset file and register it under `id`.
    ///
    /// A path that was already loaded is not read again.
    pub fn load<T: Asset>(&mut self, id: impl Into<String>, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref().to_path_buf();
        if self.loaded_paths.contains(&path) {
            return Ok(());
        }
        let asset = T::load_from_file(&path)?;
        self.insert(id, asset);
        self.loaded_paths.insert(path);
        Ok(())
    }

    /// Register every entry of a manifest; returns the number of entries.
    pub fn add_manifest(&mut self, manifest: AssetManifest) -> usize {
        let count = manifest.len();
        for (id, visual) in manifest.visuals {
            self.insert(id, visual);
        }
        for (id, collision) in manifest.collisions {
            self.insert(id, collision);
        }
        for (id, texture) in manifest.textures {
            self.insert(id, texture);
        }
        count
    }

    /// Load a RON manifest file.
    ///
    /// Returns the number of assets registered; a manifest path that was
    /// already loaded registers nothing and returns 0.
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<usize, AssetError> {
        let path = path.as_ref().to_path_buf();
        if self.loaded_paths.contains(&path) {
            log::debug!("Manifest {} already loaded", path.display());
            return Ok(0);
        }

        let text = fs::read_to_string(&path)?;
        let manifest = AssetManifest::from_ron(&text)?;
        let count = self.add_manifest(manifest);
        self.loaded_paths.insert(path.clone());

        log::info!("Loaded {} assets from {}", count, path.display());
        Ok(count)
    }

    /// Get the number of assets currently in the cache.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}
