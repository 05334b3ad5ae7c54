//! Wall registry
//!
//! Places a whole structure (one template, one shape) through the object
//! registry. Placement is all-or-nothing: if any instance fails, every
//! object created by that call is removed again before the error is
//! returned, so a partial wall never exists.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::PlacementError;
use crate::object::{ObjectKey, ObjectRegistry};
use crate::prop::PropTemplate;
use crate::shape::{compile, ShapeDescriptor};
use crate::transform::Transform;

/// A structure to place: which prop, arranged how
#[derive(Clone, Debug)]
pub struct WallSpec {
    pub object: Arc<PropTemplate>,
    pub shape: ShapeDescriptor,
}

impl WallSpec {
    /// Create a wall spec
    pub fn new(object: Arc<PropTemplate>, shape: ShapeDescriptor) -> Self {
        Self { object, shape }
    }
}

/// The objects of a placed structure, in emission order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WallHandle {
    /// Object keys; `items[0]` is the first emitted instance
    pub items: Vec<ObjectKey>,
}

impl WallHandle {
    /// Number of objects in the structure
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the structure holds no objects
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reset every object of the structure to its spawn transform
    ///
    /// Returns the number of objects that were still live.
    pub fn reset(&self, objects: &mut ObjectRegistry) -> usize {
        self.items.iter().filter(|&&key| objects.reset(key)).count()
    }

    /// Remove every object of the structure
    pub fn remove(self, objects: &mut ObjectRegistry) {
        for key in self.items {
            objects.remove(key);
        }
    }
}

/// Places structures atomically, owning the jitter RNG
pub struct WallRegistry {
    rng: StdRng,
}

impl Default for WallRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WallRegistry {
    /// Create a registry whose jitter is seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a registry with deterministic jitter
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Compile `spec` and place one object per instance
    ///
    /// # Errors
    ///
    /// Returns the first error hit while compiling or placing; no object
    /// from this call remains in `objects` afterwards.
    pub fn add(&mut self, objects: &mut ObjectRegistry, spec: &WallSpec) -> Result<WallHandle, PlacementError> {
        if let (Some(limit), Some(remaining), Some(count)) = (
            objects.max_objects(),
            objects.remaining_capacity(),
            spec.shape.instance_count(),
        ) {
            if count > remaining {
                log::warn!(
                    "Wall of {} '{}' does not fit in the {} remaining slots",
                    count,
                    spec.object.visual,
                    remaining
                );
                return Err(PlacementError::CapacityExceeded { limit });
            }
        }
        let instances = compile(&spec.object, &spec.shape, &mut self.rng)?;

        let mut items = Vec::with_capacity(instances.len());
        for instance in &instances {
            let transform = Transform::from_position_rotation(instance.position, instance.rotation);
            match objects.add(&instance.template, transform) {
                Ok(key) => items.push(key),
                Err(err) => {
                    log::warn!(
                        "Wall of '{}' failed at instance {} of {}: {}; rolling back",
                        spec.object.visual,
                        items.len(),
                        instances.len(),
                        err
                    );
                    for key in items {
                        objects.remove(key);
                    }
                    return Err(err);
                }
            }
        }

        log::debug!("Placed wall of {} '{}'", items.len(), spec.object.visual);
        Ok(WallHandle { items })
    }
}
