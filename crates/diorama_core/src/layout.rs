//! Section layouts
//!
//! A [`SectionLayout`] describes a section as data: single props, walls
//! and named trigger areas. Layouts are loaded from RON files and
//! instantiated into the registries at an origin, all-or-nothing.
//!
//! ```ron
//! (
//!     name: "crossroads",
//!     props: [
//!         (visual: "base", collision: "base", offset: (x: 0.0, y: 0.0, z: 0.0)),
//!     ],
//!     walls: [
//!         (
//!             object: (visual: "brick", collision: "brick", mass: 0.5, duplicated: true),
//!             shape: (type: "brick", width_count: 5, height_count: 3,
//!                     offset_width: (x: 1.05, y: 0.0, z: 0.0),
//!                     offset_height: (x: 0.0, y: 0.0, z: 0.45)),
//!         ),
//!     ],
//!     areas: [
//!         (name: "gate", position: (x: 0.0, y: -4.0), half_extents: (x: 2.0, y: 2.0)),
//!     ],
//! )
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use diorama_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::area::{AreaKey, AreaRegistry, AreaSpec};
use crate::error::{LayoutError, PlacementError};
use crate::object::{ObjectKey, ObjectRegistry};
use crate::prop::PropTemplate;
use crate::shape::ShapeDescriptor;
use crate::wall::{WallHandle, WallRegistry, WallSpec};

/// A wall entry in a layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutWall {
    pub object: PropTemplate,
    pub shape: ShapeDescriptor,
}

/// A named trigger area in a layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutArea {
    pub name: String,
    pub position: Vec2,
    pub half_extents: Vec2,
}

/// Data description of a section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    /// Layout name (for logging and section bookkeeping)
    pub name: String,
    #[serde(default)]
    pub props: Vec<PropTemplate>,
    #[serde(default)]
    pub walls: Vec<LayoutWall>,
    #[serde(default)]
    pub areas: Vec<LayoutArea>,
}

/// Everything a layout created
#[derive(Clone, Debug, Default)]
pub struct LayoutInstance {
    pub props: Vec<ObjectKey>,
    pub walls: Vec<WallHandle>,
    /// Areas by layout name
    pub areas: Vec<(String, AreaKey)>,
}

impl SectionLayout {
    /// Parse a layout from a RON string
    pub fn from_ron(text: &str) -> Result<Self, LayoutError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a layout from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Place the layout with every position shifted by `origin`
    ///
    /// # Errors
    ///
    /// If any prop or wall fails, everything placed by this call is
    /// removed again and the error is returned.
    pub fn instantiate<C>(
        &self,
        origin: Vec3,
        objects: &mut ObjectRegistry,
        walls: &mut WallRegistry,
        areas: &mut AreaRegistry<C>,
    ) -> Result<LayoutInstance, LayoutError> {
        let mut instance = LayoutInstance::default();

        if let Err(err) = self.place(origin, objects, walls, &mut instance) {
            log::warn!("Layout '{}' failed: {}; rolling back", self.name, err);
            for key in instance.props {
                objects.remove(key);
            }
            for wall in instance.walls {
                wall.remove(objects);
            }
            return Err(err.into());
        }

        for area in &self.areas {
            let position = Vec2::new(area.position.x + origin.x, area.position.y + origin.y);
            let key = areas.add(AreaSpec::new(position, area.half_extents));
            instance.areas.push((area.name.clone(), key));
        }

        log::info!(
            "Instantiated layout '{}': {} props, {} walls, {} areas",
            self.name,
            instance.props.len(),
            instance.walls.len(),
            instance.areas.len()
        );
        Ok(instance)
    }

    fn place(
        &self,
        origin: Vec3,
        objects: &mut ObjectRegistry,
        walls: &mut WallRegistry,
        instance: &mut LayoutInstance,
    ) -> Result<(), PlacementError> {
        for prop in &self.props {
            let template = Arc::new(prop.clone().with_offset(prop.offset + origin));
            instance.props.push(objects.spawn(&template)?);
        }
        for wall in &self.walls {
            let mut shape = wall.shape.clone();
            match &mut shape {
                ShapeDescriptor::Brick(b) => b.position += origin,
                ShapeDescriptor::Triangle(t) => t.position += origin,
            }
            let spec = WallSpec::new(Arc::new(wall.object.clone()), shape);
            instance.walls.push(walls.add(objects, &spec)?);
        }
        Ok(())
    }
}
