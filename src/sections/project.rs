//! Project sections: a row of image boards, a floor label and a link area
//! that opens the project's video.

use std::sync::Arc;

use diorama_core::{AreaKey, AreaSpec, MaterialKey, ObjectKey, PropTemplate, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::world::{SectionBuilder, Stage, WorldError};

/// First board x, relative to the section origin
const BOARD_X_START: f32 = -5.0;
/// Spacing between boards
const BOARD_X_STEP: f32 = 5.0;
/// Board row y, relative to the section origin
const BOARD_Y: f32 = 5.0;
/// Floor label y, relative to the section origin
const FLOOR_Y: f32 = -2.0;

/// The interactive area under a project's floor label
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectLink {
    /// Offset from the floor label
    pub x: f32,
    pub y: f32,
    /// Half width and half depth of the area
    pub half_extents: [f32; 2],
    /// Video opened when the area is entered
    pub video_url: String,
}

/// One project, as configured
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectOptions {
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// One board per image, left to right
    #[serde(default)]
    pub image_sources: Vec<String>,
    #[serde(default)]
    pub floor_texture: Option<String>,
    #[serde(default)]
    pub link: Option<ProjectLink>,
}

/// A board structure and the image shown on it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectBoard {
    pub structure: ObjectKey,
    pub material: MaterialKey,
    pub position: Vec2,
}

/// What a project section keeps after building
#[derive(Clone, Debug)]
pub struct ProjectSection {
    pub name: String,
    pub boards: Vec<ProjectBoard>,
    pub floor: Option<MaterialKey>,
    pub link_area: Option<AreaKey>,
}

impl ProjectSection {
    /// Build a project section
    pub fn build(builder: &mut SectionBuilder<'_>, options: &ProjectOptions) -> Result<Self, WorldError> {
        let structure = PropTemplate::new("project_board", "project_board")
            .with_floor_shadow("project_board_floor_shadow")
            .duplicated();

        let mut boards = Vec::with_capacity(options.image_sources.len());
        for (i, source) in options.image_sources.iter().enumerate() {
            let position = Vec2::new(
                options.x + BOARD_X_START + i as f32 * BOARD_X_STEP,
                options.y + BOARD_Y,
            );
            let template = structure.clone().with_offset(Vec3::new(position.x, position.y, 0.0));
            let structure = builder.spawn(&Arc::new(template))?;
            let material = builder.request_material(source.as_str());
            boards.push(ProjectBoard {
                structure,
                material,
                position,
            });
        }

        let floor = options
            .floor_texture
            .as_ref()
            .map(|source| builder.request_material(source.as_str()));

        let link_area = match &options.link {
            Some(link) => {
                let area = builder.add_area(AreaSpec::new(
                    Vec2::new(options.x + link.x, options.y + FLOOR_Y + link.y),
                    Vec2::new(link.half_extents[0], link.half_extents[1]),
                ));
                let url = link.video_url.clone();
                builder.on_interact(area, move |_, stage: &mut Stage| stage.media.open(&url));
                Some(area)
            }
            None => {
                log::debug!("Project '{}' has no link", options.name);
                None
            }
        };

        Ok(Self {
            name: options.name.clone(),
            boards,
            floor,
            link_area,
        })
    }
}
