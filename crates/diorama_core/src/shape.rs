//! Shape compiler
//!
//! Expands a small declarative structure description (a brick wall, a
//! triangle of bowling pins) into the ordered list of per-instance
//! transforms that the wall registry places one by one.
//!
//! Compilation is pure: the only source of variation is the RNG passed
//! in, so the same descriptor and seed always give the same instances.
//! Each randomized axis draws uniformly from `[-range, +range]`, in the
//! order offset x, y, z then rotation x, y, z for every cell. Axes with a
//! zero range draw nothing.

use std::sync::Arc;

use diorama_math::{Euler, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::prop::PropTemplate;

/// A rectangular wall of `width_count` x `height_count` cells
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrickShape {
    /// Anchor of the first cell
    #[serde(default)]
    pub position: Vec3,
    /// Cells per row
    pub width_count: u32,
    /// Number of rows
    pub height_count: u32,
    /// Step between cells in a row
    pub offset_width: Vec3,
    /// Step between rows
    pub offset_height: Vec3,
    /// Per-axis position jitter range
    #[serde(default)]
    pub random_offset: Vec3,
    /// Per-axis rotation jitter range (radians)
    #[serde(default)]
    pub random_rotation: Vec3,
    /// Shift the top row by half a cell, running-bond style
    #[serde(default)]
    pub equilibrate_last_line: bool,
}

/// A triangle of rows, each one cell shorter than the one below
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriangleShape {
    /// Anchor of the first cell of the base row
    #[serde(default)]
    pub position: Vec3,
    /// Cells in the base row (also the number of rows)
    pub width_count: u32,
    /// Step between cells in a row
    pub offset_width: Vec3,
    /// Step between rows
    pub offset_height: Vec3,
    /// Per-axis position jitter range
    #[serde(default)]
    pub random_offset: Vec3,
    /// Per-axis rotation jitter range (radians)
    #[serde(default)]
    pub random_rotation: Vec3,
}

/// Largest number of instances a single structure may expand to
pub const MAX_SHAPE_INSTANCES: usize = 1 << 16;

/// Structure description, tagged by `type` in data files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDescriptor {
    Brick(BrickShape),
    Triangle(TriangleShape),
}

impl ShapeDescriptor {
    /// Number of instances this shape expands to, `None` if it overflows `usize`
    pub fn instance_count(&self) -> Option<usize> {
        match self {
            ShapeDescriptor::Brick(b) => (b.width_count as usize).checked_mul(b.height_count as usize),
            ShapeDescriptor::Triangle(t) => {
                let w = t.width_count as usize;
                w.checked_mul(w.checked_add(1)?).map(|n| n / 2)
            }
        }
    }

    fn validate(&self) -> Result<(), PlacementError> {
        let (width, height, vectors) = match self {
            ShapeDescriptor::Brick(b) => (
                b.width_count,
                b.height_count,
                [b.position, b.offset_width, b.offset_height, b.random_offset, b.random_rotation],
            ),
            ShapeDescriptor::Triangle(t) => (
                t.width_count,
                1,
                [t.position, t.offset_width, t.offset_height, t.random_offset, t.random_rotation],
            ),
        };

        if width == 0 || height == 0 {
            return Err(PlacementError::InvalidShape(format!(
                "counts must be at least 1 (width {}, height {})",
                width, height
            )));
        }
        if vectors.iter().any(|v| !v.is_finite()) {
            return Err(PlacementError::InvalidShape("non-finite position, offset or range".to_string()));
        }
        match self.instance_count() {
            Some(count) if count <= MAX_SHAPE_INSTANCES => {}
            _ => {
                return Err(PlacementError::InvalidShape(format!(
                    "too many instances (width {}, height {}, limit {})",
                    width, height, MAX_SHAPE_INSTANCES
                )))
            }
        }
        let (offset_range, rotation_range) = (vectors[3], vectors[4]);
        if [offset_range, rotation_range]
            .iter()
            .any(|r| r.x < 0.0 || r.y < 0.0 || r.z < 0.0)
        {
            return Err(PlacementError::InvalidShape("random ranges must not be negative".to_string()));
        }
        Ok(())
    }
}

/// One compiled cell of a structure
#[derive(Clone, Debug)]
pub struct PlacedInstance {
    /// World position: anchor + cell offset + jitter + template offset
    pub position: Vec3,
    /// Template base rotation with the rotation jitter added
    pub rotation: Euler,
    /// Row index (0 = first emitted row)
    pub row: u32,
    /// Column index within the row
    pub column: u32,
    /// Template the instance was compiled from
    pub template: Arc<PropTemplate>,
}

/// Upper bound on the up-front reservation of `compile`
const MAX_RESERVED_INSTANCES: usize = 1024;

fn draw<R: Rng>(rng: &mut R, range: f32) -> f32 {
    if range == 0.0 {
        0.0
    } else {
        rng.random_range(-range..=range)
    }
}

/// Draw the jitter of one cell: offset x, y, z then rotation x, y, z
fn sample_jitter<R: Rng>(rng: &mut R, offset_range: Vec3, rotation_range: Vec3) -> (Vec3, Euler) {
    let offset = Vec3::new(
        draw(rng, offset_range.x),
        draw(rng, offset_range.y),
        draw(rng, offset_range.z),
    );
    let rotation = Euler::new(
        draw(rng, rotation_range.x),
        draw(rng, rotation_range.y),
        draw(rng, rotation_range.z),
    );
    (offset, rotation)
}

/// Expand a structure into placed instances using the given RNG
pub fn compile<R: Rng>(
    template: &Arc<PropTemplate>,
    shape: &ShapeDescriptor,
    rng: &mut R,
) -> Result<Vec<PlacedInstance>, PlacementError> {
    shape.validate()?;

    let count = shape.instance_count().unwrap_or(0);
    let mut instances = Vec::with_capacity(count.min(MAX_RESERVED_INSTANCES));
    let (offset_range, rotation_range) = match shape {
        ShapeDescriptor::Brick(b) => (b.random_offset, b.random_rotation),
        ShapeDescriptor::Triangle(t) => (t.random_offset, t.random_rotation),
    };

    let mut emit = |cell: Vec3, row: u32, column: u32, rng: &mut R| {
        let (offset, rotation) = sample_jitter(rng, offset_range, rotation_range);
        instances.push(PlacedInstance {
            position: cell + offset + template.offset,
            rotation: template.rotation.offset_by(rotation),
            row,
            column,
            template: Arc::clone(template),
        });
    };

    match shape {
        ShapeDescriptor::Brick(b) => {
            let nudge_last = b.equilibrate_last_line && b.height_count > 1;
            for h in 0..b.height_count {
                let mut row_start = b.position + b.offset_height * h as f32;
                if nudge_last && h == b.height_count - 1 {
                    row_start += b.offset_width * 0.5;
                }
                for w in 0..b.width_count {
                    emit(row_start + b.offset_width * w as f32, h, w, rng);
                }
            }
        }
        ShapeDescriptor::Triangle(t) => {
            for r in 0..t.width_count {
                let row_start = t.position + t.offset_height * r as f32 + t.offset_width * (r as f32 * 0.5);
                for c in 0..(t.width_count - r) {
                    emit(row_start + t.offset_width * c as f32, r, c, rng);
                }
            }
        }
    }

    log::debug!(
        "Compiled {} instances of '{}'",
        instances.len(),
        template.visual
    );
    Ok(instances)
}

/// Expand a structure with a fresh RNG seeded from `seed`
pub fn compile_seeded(
    template: &Arc<PropTemplate>,
    shape: &ShapeDescriptor,
    seed: u64,
) -> Result<Vec<PlacedInstance>, PlacementError> {
    let mut rng = StdRng::seed_from_u64(seed);
    compile(template, shape, &mut rng)
}
