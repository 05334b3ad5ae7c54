//! Hand-built sections of the world
//!
//! Each section is a build function run through a
//! [`SectionBuilder`](crate::world::SectionBuilder), returning the handles
//! it wants to keep (structures to reset, planes to show, areas to watch).

mod intro;
mod project;

pub use intro::{FootballArrangement, IntroOptions, IntroSection};
pub use project::{ProjectBoard, ProjectLink, ProjectOptions, ProjectSection};
