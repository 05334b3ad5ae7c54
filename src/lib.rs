//! Diorama - a physics-driven portfolio world
//!
//! Sections of props, brick structures and trigger areas are built into a
//! [`World`], which advances physics, material fade-ins and area triggers
//! once per frame.

pub mod config;
pub mod media;
pub mod photo_plane;
pub mod sections;
pub mod world;

pub use config::{AppConfig, ConfigError};
pub use media::{MediaEvent, MediaOverlay, RecordingOverlay};
pub use photo_plane::PhotoPlane;
pub use sections::{FootballArrangement, IntroOptions, IntroSection, ProjectOptions, ProjectSection};
pub use world::{SectionBuilder, SectionRecord, Stage, World, WorldError};
