//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`DIORAMA_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sections::ProjectOptions;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// World composition
    #[serde(default)]
    pub world: WorldConfig,
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsSettings,
    /// Headless demo run
    #[serde(default)]
    pub demo: DemoConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
    /// Project sections to build
    #[serde(default)]
    pub projects: Vec<ProjectOptions>,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`DIORAMA_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // User overrides (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // DIORAMA_WORLD__SEED=7 -> world.seed = 7
        figment = figment.merge(Env::prefixed("DIORAMA_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// World composition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for structure jitter; random when unset
    pub seed: Option<u64>,
    /// Touch layout: keyboard hint props are left out
    pub touch: bool,
    /// Upper bound on live props
    pub max_objects: Option<usize>,
    /// Asset manifest path
    pub assets: PathBuf,
    /// Extra RON section layouts
    pub layouts: Vec<PathBuf>,
    /// Origin of the intro section [x, y]
    pub intro_origin: [f32; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            touch: false,
            max_objects: None,
            assets: PathBuf::from("assets/manifest.ron"),
            layouts: Vec::new(),
            intro_origin: [0.0, 0.0],
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Gravity along Z (negative = downward)
    pub gravity: f32,
    /// Speed below which a body counts as still
    pub sleep_speed: f32,
    /// Seconds of stillness before a body sleeps
    pub sleep_time: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: -30.0,
            sleep_speed: 0.1,
            sleep_time: 1.0,
        }
    }
}

impl PhysicsSettings {
    /// Convert to the physics world's own config
    pub fn to_physics_config(&self) -> diorama_physics::PhysicsConfig {
        diorama_physics::PhysicsConfig {
            gravity: self.gravity,
            sleep_speed: self.sleep_speed,
            sleep_time: self.sleep_time,
        }
    }
}

/// Headless demo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of frames to simulate
    pub ticks: u32,
    /// Seconds per frame
    pub dt: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            dt: 1.0 / 60.0,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug, Error)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.physics.gravity, -30.0);
        assert_eq!(config.world.assets, PathBuf::from("assets/manifest.ron"));
        assert!(config.world.seed.is_none());
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("gravity"));
        assert!(toml.contains("log_level"));
    }

    #[test]
    fn test_physics_conversion() {
        let settings = PhysicsSettings {
            gravity: -9.81,
            sleep_speed: 0.2,
            sleep_time: 0.5,
        };
        let config = settings.to_physics_config();
        assert_eq!(config.gravity, -9.81);
        assert_eq!(config.sleep_time, 0.5);
    }

    #[test]
    fn test_projects_from_toml() {
        let config: AppConfig = Figment::new()
            .merge(Toml::string(
                r#"
                [[projects]]
                name = "threejs-journey"
                x = 30.0
                y = -10.0
                image_sources = ["projects/a.jpg", "projects/b.jpg"]

                [projects.link]
                x = 1.0
                y = -2.0
                half_extents = [2.0, 1.0]
                video_url = "videos/journey.mp4"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.projects.len(), 1);
        let project = &config.projects[0];
        assert_eq!(project.image_sources.len(), 2);
        assert_eq!(project.link.as_ref().unwrap().video_url, "videos/journey.mp4");
    }
}
