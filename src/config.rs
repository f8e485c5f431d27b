use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::texture::MAX_TEXTURE_SIZE;
use crate::error::VizError;

pub const CONFIG_URL: &str = "/assets/config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl CameraConfig {
    pub fn orrery() -> Self {
        CameraConfig { fov_deg: 75.0, near: 0.1, far: 1000.0, distance: 50.0 }
    }

    pub fn explorer() -> Self {
        CameraConfig { fov_deg: 75.0, near: 0.1, far: 4000.0, distance: 160.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub star_count: usize,
    pub dust_count: usize,
    pub asteroid_count: usize,
    pub seed: u64,
    pub sphere_segments: u32,
    pub orbit_segments: u32,
    pub texture_size: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            star_count: 2000,
            dust_count: 600,
            asteroid_count: 1500,
            seed: 42,
            sphere_segments: 32,
            orbit_segments: 64,
            texture_size: 256,
        }
    }
}

/// Runtime settings loaded from `/assets/config.json`. Every field is
/// optional in the file; a camera block, when present, must be complete.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub orrery: CameraConfig,
    pub explorer: CameraConfig,
    pub scene: SceneConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: "info".to_string(),
            orrery: CameraConfig::orrery(),
            explorer: CameraConfig::explorer(),
            scene: SceneConfig::default(),
        }
    }
}

impl AppConfig {
    /// Decodes the file and clamps the texture size to what the engine
    /// generates.
    pub fn from_json(text: &str) -> Result<Self, VizError> {
        let mut config: AppConfig = serde_json::from_str(text)?;
        config.scene.texture_size = config.scene.texture_size.clamp(2, MAX_TEXTURE_SIZE);
        Ok(config)
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }
}
