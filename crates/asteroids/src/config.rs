//! Game configuration
//!
//! Loaded from `asteroids.toml` (or `.ron`) next to the binary when present,
//! otherwise the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wolf_engine::config::{Config, ConfigError, EngineConfig};

/// Game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine settings
    pub engine: EngineConfig,

    /// Gameplay settings
    pub gameplay: GameplayConfig,

    /// Audio settings
    pub audio: AudioConfig,
}

impl Config for GameConfig {}

/// Gameplay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Asteroid count
    pub asteroid_count: u32,

    /// Ship thrust force
    pub ship_acceleration: f32,

    /// Ship rotation speed in radians per second
    pub ship_rotation_speed: f32,

    /// Bullet speed in units per second
    pub bullet_speed: f32,

    /// Bullet lifetime (seconds)
    pub bullet_lifetime: f32,

    /// Seconds between shots while fire is held
    pub fire_interval: f32,

    /// Half width of the play field in world units
    pub field_half_width: f32,

    /// Half height of the play field in world units
    pub field_half_height: f32,

    /// Seed for asteroid placement
    pub seed: u64,

    /// Simulated seconds the headless demo runs for
    pub run_seconds: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            asteroid_count: 5,
            ship_acceleration: 8.0,
            ship_rotation_speed: 3.0,
            bullet_speed: 12.0,
            bullet_lifetime: 1.5,
            fire_interval: 0.25,
            field_half_width: 4.0,
            field_half_height: 3.0,
            seed: 7,
            run_seconds: 10.0,
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    /// SFX volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            sfx_volume: 0.8,
        }
    }
}

impl GameConfig {
    /// Load configuration from `path`, or the defaults if it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
