//! # Engine Configuration
//!
//! Configuration structures for the engine and its two clocks, plus the
//! [`Config`] trait that loads and saves any of them as TOML or RON.
//!
//! ## Configuration Categories
//!
//! - **Engine**: game name, logging, debug features
//! - **Simulation**: fixed tick rate and how often the host polls for due ticks
//! - **Render**: display refresh rate, world-to-screen scale, viewport

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # Simulation Clock Configuration
///
/// The simulation runs at a fixed rate. The host is woken `poll_divisor`
/// times per tick so a due tick is never delayed by more than a fraction of
/// the tick duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation ticks per second
    pub tick_rate_hz: u32,
    /// Wake-ups per tick duration
    pub poll_divisor: u32,
}

impl SimulationConfig {
    /// Duration of one fixed tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            poll_divisor: 4,
        }
    }
}

/// # Render Clock Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Display refresh rate the native host loop emulates
    pub refresh_rate_hz: u32,
    /// Screen pixels per world unit
    pub pixels_per_unit: f32,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
}

impl RenderConfig {
    /// Interval between emulated vertical syncs
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.refresh_rate_hz.max(1)))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            pixels_per_unit: 100.0,
            viewport_width: 800,
            viewport_height: 600,
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration handed to [`Engine::new`](crate::Engine::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name shown in logs and window titles
    pub game_name: String,
    /// Default log filter
    pub log_level: String,
    /// Whether to enable debug features (profiling, debug overlay)
    pub debug_mode: bool,
    /// Simulation clock
    pub simulation: SimulationConfig,
    /// Render clock
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Create a configuration with defaults for the named game
    pub fn new(game_name: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            ..Self::default()
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Set the fixed simulation rate
    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.simulation.tick_rate_hz = hz;
        self
    }

    /// Set the emulated display refresh rate
    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.render.refresh_rate_hz = hz;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game_name.is_empty() {
            return Err(ConfigError::Invalid("game name cannot be empty".to_string()));
        }
        if self.simulation.tick_rate_hz == 0 {
            return Err(ConfigError::Invalid("tick rate must be at least 1 Hz".to_string()));
        }
        if self.simulation.poll_divisor == 0 {
            return Err(ConfigError::Invalid("poll divisor must be at least 1".to_string()));
        }
        if self.render.refresh_rate_hz == 0 {
            return Err(ConfigError::Invalid("refresh rate must be at least 1 Hz".to_string()));
        }
        if self.render.pixels_per_unit <= 0.0 {
            return Err(ConfigError::Invalid("pixels per unit must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game_name: "Wolf Engine Game".to_string(),
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            simulation: SimulationConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config for EngineConfig {}
