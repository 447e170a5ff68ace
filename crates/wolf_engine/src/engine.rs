//! Core engine implementation

use std::collections::HashMap;

use thiserror::Error;

use crate::audio::SoundRegistry;
use crate::config::{ConfigError, EngineConfig};
use crate::foundation::time::{Clock, SystemClock};
use crate::prefab::PrefabRegistry;
use crate::scene::{Scene, SceneError};

type ScenePrefab = Box<dyn Fn(&mut Scene, &PrefabRegistry) -> Result<(), SceneError>>;
type ClockFactory = Box<dyn Fn() -> Box<dyn Clock>>;

/// Main engine struct
///
/// Owns the registered scene prefabs, the entity prefabs and sounds shared by
/// every scene, and at most one running scene. Starting a scene always stops
/// the previous one first.
pub struct Engine {
    config: EngineConfig,
    scenes: HashMap<String, ScenePrefab>,
    clock: ClockFactory,
    running: Option<(String, Scene)>,
    prefabs: PrefabRegistry,
    sounds: SoundRegistry,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine for '{}'...", config.game_name);

        Ok(Self {
            config,
            scenes: HashMap::new(),
            clock: Box::new(|| Box::new(SystemClock::new())),
            running: None,
            prefabs: PrefabRegistry::new(),
            sounds: SoundRegistry::new(),
        })
    }

    /// Give every scene started from now on a clone of `clock`
    #[must_use]
    pub fn with_clock<C: Clock + Clone + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(move || Box::new(clock.clone()));
        self
    }

    /// Register a scene prefab, replacing any prefab with the same name.
    ///
    /// The prefab receives the new scene and the engine's entity prefabs.
    pub fn register_scene<F>(&mut self, name: impl Into<String>, prefab: F)
    where
        F: Fn(&mut Scene, &PrefabRegistry) -> Result<(), SceneError> + 'static,
    {
        let name = name.into();
        if self.scenes.insert(name.clone(), Box::new(prefab)).is_some() {
            log::warn!("Scene '{}' registered twice, keeping the latest", name);
        }
    }

    /// Stop the running scene, then build and start the named one
    pub fn start_scene(&mut self, name: &str) -> Result<&mut Scene, EngineError> {
        self.stop_scene()?;

        let prefab = self
            .scenes
            .get(name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))?;

        log::info!("Starting scene '{}'", name);
        let mut scene = Scene::with_boxed_clock(&self.config, (self.clock)());
        prefab(&mut scene, &self.prefabs)?;
        scene.start();

        let (_, scene) = self.running.insert((name.to_string(), scene));
        Ok(scene)
    }

    /// Destroy the running scene, if any
    pub fn stop_scene(&mut self) -> Result<(), EngineError> {
        if let Some((name, mut scene)) = self.running.take() {
            log::info!("Stopping scene '{}'", name);
            scene.destroy()?;
        }
        Ok(())
    }

    /// Start the running scene again from its prefab
    pub fn restart_scene(&mut self) -> Result<&mut Scene, EngineError> {
        let name = self
            .running_scene_name()
            .map(str::to_string)
            .ok_or(EngineError::NoSceneRunning)?;
        self.start_scene(&name)
    }

    /// The running scene
    pub fn running_scene(&self) -> Option<&Scene> {
        self.running.as_ref().map(|(_, scene)| scene)
    }

    /// The running scene, mutably
    pub fn running_scene_mut(&mut self) -> Option<&mut Scene> {
        self.running.as_mut().map(|(_, scene)| scene)
    }

    /// Name the running scene was started with
    pub fn running_scene_name(&self) -> Option<&str> {
        self.running.as_ref().map(|(name, _)| name.as_str())
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Entity prefabs
    pub fn prefabs(&self) -> &PrefabRegistry {
        &self.prefabs
    }

    /// Entity prefabs, mutably
    pub fn prefabs_mut(&mut self) -> &mut PrefabRegistry {
        &mut self.prefabs
    }

    /// Registered sounds
    pub fn sounds(&self) -> &SoundRegistry {
        &self.sounds
    }

    /// Registered sounds, mutably
    pub fn sounds_mut(&mut self) -> &mut SoundRegistry {
        &mut self.sounds
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configuration failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// No scene prefab registered under this name
    #[error("Scene {0} not found")]
    SceneNotFound(String),

    /// Restart requested with no scene running
    #[error("No scene running")]
    NoSceneRunning,

    /// Error while building or tearing down a scene
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Parent, Transform};
    use crate::foundation::time::ManualClock;
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine(clock: &ManualClock) -> Engine {
        let config = EngineConfig::new("Test").with_tick_rate(50);
        let mut engine = Engine::new(config).unwrap().with_clock(clock.clone());
        engine.register_scene("level", |scene, _| {
            let entity = scene.create_entity()?;
            scene.world_mut().add_component(entity, Transform::default())?;
            Ok(())
        });
        engine
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::new("Test").with_tick_rate(0);
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_start_scene_builds_and_runs() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);

        let scene = engine.start_scene("level").unwrap();
        assert!(scene.is_running());
        assert_eq!(scene.world().roots().len(), 1);
        let tick = scene.tick_duration();

        clock.advance(tick * 3);
        let ran = engine.running_scene_mut().unwrap().wake_simulation().unwrap();
        assert_eq!(ran, 3);
        assert_eq!(engine.running_scene_name(), Some("level"));
    }

    #[test]
    fn test_unknown_scene_and_restart_without_scene() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        assert!(matches!(
            engine.start_scene("menu"),
            Err(EngineError::SceneNotFound(name)) if name == "menu"
        ));
        assert!(matches!(engine.restart_scene(), Err(EngineError::NoSceneRunning)));
    }

    #[test]
    fn test_restart_rebuilds_from_prefab() {
        let clock = ManualClock::new();
        let builds = Rc::new(Cell::new(0));
        let mut engine = engine(&clock);
        let counter = Rc::clone(&builds);
        engine.register_scene("counted", move |scene, _| {
            counter.set(counter.get() + 1);
            scene.create_entity()?;
            Ok(())
        });

        engine.start_scene("counted").unwrap();
        engine.restart_scene().unwrap();
        assert_eq!(builds.get(), 2);
        assert_eq!(engine.running_scene_name(), Some("counted"));
        assert_eq!(engine.running_scene().unwrap().world().entity_count(), 1);

        engine.stop_scene().unwrap();
        assert!(engine.running_scene().is_none());
        assert!(engine.running_scene_name().is_none());
    }

    #[test]
    fn test_scene_prefab_uses_entity_prefabs() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine
            .prefabs_mut()
            .register("rock", |world, entity, size: &f32| {
                world.add_component(entity, Transform::from_position(*size, 0.0))?;
                Ok(())
            })
            .unwrap();
        engine.register_scene("field", |scene, prefabs| {
            for size in [1.0_f32, 2.0] {
                prefabs.instantiate("rock", scene.world_mut(), Parent::Scene, &size)?;
            }
            Ok(())
        });

        let scene = engine.start_scene("field").unwrap();
        assert_eq!(scene.world().roots().len(), 2);
    }

    #[test]
    fn test_register_scene_replaces() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.register_scene("level", |scene, _| {
            scene.create_entity()?;
            scene.create_entity()?;
            Ok(())
        });
        let scene = engine.start_scene("level").unwrap();
        assert_eq!(scene.world().roots().len(), 2);
    }
}
