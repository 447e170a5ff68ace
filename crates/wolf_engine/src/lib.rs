//! # Wolf Engine
//!
//! A 2D entity-component game engine with pluggable physics and rendering
//! backends.
//!
//! ## Features
//!
//! - **Entity Tree**: entities nest under the scene or other entities, with
//!   attach and destroy hooks fired in a fixed order
//! - **Hierarchical Transforms**: global poses composed through the parent
//!   chain, or read from a physics body
//! - **Dual Clocks**: fixed-step simulation with catch-up and a separate
//!   display-rate render clock
//! - **Backends**: physics and drawing behind traits, with a built-in arcade
//!   physics backend and a headless recording renderer
//! - **UI Layout**: text elements pinned to viewport anchors or following
//!   entities
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wolf_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::new("My Game"))?;
//!     engine.register_scene("main", |scene, _prefabs| {
//!         scene.add_system(PhysicsSystem::new(ArcadePhysics::new()));
//!         let player = scene.create_entity()?;
//!         scene
//!             .world_mut()
//!             .add_component(player, Transform::from_position(0.0, 0.0))?;
//!         Ok(())
//!     });
//!
//!     let scene = engine.start_scene("main")?;
//!     run_scene(scene, |scene| scene.stats().ticks < 600)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod audio;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod prefab;
pub mod render;
pub mod scene;
pub mod settings;

mod engine;

pub use config::EngineConfig;
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        audio::{AudioBackend, SoundRegistry, VolumeGroup},
        config::{Config, EngineConfig},
        ecs::{
            Anchor, Camera2D, Collider, CollisionPhase, Component, ComponentId, EcsError,
            EntityId, FnComponent, FnSystem, HookContext, Hooks, LifetimeLimiter, Parent,
            RenderContext, Renderer, RigidBody, Sprite, System, SystemContext, Transform,
            UiElement, World,
        },
        foundation::{
            math::{Pose2, Vec2},
            time::{Clock, ManualClock, SystemClock},
        },
        input::{InputManager, InputSource, KeyCode, MouseButton},
        physics::{ArcadePhysics, PhysicsBackend, PhysicsSystem, Shape},
        prefab::PrefabRegistry,
        render::{DebugRenderer, RecordingBackend, RenderBackend, SpriteRenderer, UiRenderer},
        scene::{run_scene, Scene, SceneError},
        settings::{KeyValueStore, MemoryStore, PlayerPrefs},
        Engine, EngineError,
    };
}
