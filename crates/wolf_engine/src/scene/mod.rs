//! Scene management
//!
//! A [`Scene`] owns a [`World`], the systems and renderers that run over it,
//! the input state and two clocks. The host loop wakes it regularly:
//!
//! - [`Scene::wake_simulation`] runs every fixed tick that has fallen due,
//!   each one running all systems, then every component update hook in
//!   pre-order, then clearing the input edges.
//! - [`Scene::wake_render`] runs the renderers once per display refresh.
//!
//! Both passes work on a snapshot of the entity list taken when they begin,
//! so destroying or spawning entities mid-pass never invalidates iteration.

pub mod runner;
pub mod ticker;


use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::ecs::{
    EcsError, EntityId, FrameStats, RenderContext, Renderer, System, SystemContext, World,
};
use crate::foundation::profiler::Profiler;
use crate::foundation::time::{Clock, RateCounter, SystemClock};
use crate::input::{InputManager, InputSource};
use crate::prefab::PrefabError;

pub use runner::{run_scene, run_scene_with};
pub use ticker::{FixedTicker, FrameTicker};

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// A world operation failed outside any system
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// A system failed during a tick
    #[error("System {name} failed: {source}")]
    System {
        /// Name of the failing system
        name: &'static str,
        /// What went wrong
        source: EcsError,
    },

    /// A renderer failed during a frame
    #[error("Renderer {name} failed: {source}")]
    Renderer {
        /// Name of the failing renderer
        name: &'static str,
        /// What went wrong
        source: EcsError,
    },

    /// No system of the requested type is registered
    #[error("System {0} not found")]
    SystemNotFound(&'static str),

    /// No renderer of the requested type is registered
    #[error("Renderer {0} not found")]
    RendererNotFound(&'static str),

    /// An entity prefab failed while building the scene
    #[error(transparent)]
    Prefab(#[from] PrefabError),
}

/// Root container running the simulation and render loops
pub struct Scene {
    world: World,
    input: InputManager,
    systems: Vec<Box<dyn System>>,
    renderers: Vec<Box<dyn Renderer>>,
    simulation: FixedTicker,
    render: FrameTicker,
    clock: Box<dyn Clock>,
    profiler: Profiler,
    tick_rate: RateCounter,
    frame_rate: RateCounter,
    ticks: u64,
    frames: u64,
}

impl Scene {
    /// Scene on the system clock
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }

    /// Scene reading wall time from `clock`
    pub fn with_clock(config: &EngineConfig, clock: impl Clock + 'static) -> Self {
        Self::with_boxed_clock(config, Box::new(clock))
    }

    pub(crate) fn with_boxed_clock(config: &EngineConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            world: World::new(),
            input: InputManager::new(),
            systems: Vec::new(),
            renderers: Vec::new(),
            simulation: FixedTicker::from_config(&config.simulation),
            render: FrameTicker::from_config(&config.render),
            clock,
            profiler: Profiler::new(config.debug_mode),
            tick_rate: RateCounter::new(),
            frame_rate: RateCounter::new(),
            ticks: 0,
            frames: 0,
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Spawn an entity directly under the scene
    pub fn create_entity(&mut self) -> Result<EntityId, SceneError> {
        let entity = self.world.spawn();
        self.world.add_root(entity)?;
        Ok(entity)
    }

    /// Attach a detached entity under the scene
    pub fn add_entity(&mut self, entity: EntityId) -> Result<(), SceneError> {
        self.world.add_root(entity)?;
        Ok(())
    }

    /// Take a root entity out of the root list without destroying it
    pub fn remove_entity(&mut self, entity: EntityId) -> Result<(), SceneError> {
        self.world.remove_root(entity)?;
        Ok(())
    }

    /// The world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Input state
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Input state, for feeding host events
    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    // ------------------------------------------------------------------
    // Systems and renderers
    // ------------------------------------------------------------------

    /// Append a system; systems run in insertion order
    pub fn add_system(&mut self, system: impl System) {
        debug!("Added system {}", system.name());
        self.systems.push(Box::new(system));
    }

    /// Append a renderer; renderers run in insertion order
    pub fn add_renderer(&mut self, renderer: impl Renderer) {
        debug!("Added renderer {}", renderer.name());
        self.renderers.push(Box::new(renderer));
    }

    /// First system of type `T`
    pub fn system<T: System>(&self) -> Option<&T> {
        self.systems.iter().find_map(|s| s.downcast_ref::<T>())
    }

    /// First system of type `T`, mutably
    pub fn system_mut<T: System>(&mut self) -> Option<&mut T> {
        self.systems.iter_mut().find_map(|s| s.downcast_mut::<T>())
    }

    /// First system of type `T`, failing when there is none
    pub fn require_system<T: System>(&self) -> Result<&T, SceneError> {
        self.system::<T>()
            .ok_or(SceneError::SystemNotFound(std::any::type_name::<T>()))
    }

    /// First renderer of type `T`
    pub fn renderer<T: Renderer>(&self) -> Option<&T> {
        self.renderers.iter().find_map(|r| r.downcast_ref::<T>())
    }

    /// First renderer of type `T`, mutably
    pub fn renderer_mut<T: Renderer>(&mut self) -> Option<&mut T> {
        self.renderers.iter_mut().find_map(|r| r.downcast_mut::<T>())
    }

    /// First renderer of type `T`, failing when there is none
    pub fn require_renderer<T: Renderer>(&self) -> Result<&T, SceneError> {
        self.renderer::<T>()
            .ok_or(SceneError::RendererNotFound(std::any::type_name::<T>()))
    }

    // ------------------------------------------------------------------
    // Loop control
    // ------------------------------------------------------------------

    /// Start both clocks
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.simulation.start(now);
        self.render.start();
        info!(
            "Scene started: {} Hz simulation, {} roots",
            (1.0 / self.simulation.delta_time()).round(),
            self.world.roots().len()
        );
    }

    /// Stop both clocks; wake-ups after this do nothing
    pub fn stop(&mut self) {
        if self.is_running() {
            info!("Scene stopped after {} ticks", self.ticks);
        }
        self.simulation.stop();
        self.render.stop();
    }

    /// Whether the simulation clock is running
    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    /// Stop and destroy every root entity
    pub fn destroy(&mut self) -> Result<(), SceneError> {
        self.stop();
        self.world.clear()?;
        Ok(())
    }

    /// Fixed tick length
    pub fn tick_duration(&self) -> Duration {
        self.simulation.tick_duration()
    }

    /// How long the host should sleep between wake-ups
    pub fn poll_interval(&self) -> Duration {
        self.simulation
            .poll_interval()
            .min(self.render.until_next(self.clock.now()).max(Duration::from_millis(1)))
    }

    /// Run every simulation tick due by now and return how many ran
    pub fn wake_simulation(&mut self) -> Result<u64, SceneError> {
        let due = self.simulation.due(self.clock.now());
        if due > 1 {
            warn!("Simulation fell behind, running {} ticks to catch up", due);
        }
        let mut ran = 0;
        for _ in 0..due {
            self.simulation.advance();
            ran += 1;
            self.step()?;
        }
        Ok(ran)
    }

    /// Render a frame if one is due; returns whether a frame was drawn
    pub fn wake_render(&mut self) -> Result<bool, SceneError> {
        match self.render.poll(self.clock.now()) {
            Some(delta_time) => {
                self.render_frame(delta_time)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run one simulation tick regardless of the clock
    pub fn step(&mut self) -> Result<(), SceneError> {
        self.ticks += 1;
        self.tick_rate.record(self.clock.now());
        let delta_time = self.simulation.delta_time();
        let entities = self.world.all_entities();

        self.profiler.start("tick");
        let result = self.run_tick(&entities, delta_time);
        self.profiler.end("tick");
        // Edges last exactly one tick, even when the tick failed
        self.input.reset_frame();
        result
    }

    fn run_tick(&mut self, entities: &[EntityId], delta_time: f32) -> Result<(), SceneError> {
        for system in &mut self.systems {
            let name = system.name();
            self.profiler.start(name);
            let mut ctx = SystemContext {
                world: &mut self.world,
                entities,
                input: &self.input,
                delta_time,
                tick: self.ticks,
            };
            let result = system.update(&mut ctx);
            self.profiler.end(name);
            result.map_err(|source| SceneError::System { name, source })?;
        }

        self.profiler.start("components");
        let result = self.world.update_entities(entities, &self.input, delta_time);
        self.profiler.end("components");
        result?;
        Ok(())
    }

    /// Run every renderer once regardless of the clock
    pub fn render_frame(&mut self, delta_time: f32) -> Result<(), SceneError> {
        self.frames += 1;
        self.frame_rate.record(self.clock.now());
        let entities = self.world.all_entities();
        let ctx = RenderContext {
            world: &self.world,
            entities: &entities,
            delta_time,
            stats: self.stats(),
        };

        self.profiler.start("render");
        for renderer in &mut self.renderers {
            let name = renderer.name();
            self.profiler.start(name);
            let result = renderer.draw(&ctx);
            self.profiler.end(name);
            if let Err(source) = result {
                self.profiler.end("render");
                return Err(SceneError::Renderer { name, source });
            }
        }
        self.profiler.end("render");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Clock figures
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            fps: self.frame_rate.rate(),
            tps: self.tick_rate.rate(),
            ticks: self.ticks,
            frames: self.frames,
        }
    }

    /// Profiler scopes recorded so far; empty unless debug mode is on
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Log the profiler report at info level
    pub fn log_performance(&self) {
        self.profiler.log_report();
    }
}
