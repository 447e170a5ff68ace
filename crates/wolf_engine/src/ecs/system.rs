//! System and Renderer traits
//!
//! A [`System`] runs once per simulation tick over the whole world; iterating
//! entities is its own business. A [`Renderer`] is the read-only counterpart
//! run once per render frame.

use super::component::AsAny;
use super::entity::EntityId;
use super::error::EcsError;
use super::world::World;
use crate::input::InputSource;

/// Arguments of one system update
pub struct SystemContext<'a> {
    /// World of the running scene
    pub world: &'a mut World,
    /// Attached entities in pre-order, snapshotted at the start of the tick
    pub entities: &'a [EntityId],
    /// Input state for this tick
    pub input: &'a dyn InputSource,
    /// Fixed tick duration in seconds
    pub delta_time: f32,
    /// Number of the tick being run, starting at 1
    pub tick: u64,
}

/// Timing figures shown by debug overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames rendered during the last second
    pub fps: usize,
    /// Simulation ticks run during the last second
    pub tps: usize,
    /// Simulation ticks run since start
    pub ticks: u64,
    /// Frames rendered since start
    pub frames: u64,
}

/// Arguments of one renderer draw
pub struct RenderContext<'a> {
    /// World of the running scene, read-only
    pub world: &'a World,
    /// Attached entities in pre-order
    pub entities: &'a [EntityId],
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Clock figures for overlays
    pub stats: FrameStats,
}

/// System trait for processing the world once per simulation tick
pub trait System: AsAny {
    /// Name used in logs and profiler scopes
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Run the system
    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError>;
}

type UpdateFn = Box<dyn FnMut(&mut SystemContext<'_>) -> Result<(), EcsError>>;

/// System built from a closure
pub struct FnSystem {
    name: &'static str,
    update: UpdateFn,
}

impl FnSystem {
    /// System running `update` every tick
    pub fn new(
        name: &'static str,
        update: impl FnMut(&mut SystemContext<'_>) -> Result<(), EcsError> + 'static,
    ) -> Self {
        Self {
            name,
            update: Box::new(update),
        }
    }
}

impl System for FnSystem {
    fn name(&self) -> &'static str {
        self.name
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        (self.update)(ctx)
    }
}

impl std::fmt::Debug for FnSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSystem").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Renderer trait for producing output once per render frame
pub trait Renderer: AsAny {
    /// Name used in logs and profiler scopes
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Draw the current state
    fn draw(&mut self, ctx: &RenderContext<'_>) -> Result<(), EcsError>;
}

impl dyn System {
    /// Downcast to a concrete system type
    pub fn downcast_ref<T: System>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete system type
    pub fn downcast_mut<T: System>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl dyn Renderer {
    /// Downcast to a concrete renderer type
    pub fn downcast_ref<T: Renderer>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete renderer type
    pub fn downcast_mut<T: Renderer>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
