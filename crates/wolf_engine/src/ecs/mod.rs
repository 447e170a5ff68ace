//! Entity-Component-System implementation
//!
//! Entities form a tree rooted in the scene; components attach to exactly
//! one entity and carry optional lifecycle hooks. Systems and renderers run
//! over the whole tree once per simulation tick or render frame.

pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod system;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{AsAny, CollisionPhase, Component, FnComponent, HookContext, Hooks};
pub use components::{
    Anchor, Camera2D, Collider, HorizontalAnchor, LifetimeLimiter, RigidBody, Sprite, Transform,
    TransformSource, UiElement, UiPlacement, VerticalAnchor,
};
pub use entity::{ComponentId, EntityId, Parent};
pub use error::EcsError;
pub use system::{FnSystem, FrameStats, RenderContext, Renderer, System, SystemContext};
pub use world::World;
