//! # Render Backend Abstraction
//!
//! The engine never draws pixels itself. Renderers hand screen-space draw
//! items to a [`RenderBackend`], which owns every visual resource behind an
//! opaque [`DrawableHandle`].
//!
//! ## Architecture
//!
//! - **Passive backends**: a backend receives registrations and per-frame
//!   item lists; it never reads the world or owns pose state
//! - **Pull-based poses**: renderers recompute each drawable's screen pose
//!   from the transform hierarchy every frame
//! - **Read-only**: renderers see the world through a shared reference
//!
//! [`SpriteRenderer`] draws [`Sprite`](crate::ecs::Sprite) components,
//! [`RecordingBackend`] is a headless backend that keeps the submitted
//! frames, and [`DebugRenderer`] produces a text overlay of the scene.
//! [`UiRenderer`] lays out [`UiElement`](crate::ecs::UiElement) text in
//! screen pixels for the host to draw.

pub mod debug;
pub mod projection;
pub mod recording;
pub mod sprite_renderer;
pub mod ui;

use std::fmt;

use thiserror::Error;

use crate::ecs::EcsError;
use crate::foundation::math::Vec2;

pub use debug::DebugRenderer;
pub use projection::Projection;
pub use recording::{RecordedFrame, RecordingBackend};
pub use sprite_renderer::SpriteRenderer;
pub use ui::{UiItem, UiRenderer, SCREEN_LAYER};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Render backend errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Handle was never issued or was unregistered
    #[error("Unknown drawable {0}")]
    UnknownDrawable(DrawableHandle),

    /// The backend failed to present a frame
    #[error("Draw failed: {0}")]
    DrawFailed(String),
}

impl From<RenderError> for EcsError {
    fn from(error: RenderError) -> Self {
        Self::Backend(error.to_string())
    }
}

/// Backend handle of a registered drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableHandle(pub u64);

impl fmt::Display for DrawableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drawable#{}", self.0)
    }
}

/// What a backend needs to create a visual
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// Texture key
    pub texture: String,
    /// Size in world units
    pub size: Vec2,
}

/// One drawable placed on screen for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Registered visual
    pub handle: DrawableHandle,
    /// Centre in screen pixels, origin at the top-left corner
    pub position: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Size in screen pixels
    pub size: Vec2,
    /// Draw order; items arrive sorted by it
    pub z_index: i32,
}

/// # Render Backend Trait
///
/// Implemented by whatever actually puts pixels on a screen.
pub trait RenderBackend {
    /// Create the visual for a drawable
    fn register_drawable(&mut self, drawable: &Drawable) -> BackendResult<DrawableHandle>;

    /// Release a visual
    fn unregister_drawable(&mut self, handle: DrawableHandle) -> BackendResult<()>;

    /// Present one frame; `items` are sorted back to front
    fn draw(&mut self, items: &[DrawItem], delta_time: f32) -> BackendResult<()>;
}
