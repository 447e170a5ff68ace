//! 2D camera component

use crate::ecs::component::{Component, Hooks};

/// Camera looking at its entity's world position.
///
/// The first active camera in pre-order is used by the sprite renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    /// Magnification; 2.0 shows half as much of the world
    pub zoom: f32,
    /// Inactive cameras are skipped
    pub active: bool,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            active: true,
        }
    }
}

impl Camera2D {
    /// Active camera with the given zoom
    pub fn new(zoom: f32) -> Self {
        Self { zoom, active: true }
    }
}

impl Component for Camera2D {
    fn hooks(&self) -> Hooks {
        Hooks::DEBUG
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!("Camera2D zoom={:.2}", self.zoom))
    }
}
