//! Sprite component
//!
//! A textured quad drawn by [`SpriteRenderer`](crate::render::SpriteRenderer)
//! at the entity's world pose. The renderer registers it with the render
//! backend the first frame it sees it.

use crate::ecs::component::{Component, Hooks};
use crate::foundation::math::Vec2;

/// Sprite component
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Texture key understood by the render backend
    pub texture: String,
    /// Size in world units
    pub size: Vec2,
    /// Draw order; higher is drawn later
    pub z_index: i32,
    /// Hidden sprites stay registered but are not submitted
    pub visible: bool,
}

impl Sprite {
    /// One-by-one world unit sprite
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            size: Vec2::new(1.0, 1.0),
            z_index: 0,
            visible: true,
        }
    }

    /// Set the size in world units
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height);
        self
    }

    /// Set the draw order
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

impl Component for Sprite {
    fn hooks(&self) -> Hooks {
        Hooks::DEBUG
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!("Sprite '{}' z={}", self.texture, self.z_index))
    }
}
