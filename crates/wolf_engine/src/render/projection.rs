//! World to screen mapping
//!
//! Screen space has its origin at the top-left corner of the viewport and
//! the active camera's world position at the viewport centre.

use crate::config::RenderConfig;
use crate::ecs::{Camera2D, EntityId, World};
use crate::foundation::math::Vec2;

/// Viewport and camera state shared by the renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pixels_per_unit: f32,
    viewport: Vec2,
    camera: Vec2,
    zoom: f32,
}

impl Projection {
    /// Projection with the viewport and scale of a render config
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            pixels_per_unit: config.pixels_per_unit,
            viewport: Vec2::new(
                config.viewport_width as f32,
                config.viewport_height as f32,
            ),
            camera: Vec2::zeros(),
            zoom: 1.0,
        }
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Resize the viewport, in pixels
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Screen pixels per world unit at the current zoom
    pub fn scale(&self) -> f32 {
        self.pixels_per_unit * self.zoom
    }

    /// Look through the first active camera in pre-order, or the origin
    pub fn follow_active_camera(&mut self, world: &World, entities: &[EntityId]) {
        let view = entities.iter().find_map(|&entity| {
            let camera = world.get_component::<Camera2D>(entity)?;
            camera
                .active
                .then(|| (world.global_position(entity).unwrap_or_default(), camera.zoom))
        });
        (self.camera, self.zoom) = view.unwrap_or((Vec2::zeros(), 1.0));
    }

    /// Screen pixels for a world position
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.camera) * self.scale() + self.viewport * 0.5
    }

    /// World position under a screen pixel
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport * 0.5) / self.scale() + self.camera
    }
}
