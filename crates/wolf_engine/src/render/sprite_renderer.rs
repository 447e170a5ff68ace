//! World renderer for sprites
//!
//! Every frame the renderer registers sprites it has not seen yet, releases
//! the ones that disappeared, places the rest on screen through the active
//! camera and submits them sorted by z index.
//!
//! Placement goes through a [`Projection`], so screen space has its origin
//! at the top-left corner of the viewport and the camera at its centre.

use std::collections::BTreeMap;

use log::trace;

use super::{DrawItem, Drawable, DrawableHandle, Projection, RenderBackend};
use crate::config::RenderConfig;
use crate::ecs::{ComponentId, EcsError, EntityId, RenderContext, Renderer, Sprite, World};
use crate::foundation::math::Vec2;

/// Renderer drawing [`Sprite`] components through a backend
pub struct SpriteRenderer<B: RenderBackend> {
    backend: B,
    projection: Projection,
    registered: BTreeMap<ComponentId, DrawableHandle>,
}

impl<B: RenderBackend> SpriteRenderer<B> {
    /// Renderer with the viewport and scale of a render config
    pub fn new(backend: B, config: &RenderConfig) -> Self {
        Self {
            backend,
            projection: Projection::new(config),
            registered: BTreeMap::new(),
        }
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Resize the viewport, in pixels
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.projection.set_viewport(width, height);
    }

    /// Number of sprites registered with the backend
    pub fn drawable_count(&self) -> usize {
        self.registered.len()
    }

    /// Backend handle of a sprite component
    pub fn drawable(&self, sprite: ComponentId) -> Option<DrawableHandle> {
        self.registered.get(&sprite).copied()
    }

    /// Screen pixels for a world position, as of the last frame's camera
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.projection.world_to_screen(world)
    }

    /// World position under a screen pixel, as of the last frame's camera
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.projection.screen_to_world(screen)
    }

    fn collect(&mut self, world: &World, entities: &[EntityId]) -> Result<Vec<DrawItem>, EcsError> {
        let mut items = Vec::new();
        let mut live = Vec::new();
        for &entity in entities {
            for &id in world.components(entity) {
                let Some(sprite) = world.component::<Sprite>(id) else {
                    continue;
                };
                live.push(id);
                let handle = match self.registered.get(&id) {
                    Some(&handle) => handle,
                    None => {
                        let handle = self.backend.register_drawable(&Drawable {
                            texture: sprite.texture.clone(),
                            size: sprite.size,
                        })?;
                        trace!("Registered sprite {id} as {handle}");
                        self.registered.insert(id, handle);
                        handle
                    }
                };
                if !sprite.visible {
                    continue;
                }
                let pose = world.global_pose(entity)?;
                items.push(DrawItem {
                    handle,
                    position: self.world_to_screen(pose.position),
                    rotation: pose.rotation,
                    size: sprite.size * self.projection.scale(),
                    z_index: sprite.z_index,
                });
            }
        }

        let stale: Vec<ComponentId> = self
            .registered
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(handle) = self.registered.remove(&id) {
                self.backend.unregister_drawable(handle)?;
                trace!("Released sprite {id}");
            }
        }

        items.sort_by_key(|item| item.z_index);
        Ok(items)
    }
}

impl<B: RenderBackend + 'static> Renderer for SpriteRenderer<B> {
    fn name(&self) -> &'static str {
        "SpriteRenderer"
    }

    fn draw(&mut self, ctx: &RenderContext<'_>) -> Result<(), EcsError> {
        self.projection.follow_active_camera(ctx.world, ctx.entities);
        let items = self.collect(ctx.world, ctx.entities)?;
        self.backend.draw(&items, ctx.delta_time)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Camera2D, FrameStats, Transform};
    use crate::render::RecordingBackend;
    use approx::assert_relative_eq;

    fn draw(renderer: &mut SpriteRenderer<RecordingBackend>, world: &World) {
        let entities = world.all_entities();
        let ctx = RenderContext {
            world,
            entities: &entities,
            delta_time: 0.0,
            stats: FrameStats::default(),
        };
        renderer.draw(&ctx).unwrap();
    }

    fn sprite_at(world: &mut World, x: f32, y: f32, sprite: Sprite) -> (EntityId, ComponentId) {
        let entity = world.spawn();
        world.add_component(entity, Transform::from_position(x, y)).unwrap();
        let id = world.add_component(entity, sprite).unwrap();
        world.add_root(entity).unwrap();
        (entity, id)
    }

    fn renderer() -> SpriteRenderer<RecordingBackend> {
        SpriteRenderer::new(RecordingBackend::new(), &RenderConfig::default())
    }

    #[test]
    fn test_items_placed_through_camera_and_sorted() {
        let mut world = World::new();
        let mut renderer = renderer();
        let camera = world.spawn();
        world.add_component(camera, Transform::from_position(1.0, 1.0)).unwrap();
        world.add_component(camera, Camera2D::new(2.0)).unwrap();
        world.add_root(camera).unwrap();

        sprite_at(&mut world, 2.0, 1.0, Sprite::new("front").with_z_index(5));
        sprite_at(&mut world, 1.0, 0.0, Sprite::new("back").with_z_index(-1));

        draw(&mut renderer, &world);
        let frame = renderer.backend().last_frame().unwrap();
        let textures: Vec<&str> = frame
            .items
            .iter()
            .map(|i| renderer.backend().drawable(i.handle).unwrap().texture.as_str())
            .collect();
        assert_eq!(textures, vec!["back", "front"]);

        // 100 px per unit at zoom 2, viewport centre (400, 300)
        assert_relative_eq!(frame.items[0].position, Vec2::new(400.0, 100.0));
        assert_relative_eq!(frame.items[1].position, Vec2::new(600.0, 300.0));
        assert_relative_eq!(frame.items[1].size, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_screen_to_world_inverts_placement() {
        let mut world = World::new();
        let mut renderer = renderer();
        let camera = world.spawn();
        world.add_component(camera, Transform::from_position(-3.0, 7.5)).unwrap();
        world.add_component(camera, Camera2D::new(0.5)).unwrap();
        world.add_root(camera).unwrap();
        draw(&mut renderer, &world);

        let point = Vec2::new(4.25, -2.0);
        let screen = renderer.world_to_screen(point);
        assert_relative_eq!(renderer.screen_to_world(screen), point, epsilon = 1e-4);
        assert_relative_eq!(renderer.screen_to_world(Vec2::new(400.0, 300.0)), Vec2::new(-3.0, 7.5));
    }

    #[test]
    fn test_hidden_and_removed_sprites() {
        let mut world = World::new();
        let mut renderer = renderer();
        let (shown, _) = sprite_at(&mut world, 0.0, 0.0, Sprite::new("a"));
        let (_, hidden) = sprite_at(&mut world, 0.0, 0.0, Sprite::new("b"));
        world.component_mut::<Sprite>(hidden).unwrap().visible = false;

        draw(&mut renderer, &world);
        assert_eq!(renderer.drawable_count(), 2);
        assert_eq!(renderer.backend().last_frame().unwrap().items.len(), 1);

        world.destroy(shown).unwrap();
        draw(&mut renderer, &world);
        assert_eq!(renderer.drawable_count(), 1);
        assert_eq!(renderer.backend().drawable_count(), 1);
        assert!(renderer.backend().last_frame().unwrap().items.is_empty());
    }

    #[test]
    fn test_identical_state_draws_identical_frames() {
        let mut world = World::new();
        let mut renderer = renderer();
        sprite_at(&mut world, 0.5, -0.5, Sprite::new("ship"));

        draw(&mut renderer, &world);
        draw(&mut renderer, &world);
        let frames = renderer.backend().frames();
        assert_eq!(frames[0], frames[1]);
    }
}
