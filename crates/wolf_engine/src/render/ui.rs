//! UI renderer
//!
//! Lays out [`UiElement`] components in screen pixels without drawing them.
//! Elements that follow an entity sit in a lower layer than elements pinned
//! to the viewport; each layer is ordered by z index, then by pre-order.
//! A host draws [`UiRenderer::items`] with whatever text system it has.

use crate::config::RenderConfig;
use crate::ecs::{
    Anchor, ComponentId, EcsError, EntityId, RenderContext, Renderer, UiElement, UiPlacement,
};
use crate::foundation::math::Vec2;

use super::Projection;

/// Z offset of viewport-pinned elements
pub const SCREEN_LAYER: i32 = 10_000;

/// One laid-out element
#[derive(Debug, Clone, PartialEq)]
pub struct UiItem {
    /// Owning entity
    pub entity: EntityId,
    /// The element component
    pub component: ComponentId,
    /// Text to show
    pub text: String,
    /// Reference point in screen pixels
    pub position: Vec2,
    /// Which point of the element's box sits on `position`
    pub align: Anchor,
    /// Effective draw order
    pub z_index: i32,
}

/// Renderer laying out UI elements
#[derive(Debug)]
pub struct UiRenderer {
    projection: Projection,
    items: Vec<UiItem>,
}

impl UiRenderer {
    /// Renderer with the viewport and scale of a render config
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            projection: Projection::new(config),
            items: Vec::new(),
        }
    }

    /// Resize the viewport, in pixels
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.projection.set_viewport(width, height);
    }

    /// Elements of the last frame in draw order
    pub fn items(&self) -> &[UiItem] {
        &self.items
    }

    fn place(&self, element: &UiElement, world_position: Vec2) -> (Vec2, Anchor, i32) {
        match element.placement {
            UiPlacement::Screen { anchor, offset } => (
                self.projection
                    .viewport()
                    .component_mul(&anchor.fraction())
                    + offset,
                anchor,
                element.z_index.saturating_add(SCREEN_LAYER),
            ),
            UiPlacement::Entity { offset } => (
                self.projection.world_to_screen(world_position) + offset,
                Anchor::TOP_LEFT,
                element.z_index,
            ),
        }
    }
}

impl Renderer for UiRenderer {
    fn name(&self) -> &'static str {
        "UiRenderer"
    }

    fn draw(&mut self, ctx: &RenderContext<'_>) -> Result<(), EcsError> {
        self.projection.follow_active_camera(ctx.world, ctx.entities);
        let mut items = Vec::new();
        for &entity in ctx.entities {
            for &id in ctx.world.components(entity) {
                let Some(element) = ctx.world.component::<UiElement>(id) else {
                    continue;
                };
                if !element.visible {
                    continue;
                }
                let Some(text) = element.content(ctx.world, entity) else {
                    continue;
                };
                let world_position = match element.placement {
                    UiPlacement::Entity { .. } => ctx.world.global_position(entity)?,
                    UiPlacement::Screen { .. } => Vec2::zeros(),
                };
                let (position, align, z_index) = self.place(element, world_position);
                items.push(UiItem {
                    entity,
                    component: id,
                    text,
                    position,
                    align,
                    z_index,
                });
            }
        }
        items.sort_by_key(|item| item.z_index);
        self.items = items;
        Ok(())
    }
}
