//! UI element component
//!
//! Text shown on top of the world by [`UiRenderer`](crate::render::UiRenderer).
//! An element is either pinned to an anchor of the viewport or follows its
//! entity's world position. The content is produced every frame from the
//! world, so a label can show live values such as a score.

use std::fmt;

use crate::ecs::component::{Component, Hooks};
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::foundation::math::Vec2;

type ContentFn = Box<dyn Fn(&World, EntityId) -> Option<String>>;

/// Vertical anchor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAnchor {
    /// Top edge
    #[default]
    Top,
    /// Middle
    Center,
    /// Bottom edge
    Bottom,
}

/// Horizontal anchor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAnchor {
    /// Left edge
    #[default]
    Left,
    /// Middle
    Center,
    /// Right edge
    Right,
}

/// One of the nine anchor points of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Anchor {
    /// Row
    pub vertical: VerticalAnchor,
    /// Column
    pub horizontal: HorizontalAnchor,
}

impl Anchor {
    /// Top-left corner
    pub const TOP_LEFT: Self = Self::new(VerticalAnchor::Top, HorizontalAnchor::Left);
    /// Middle of the top edge
    pub const TOP_CENTER: Self = Self::new(VerticalAnchor::Top, HorizontalAnchor::Center);
    /// Top-right corner
    pub const TOP_RIGHT: Self = Self::new(VerticalAnchor::Top, HorizontalAnchor::Right);
    /// Middle of the left edge
    pub const CENTER_LEFT: Self = Self::new(VerticalAnchor::Center, HorizontalAnchor::Left);
    /// Centre
    pub const CENTER: Self = Self::new(VerticalAnchor::Center, HorizontalAnchor::Center);
    /// Middle of the right edge
    pub const CENTER_RIGHT: Self = Self::new(VerticalAnchor::Center, HorizontalAnchor::Right);
    /// Bottom-left corner
    pub const BOTTOM_LEFT: Self = Self::new(VerticalAnchor::Bottom, HorizontalAnchor::Left);
    /// Middle of the bottom edge
    pub const BOTTOM_CENTER: Self = Self::new(VerticalAnchor::Bottom, HorizontalAnchor::Center);
    /// Bottom-right corner
    pub const BOTTOM_RIGHT: Self = Self::new(VerticalAnchor::Bottom, HorizontalAnchor::Right);

    /// Anchor from its row and column
    pub const fn new(vertical: VerticalAnchor, horizontal: HorizontalAnchor) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Anchor point as a fraction of the rectangle, `(0, 0)` at the top-left
    pub fn fraction(self) -> Vec2 {
        let x = match self.horizontal {
            HorizontalAnchor::Left => 0.0,
            HorizontalAnchor::Center => 0.5,
            HorizontalAnchor::Right => 1.0,
        };
        let y = match self.vertical {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Center => 0.5,
            VerticalAnchor::Bottom => 1.0,
        };
        Vec2::new(x, y)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            VerticalAnchor::Top => "top",
            VerticalAnchor::Center => "center",
            VerticalAnchor::Bottom => "bottom",
        };
        let horizontal = match self.horizontal {
            HorizontalAnchor::Left => "left",
            HorizontalAnchor::Center => "center",
            HorizontalAnchor::Right => "right",
        };
        write!(f, "{vertical}-{horizontal}")
    }
}

/// Where an element is placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiPlacement {
    /// Pinned to an anchor of the viewport, shifted by `offset` pixels
    Screen {
        /// Viewport anchor; the element aligns the same point to it
        anchor: Anchor,
        /// Shift in pixels, y down
        offset: Vec2,
    },
    /// At the entity's world position, shifted by `offset` pixels
    Entity {
        /// Shift in pixels, y down
        offset: Vec2,
    },
}

impl Default for UiPlacement {
    fn default() -> Self {
        Self::Screen {
            anchor: Anchor::TOP_LEFT,
            offset: Vec2::zeros(),
        }
    }
}

/// UI element component
pub struct UiElement {
    content: ContentFn,
    /// Where the element goes
    pub placement: UiPlacement,
    /// Order within its layer; higher is drawn later
    pub z_index: i32,
    /// Hidden elements are skipped
    pub visible: bool,
}

impl UiElement {
    /// Element whose text is computed each frame; `None` shows nothing
    pub fn new(content: impl Fn(&World, EntityId) -> Option<String> + 'static) -> Self {
        Self {
            content: Box::new(content),
            placement: UiPlacement::default(),
            z_index: 0,
            visible: true,
        }
    }

    /// Element with fixed text
    pub fn label(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _| Some(text.clone()))
    }

    /// Pin to a viewport anchor
    #[must_use]
    pub fn anchored(mut self, anchor: Anchor, offset_x: f32, offset_y: f32) -> Self {
        self.placement = UiPlacement::Screen {
            anchor,
            offset: Vec2::new(offset_x, offset_y),
        };
        self
    }

    /// Follow the entity's world position
    #[must_use]
    pub fn following(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.placement = UiPlacement::Entity {
            offset: Vec2::new(offset_x, offset_y),
        };
        self
    }

    /// Set the draw order
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Text for this frame
    pub fn content(&self, world: &World, entity: EntityId) -> Option<String> {
        (self.content)(world, entity)
    }
}

impl fmt::Debug for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiElement")
            .field("placement", &self.placement)
            .field("z_index", &self.z_index)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl Component for UiElement {
    fn hooks(&self) -> Hooks {
        Hooks::DEBUG
    }

    fn render_debug(&self) -> Option<String> {
        let place = match self.placement {
            UiPlacement::Screen { anchor, .. } => anchor.to_string(),
            UiPlacement::Entity { .. } => "entity".to_string(),
        };
        Some(format!("UiElement {place} z={}", self.z_index))
    }
}
