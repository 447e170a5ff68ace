//! Collider component
//!
//! Describes collision geometry for the physics backend. A collider on an
//! entity with a [`RigidBody`](super::RigidBody) moves with the body;
//! otherwise it follows the entity's transform. The physics system resolves
//! the body every tick, so the two components can be added in either order
//! and the body can come and go at runtime.

use crate::ecs::component::{Component, Hooks};
use crate::foundation::math::Vec2;
use crate::physics::{ColliderDesc, CollisionFilter, CollisionLayers, Shape};

/// Collider component
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    desc: ColliderDesc,
}

impl Collider {
    /// Solid collider with default layers
    pub fn new(shape: Shape) -> Self {
        Self {
            desc: ColliderDesc {
                shape,
                offset: Vec2::zeros(),
                filter: CollisionFilter::default(),
                sensor: false,
            },
        }
    }

    /// Circle collider
    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::circle(radius))
    }

    /// Rectangle collider
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(Shape::rect(width, height))
    }

    /// Offset from the entity, in its frame
    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.desc.offset = offset;
        self
    }

    /// Layer membership and mask
    #[must_use]
    pub fn with_layers(mut self, layer: CollisionLayers, mask: CollisionLayers) -> Self {
        self.desc.filter = CollisionFilter::new(layer, mask);
        self
    }

    /// Report contacts without pushing anything
    #[must_use]
    pub fn sensor(mut self) -> Self {
        self.desc.sensor = true;
        self
    }

    /// Geometry
    pub fn shape(&self) -> Shape {
        self.desc.shape
    }

    /// Full description for the backend
    pub fn desc(&self) -> ColliderDesc {
        self.desc
    }
}

impl Component for Collider {
    fn hooks(&self) -> Hooks {
        Hooks::DEBUG
    }

    fn render_debug(&self) -> Option<String> {
        let kind = if self.desc.sensor { "Sensor" } else { "Collider" };
        Some(match self.desc.shape {
            Shape::Circle { radius } => format!("{kind} circle r={radius:.2}"),
            Shape::Rect { half_extents } => format!(
                "{kind} rect {:.2}x{:.2}",
                half_extents.x * 2.0,
                half_extents.y * 2.0
            ),
        })
    }
}
