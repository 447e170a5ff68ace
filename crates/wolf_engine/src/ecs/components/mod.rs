//! Built-in components

pub mod camera;
pub mod collider;
pub mod lifetime;
pub mod rigid_body;
pub mod sprite;
pub mod transform;
pub mod ui;

pub use camera::Camera2D;
pub use collider::Collider;
pub use lifetime::LifetimeLimiter;
pub use rigid_body::{BodyCommand, RigidBody};
pub use sprite::Sprite;
pub use transform::{Transform, TransformSource};
pub use ui::{Anchor, HorizontalAnchor, UiElement, UiPlacement, VerticalAnchor};
