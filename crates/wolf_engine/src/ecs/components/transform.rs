//! Hierarchical 2D transform
//!
//! A [`Transform`] stores a pose relative to the nearest ancestor that also
//! has a transform. Global poses are recomputed on every query by walking up
//! the tree; nothing is cached, so moving a parent moves its children on the
//! next read.
//!
//! When the entity also carries an attached [`RigidBody`], the transform is
//! physics backed: the body's pose is the single source of truth and writes
//! go to the body. Removing the body switches the transform back to local
//! storage, seeded from the body's last pose so nothing jumps.

use crate::ecs::component::{Component, HookContext, Hooks};
use crate::ecs::entity::{ComponentId, EntityId, Parent};
use crate::ecs::error::EcsError;
use crate::ecs::world::World;
use crate::foundation::math::{angle_of, from_angle, Pose2, Vec2};

use super::rigid_body::RigidBody;

/// Where a transform reads its pose from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSource {
    /// Local pose composed with the parent chain
    Local,
    /// World pose of the given rigid body component
    PhysicsBacked(ComponentId),
}

/// ECS Transform component
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    local: Pose2,
    source: TransformSource,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::zeros(), 0.0)
    }
}

impl Transform {
    /// Create from a local position and rotation
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            local: Pose2::new(position, rotation),
            source: TransformSource::Local,
        }
    }

    /// Create from a local position only
    pub fn from_position(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), 0.0)
    }

    /// Position relative to the parent frame.
    ///
    /// Stale while physics backed; use [`World::global_position`] instead.
    pub fn local_position(&self) -> Vec2 {
        self.local.position
    }

    /// Rotation relative to the parent frame
    pub fn local_rotation(&self) -> f32 {
        self.local.rotation
    }

    /// Pose relative to the parent frame
    pub fn local_pose(&self) -> Pose2 {
        self.local
    }

    /// Set the position relative to the parent frame
    pub fn set_local_position(&mut self, position: Vec2) {
        self.local.position = position;
    }

    /// Set the rotation relative to the parent frame
    pub fn set_local_rotation(&mut self, rotation: f32) {
        self.local.rotation = rotation;
    }

    /// Current pose source
    pub fn source(&self) -> TransformSource {
        self.source
    }

    /// Whether a rigid body owns the pose
    pub fn is_physics_backed(&self) -> bool {
        matches!(self.source, TransformSource::PhysicsBacked(_))
    }

    pub(crate) fn bind(&mut self, body: ComponentId) {
        self.source = TransformSource::PhysicsBacked(body);
    }

    pub(crate) fn unbind(&mut self, local: Pose2) {
        self.local = local;
        self.source = TransformSource::Local;
    }
}

impl Component for Transform {
    fn hooks(&self) -> Hooks {
        Hooks::ATTACH | Hooks::DEBUG
    }

    fn on_attach(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        // Bodies attached earlier found no transform to bind
        if self.source == TransformSource::Local {
            let world = &*ctx.world;
            let body = world
                .components(ctx.entity)
                .iter()
                .copied()
                .find(|&id| {
                    world.component::<RigidBody>(id).is_some() && world.is_component_attached(id)
                });
            if let Some(body) = body {
                self.bind(body);
            }
        }
        Ok(())
    }

    fn render_debug(&self) -> Option<String> {
        Some(match self.source {
            TransformSource::Local => format!(
                "Transform ({:.2}, {:.2}) {:.2}rad",
                self.local.position.x, self.local.position.y, self.local.rotation
            ),
            TransformSource::PhysicsBacked(_) => "Transform (physics)".to_string(),
        })
    }
}

impl World {
    /// World pose of an entity's transform.
    ///
    /// Fails when the entity has no [`Transform`] or is not attached.
    pub fn global_pose(&self, entity: EntityId) -> Result<Pose2, EcsError> {
        let transform = self.require_component::<Transform>(entity)?;
        if let TransformSource::PhysicsBacked(body) = transform.source {
            if let Some(body) = self.component::<RigidBody>(body) {
                return Ok(body.pose());
            }
        }
        let local = transform.local;
        Ok(self.parent_frame(entity)?.compose(&local))
    }

    /// World pose of the nearest ancestor with a transform, identity if none
    pub fn parent_frame(&self, entity: EntityId) -> Result<Pose2, EcsError> {
        let mut current = entity;
        loop {
            match self.parent(current)? {
                Parent::Scene => return Ok(Pose2::identity()),
                Parent::Entity(parent) if self.has_component::<Transform>(parent) => {
                    return self.global_pose(parent);
                }
                Parent::Entity(parent) => current = parent,
            }
        }
    }

    /// World position of an entity
    pub fn global_position(&self, entity: EntityId) -> Result<Vec2, EcsError> {
        Ok(self.global_pose(entity)?.position)
    }

    /// World rotation of an entity
    pub fn global_rotation(&self, entity: EntityId) -> Result<f32, EcsError> {
        Ok(self.global_pose(entity)?.rotation)
    }

    /// Move an entity so its world pose becomes `pose`
    pub fn set_global_pose(&mut self, entity: EntityId, pose: Pose2) -> Result<(), EcsError> {
        let source = self.require_component::<Transform>(entity)?.source;
        if let TransformSource::PhysicsBacked(body) = source {
            if let Some(body) = self.component_mut::<RigidBody>(body) {
                body.set_pose(pose);
                return Ok(());
            }
        }
        let local = self.parent_frame(entity)?.localize(&pose);
        self.require_component_mut::<Transform>(entity)?.local = local;
        Ok(())
    }

    /// Move an entity so its world position becomes `position`
    pub fn set_global_position(&mut self, entity: EntityId, position: Vec2) -> Result<(), EcsError> {
        let rotation = self.global_rotation(entity)?;
        self.set_global_pose(entity, Pose2::new(position, rotation))
    }

    /// Turn an entity so its world rotation becomes `rotation`
    pub fn set_global_rotation(&mut self, entity: EntityId, rotation: f32) -> Result<(), EcsError> {
        let position = self.global_position(entity)?;
        self.set_global_pose(entity, Pose2::new(position, rotation))
    }

    /// Move by `delta`, in the parent frame (world frame when physics backed)
    pub fn translate(&mut self, entity: EntityId, delta: Vec2) -> Result<(), EcsError> {
        let source = self.require_component::<Transform>(entity)?.source;
        if let TransformSource::PhysicsBacked(body) = source {
            if let Some(body) = self.component_mut::<RigidBody>(body) {
                body.translate(delta);
                return Ok(());
            }
        }
        self.require_component_mut::<Transform>(entity)?.local.position += delta;
        Ok(())
    }

    /// Turn by `angle` radians
    pub fn rotate(&mut self, entity: EntityId, angle: f32) -> Result<(), EcsError> {
        let source = self.require_component::<Transform>(entity)?.source;
        if let TransformSource::PhysicsBacked(body) = source {
            if let Some(body) = self.component_mut::<RigidBody>(body) {
                body.rotate(angle);
                return Ok(());
            }
        }
        self.require_component_mut::<Transform>(entity)?.local.rotation += angle;
        Ok(())
    }

    /// Turn so the forward axis points at a world position
    pub fn point_towards(&mut self, entity: EntityId, target: Vec2) -> Result<(), EcsError> {
        let position = self.global_position(entity)?;
        let direction = target - position;
        if direction.norm_squared() == 0.0 {
            return Ok(());
        }
        self.set_global_rotation(entity, angle_of(direction))
    }

    /// Unit vector along the entity's world rotation
    pub fn forward(&self, entity: EntityId) -> Result<Vec2, EcsError> {
        Ok(from_angle(self.global_rotation(entity)?))
    }
}
