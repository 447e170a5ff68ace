//! Rigid body component
//!
//! Holds the engine-side view of a physics body: its last solved pose and a
//! queue of commands for the backend. The [`PhysicsSystem`] registers the
//! body with the backend on its next tick, flushes the queue before each
//! step and writes the solved pose back afterwards.
//!
//! [`PhysicsSystem`]: crate::physics::PhysicsSystem

use std::collections::BTreeSet;

use crate::ecs::component::{Component, HookContext, Hooks};
use crate::ecs::entity::{ComponentId, Parent};
use crate::ecs::error::EcsError;
use crate::foundation::math::{Pose2, Vec2};
use crate::physics::{BodyType, RigidBodyDesc};

use super::transform::{Transform, TransformSource};

/// Change waiting to be pushed to the physics backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyCommand {
    /// Teleport
    SetPose(Pose2),
    /// Replace the linear velocity
    SetLinearVelocity(Vec2),
    /// Replace the angular velocity
    SetAngularVelocity(f32),
    /// Push for one step
    ApplyForce(Vec2),
}

/// Rigid body component
#[derive(Debug, Clone)]
pub struct RigidBody {
    desc: RigidBodyDesc,
    pose: Pose2,
    linear_velocity: Vec2,
    commands: Vec<BodyCommand>,
    /// Rigid bodies of the entities currently touching this one
    contacts: BTreeSet<ComponentId>,
}

impl RigidBody {
    /// Body with the given motion model
    pub fn new(body_type: BodyType) -> Self {
        Self::from_desc(RigidBodyDesc {
            body_type,
            ..RigidBodyDesc::default()
        })
    }

    /// Dynamic body
    pub fn dynamic() -> Self {
        Self::new(BodyType::Dynamic)
    }

    /// Kinematic body
    pub fn kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    /// Fixed body
    pub fn fixed() -> Self {
        Self::new(BodyType::Fixed)
    }

    /// Body from a full description; its pose is replaced on attach
    pub fn from_desc(desc: RigidBodyDesc) -> Self {
        Self {
            pose: desc.pose,
            linear_velocity: desc.linear_velocity,
            desc,
            commands: Vec::new(),
            contacts: BTreeSet::new(),
        }
    }

    /// Set the mass
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.desc.mass = mass;
        self
    }

    /// Set the gravity multiplier
    #[must_use]
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.desc.gravity_scale = scale;
        self
    }

    /// Set the linear damping
    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.desc.linear_damping = damping;
        self
    }

    /// Set the initial linear velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.desc.linear_velocity = velocity;
        self.linear_velocity = velocity;
        self
    }

    /// Motion model
    pub fn body_type(&self) -> BodyType {
        self.desc.body_type
    }

    /// Description used to register the body, at the current pose
    pub fn desc(&self) -> RigidBodyDesc {
        RigidBodyDesc {
            pose: self.pose,
            linear_velocity: self.linear_velocity,
            ..self.desc
        }
    }

    /// World pose
    pub fn pose(&self) -> Pose2 {
        self.pose
    }

    /// World position
    pub fn position(&self) -> Vec2 {
        self.pose.position
    }

    /// World rotation
    pub fn rotation(&self) -> f32 {
        self.pose.rotation
    }

    /// Linear velocity as of the last step
    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    /// Teleport to a world pose
    pub fn set_pose(&mut self, pose: Pose2) {
        self.pose = pose;
        self.commands.push(BodyCommand::SetPose(pose));
    }

    /// Teleport to a world position
    pub fn set_position(&mut self, position: Vec2) {
        self.set_pose(Pose2::new(position, self.pose.rotation));
    }

    /// Turn to a world rotation
    pub fn set_rotation(&mut self, rotation: f32) {
        self.set_pose(Pose2::new(self.pose.position, rotation));
    }

    /// Move by a world-space offset
    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.pose.position + delta);
    }

    /// Turn by an angle
    pub fn rotate(&mut self, angle: f32) {
        self.set_rotation(self.pose.rotation + angle);
    }

    /// Replace the linear velocity
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.linear_velocity = velocity;
        self.commands.push(BodyCommand::SetLinearVelocity(velocity));
    }

    /// Replace the angular velocity
    pub fn set_angular_velocity(&mut self, velocity: f32) {
        self.commands.push(BodyCommand::SetAngularVelocity(velocity));
    }

    /// Push for the next step
    pub fn apply_force(&mut self, force: Vec2) {
        self.commands.push(BodyCommand::ApplyForce(force));
    }

    /// Rigid bodies currently touching this one
    pub fn colliding_with(&self) -> Vec<ComponentId> {
        self.contacts.iter().copied().collect()
    }

    pub(crate) fn take_commands(&mut self) -> Vec<BodyCommand> {
        std::mem::take(&mut self.commands)
    }

    pub(crate) fn sync_from_backend(&mut self, pose: Pose2, linear_velocity: Vec2) {
        self.pose = pose;
        self.linear_velocity = linear_velocity;
    }

    pub(crate) fn add_contact(&mut self, other: ComponentId) {
        self.contacts.insert(other);
    }

    pub(crate) fn remove_contact(&mut self, other: ComponentId) {
        self.contacts.remove(&other);
    }
}

impl Component for RigidBody {
    fn hooks(&self) -> Hooks {
        Hooks::ATTACH | Hooks::DESTROY | Hooks::DEBUG
    }

    fn on_attach(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        if let Ok(pose) = ctx.world.global_pose(ctx.entity) {
            self.pose = pose;
        }
        if let Some(transform) = ctx.world.get_component_mut::<Transform>(ctx.entity) {
            if !transform.is_physics_backed() {
                transform.bind(ctx.component);
            }
        }
        Ok(())
    }

    fn on_destroy(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        let pose = self.pose;
        let local = match ctx.world.parent(ctx.entity) {
            Ok(Parent::Entity(_)) => ctx
                .world
                .parent_frame(ctx.entity)
                .map_or(pose, |frame| frame.localize(&pose)),
            _ => pose,
        };
        if let Some(transform) = ctx.world.get_component_mut::<Transform>(ctx.entity) {
            if transform.source() == TransformSource::PhysicsBacked(ctx.component) {
                transform.unbind(local);
            }
        }
        Ok(())
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!(
            "RigidBody {:?} v=({:.2}, {:.2}) contacts={}",
            self.desc.body_type,
            self.linear_velocity.x,
            self.linear_velocity.y,
            self.contacts.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_takes_over_transform_on_attach() {
        let mut world = World::new();
        let entity = world.spawn();
        world.add_component(entity, Transform::new(Vec2::new(2.0, 3.0), 0.5)).unwrap();
        let body = world.add_component(entity, RigidBody::dynamic()).unwrap();
        world.add_root(entity).unwrap();

        let transform = world.get_component::<Transform>(entity).unwrap();
        assert_eq!(transform.source(), TransformSource::PhysicsBacked(body));
        assert_relative_eq!(world.component::<RigidBody>(body).unwrap().position(), Vec2::new(2.0, 3.0));

        world.set_global_position(entity, Vec2::new(-1.0, 0.0)).unwrap();
        let rb = world.component_mut::<RigidBody>(body).unwrap();
        assert_eq!(rb.position(), Vec2::new(-1.0, 0.0));
        assert_eq!(
            rb.take_commands(),
            vec![BodyCommand::SetPose(Pose2::new(Vec2::new(-1.0, 0.0), 0.5))]
        );
    }

    #[test]
    fn test_transform_added_after_body_binds_on_attach() {
        let mut world = World::new();
        let entity = world.spawn();
        world.add_root(entity).unwrap();
        let body = world.add_component(entity, RigidBody::dynamic()).unwrap();
        world.add_component(entity, Transform::from_position(4.0, 0.0)).unwrap();

        let transform = world.get_component::<Transform>(entity).unwrap();
        assert_eq!(transform.source(), TransformSource::PhysicsBacked(body));
        // The body was placed before the transform existed
        assert_eq!(world.global_position(entity).unwrap(), Vec2::zeros());
    }

    #[test]
    fn test_removing_body_keeps_world_pose() {
        let mut world = World::new();
        let parent = world.spawn();
        world
            .add_component(parent, Transform::new(Vec2::new(10.0, 0.0), std::f32::consts::FRAC_PI_2))
            .unwrap();
        world.add_root(parent).unwrap();
        let child = world.create_child(parent).unwrap();
        world.add_component(child, Transform::default()).unwrap();
        let body = world.add_component(child, RigidBody::dynamic()).unwrap();

        // The solver moved the body somewhere else
        world
            .component_mut::<RigidBody>(body)
            .unwrap()
            .sync_from_backend(Pose2::new(Vec2::new(7.0, 2.0), 1.0), Vec2::zeros());
        world.remove_component(body).unwrap();

        let transform = world.get_component::<Transform>(child).unwrap();
        assert_eq!(transform.source(), TransformSource::Local);
        assert_relative_eq!(world.global_position(child).unwrap(), Vec2::new(7.0, 2.0), epsilon = 1e-5);
        assert_relative_eq!(world.global_rotation(child).unwrap(), 1.0, epsilon = 1e-5);
    }
}
