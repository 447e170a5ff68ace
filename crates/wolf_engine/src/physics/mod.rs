//! Physics module
//!
//! The engine does not solve rigid bodies itself. It talks to a
//! [`PhysicsBackend`] through opaque handles and keeps its own
//! handle-to-component tables in [`PhysicsSystem`]. [`ArcadePhysics`] is a
//! small built-in backend good enough for arcade games and tests.

pub mod arcade;
pub mod layers;
pub mod shape;
pub mod system;

use std::fmt;

use crate::ecs::{CollisionPhase, EcsError};
use crate::foundation::math::{Pose2, Vec2};

pub use arcade::ArcadePhysics;
pub use layers::{CollisionFilter, CollisionLayers};
pub use shape::Shape;
pub use system::PhysicsSystem;

/// Backend handle of a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Backend handle of a collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for ColliderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider#{}", self.0)
    }
}

/// How a body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyType {
    /// Moved by forces, gravity and velocity
    #[default]
    Dynamic,
    /// Moved by velocity only
    Kinematic,
    /// Never moves
    Fixed,
}

/// Everything a backend needs to create a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyDesc {
    /// Motion model
    pub body_type: BodyType,
    /// Initial world pose
    pub pose: Pose2,
    /// Initial linear velocity in units per second
    pub linear_velocity: Vec2,
    /// Initial angular velocity in radians per second
    pub angular_velocity: f32,
    /// Mass; forces are divided by it
    pub mass: f32,
    /// Multiplier on the backend's gravity
    pub gravity_scale: f32,
    /// Fraction of velocity lost per second
    pub linear_damping: f32,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            pose: Pose2::identity(),
            linear_velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            mass: 1.0,
            gravity_scale: 1.0,
            linear_damping: 0.0,
        }
    }
}

/// Everything a backend needs to create a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderDesc {
    /// Geometry
    pub shape: Shape,
    /// Offset from the owning body or entity, in its frame
    pub offset: Vec2,
    /// Layer filtering
    pub filter: CollisionFilter,
    /// Sensors report contacts but never push
    pub sensor: bool,
}

/// Contact change between two colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    /// First collider
    pub a: ColliderHandle,
    /// Second collider
    pub b: ColliderHandle,
    /// Whether the contact started or ended
    pub phase: CollisionPhase,
}

/// Physics backend errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// Handle was never issued or was unregistered
    #[error("Unknown rigid body {0}")]
    UnknownBody(BodyHandle),

    /// Handle was never issued or was unregistered
    #[error("Unknown collider {0}")]
    UnknownCollider(ColliderHandle),
}

impl From<PhysicsError> for EcsError {
    fn from(error: PhysicsError) -> Self {
        Self::Backend(error.to_string())
    }
}

/// Rigid-body solver the engine delegates to
pub trait PhysicsBackend {
    /// Create a rigid body
    fn register_rigid_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle;

    /// Remove a rigid body together with the colliders attached to it
    fn unregister_rigid_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Create a collider, attached to `body` when given
    fn register_collider(
        &mut self,
        desc: &ColliderDesc,
        body: Option<BodyHandle>,
    ) -> Result<ColliderHandle, PhysicsError>;

    /// Remove a collider
    fn unregister_collider(&mut self, handle: ColliderHandle) -> Result<(), PhysicsError>;

    /// Advance the simulation
    fn step(&mut self, delta_time: f32);

    /// Contact changes since the last drain
    fn drain_collision_events(&mut self) -> Vec<CollisionEvent>;

    /// Solved world pose of a body
    fn body_pose(&self, handle: BodyHandle) -> Result<Pose2, PhysicsError>;

    /// Linear velocity of a body
    fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError>;

    /// Teleport a body
    fn set_body_pose(&mut self, handle: BodyHandle, pose: Pose2) -> Result<(), PhysicsError>;

    /// Replace the linear velocity of a body
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2)
        -> Result<(), PhysicsError>;

    /// Replace the angular velocity of a body
    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: f32)
        -> Result<(), PhysicsError>;

    /// Add a force for the next step
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<(), PhysicsError>;

    /// Move a collider that has no body
    fn set_collider_pose(&mut self, handle: ColliderHandle, pose: Pose2)
        -> Result<(), PhysicsError>;
}
