//! Built-in arcade physics backend
//!
//! Explicit Euler integration with optional gravity and no contact response:
//! colliders overlap freely and only report contact changes. Each step
//! compares the overlapping pairs with the previous step's pairs to produce
//! started and ended events, sorted by handle so runs are reproducible.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    BodyHandle, BodyType, ColliderDesc, ColliderHandle, CollisionEvent, PhysicsBackend,
    PhysicsError, RigidBodyDesc,
};
use crate::ecs::CollisionPhase;
use crate::foundation::math::{rotate, Pose2, Vec2};

#[derive(Debug, Clone)]
struct Body {
    desc: RigidBodyDesc,
    pose: Pose2,
    velocity: Vec2,
    angular_velocity: f32,
    force: Vec2,
}

#[derive(Debug, Clone)]
struct ColliderData {
    desc: ColliderDesc,
    body: Option<BodyHandle>,
    /// Pose of a body-less collider
    pose: Pose2,
}

/// Collision pair, smaller handle first
type Pair = (ColliderHandle, ColliderHandle);

fn pair(a: ColliderHandle, b: ColliderHandle) -> Pair {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Minimal physics backend
#[derive(Debug, Clone, Default)]
pub struct ArcadePhysics {
    gravity: Vec2,
    next_handle: u64,
    bodies: BTreeMap<BodyHandle, Body>,
    colliders: BTreeMap<ColliderHandle, ColliderData>,
    current_pairs: BTreeSet<Pair>,
    previous_pairs: BTreeSet<Pair>,
    events: Vec<CollisionEvent>,
}

impl ArcadePhysics {
    /// Backend without gravity
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with constant gravity
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Body a collider is attached to
    pub fn collider_body(&self, handle: ColliderHandle) -> Option<BodyHandle> {
        self.colliders.get(&handle)?.body
    }

    /// Whether two colliders overlapped during the last step
    pub fn in_contact(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.current_pairs.contains(&pair(a, b))
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, PhysicsError> {
        self.bodies
            .get_mut(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn integrate(&mut self, delta_time: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            match body.desc.body_type {
                BodyType::Fixed => {}
                BodyType::Kinematic => {
                    body.pose.position += body.velocity * delta_time;
                    body.pose.rotation += body.angular_velocity * delta_time;
                }
                BodyType::Dynamic => {
                    let mass = body.desc.mass.max(f32::EPSILON);
                    let acceleration = gravity * body.desc.gravity_scale + body.force / mass;
                    body.velocity += acceleration * delta_time;
                    body.velocity *= (1.0 - body.desc.linear_damping * delta_time).max(0.0);
                    body.pose.position += body.velocity * delta_time;
                    body.pose.rotation += body.angular_velocity * delta_time;
                }
            }
            body.force = Vec2::zeros();
        }
    }

    /// World pose of a collider's shape centre
    fn collider_pose(&self, collider: &ColliderData) -> Pose2 {
        let frame = collider
            .body
            .and_then(|b| self.bodies.get(&b))
            .map_or(collider.pose, |b| b.pose);
        Pose2::new(
            frame.position + rotate(collider.desc.offset, frame.rotation),
            frame.rotation,
        )
    }

    fn detect(&mut self) {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let placed: Vec<(ColliderHandle, &ColliderData, Pose2)> = self
            .colliders
            .iter()
            .map(|(&handle, data)| (handle, data, self.collider_pose(data)))
            .collect();

        let mut current = BTreeSet::new();
        for (i, (ha, a, pa)) in placed.iter().enumerate() {
            for (hb, b, pb) in &placed[i + 1..] {
                if a.body.is_some() && a.body == b.body {
                    continue;
                }
                if !a.desc.filter.should_collide(&b.desc.filter) {
                    continue;
                }
                if a.desc.shape.overlaps(pa, &b.desc.shape, pb) {
                    current.insert(pair(*ha, *hb));
                }
            }
        }
        self.current_pairs = current;

        for &(a, b) in self.current_pairs.difference(&self.previous_pairs) {
            self.events.push(CollisionEvent {
                a,
                b,
                phase: CollisionPhase::Started,
            });
        }
        for &(a, b) in self.previous_pairs.difference(&self.current_pairs) {
            self.events.push(CollisionEvent {
                a,
                b,
                phase: CollisionPhase::Ended,
            });
        }
    }
}

impl PhysicsBackend for ArcadePhysics {
    fn register_rigid_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next());
        self.bodies.insert(
            handle,
            Body {
                desc: *desc,
                pose: desc.pose,
                velocity: desc.linear_velocity,
                angular_velocity: desc.angular_velocity,
                force: Vec2::zeros(),
            },
        );
        log::trace!("Registered {}", handle);
        handle
    }

    fn unregister_rigid_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .remove(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        let attached: Vec<ColliderHandle> = self
            .colliders
            .iter()
            .filter(|(_, c)| c.body == Some(handle))
            .map(|(&h, _)| h)
            .collect();
        for collider in attached {
            self.unregister_collider(collider)?;
        }
        log::trace!("Unregistered {}", handle);
        Ok(())
    }

    fn register_collider(
        &mut self,
        desc: &ColliderDesc,
        body: Option<BodyHandle>,
    ) -> Result<ColliderHandle, PhysicsError> {
        if let Some(body) = body {
            if !self.bodies.contains_key(&body) {
                return Err(PhysicsError::UnknownBody(body));
            }
        }
        let handle = ColliderHandle(self.next());
        self.colliders.insert(
            handle,
            ColliderData {
                desc: *desc,
                body,
                pose: Pose2::identity(),
            },
        );
        log::trace!("Registered {} on {:?}", handle, body);
        Ok(handle)
    }

    fn unregister_collider(&mut self, handle: ColliderHandle) -> Result<(), PhysicsError> {
        self.colliders
            .remove(&handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?;
        let touches = |&(a, b): &Pair| a == handle || b == handle;
        let (dropped, kept): (BTreeSet<Pair>, BTreeSet<Pair>) =
            self.current_pairs.iter().copied().partition(|p| touches(p));
        self.current_pairs = kept;
        self.previous_pairs.retain(|p| !touches(p));
        // Live contacts end with the collider
        self.events.extend(dropped.into_iter().map(|(a, b)| CollisionEvent {
            a,
            b,
            phase: CollisionPhase::Ended,
        }));
        Ok(())
    }

    fn step(&mut self, delta_time: f32) {
        self.integrate(delta_time);
        self.detect();
    }

    fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    fn body_pose(&self, handle: BodyHandle) -> Result<Pose2, PhysicsError> {
        self.bodies
            .get(&handle)
            .map(|b| b.pose)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        self.bodies
            .get(&handle)
            .map(|b| b.velocity)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn set_body_pose(&mut self, handle: BodyHandle, pose: Pose2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.pose = pose;
        Ok(())
    }

    fn set_linear_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec2,
    ) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.velocity = velocity;
        Ok(())
    }

    fn set_angular_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: f32,
    ) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.angular_velocity = velocity;
        Ok(())
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.force += force;
        Ok(())
    }

    fn set_collider_pose(
        &mut self,
        handle: ColliderHandle,
        pose: Pose2,
    ) -> Result<(), PhysicsError> {
        self.colliders
            .get_mut(&handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?
            .pose = pose;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Shape;
    use approx::assert_relative_eq;

    fn circle(radius: f32) -> ColliderDesc {
        ColliderDesc {
            shape: Shape::circle(radius),
            offset: Vec2::zeros(),
            filter: Default::default(),
            sensor: false,
        }
    }

    #[test]
    fn test_gravity_and_velocity() {
        let mut physics = ArcadePhysics::with_gravity(Vec2::new(0.0, -10.0));
        let body = physics.register_rigid_body(&RigidBodyDesc {
            linear_velocity: Vec2::new(2.0, 0.0),
            ..Default::default()
        });
        let fixed = physics.register_rigid_body(&RigidBodyDesc {
            body_type: BodyType::Fixed,
            ..Default::default()
        });

        physics.step(0.5);
        let pose = physics.body_pose(body).unwrap();
        assert_relative_eq!(pose.position, Vec2::new(1.0, -2.5));
        assert_relative_eq!(physics.linear_velocity(body).unwrap(), Vec2::new(2.0, -5.0));
        assert_eq!(physics.body_pose(fixed).unwrap().position, Vec2::zeros());
    }

    #[test]
    fn test_force_lasts_one_step() {
        let mut physics = ArcadePhysics::new();
        let body = physics.register_rigid_body(&RigidBodyDesc {
            mass: 2.0,
            ..Default::default()
        });
        physics.apply_force(body, Vec2::new(4.0, 0.0)).unwrap();
        physics.step(1.0);
        physics.step(1.0);
        assert_relative_eq!(physics.linear_velocity(body).unwrap(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_contact_started_then_ended() {
        let mut physics = ArcadePhysics::new();
        let mover = physics.register_rigid_body(&RigidBodyDesc {
            body_type: BodyType::Kinematic,
            pose: Pose2::new(Vec2::new(-5.0, 0.0), 0.0),
            linear_velocity: Vec2::new(2.0, 0.0),
            ..Default::default()
        });
        let a = physics.register_collider(&circle(1.0), Some(mover)).unwrap();
        let b = physics.register_collider(&circle(1.0), None).unwrap();

        physics.step(1.0);
        assert!(physics.drain_collision_events().is_empty());

        physics.step(1.0);
        assert_eq!(
            physics.drain_collision_events(),
            vec![CollisionEvent {
                a,
                b,
                phase: CollisionPhase::Started
            }]
        );
        assert!(physics.in_contact(b, a));

        physics.step(1.0);
        physics.step(1.0);
        let events = physics.drain_collision_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, CollisionPhase::Ended);
    }

    #[test]
    fn test_removed_collider_ends_its_contacts() {
        let mut physics = ArcadePhysics::new();
        let a = physics.register_collider(&circle(1.0), None).unwrap();
        let b = physics.register_collider(&circle(1.0), None).unwrap();
        let far = physics.register_collider(&circle(1.0), None).unwrap();
        physics
            .set_collider_pose(far, Pose2::new(Vec2::new(10.0, 0.0), 0.0))
            .unwrap();

        physics.step(1.0);
        assert_eq!(physics.drain_collision_events().len(), 1);

        physics.unregister_collider(b).unwrap();
        physics.unregister_collider(far).unwrap();
        assert_eq!(
            physics.drain_collision_events(),
            vec![CollisionEvent {
                a,
                b,
                phase: CollisionPhase::Ended
            }]
        );
        assert!(!physics.in_contact(a, b));

        physics.step(1.0);
        assert!(physics.drain_collision_events().is_empty());
    }

    #[test]
    fn test_removing_body_removes_its_colliders() {
        let mut physics = ArcadePhysics::new();
        let body = physics.register_rigid_body(&RigidBodyDesc::default());
        let collider = physics.register_collider(&circle(1.0), Some(body)).unwrap();
        assert_eq!(physics.collider_body(collider), Some(body));

        physics.unregister_rigid_body(body).unwrap();
        assert_eq!(physics.collider_count(), 0);
        assert_eq!(
            physics.unregister_collider(collider),
            Err(PhysicsError::UnknownCollider(collider))
        );
        assert_eq!(
            physics.register_collider(&circle(1.0), Some(body)),
            Err(PhysicsError::UnknownBody(body))
        );
    }
}
