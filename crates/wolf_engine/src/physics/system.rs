//! Physics system
//!
//! Bridges the world and a [`PhysicsBackend`]. Every tick it reconciles the
//! backend with the attached [`RigidBody`] and [`Collider`] components,
//! flushes queued body commands, steps the solver, writes solved poses back
//! and turns backend contact events into collision hooks.
//!
//! A collider is attached to the first rigid body on its entity. When that
//! body appears or disappears the collider is re-registered, so the two
//! components can be added and removed in any order.
//!
//! Removing a collider ends its contacts. The removed collider stays known
//! until that tick's events are dispatched, so the surviving side still gets
//! its collision end hook. The `other` id it receives may no longer exist.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use super::{BodyHandle, ColliderHandle, CollisionEvent, PhysicsBackend};
use crate::ecs::components::rigid_body::BodyCommand;
use crate::ecs::{
    CollisionPhase, Collider, ComponentId, EcsError, EntityId, RigidBody, System, SystemContext,
    World,
};
use crate::input::InputSource;

#[derive(Debug, Clone, Copy)]
struct ColliderEntry {
    handle: ColliderHandle,
    body: Option<BodyHandle>,
    entity: EntityId,
}

/// One side of a contact event
#[derive(Debug, Clone, Copy)]
struct ContactSide {
    collider: ComponentId,
    entity: EntityId,
    body: Option<ComponentId>,
}

/// System driving a physics backend
pub struct PhysicsSystem<B: PhysicsBackend> {
    backend: B,
    bodies: HashMap<ComponentId, BodyHandle>,
    body_components: HashMap<BodyHandle, ComponentId>,
    colliders: HashMap<ComponentId, ColliderEntry>,
    collider_components: HashMap<ColliderHandle, ComponentId>,
    /// Colliders unregistered this tick, kept until events are dispatched
    retired: HashMap<ColliderHandle, ContactSide>,
}

impl<B: PhysicsBackend> PhysicsSystem<B> {
    /// System over a fresh backend
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            bodies: HashMap::new(),
            body_components: HashMap::new(),
            colliders: HashMap::new(),
            collider_components: HashMap::new(),
            retired: HashMap::new(),
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

    /// Backend handle registered for a rigid body component
    pub fn body_handle(&self, component: ComponentId) -> Option<BodyHandle> {
        self.bodies.get(&component).copied()
    }

    /// Backend handle registered for a collider component
    pub fn collider_handle(&self, component: ComponentId) -> Option<ColliderHandle> {
        self.colliders.get(&component).map(|entry| entry.handle)
    }

    /// Collider component behind a backend handle
    pub fn collider_component(&self, handle: ColliderHandle) -> Option<ComponentId> {
        self.collider_components.get(&handle).copied()
    }

    /// Rigid body component behind a backend handle
    pub fn body_component(&self, handle: BodyHandle) -> Option<ComponentId> {
        self.body_components.get(&handle).copied()
    }

    /// Register new bodies, returning every live body component
    fn sync_bodies(&mut self, world: &World, entities: &[EntityId]) -> HashSet<ComponentId> {
        let mut live = HashSet::new();
        for &entity in entities {
            for &id in world.components(entity) {
                let Some(body) = world.component::<RigidBody>(id) else {
                    continue;
                };
                if !world.is_component_attached(id) {
                    continue;
                }
                live.insert(id);
                if !self.bodies.contains_key(&id) {
                    let handle = self.backend.register_rigid_body(&body.desc());
                    debug!("Registered {id} as {handle}");
                    self.bodies.insert(id, handle);
                    self.body_components.insert(handle, id);
                }
            }
        }
        live
    }

    /// Register, move and re-home colliders; drop colliders that went away
    fn sync_colliders(
        &mut self,
        world: &World,
        entities: &[EntityId],
        live_bodies: &HashSet<ComponentId>,
    ) -> Result<(), EcsError> {
        let mut live = HashSet::new();
        for &entity in entities {
            let body = world
                .components(entity)
                .iter()
                .filter(|id| live_bodies.contains(id))
                .find_map(|id| self.bodies.get(id).copied());

            for &id in world.components(entity) {
                let Some(collider) = world.component::<Collider>(id) else {
                    continue;
                };
                if !world.is_component_attached(id) {
                    continue;
                }
                live.insert(id);

                let handle = match self.colliders.get(&id).copied() {
                    Some(entry) if entry.body == body => entry.handle,
                    existing => {
                        if existing.is_some() {
                            self.retire_collider(id)?;
                        }
                        let handle = self.backend.register_collider(&collider.desc(), body)?;
                        trace!("Registered {id} as {handle} on {body:?}");
                        self.colliders.insert(
                            id,
                            ColliderEntry {
                                handle,
                                body,
                                entity,
                            },
                        );
                        self.collider_components.insert(handle, id);
                        handle
                    }
                };

                if body.is_none() {
                    let pose = world.global_pose(entity).unwrap_or_default();
                    self.backend.set_collider_pose(handle, pose)?;
                }
            }
        }

        let stale: Vec<ComponentId> = self
            .colliders
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in stale {
            self.retire_collider(id)?;
            trace!("Unregistered collider {id}");
        }
        Ok(())
    }

    /// Unregister a collider but keep resolving its handle until dispatch
    fn retire_collider(&mut self, id: ComponentId) -> Result<(), EcsError> {
        let Some(entry) = self.colliders.remove(&id) else {
            return Ok(());
        };
        self.collider_components.remove(&entry.handle);
        let side = ContactSide {
            collider: id,
            entity: entry.entity,
            body: entry.body.and_then(|h| self.body_component(h)),
        };
        self.retired.insert(entry.handle, side);
        self.backend.unregister_collider(entry.handle)?;
        Ok(())
    }

    fn contact_side(&self, handle: ColliderHandle) -> Option<ContactSide> {
        if let Some(side) = self.retired.get(&handle) {
            return Some(*side);
        }
        let collider = self.collider_component(handle)?;
        let entry = self.colliders.get(&collider)?;
        Some(ContactSide {
            collider,
            entity: entry.entity,
            body: entry.body.and_then(|h| self.body_component(h)),
        })
    }

    fn remove_stale_bodies(&mut self, live_bodies: &HashSet<ComponentId>) -> Result<(), EcsError> {
        let stale: Vec<ComponentId> = self
            .bodies
            .keys()
            .filter(|id| !live_bodies.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(handle) = self.bodies.remove(&id) {
                self.backend.unregister_rigid_body(handle)?;
                self.body_components.remove(&handle);
                debug!("Unregistered {id}");
            }
        }
        Ok(())
    }

    fn push_commands(&mut self, world: &mut World) -> Result<(), EcsError> {
        for (&id, &handle) in &self.bodies {
            let Some(body) = world.component_mut::<RigidBody>(id) else {
                continue;
            };
            for command in body.take_commands() {
                match command {
                    BodyCommand::SetPose(pose) => self.backend.set_body_pose(handle, pose)?,
                    BodyCommand::SetLinearVelocity(v) => {
                        self.backend.set_linear_velocity(handle, v)?;
                    }
                    BodyCommand::SetAngularVelocity(w) => {
                        self.backend.set_angular_velocity(handle, w)?;
                    }
                    BodyCommand::ApplyForce(force) => self.backend.apply_force(handle, force)?,
                }
            }
        }
        Ok(())
    }

    fn write_back(&self, world: &mut World) -> Result<(), EcsError> {
        for (&id, &handle) in &self.bodies {
            let pose = self.backend.body_pose(handle)?;
            let velocity = self.backend.linear_velocity(handle)?;
            if let Some(body) = world.component_mut::<RigidBody>(id) {
                body.sync_from_backend(pose, velocity);
            }
        }
        Ok(())
    }

    fn dispatch_events(
        &mut self,
        world: &mut World,
        input: &dyn InputSource,
        delta_time: f32,
    ) -> Result<(), EcsError> {
        let events = self.backend.drain_collision_events();
        let result = self.dispatch(&events, world, input, delta_time);
        self.retired.clear();
        result
    }

    fn dispatch(
        &self,
        events: &[CollisionEvent],
        world: &mut World,
        input: &dyn InputSource,
        delta_time: f32,
    ) -> Result<(), EcsError> {
        for event in events {
            let (Some(a), Some(b)) = (self.contact_side(event.a), self.contact_side(event.b))
            else {
                continue;
            };

            track_contact(world, a, b, event.phase);
            track_contact(world, b, a, event.phase);

            for component in world.components(a.entity).to_vec() {
                world.notify_collision(component, b.collider, event.phase, input, delta_time)?;
            }
            for component in world.components(b.entity).to_vec() {
                world.notify_collision(component, a.collider, event.phase, input, delta_time)?;
            }
        }
        Ok(())
    }
}

/// Record a contact on `side`'s rigid body against `other`'s rigid body
fn track_contact(world: &mut World, side: ContactSide, other: ContactSide, phase: CollisionPhase) {
    let (Some(own), Some(other_body)) = (side.body, other.body) else {
        return;
    };
    if let Some(body) = world.component_mut::<RigidBody>(own) {
        match phase {
            CollisionPhase::Started => body.add_contact(other_body),
            CollisionPhase::Ended => body.remove_contact(other_body),
        }
    }
}

impl<B: PhysicsBackend + 'static> System for PhysicsSystem<B> {
    fn name(&self) -> &'static str {
        "PhysicsSystem"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        let live_bodies = self.sync_bodies(ctx.world, ctx.entities);
        self.sync_colliders(ctx.world, ctx.entities, &live_bodies)?;
        self.remove_stale_bodies(&live_bodies)?;
        self.push_commands(ctx.world)?;
        self.backend.step(ctx.delta_time);
        self.write_back(ctx.world)?;
        self.dispatch_events(ctx.world, ctx.input, ctx.delta_time)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ecs::{FnComponent, Transform};
    use crate::foundation::math::Vec2;
    use crate::input::NullInput;
    use crate::physics::ArcadePhysics;
    use approx::assert_relative_eq;

    const DT: f32 = 0.1;

    fn tick(system: &mut PhysicsSystem<ArcadePhysics>, world: &mut World, number: u64) {
        let entities = world.all_entities();
        let mut ctx = SystemContext {
            world,
            entities: &entities,
            input: &NullInput,
            delta_time: DT,
            tick: number,
        };
        system.update(&mut ctx).unwrap();
    }

    fn moving_ball(world: &mut World, x: f32, velocity: Vec2) -> (EntityId, ComponentId) {
        let entity = world.spawn();
        world.add_component(entity, Transform::from_position(x, 0.0)).unwrap();
        let body = world
            .add_component(entity, RigidBody::kinematic().with_velocity(velocity))
            .unwrap();
        world.add_component(entity, Collider::circle(1.0)).unwrap();
        world.add_root(entity).unwrap();
        (entity, body)
    }

    #[test]
    fn test_transform_follows_solved_body() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let (entity, body) = moving_ball(&mut world, 2.0, Vec2::new(10.0, 0.0));

        tick(&mut physics, &mut world, 1);
        assert!(physics.body_handle(body).is_some());
        assert_relative_eq!(world.global_position(entity).unwrap(), Vec2::new(3.0, 0.0), epsilon = 1e-5);

        // Writes through the transform reach the backend before the next step
        world.set_global_position(entity, Vec2::new(-5.0, 0.0)).unwrap();
        tick(&mut physics, &mut world, 2);
        assert_relative_eq!(world.global_position(entity).unwrap(), Vec2::new(-4.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_collision_hooks_reach_every_component_of_both_entities() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let (left, left_body) = moving_ball(&mut world, -3.0, Vec2::new(10.0, 0.0));
        let (right, right_body) = moving_ball(&mut world, 2.5, Vec2::zeros());
        for (entity, name) in [(left, "left"), (right, "right")] {
            let started = Rc::clone(&log);
            let ended = Rc::clone(&log);
            world
                .add_component(
                    entity,
                    FnComponent::new(name)
                        .on_collision_start(move |name, _, _| {
                            started.borrow_mut().push(format!("{name} start"));
                            Ok(())
                        })
                        .on_collision_end(move |name, _, _| {
                            ended.borrow_mut().push(format!("{name} end"));
                            Ok(())
                        }),
                )
                .unwrap();
        }

        // Closing at one unit per tick; circles touch once the gap is 2
        for n in 1..=3 {
            tick(&mut physics, &mut world, n);
        }
        assert!(log.borrow().is_empty());
        tick(&mut physics, &mut world, 4);
        assert_eq!(*log.borrow(), vec!["left start", "right start"]);
        assert_eq!(
            world.component::<RigidBody>(left_body).unwrap().colliding_with(),
            vec![right_body]
        );
        assert_eq!(
            world.component::<RigidBody>(right_body).unwrap().colliding_with(),
            vec![left_body]
        );

        // Passes through and separates
        for n in 5..=9 {
            tick(&mut physics, &mut world, n);
        }
        assert_eq!(
            *log.borrow(),
            vec!["left start", "right start", "left end", "right end"]
        );
        assert!(world.component::<RigidBody>(left_body).unwrap().colliding_with().is_empty());
    }

    #[test]
    fn test_collider_rehomed_when_body_comes_and_goes() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let entity = world.spawn();
        world.add_component(entity, Transform::from_position(1.0, 1.0)).unwrap();
        let collider = world.add_component(entity, Collider::rect(2.0, 2.0)).unwrap();
        world.add_root(entity).unwrap();

        tick(&mut physics, &mut world, 1);
        let handle = physics.collider_handle(collider).unwrap();
        assert_eq!(physics.backend().collider_body(handle), None);

        let body = world.add_component(entity, RigidBody::fixed()).unwrap();
        tick(&mut physics, &mut world, 2);
        let body_handle = physics.body_handle(body).unwrap();
        let handle = physics.collider_handle(collider).unwrap();
        assert_eq!(physics.backend().collider_body(handle), Some(body_handle));

        world.remove_component(body).unwrap();
        tick(&mut physics, &mut world, 3);
        assert_eq!(physics.body_handle(body), None);
        assert_eq!(physics.backend().body_count(), 0);
        let handle = physics.collider_handle(collider).unwrap();
        assert_eq!(physics.backend().collider_body(handle), None);
        assert_eq!(physics.backend().collider_count(), 1);
    }

    /// Fixed circle at `x` whose start and end hooks append to `log`
    fn logged_circle(
        world: &mut World,
        x: f32,
        name: &'static str,
        log: &Rc<RefCell<Vec<String>>>,
    ) -> (EntityId, ComponentId) {
        let entity = world.spawn();
        world.add_component(entity, Transform::from_position(x, 0.0)).unwrap();
        let body = world.add_component(entity, RigidBody::fixed()).unwrap();
        world.add_component(entity, Collider::circle(1.0)).unwrap();
        let started = Rc::clone(log);
        let ended = Rc::clone(log);
        world
            .add_component(
                entity,
                FnComponent::new(name)
                    .on_collision_start(move |name, _, _| {
                        started.borrow_mut().push(format!("{name} start"));
                        Ok(())
                    })
                    .on_collision_end(move |name, _, _| {
                        ended.borrow_mut().push(format!("{name} end"));
                        Ok(())
                    }),
            )
            .unwrap();
        world.add_root(entity).unwrap();
        (entity, body)
    }

    #[test]
    fn test_destroyed_partner_ends_contact() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let (_, a_body) = logged_circle(&mut world, 0.0, "a", &log);
        let (b, _) = logged_circle(&mut world, 0.5, "b", &log);

        tick(&mut physics, &mut world, 1);
        assert_eq!(*log.borrow(), vec!["a start", "b start"]);
        assert_eq!(world.component::<RigidBody>(a_body).unwrap().colliding_with().len(), 1);

        world.destroy(b).unwrap();
        for n in 2..=4 {
            tick(&mut physics, &mut world, n);
        }
        assert_eq!(*log.borrow(), vec!["a start", "b start", "a end"]);
        assert!(world.component::<RigidBody>(a_body).unwrap().colliding_with().is_empty());
    }

    #[test]
    fn test_removed_partner_collider_ends_contact() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let (_, a_body) = logged_circle(&mut world, 0.0, "a", &log);
        let (b, _) = logged_circle(&mut world, 0.5, "b", &log);

        tick(&mut physics, &mut world, 1);
        let collider = world.find_component::<Collider>(b).unwrap();
        world.remove_component(collider).unwrap();
        tick(&mut physics, &mut world, 2);

        assert_eq!(*log.borrow(), vec!["a start", "b start", "a end", "b end"]);
        assert!(world.component::<RigidBody>(a_body).unwrap().colliding_with().is_empty());
    }

    #[test]
    fn test_rehomed_collider_ends_before_starting_again() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let (_, a_body) = logged_circle(&mut world, 0.0, "a", &log);
        let (b, b_body) = logged_circle(&mut world, 0.5, "b", &log);

        tick(&mut physics, &mut world, 1);
        world.remove_component(b_body).unwrap();
        tick(&mut physics, &mut world, 2);
        tick(&mut physics, &mut world, 3);

        assert_eq!(
            *log.borrow(),
            vec!["a start", "b start", "a end", "b end", "a start", "b start"]
        );
        // b has no body left, so a tracks no body contact
        assert!(world.component::<RigidBody>(a_body).unwrap().colliding_with().is_empty());
        assert!(world.contains(b));
    }

    #[test]
    fn test_destroyed_entity_leaves_backend() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::new(ArcadePhysics::new());
        let (entity, _) = moving_ball(&mut world, 0.0, Vec2::zeros());
        tick(&mut physics, &mut world, 1);
        assert_eq!(physics.backend().body_count(), 1);

        world.destroy(entity).unwrap();
        tick(&mut physics, &mut world, 2);
        assert_eq!(physics.backend().body_count(), 0);
        assert_eq!(physics.backend().collider_count(), 0);
    }
}
