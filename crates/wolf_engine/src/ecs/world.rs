//! ECS World implementation
//!
//! The world owns every entity and component in two slotmap arenas and keeps
//! the entity tree as id lists. It implements the lifecycle protocol:
//!
//! - Adding a component to an attached entity fires its attach hook
//!   immediately; otherwise the hook fires when the entity attaches.
//! - Attaching an entity walks its subtree in pre-order, firing a node's
//!   component hooks before descending into its children.
//! - Destroying an entity destroys its children first, then fires its own
//!   components' destroy hooks, then unlinks it from its parent.
//!
//! Hooks run with their component checked out of the arena. Destruction and
//! component removal requested while any hook is running are queued and run,
//! in request order, once the outermost hook has returned.

use std::collections::VecDeque;

use slotmap::SlotMap;

use super::component::{CollisionPhase, Component, HookContext, Hooks};
use super::entity::{ComponentId, ComponentSlot, EntityId, EntityNode, Parent};
use super::error::EcsError;
use crate::input::{InputSource, NullInput};

/// Input seen by hooks fired outside the simulation loop
static NO_INPUT: NullInput = NullInput;

/// Work postponed until no hook is running
#[derive(Debug, Clone, Copy)]
enum Deferred {
    Destroy(EntityId),
    RemoveComponent(ComponentId),
}

/// ECS World containing all entities and components
#[derive(Default)]
pub struct World {
    entities: SlotMap<EntityId, EntityNode>,
    components: SlotMap<ComponentId, ComponentSlot>,
    roots: Vec<EntityId>,
    /// Hooks and protocol operations currently on the stack
    depth: usize,
    deferred: VecDeque<Deferred>,
    flushing: bool,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Creation and tree building
    // ------------------------------------------------------------------

    /// Create a detached entity
    pub fn spawn(&mut self) -> EntityId {
        let entity = self.entities.insert(EntityNode::default());
        log::trace!("Spawned {}", entity);
        entity
    }

    /// Store a component that does not belong to any entity yet
    pub fn insert_component<C: Component>(&mut self, component: C) -> ComponentId {
        self.insert_boxed(Box::new(component))
    }

    /// Store a boxed component that does not belong to any entity yet
    pub fn insert_boxed(&mut self, component: Box<dyn Component>) -> ComponentId {
        self.components.insert(ComponentSlot::new(component))
    }

    /// Append a component to an entity.
    ///
    /// Fires the attach hook right away when the entity is attached.
    pub fn add_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<ComponentId, EcsError> {
        self.add_boxed(entity, Box::new(component))
    }

    /// Append a boxed component to an entity
    pub fn add_boxed(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
    ) -> Result<ComponentId, EcsError> {
        if !self.entities.contains_key(entity) {
            return Err(EcsError::NoSuchEntity(entity));
        }
        let id = self.insert_boxed(component);
        self.attach_component(entity, id)?;
        Ok(id)
    }

    /// Append several components in order
    pub fn add_components(
        &mut self,
        entity: EntityId,
        components: impl IntoIterator<Item = Box<dyn Component>>,
    ) -> Result<Vec<ComponentId>, EcsError> {
        components
            .into_iter()
            .map(|component| self.add_boxed(entity, component))
            .collect()
    }

    /// Give a stored component to an entity
    pub fn attach_component(
        &mut self,
        entity: EntityId,
        component: ComponentId,
    ) -> Result<(), EcsError> {
        let node = self
            .entities
            .get_mut(entity)
            .ok_or(EcsError::NoSuchEntity(entity))?;
        let slot = self
            .components
            .get_mut(component)
            .ok_or(EcsError::NoSuchComponent(component))?;
        if slot.owner.is_some() {
            return Err(EcsError::ComponentAlreadyOwned(component));
        }

        slot.owner = Some(entity);
        node.components.push(component);
        let entity_attached = node.attached;

        if entity_attached {
            self.enter();
            let result = self.fire_attach(component);
            self.leave(result)
        } else {
            Ok(())
        }
    }

    /// Spawn an entity as a child of `parent`
    pub fn create_child(&mut self, parent: EntityId) -> Result<EntityId, EcsError> {
        if !self.entities.contains_key(parent) {
            return Err(EcsError::NoSuchEntity(parent));
        }
        let child = self.spawn();
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Make `child` a child of `parent`.
    ///
    /// When `parent` is attached, the whole subtree of `child` attaches before
    /// this returns. An entity that already has a parent cannot be moved.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), EcsError> {
        if !self.entities.contains_key(parent) {
            return Err(EcsError::NoSuchEntity(parent));
        }
        let child_node = self
            .entities
            .get(child)
            .ok_or(EcsError::NoSuchEntity(child))?;
        if child_node.parent.is_some() {
            return Err(EcsError::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(EcsError::CyclicHierarchy { parent, child });
        }

        if let Some(node) = self.entities.get_mut(child) {
            node.parent = Some(Parent::Entity(parent));
        }
        let parent_attached = match self.entities.get_mut(parent) {
            Some(node) => {
                node.children.push(child);
                node.attached
            }
            None => false,
        };

        if parent_attached {
            self.enter();
            let result = self.attach_subtree(child);
            self.leave(result)
        } else {
            Ok(())
        }
    }

    /// Add a root-level entity, attaching its whole subtree
    pub fn add_root(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let node = self
            .entities
            .get_mut(entity)
            .ok_or(EcsError::NoSuchEntity(entity))?;
        if node.parent.is_some() {
            return Err(EcsError::AlreadyAttached(entity));
        }
        node.parent = Some(Parent::Scene);
        self.roots.push(entity);
        log::debug!("Added root {}", entity);

        self.enter();
        let result = self.attach_subtree(entity);
        self.leave(result)
    }

    /// Take an entity out of the root list.
    ///
    /// Nothing else happens: the subtree stays alive and keeps its scene
    /// parent, so it can neither be updated nor added again. Call
    /// [`World::destroy`] to release it.
    pub fn remove_root(&mut self, entity: EntityId) -> Result<(), EcsError> {
        if !self.entities.contains_key(entity) {
            return Err(EcsError::NoSuchEntity(entity));
        }
        self.roots.retain(|&root| root != entity);
        Ok(())
    }

    fn is_ancestor(&self, ancestor: EntityId, mut entity: EntityId) -> bool {
        while let Some(Parent::Entity(parent)) = self.entities.get(entity).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            entity = parent;
        }
        false
    }

    fn attach_subtree(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let Some(node) = self.entities.get_mut(entity) else {
            return Ok(());
        };
        node.attached = true;
        let components = node.components.clone();

        for component in components {
            self.fire_attach(component)?;
        }

        let children = self.children(entity).to_vec();
        for child in children {
            if !self.is_attached(child) {
                self.attach_subtree(child)?;
            }
        }
        Ok(())
    }

    fn fire_attach(&mut self, component: ComponentId) -> Result<(), EcsError> {
        match self.components.get_mut(component) {
            Some(slot) if !slot.attached => slot.attached = true,
            _ => return Ok(()),
        }
        self.run_hook(component, &NO_INPUT, 0.0, Hooks::ATTACH, |c, ctx| {
            c.on_attach(ctx)
        })
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Destroy an entity with its children and components.
    ///
    /// Inside a hook the destruction is queued until the outermost hook
    /// returns.
    pub fn destroy(&mut self, entity: EntityId) -> Result<(), EcsError> {
        if !self.entities.contains_key(entity) {
            return Err(EcsError::NoSuchEntity(entity));
        }
        if self.depth > 0 {
            self.deferred.push_back(Deferred::Destroy(entity));
            return Ok(());
        }

        self.enter();
        let result = self.destroy_now(entity);
        self.leave(result)
    }

    /// Destroy one component, firing its destroy hook if it had attached
    pub fn remove_component(&mut self, component: ComponentId) -> Result<(), EcsError> {
        if !self.components.contains_key(component) {
            return Err(EcsError::NoSuchComponent(component));
        }
        if self.depth > 0 {
            self.deferred.push_back(Deferred::RemoveComponent(component));
            return Ok(());
        }

        self.enter();
        let result = self.remove_component_now(component);
        self.leave(result)
    }

    /// Destroy every root entity
    pub fn clear(&mut self) -> Result<(), EcsError> {
        let mut first_error = None;
        for root in self.roots.clone() {
            if let Err(e) = self.destroy(root) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn destroy_now(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let Some(node) = self.entities.get(entity) else {
            // Queued twice, or destroyed together with an ancestor
            return Ok(());
        };
        let children = node.children.clone();
        let components = node.components.clone();
        let mut first_error = None;

        for child in children {
            if let Err(e) = self.destroy_now(child) {
                first_error.get_or_insert(e);
            }
        }

        for &component in &components {
            if let Err(e) = self.fire_destroy(component) {
                first_error.get_or_insert(e);
            }
        }
        for component in components {
            self.components.remove(component);
        }

        if let Some(node) = self.entities.remove(entity) {
            match node.parent {
                Some(Parent::Entity(parent)) => {
                    if let Some(parent) = self.entities.get_mut(parent) {
                        parent.children.retain(|&c| c != entity);
                    }
                }
                Some(Parent::Scene) => self.roots.retain(|&r| r != entity),
                None => {}
            }
            log::trace!("Destroyed {}", entity);
        }

        first_error.map_or(Ok(()), Err)
    }

    fn remove_component_now(&mut self, component: ComponentId) -> Result<(), EcsError> {
        let result = self.fire_destroy(component);
        if let Some(slot) = self.components.remove(component) {
            if let Some(node) = slot.owner.and_then(|owner| self.entities.get_mut(owner)) {
                node.components.retain(|&c| c != component);
            }
        }
        result
    }

    fn fire_destroy(&mut self, component: ComponentId) -> Result<(), EcsError> {
        match self.components.get(component) {
            Some(slot) if slot.attached => {}
            _ => return Ok(()),
        }
        self.run_hook(component, &NO_INPUT, 0.0, Hooks::DESTROY, |c, ctx| {
            c.on_destroy(ctx)
        })
    }

    // ------------------------------------------------------------------
    // Hook dispatch
    // ------------------------------------------------------------------

    fn enter(&mut self) {
        self.depth += 1;
    }

    fn leave(&mut self, result: Result<(), EcsError>) -> Result<(), EcsError> {
        self.depth -= 1;
        if self.depth == 0 {
            let flushed = self.flush_deferred();
            result.and(flushed)
        } else {
            result
        }
    }

    fn flush_deferred(&mut self) -> Result<(), EcsError> {
        if self.flushing {
            return Ok(());
        }
        self.flushing = true;
        let mut first_error = None;

        while let Some(work) = self.deferred.pop_front() {
            self.depth += 1;
            let result = match work {
                Deferred::Destroy(entity) => self.destroy_now(entity),
                Deferred::RemoveComponent(component) => self.remove_component_now(component),
            };
            self.depth -= 1;
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        self.flushing = false;
        first_error.map_or(Ok(()), Err)
    }

    /// Check a component out, run one of its hooks and put it back.
    ///
    /// Does nothing when the component does not declare `hook` or is already
    /// checked out.
    fn run_hook<F>(
        &mut self,
        component: ComponentId,
        input: &dyn InputSource,
        delta_time: f32,
        hook: Hooks,
        f: F,
    ) -> Result<(), EcsError>
    where
        F: FnOnce(&mut dyn Component, &mut HookContext<'_>) -> Result<(), EcsError>,
    {
        let slot = self
            .components
            .get_mut(component)
            .ok_or(EcsError::NoSuchComponent(component))?;
        let entity = slot.owner.ok_or(EcsError::ComponentNotAttached(component))?;
        let Some(mut behaviour) = slot.behaviour.take() else {
            return Ok(());
        };
        if !behaviour.hooks().contains(hook) {
            slot.behaviour = Some(behaviour);
            return Ok(());
        }

        self.enter();
        let result = {
            let mut ctx = HookContext {
                world: self,
                input,
                entity,
                component,
                delta_time,
            };
            f(behaviour.as_mut(), &mut ctx)
        };
        if let Some(slot) = self.components.get_mut(component) {
            slot.behaviour = Some(behaviour);
        }
        self.leave(result)
    }

    /// Run one simulation pass over `entities`, in order.
    ///
    /// Entities destroyed earlier in the pass are skipped. A component whose
    /// attach hook has not fired yet gets it right before its first update.
    pub fn update_entities(
        &mut self,
        entities: &[EntityId],
        input: &dyn InputSource,
        delta_time: f32,
    ) -> Result<(), EcsError> {
        for &entity in entities {
            let Some(node) = self.entities.get(entity) else {
                continue;
            };
            if !node.attached {
                continue;
            }
            let components = node.components.clone();

            for component in components {
                let Some(slot) = self.components.get(component) else {
                    continue;
                };
                if !slot.attached {
                    self.enter();
                    let result = self.fire_attach(component);
                    self.leave(result)?;
                }
                self.run_hook(component, input, delta_time, Hooks::UPDATE, |c, ctx| {
                    c.on_update(ctx)
                })?;
            }
        }
        Ok(())
    }

    /// Deliver a contact event to one component
    pub fn notify_collision(
        &mut self,
        component: ComponentId,
        other: ComponentId,
        phase: CollisionPhase,
        input: &dyn InputSource,
        delta_time: f32,
    ) -> Result<(), EcsError> {
        match self.components.get(component) {
            Some(slot) if slot.attached => {}
            _ => return Ok(()),
        }
        self.run_hook(component, input, delta_time, phase.hook(), |c, ctx| match phase {
            CollisionPhase::Started => c.on_collision_start(ctx, other),
            CollisionPhase::Ended => c.on_collision_end(ctx, other),
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether the entity exists
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Whether the component exists
    pub fn contains_component(&self, component: ComponentId) -> bool {
        self.components.contains_key(component)
    }

    /// Whether the entity is reachable from the scene
    pub fn is_attached(&self, entity: EntityId) -> bool {
        self.entities.get(entity).is_some_and(|n| n.attached)
    }

    /// Whether the component's attach hook has fired
    pub fn is_component_attached(&self, component: ComponentId) -> bool {
        self.components.get(component).is_some_and(|s| s.attached)
    }

    /// Parent of an attached entity
    pub fn parent(&self, entity: EntityId) -> Result<Parent, EcsError> {
        self.entities
            .get(entity)
            .ok_or(EcsError::NoSuchEntity(entity))?
            .parent
            .ok_or(EcsError::NotAttached(entity))
    }

    /// Children in insertion order
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.entities
            .get(entity)
            .map_or(&[], |n| n.children.as_slice())
    }

    /// Component ids in insertion order
    pub fn components(&self, entity: EntityId) -> &[ComponentId] {
        self.entities
            .get(entity)
            .map_or(&[], |n| n.components.as_slice())
    }

    /// Entity owning a component
    pub fn component_owner(&self, component: ComponentId) -> Result<EntityId, EcsError> {
        self.components
            .get(component)
            .ok_or(EcsError::NoSuchComponent(component))?
            .owner
            .ok_or(EcsError::ComponentNotAttached(component))
    }

    /// Root entities in insertion order
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Every entity reachable from the roots, depth-first pre-order
    pub fn all_entities(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(self.entities.len());
        let mut stack: Vec<EntityId> = self.roots.iter().rev().copied().collect();
        while let Some(entity) = stack.pop() {
            out.push(entity);
            stack.extend(self.children(entity).iter().rev());
        }
        out
    }

    /// Number of live entities, attached or not
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of live components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component as a trait object; `None` while it is checked out
    pub fn component_by_id(&self, component: ComponentId) -> Option<&(dyn Component + 'static)> {
        self.components.get(component)?.behaviour.as_deref()
    }

    /// Type name of a component, available even while it is checked out
    pub fn component_type_name(&self, component: ComponentId) -> Option<&'static str> {
        self.components.get(component).map(|s| s.type_name)
    }

    /// Typed access by id
    pub fn component<T: Component>(&self, component: ComponentId) -> Option<&T> {
        self.component_by_id(component)?.downcast_ref::<T>()
    }

    /// Typed mutable access by id
    pub fn component_mut<T: Component>(&mut self, component: ComponentId) -> Option<&mut T> {
        self.components
            .get_mut(component)?
            .behaviour
            .as_deref_mut()?
            .downcast_mut::<T>()
    }

    /// Id of the first `T` on the entity, in insertion order
    pub fn find_component<T: Component>(&self, entity: EntityId) -> Option<ComponentId> {
        self.components(entity)
            .iter()
            .copied()
            .find(|&id| self.component::<T>(id).is_some())
    }

    /// First `T` on the entity, in insertion order
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.component(self.find_component::<T>(entity)?)
    }

    /// First `T` on the entity, in insertion order
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let id = self.find_component::<T>(entity)?;
        self.component_mut(id)
    }

    /// Every `T` on the entity, in insertion order
    pub fn get_components<T: Component>(&self, entity: EntityId) -> Vec<&T> {
        self.components(entity)
            .iter()
            .filter_map(|&id| self.component::<T>(id))
            .collect()
    }

    /// Whether the entity has a `T`
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.find_component::<T>(entity).is_some()
    }

    /// First `T` on the entity, failing when there is none
    pub fn require_component<T: Component>(&self, entity: EntityId) -> Result<&T, EcsError> {
        if !self.entities.contains_key(entity) {
            return Err(EcsError::NoSuchEntity(entity));
        }
        self.get_component::<T>(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: std::any::type_name::<T>(),
            })
    }

    /// First `T` on the entity, failing when there is none
    pub fn require_component_mut<T: Component>(
        &mut self,
        entity: EntityId,
    ) -> Result<&mut T, EcsError> {
        if !self.entities.contains_key(entity) {
            return Err(EcsError::NoSuchEntity(entity));
        }
        self.get_component_mut::<T>(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: std::any::type_name::<T>(),
            })
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Tag an entity
    pub fn add_tag(&mut self, entity: EntityId, tag: impl Into<String>) -> Result<(), EcsError> {
        self.entities
            .get_mut(entity)
            .ok_or(EcsError::NoSuchEntity(entity))?
            .tags
            .insert(tag.into());
        Ok(())
    }

    /// Remove a tag, returning whether it was present
    pub fn remove_tag(&mut self, entity: EntityId, tag: &str) -> bool {
        self.entities
            .get_mut(entity)
            .is_some_and(|n| n.tags.remove(tag))
    }

    /// Whether the entity carries the tag
    pub fn has_tag(&self, entity: EntityId, tag: &str) -> bool {
        self.entities.get(entity).is_some_and(|n| n.tags.contains(tag))
    }

    /// Tags of an entity, sorted
    pub fn tags(&self, entity: EntityId) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .entities
            .get(entity)
            .map(|n| n.tags.iter().map(String::as_str).collect())
            .unwrap_or_default();
        tags.sort_unstable();
        tags
    }

    /// Attached entities carrying the tag, in pre-order
    pub fn find_by_tag(&self, tag: &str) -> Vec<EntityId> {
        self.all_entities()
            .into_iter()
            .filter(|&e| self.has_tag(e, tag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::FnComponent;

    struct Health(i32);
    impl Component for Health {
        fn hooks(&self) -> Hooks {
            Hooks::empty()
        }
    }

    #[test]
    fn test_spawned_entity_is_detached() {
        let mut world = World::new();
        let entity = world.spawn();
        let component = world.add_component(entity, Health(3)).unwrap();

        assert!(!world.is_attached(entity));
        assert_eq!(world.parent(entity), Err(EcsError::NotAttached(entity)));
        assert_eq!(world.component_owner(component), Ok(entity));
        assert!(!world.is_component_attached(component));
    }

    #[test]
    fn test_standalone_component_has_no_owner() {
        let mut world = World::new();
        let component = world.insert_component(Health(1));
        assert_eq!(
            world.component_owner(component),
            Err(EcsError::ComponentNotAttached(component))
        );

        let entity = world.spawn();
        world.attach_component(entity, component).unwrap();
        assert_eq!(world.component_owner(component), Ok(entity));

        let other = world.spawn();
        assert_eq!(
            world.attach_component(other, component),
            Err(EcsError::ComponentAlreadyOwned(component))
        );
    }

    #[test]
    fn test_get_component_returns_first_in_insertion_order() {
        let mut world = World::new();
        let entity = world.spawn();
        world.add_component(entity, Health(1)).unwrap();
        world.add_component(entity, Health(2)).unwrap();

        assert_eq!(world.get_component::<Health>(entity).map(|h| h.0), Some(1));
        assert_eq!(world.get_components::<Health>(entity).len(), 2);
        assert!(world.require_component::<Health>(entity).is_ok());
        assert!(!world.has_component::<FnComponent<()>>(entity));
        assert!(matches!(
            world.require_component::<FnComponent<()>>(entity),
            Err(EcsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_double_attach_rejected() {
        let mut world = World::new();
        let parent = world.spawn();
        let child = world.spawn();
        world.add_root(parent).unwrap();
        world.add_child(parent, child).unwrap();

        assert_eq!(world.add_root(child), Err(EcsError::AlreadyAttached(child)));
        assert_eq!(world.add_root(parent), Err(EcsError::AlreadyAttached(parent)));
        let other = world.spawn();
        assert_eq!(world.add_child(other, child), Err(EcsError::AlreadyAttached(child)));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.create_child(a).unwrap();
        assert_eq!(
            world.add_child(b, a),
            Err(EcsError::CyclicHierarchy { parent: b, child: a })
        );
        assert_eq!(
            world.add_child(a, a),
            Err(EcsError::CyclicHierarchy { parent: a, child: a })
        );
    }

    #[test]
    fn test_all_entities_is_pre_order() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        world.add_root(a).unwrap();
        world.add_root(b).unwrap();
        let a1 = world.create_child(a).unwrap();
        let a1x = world.create_child(a1).unwrap();
        let a2 = world.create_child(a).unwrap();
        let b1 = world.create_child(b).unwrap();

        assert_eq!(world.all_entities(), vec![a, a1, a1x, a2, b, b1]);
    }

    #[test]
    fn test_remove_root_keeps_entity_alive() {
        let mut world = World::new();
        let root = world.spawn();
        world.add_root(root).unwrap();
        world.remove_root(root).unwrap();

        assert!(world.roots().is_empty());
        assert!(world.contains(root));
        assert_eq!(world.add_root(root), Err(EcsError::AlreadyAttached(root)));

        world.destroy(root).unwrap();
        assert!(!world.contains(root));
    }

    #[test]
    fn test_tags() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        world.add_root(a).unwrap();
        world.add_root(b).unwrap();
        world.add_tag(a, "enemy").unwrap();
        world.add_tag(b, "enemy").unwrap();
        world.add_tag(b, "boss").unwrap();

        assert_eq!(world.find_by_tag("enemy"), vec![a, b]);
        assert_eq!(world.tags(b), vec!["boss", "enemy"]);
        assert!(world.remove_tag(b, "enemy"));
        assert_eq!(world.find_by_tag("enemy"), vec![a]);
    }

    #[test]
    fn test_destroy_inside_hook_is_deferred() {
        let mut world = World::new();
        let root = world.spawn();
        world.add_root(root).unwrap();
        let victim = world.create_child(root).unwrap();

        let seen_during_hook = std::rc::Rc::new(std::cell::Cell::new(false));
        let seen = seen_during_hook.clone();
        world
            .add_component(
                root,
                FnComponent::new(victim).on_update(move |victim, ctx| {
                    ctx.world.destroy(*victim)?;
                    seen.set(ctx.world.contains(*victim));
                    Ok(())
                }),
            )
            .unwrap();

        let entities = world.all_entities();
        world.update_entities(&entities, &NullInput, 0.016).unwrap();

        assert!(seen_during_hook.get());
        assert!(!world.contains(victim));
        assert!(world.children(root).is_empty());
    }

    #[test]
    fn test_component_is_checked_out_during_its_hook() {
        let mut world = World::new();
        let entity = world.spawn();
        let visible = std::rc::Rc::new(std::cell::Cell::new(true));
        let flag = visible.clone();
        world
            .add_component(
                entity,
                FnComponent::new(()).on_attach(move |_, ctx| {
                    flag.set(ctx.world.has_component::<FnComponent<()>>(ctx.entity));
                    Ok(())
                }),
            )
            .unwrap();
        world.add_root(entity).unwrap();

        assert!(!visible.get());
        assert!(world.has_component::<FnComponent<()>>(entity));
    }

    #[test]
    fn test_remove_component_fires_destroy_once() {
        let mut world = World::new();
        let entity = world.spawn();
        world.add_root(entity).unwrap();
        let destroyed = std::rc::Rc::new(std::cell::Cell::new(0));
        let count = destroyed.clone();
        let component = world
            .add_component(
                entity,
                FnComponent::new(()).on_destroy(move |_, _| {
                    count.set(count.get() + 1);
                    Ok(())
                }),
            )
            .unwrap();

        world.remove_component(component).unwrap();
        assert_eq!(destroyed.get(), 1);
        assert!(world.components(entity).is_empty());
        assert_eq!(
            world.remove_component(component),
            Err(EcsError::NoSuchComponent(component))
        );

        world.destroy(entity).unwrap();
        assert_eq!(destroyed.get(), 1);
        assert_eq!(world.component_count(), 0);
    }
}
