//! Component trait and hook dispatch
//!
//! A component is a unit of behaviour owned by exactly one entity. Every hook
//! is optional; [`Component::hooks`] declares which ones a type implements so
//! the world can skip the rest without a virtual call.

use std::any::Any;

use bitflags::bitflags;

use super::entity::{ComponentId, EntityId};
use super::error::EcsError;
use super::world::World;
use crate::input::InputSource;

bitflags! {
    /// Lifecycle hooks a component responds to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Hooks: u8 {
        /// [`Component::on_attach`]
        const ATTACH = 1 << 0;
        /// [`Component::on_update`]
        const UPDATE = 1 << 1;
        /// [`Component::on_collision_start`]
        const COLLISION_START = 1 << 2;
        /// [`Component::on_collision_end`]
        const COLLISION_END = 1 << 3;
        /// [`Component::on_destroy`]
        const DESTROY = 1 << 4;
        /// [`Component::render_debug`]
        const DEBUG = 1 << 5;
    }
}

/// Upcast to [`Any`] for downcasting trait objects
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Everything a hook may touch.
///
/// While the hook runs its own component is checked out of `world`, so
/// queries on the owning entity do not see it.
pub struct HookContext<'a> {
    /// The world the component lives in
    pub world: &'a mut World,
    /// Input state of the running scene
    pub input: &'a dyn InputSource,
    /// Entity owning the component
    pub entity: EntityId,
    /// The component whose hook is running
    pub component: ComponentId,
    /// Seconds since the previous tick; zero outside the simulation loop
    pub delta_time: f32,
}

/// Contact phase reported by the physics system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    /// Two colliders started touching
    Started,
    /// Two colliders stopped touching
    Ended,
}

impl CollisionPhase {
    /// Hook flag dispatched for this phase
    pub fn hook(self) -> Hooks {
        match self {
            Self::Started => Hooks::COLLISION_START,
            Self::Ended => Hooks::COLLISION_END,
        }
    }
}

/// Component trait
pub trait Component: AsAny {
    /// Type name used in errors and debug output
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Hooks this component implements
    fn hooks(&self) -> Hooks {
        Hooks::all()
    }

    /// Fired once, when the owning entity becomes attached
    fn on_attach(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// Fired once per simulation tick
    fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// Fired when a collider on this entity starts touching `other`
    fn on_collision_start(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _other: ComponentId,
    ) -> Result<(), EcsError> {
        Ok(())
    }

    /// Fired when a collider on this entity stops touching `other`
    fn on_collision_end(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _other: ComponentId,
    ) -> Result<(), EcsError> {
        Ok(())
    }

    /// Fired once, when the component or its entity is destroyed
    fn on_destroy(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// One line of text for the debug overlay
    fn render_debug(&self) -> Option<String> {
        None
    }
}

impl dyn Component {
    /// Downcast to a concrete component type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete component type
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether this is a `T`
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

type HookFn<S> = Box<dyn FnMut(&mut S, &mut HookContext<'_>) -> Result<(), EcsError>>;
type CollisionFn<S> =
    Box<dyn FnMut(&mut S, &mut HookContext<'_>, ComponentId) -> Result<(), EcsError>>;
type DebugFn<S> = Box<dyn Fn(&S) -> Option<String>>;

/// Component assembled from closures around a state value.
///
/// ```
/// use wolf_engine::ecs::{FnComponent, World};
///
/// let mut world = World::new();
/// let entity = world.spawn();
/// let counter = FnComponent::new(0_u32).on_update(|ticks, _ctx| {
///     *ticks += 1;
///     Ok(())
/// });
/// world.add_component(entity, counter).unwrap();
/// ```
pub struct FnComponent<S: 'static> {
    state: S,
    attach: Option<HookFn<S>>,
    update: Option<HookFn<S>>,
    destroy: Option<HookFn<S>>,
    collision_start: Option<CollisionFn<S>>,
    collision_end: Option<CollisionFn<S>>,
    debug: Option<DebugFn<S>>,
}

impl<S: 'static> FnComponent<S> {
    /// Component with no hooks yet
    pub fn new(state: S) -> Self {
        Self {
            state,
            attach: None,
            update: None,
            destroy: None,
            collision_start: None,
            collision_end: None,
            debug: None,
        }
    }

    /// Set the attach hook
    #[must_use]
    pub fn on_attach(
        mut self,
        f: impl FnMut(&mut S, &mut HookContext<'_>) -> Result<(), EcsError> + 'static,
    ) -> Self {
        self.attach = Some(Box::new(f));
        self
    }

    /// Set the update hook
    #[must_use]
    pub fn on_update(
        mut self,
        f: impl FnMut(&mut S, &mut HookContext<'_>) -> Result<(), EcsError> + 'static,
    ) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Set the destroy hook
    #[must_use]
    pub fn on_destroy(
        mut self,
        f: impl FnMut(&mut S, &mut HookContext<'_>) -> Result<(), EcsError> + 'static,
    ) -> Self {
        self.destroy = Some(Box::new(f));
        self
    }

    /// Set the collision start hook
    #[must_use]
    pub fn on_collision_start(
        mut self,
        f: impl FnMut(&mut S, &mut HookContext<'_>, ComponentId) -> Result<(), EcsError> + 'static,
    ) -> Self {
        self.collision_start = Some(Box::new(f));
        self
    }

    /// Set the collision end hook
    #[must_use]
    pub fn on_collision_end(
        mut self,
        f: impl FnMut(&mut S, &mut HookContext<'_>, ComponentId) -> Result<(), EcsError> + 'static,
    ) -> Self {
        self.collision_end = Some(Box::new(f));
        self
    }

    /// Set the debug text
    #[must_use]
    pub fn render_debug(mut self, f: impl Fn(&S) -> Option<String> + 'static) -> Self {
        self.debug = Some(Box::new(f));
        self
    }

    /// Shared state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Shared state
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl<S: 'static> Component for FnComponent<S> {
    fn hooks(&self) -> Hooks {
        let mut hooks = Hooks::empty();
        hooks.set(Hooks::ATTACH, self.attach.is_some());
        hooks.set(Hooks::UPDATE, self.update.is_some());
        hooks.set(Hooks::DESTROY, self.destroy.is_some());
        hooks.set(Hooks::COLLISION_START, self.collision_start.is_some());
        hooks.set(Hooks::COLLISION_END, self.collision_end.is_some());
        hooks.set(Hooks::DEBUG, self.debug.is_some());
        hooks
    }

    fn on_attach(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        match &mut self.attach {
            Some(f) => f(&mut self.state, ctx),
            None => Ok(()),
        }
    }

    fn on_update(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        match &mut self.update {
            Some(f) => f(&mut self.state, ctx),
            None => Ok(()),
        }
    }

    fn on_collision_start(
        &mut self,
        ctx: &mut HookContext<'_>,
        other: ComponentId,
    ) -> Result<(), EcsError> {
        match &mut self.collision_start {
            Some(f) => f(&mut self.state, ctx, other),
            None => Ok(()),
        }
    }

    fn on_collision_end(
        &mut self,
        ctx: &mut HookContext<'_>,
        other: ComponentId,
    ) -> Result<(), EcsError> {
        match &mut self.collision_end {
            Some(f) => f(&mut self.state, ctx, other),
            None => Ok(()),
        }
    }

    fn on_destroy(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        match &mut self.destroy {
            Some(f) => f(&mut self.state, ctx),
            None => Ok(()),
        }
    }

    fn render_debug(&self) -> Option<String> {
        self.debug.as_ref().and_then(|f| f(&self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Component for Marker {}

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn Component> = Box::new(Marker);
        let component = &*boxed;
        assert!(component.is::<Marker>());
        assert!(component.downcast_ref::<FnComponent<()>>().is_none());
        assert!(component.type_name().ends_with("Marker"));
    }

    #[test]
    fn test_fn_component_declares_only_set_hooks() {
        let component = FnComponent::new(())
            .on_update(|_, _| Ok(()))
            .render_debug(|_| Some("hi".to_string()));
        assert_eq!(component.hooks(), Hooks::UPDATE | Hooks::DEBUG);
        assert_eq!(Component::render_debug(&component).as_deref(), Some("hi"));
        assert_eq!(Marker.hooks(), Hooks::all());
    }
}
