//! Entity identifiers and tree nodes

use std::collections::HashSet;
use std::fmt;

use slotmap::Key;

use super::component::Component;

slotmap::new_key_type! {
    /// Entity identifier
    pub struct EntityId;

    /// Component identifier
    pub struct ComponentId;
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{:x}", self.data().as_ffi())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{:x}", self.data().as_ffi())
    }
}

/// What an entity hangs from once it has been attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// Root-level entity of the scene
    Scene,
    /// Child of another entity
    Entity(EntityId),
}

/// Tree node stored in the world's entity arena
#[derive(Debug, Default)]
pub(crate) struct EntityNode {
    /// Insertion order is update and query order
    pub components: Vec<ComponentId>,
    pub children: Vec<EntityId>,
    /// Set exactly once
    pub parent: Option<Parent>,
    pub tags: HashSet<String>,
    pub attached: bool,
}

/// Component storage slot.
///
/// `behaviour` is `None` while one of the component's hooks is running.
pub(crate) struct ComponentSlot {
    /// Set exactly once, when the component is added to an entity
    pub owner: Option<EntityId>,
    /// Whether the attach hook has fired
    pub attached: bool,
    pub type_name: &'static str,
    pub behaviour: Option<Box<dyn Component>>,
}

impl ComponentSlot {
    pub fn new(behaviour: Box<dyn Component>) -> Self {
        Self {
            owner: None,
            attached: false,
            type_name: behaviour.type_name(),
            behaviour: Some(behaviour),
        }
    }
}
