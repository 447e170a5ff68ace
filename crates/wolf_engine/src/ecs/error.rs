//! ECS error types

use super::entity::{ComponentId, EntityId};

/// Errors raised by entity and component operations.
///
/// Apart from [`EcsError::Behaviour`], every variant marks a bug in the code
/// calling the engine; none of them is recovered from inside the engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity does not exist (never created or already destroyed)
    #[error("No such entity: {0}")]
    NoSuchEntity(EntityId),

    /// The component does not exist
    #[error("No such component: {0}")]
    NoSuchComponent(ComponentId),

    /// The entity has not been added to a scene or another entity yet
    #[error("{0} is not attached")]
    NotAttached(EntityId),

    /// The component has not been added to an entity yet
    #[error("{0} has no owning entity")]
    ComponentNotAttached(ComponentId),

    /// The entity already has a parent
    #[error("{0} is already attached")]
    AlreadyAttached(EntityId),

    /// The component already belongs to an entity
    #[error("{0} already belongs to an entity")]
    ComponentAlreadyOwned(ComponentId),

    /// A required component is absent
    #[error("{entity} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: EntityId,
        /// Type name of the missing component
        component: &'static str,
    },

    /// Attaching would make an entity its own ancestor
    #[error("Attaching {child} to {parent} would create a cycle")]
    CyclicHierarchy {
        /// Would-be parent
        parent: EntityId,
        /// Would-be child
        child: EntityId,
    },

    /// A physics or render backend rejected a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// Error reported by game code inside a hook
    #[error("{0}")]
    Behaviour(String),
}
