//! Named entity prefabs
//!
//! A prefab is a function that fills a freshly created entity with
//! components and children. Each prefab declares the type of props it takes;
//! instantiating with props of another type is an error rather than a panic.

use std::any::{type_name, Any};
use std::collections::HashMap;

use thiserror::Error;

use crate::ecs::{EcsError, EntityId, Parent, World};

/// Prefab errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefabError {
    /// A prefab with this name already exists
    #[error("Prefab with name {0} already exists")]
    Duplicate(String),

    /// No prefab registered under this name
    #[error("Prefab with name {0} not found")]
    NotFound(String),

    /// Props of the wrong type were passed
    #[error("Prefab {name} expects props of type {expected}")]
    WrongProps {
        /// Prefab name
        name: String,
        /// Props type the prefab was registered with
        expected: &'static str,
    },

    /// Building the entity failed
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

type BuildFn = Box<dyn Fn(&mut World, EntityId, &dyn Any) -> Option<Result<(), EcsError>>>;

struct Prefab {
    props_type: &'static str,
    build: BuildFn,
}

/// Prefabs by name
#[derive(Default)]
pub struct PrefabRegistry {
    prefabs: HashMap<String, Prefab>,
}

impl PrefabRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefab taking props of type `P`
    pub fn register<P, F>(&mut self, name: impl Into<String>, build: F) -> Result<(), PrefabError>
    where
        P: 'static,
        F: Fn(&mut World, EntityId, &P) -> Result<(), EcsError> + 'static,
    {
        let name = name.into();
        if self.prefabs.contains_key(&name) {
            return Err(PrefabError::Duplicate(name));
        }
        log::debug!("Registered prefab '{}'", name);
        self.prefabs.insert(
            name,
            Prefab {
                props_type: type_name::<P>(),
                build: Box::new(move |world, entity, props| {
                    props
                        .downcast_ref::<P>()
                        .map(|props| build(world, entity, props))
                }),
            },
        );
        Ok(())
    }

    /// Whether a prefab is registered
    pub fn contains(&self, name: &str) -> bool {
        self.prefabs.contains_key(name)
    }

    /// Create an entity under `parent` and build it from the named prefab.
    ///
    /// The entity is attached before the prefab runs, so components it adds
    /// attach immediately when `parent` is attached.
    pub fn instantiate<P: 'static>(
        &self,
        name: &str,
        world: &mut World,
        parent: Parent,
        props: &P,
    ) -> Result<EntityId, PrefabError> {
        let prefab = self
            .prefabs
            .get(name)
            .ok_or_else(|| PrefabError::NotFound(name.to_string()))?;
        if type_name::<P>() != prefab.props_type {
            return Err(PrefabError::WrongProps {
                name: name.to_string(),
                expected: prefab.props_type,
            });
        }

        let entity = match parent {
            Parent::Scene => {
                let entity = world.spawn();
                world.add_root(entity)?;
                entity
            }
            Parent::Entity(parent) => world.create_child(parent)?,
        };
        match (prefab.build)(world, entity, props) {
            Some(result) => result?,
            None => {
                return Err(PrefabError::WrongProps {
                    name: name.to_string(),
                    expected: prefab.props_type,
                })
            }
        }
        Ok(entity)
    }
}

impl std::fmt::Debug for PrefabRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefabRegistry")
            .field("prefabs", &self.prefabs.keys().collect::<Vec<_>>())
            .finish()
    }
}
