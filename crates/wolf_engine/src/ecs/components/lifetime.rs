//! Lifetime Component
//!
//! Destroys its entity once it has been updated for long enough. Useful for
//! bullets, particles and other short-lived spawns.

use crate::ecs::component::{Component, HookContext, Hooks};
use crate::ecs::error::EcsError;

/// Destroys the owning entity after `max_lifetime` seconds of simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifetimeLimiter {
    /// How long the entity should live (in seconds); zero or less is forever
    pub max_lifetime: f32,
    /// Simulated seconds since the entity attached
    pub elapsed: f32,
}

impl LifetimeLimiter {
    /// Create a new lifetime limiter
    pub fn new(max_lifetime: f32) -> Self {
        Self {
            max_lifetime,
            elapsed: 0.0,
        }
    }

    /// Check if this entity's lifetime has expired
    pub fn is_expired(&self) -> bool {
        if self.max_lifetime <= 0.0 {
            false // Infinite lifetime
        } else {
            self.elapsed >= self.max_lifetime
        }
    }

    /// Get remaining lifetime in seconds
    pub fn remaining(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            f32::INFINITY
        } else {
            (self.max_lifetime - self.elapsed).max(0.0)
        }
    }
}

impl Component for LifetimeLimiter {
    fn hooks(&self) -> Hooks {
        Hooks::UPDATE | Hooks::DEBUG
    }

    fn on_update(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        if self.is_expired() {
            return Ok(());
        }
        self.elapsed += ctx.delta_time;
        if self.is_expired() {
            log::trace!("Lifetime of {} expired", ctx.entity);
            ctx.world.destroy(ctx.entity)?;
        }
        Ok(())
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!("Lifetime {:.2}s left", self.remaining()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::input::NullInput;

    #[test]
    fn test_lifetime_not_expired() {
        let lifetime = LifetimeLimiter {
            max_lifetime: 5.0,
            elapsed: 2.0,
        };
        assert!(!lifetime.is_expired());
        assert_eq!(lifetime.remaining(), 3.0);
    }

    #[test]
    fn test_infinite_lifetime() {
        let lifetime = LifetimeLimiter {
            max_lifetime: 0.0,
            elapsed: 1000.0,
        };
        assert!(!lifetime.is_expired());
        assert_eq!(lifetime.remaining(), f32::INFINITY);
    }

    #[test]
    fn test_entity_destroyed_when_expired() {
        let mut world = World::new();
        let bullet = world.spawn();
        world.add_component(bullet, LifetimeLimiter::new(1.0)).unwrap();
        world.add_root(bullet).unwrap();

        let entities = world.all_entities();
        world.update_entities(&entities, &NullInput, 0.5).unwrap();
        assert!(world.contains(bullet));

        world.update_entities(&entities, &NullInput, 0.5).unwrap();
        assert!(!world.contains(bullet));
        assert!(world.roots().is_empty());

        // Stale snapshot entries are skipped
        world.update_entities(&entities, &NullInput, 0.5).unwrap();
    }
}
