//! Collision layers for filtering contact detection
//!
//! A collider sits on one or more layers and carries a mask of the layers it
//! wants to touch. Two colliders interact only when each one's layer is in
//! the other's mask.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes
        const TRIGGER = 1 << 4;
        /// Debris and small physics objects
        const DEBRIS = 1 << 5;
        /// Pickups and collectibles
        const PICKUP = 1 << 6;
        /// Everything else
        const DEFAULT = 1 << 7;

        // Bits 8-31 are left to games
        const _ = !0;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Layer membership plus the layers a collider collides with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionFilter {
    /// Layers this collider is on
    pub layer: CollisionLayers,
    /// Layers this collider collides with
    pub mask: CollisionLayers,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayers::DEFAULT,
            mask: CollisionLayers::all(),
        }
    }
}

impl CollisionFilter {
    /// Create a filter
    pub fn new(layer: CollisionLayers, mask: CollisionLayers) -> Self {
        Self { layer, mask }
    }

    /// Custom layer from a bit index in `8..32`
    pub fn custom_layer(bit: u32) -> CollisionLayers {
        CollisionLayers::from_bits_retain(1 << bit.clamp(8, 31))
    }

    /// A's layer must be in B's mask and B's layer must be in A's mask
    pub fn should_collide(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        let player = CollisionFilter::new(
            CollisionLayers::PLAYER,
            CollisionLayers::ENEMY | CollisionLayers::ENVIRONMENT,
        );
        let enemy = CollisionFilter::new(
            CollisionLayers::ENEMY,
            CollisionLayers::PLAYER | CollisionLayers::PROJECTILE,
        );
        assert!(player.should_collide(&enemy));
        assert!(enemy.should_collide(&player));
    }

    #[test]
    fn test_one_sided_mask_does_not_collide() {
        let bullet = CollisionFilter::new(CollisionLayers::PROJECTILE, CollisionLayers::ENEMY);
        let player = CollisionFilter::new(CollisionLayers::PLAYER, CollisionLayers::all());
        assert!(!bullet.should_collide(&player));
    }

    #[test]
    fn test_custom_layers() {
        let layer = CollisionFilter::custom_layer(12);
        assert_eq!(layer.bits(), 1 << 12);
        let a = CollisionFilter::new(layer, layer);
        assert!(a.should_collide(&a));
        assert!(!a.should_collide(&CollisionFilter::new(CollisionLayers::PLAYER, layer)));
    }
}
