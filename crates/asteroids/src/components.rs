//! Game-specific components

use wolf_engine::ecs::{
    Collider, Component, ComponentId, EcsError, EntityId, HookContext, Hooks, LifetimeLimiter,
    RigidBody, Sprite, Transform, World,
};
use wolf_engine::foundation::math::{normalize_or_zero, rotate, Vec2};
use wolf_engine::input::KeyCode;
use wolf_engine::physics::CollisionLayers;

/// Tag carried by bullets
pub const BULLET_TAG: &str = "bullet";
/// Tag carried by asteroids
pub const ASTEROID_TAG: &str = "asteroid";
/// Tag of the entity holding the [`Score`]
pub const SCORE_TAG: &str = "score";

/// Player ship component
#[derive(Debug, Clone)]
pub struct Ship {
    /// Thrust force
    pub acceleration: f32,

    /// Turn speed in radians per second
    pub turn_speed: f32,

    /// Seconds between shots
    pub fire_interval: f32,

    /// Bullet speed
    pub bullet_speed: f32,

    /// Bullet lifetime in seconds
    pub bullet_lifetime: f32,

    /// Lives left
    pub lives: u32,

    cooldown: f32,
}

impl Ship {
    /// Ship with three lives
    pub fn new(acceleration: f32, turn_speed: f32) -> Self {
        Self {
            acceleration,
            turn_speed,
            fire_interval: 0.25,
            bullet_speed: 12.0,
            bullet_lifetime: 1.5,
            lives: 3,
            cooldown: 0.0,
        }
    }

    fn fire(&self, world: &mut World, ship: EntityId) -> Result<(), EcsError> {
        let forward = world.forward(ship)?;
        let position = world.global_position(ship)? + forward * 0.3;
        let rotation = world.global_rotation(ship)?;
        spawn_bullet(world, position, rotation, forward * self.bullet_speed, self.bullet_lifetime)?;
        Ok(())
    }
}

impl Component for Ship {
    fn hooks(&self) -> Hooks {
        Hooks::UPDATE | Hooks::COLLISION_START | Hooks::DEBUG
    }

    fn on_update(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        let input = ctx.input;
        let held = |key: KeyCode| input.is_key_down(key.into());
        let turn = f32::from(u8::from(held(KeyCode::Left))) - f32::from(u8::from(held(KeyCode::Right)));
        if turn != 0.0 {
            ctx.world.rotate(ctx.entity, turn * self.turn_speed * ctx.delta_time)?;
        }

        if held(KeyCode::Up) {
            let force = ctx.world.forward(ctx.entity)? * self.acceleration;
            if let Some(body) = ctx.world.get_component_mut::<RigidBody>(ctx.entity) {
                body.apply_force(force);
            }
        }

        self.cooldown = (self.cooldown - ctx.delta_time).max(0.0);
        if held(KeyCode::Space) && self.cooldown <= 0.0 {
            self.fire(ctx.world, ctx.entity)?;
            self.cooldown = self.fire_interval;
        }
        Ok(())
    }

    fn on_collision_start(
        &mut self,
        ctx: &mut HookContext<'_>,
        other: ComponentId,
    ) -> Result<(), EcsError> {
        let other = ctx.world.component_owner(other)?;
        if !ctx.world.has_tag(other, ASTEROID_TAG) || self.lives == 0 {
            return Ok(());
        }
        self.lives -= 1;
        log::info!("Ship hit, {} lives left", self.lives);
        ctx.world.set_global_position(ctx.entity, Vec2::zeros())?;
        if self.lives == 0 {
            ctx.world.destroy(ctx.entity)?;
        }
        Ok(())
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!("Ship lives={}", self.lives))
    }
}

/// Asteroid size categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsteroidSize {
    /// Large asteroid (splits into medium)
    Large,

    /// Medium asteroid (splits into small)
    Medium,

    /// Small asteroid (destroyed completely)
    Small,
}

impl AsteroidSize {
    /// Collision radius in world units
    pub fn radius(self) -> f32 {
        match self {
            Self::Large => 0.6,
            Self::Medium => 0.4,
            Self::Small => 0.2,
        }
    }

    /// Get the points awarded for destroying this size
    pub fn points(self) -> u32 {
        match self {
            Self::Large => 20,
            Self::Medium => 50,
            Self::Small => 100,
        }
    }

    /// Get the next smaller size when split
    pub fn split_into(self) -> Option<Self> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => None,
        }
    }
}

/// Asteroid component
#[derive(Debug, Clone)]
pub struct Asteroid {
    /// Asteroid size category
    pub size: AsteroidSize,

    /// Set by the first bullet; later hits in the same tick are ignored
    hit: bool,
}

impl Asteroid {
    /// Unhit asteroid
    pub fn new(size: AsteroidSize) -> Self {
        Self { size, hit: false }
    }
}

impl Component for Asteroid {
    fn hooks(&self) -> Hooks {
        Hooks::COLLISION_START | Hooks::DEBUG
    }

    fn on_collision_start(
        &mut self,
        ctx: &mut HookContext<'_>,
        other: ComponentId,
    ) -> Result<(), EcsError> {
        let bullet = ctx.world.component_owner(other)?;
        if self.hit || !ctx.world.has_tag(bullet, BULLET_TAG) {
            return Ok(());
        }
        self.hit = true;

        let position = ctx.world.global_position(ctx.entity)?;
        let velocity = ctx
            .world
            .get_component::<RigidBody>(ctx.entity)
            .map_or_else(Vec2::zeros, RigidBody::linear_velocity);
        ctx.world.destroy(bullet)?;
        ctx.world.destroy(ctx.entity)?;

        if let Some(score) = ctx
            .world
            .find_by_tag(SCORE_TAG)
            .first()
            .copied()
            .and_then(|holder| ctx.world.get_component_mut::<Score>(holder))
        {
            score.add_points(self.size.points());
        }

        if let Some(smaller) = self.size.split_into() {
            let speed = velocity.norm().max(0.5) * 1.5;
            let mut heading = normalize_or_zero(velocity);
            if heading == Vec2::zeros() {
                heading = Vec2::x();
            }
            for angle in [0.6_f32, -0.6] {
                spawn_asteroid(ctx.world, smaller, position, rotate(heading, angle) * speed)?;
            }
        }
        Ok(())
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!("Asteroid {:?}", self.size))
    }
}

/// Score component for tracking points
#[derive(Debug, Clone, Default)]
pub struct Score {
    /// Current score
    pub value: u32,
}

impl Score {
    /// Add points to the score
    pub fn add_points(&mut self, points: u32) {
        self.value += points;
    }
}

impl Component for Score {
    fn hooks(&self) -> Hooks {
        Hooks::DEBUG
    }

    fn render_debug(&self) -> Option<String> {
        Some(format!("Score {}", self.value))
    }
}

/// Wraps its entity around the edges of the play field
#[derive(Debug, Clone, Copy)]
pub struct WrapAround {
    /// Half extents of the field
    pub half_extent: Vec2,
}

impl WrapAround {
    /// Field spanning `-half_width..half_width` by `-half_height..half_height`
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_extent: Vec2::new(half_width, half_height),
        }
    }

    /// Position moved back inside the field, if it left
    pub fn wrap(&self, position: Vec2) -> Option<Vec2> {
        let wrap_axis = |value: f32, half: f32| {
            if value > half {
                value - 2.0 * half
            } else if value < -half {
                value + 2.0 * half
            } else {
                value
            }
        };
        let wrapped = Vec2::new(
            wrap_axis(position.x, self.half_extent.x),
            wrap_axis(position.y, self.half_extent.y),
        );
        (wrapped != position).then_some(wrapped)
    }
}

impl Component for WrapAround {
    fn hooks(&self) -> Hooks {
        Hooks::UPDATE
    }

    fn on_update(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EcsError> {
        let position = ctx.world.global_position(ctx.entity)?;
        if let Some(wrapped) = self.wrap(position) {
            ctx.world.set_global_position(ctx.entity, wrapped)?;
        }
        Ok(())
    }
}

/// Fill `entity` with the components of an asteroid
pub fn build_asteroid(
    world: &mut World,
    entity: EntityId,
    size: AsteroidSize,
    position: Vec2,
    velocity: Vec2,
    field: Vec2,
) -> Result<(), EcsError> {
    let radius = size.radius();
    world.add_component(entity, Transform::new(position, 0.0))?;
    world.add_component(entity, RigidBody::kinematic().with_velocity(velocity))?;
    world.add_component(
        entity,
        Collider::circle(radius).with_layers(
            CollisionLayers::ENEMY,
            CollisionLayers::PLAYER | CollisionLayers::PROJECTILE,
        ),
    )?;
    world.add_component(entity, Sprite::new("asteroid").with_size(radius * 2.0, radius * 2.0))?;
    world.add_component(entity, Asteroid::new(size))?;
    world.add_component(entity, WrapAround::new(field.x, field.y))?;
    world.add_tag(entity, ASTEROID_TAG)?;
    Ok(())
}

/// Spawn a split asteroid at the root of the scene
fn spawn_asteroid(
    world: &mut World,
    size: AsteroidSize,
    position: Vec2,
    velocity: Vec2,
) -> Result<EntityId, EcsError> {
    let field = world
        .find_by_tag(ASTEROID_TAG)
        .iter()
        .find_map(|&e| world.get_component::<WrapAround>(e).map(|w| w.half_extent))
        .unwrap_or_else(|| Vec2::new(4.0, 3.0));
    let entity = world.spawn();
    build_asteroid(world, entity, size, position, velocity, field)?;
    world.add_root(entity)?;
    Ok(entity)
}

/// Spawn a bullet that destroys itself after `lifetime` seconds
pub fn spawn_bullet(
    world: &mut World,
    position: Vec2,
    rotation: f32,
    velocity: Vec2,
    lifetime: f32,
) -> Result<EntityId, EcsError> {
    let bullet = world.spawn();
    world.add_component(bullet, Transform::new(position, rotation))?;
    world.add_component(bullet, RigidBody::kinematic().with_velocity(velocity))?;
    world.add_component(
        bullet,
        Collider::circle(0.05).with_layers(CollisionLayers::PROJECTILE, CollisionLayers::ENEMY),
    )?;
    world.add_component(bullet, Sprite::new("bullet").with_size(0.1, 0.1))?;
    world.add_component(bullet, LifetimeLimiter::new(lifetime))?;
    world.add_tag(bullet, BULLET_TAG)?;
    world.add_root(bullet)?;
    Ok(bullet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_around_edges() {
        let wrap = WrapAround::new(4.0, 3.0);
        assert_eq!(wrap.wrap(Vec2::new(1.0, 1.0)), None);
        assert_eq!(wrap.wrap(Vec2::new(4.5, 0.0)), Some(Vec2::new(-3.5, 0.0)));
        assert_eq!(wrap.wrap(Vec2::new(0.0, -3.5)), Some(Vec2::new(0.0, 2.5)));
    }

    #[test]
    fn test_split_sizes() {
        assert_eq!(AsteroidSize::Large.split_into(), Some(AsteroidSize::Medium));
        assert_eq!(AsteroidSize::Small.split_into(), None);
        assert!(AsteroidSize::Small.points() > AsteroidSize::Large.points());
    }
}
