//! Headless Asteroids
//!
//! Runs the game for a fixed number of simulated seconds with a scripted
//! pilot, drawing into a recording backend, and keeps the high score in a
//! preferences file.

mod components;
mod config;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wolf_engine::audio::{SilentBackend, VolumeGroup};
use wolf_engine::ecs::{
    Anchor, Camera2D, Collider, EcsError, Parent, RigidBody, Sprite, Transform, UiElement,
};
use wolf_engine::foundation::logging;
use wolf_engine::foundation::math::constants::TAU;
use wolf_engine::foundation::math::Vec2;
use wolf_engine::input::KeyCode;
use wolf_engine::physics::{ArcadePhysics, CollisionLayers, PhysicsSystem};
use wolf_engine::prefab::PrefabRegistry;
use wolf_engine::render::{DebugRenderer, RecordingBackend, SpriteRenderer, UiRenderer};
use wolf_engine::scene::{run_scene, Scene, SceneError};
use wolf_engine::settings::{FileStore, PlayerPrefs};
use wolf_engine::Engine;

use components::{build_asteroid, AsteroidSize, Score, Ship, WrapAround, SCORE_TAG};
use config::{GameConfig, GameplayConfig};

const HIGH_SCORE_KEY: &str = "high_score";

/// Props of the `asteroid` prefab
struct AsteroidProps {
    size: AsteroidSize,
    position: Vec2,
    velocity: Vec2,
    field: Vec2,
}

fn register_prefabs(prefabs: &mut PrefabRegistry) -> Result<(), Box<dyn std::error::Error>> {
    prefabs.register("ship", |world, ship, gameplay: &GameplayConfig| {
        let mut pilot = Ship::new(gameplay.ship_acceleration, gameplay.ship_rotation_speed);
        pilot.fire_interval = gameplay.fire_interval;
        pilot.bullet_speed = gameplay.bullet_speed;
        pilot.bullet_lifetime = gameplay.bullet_lifetime;

        world.add_component(ship, Transform::default())?;
        world.add_component(ship, RigidBody::dynamic().with_damping(0.5))?;
        world.add_component(
            ship,
            Collider::circle(0.25).with_layers(CollisionLayers::PLAYER, CollisionLayers::ENEMY),
        )?;
        world.add_component(ship, Sprite::new("ship").with_size(0.5, 0.5).with_z_index(1))?;
        world.add_component(ship, pilot)?;
        world.add_component(
            ship,
            UiElement::new(|world, ship| {
                let lives = world.get_component::<Ship>(ship)?.lives;
                Some(format!("x{lives}"))
            })
            .following(0.0, -30.0),
        )?;
        world.add_component(
            ship,
            WrapAround::new(gameplay.field_half_width, gameplay.field_half_height),
        )?;
        world.add_tag(ship, "player")
    })?;

    prefabs.register("asteroid", |world, entity, props: &AsteroidProps| {
        build_asteroid(world, entity, props.size, props.position, props.velocity, props.field)
    })?;
    Ok(())
}

fn build_game(
    scene: &mut Scene,
    prefabs: &PrefabRegistry,
    config: &GameConfig,
) -> Result<(), SceneError> {
    let gameplay = &config.gameplay;
    let field = Vec2::new(gameplay.field_half_width, gameplay.field_half_height);

    scene.add_system(PhysicsSystem::new(ArcadePhysics::new()));
    scene.add_renderer(SpriteRenderer::new(
        RecordingBackend::with_capacity(4),
        &config.engine.render,
    ));
    scene.add_renderer(UiRenderer::new(&config.engine.render));
    if config.engine.debug_mode {
        scene.add_renderer(DebugRenderer::new());
    }

    let camera = scene.create_entity()?;
    scene.world_mut().add_component(camera, Transform::default())?;
    scene.world_mut().add_component(camera, Camera2D::new(1.0))?;

    let score = scene.create_entity()?;
    scene.world_mut().add_component(score, Score::default())?;
    scene.world_mut().add_tag(score, SCORE_TAG)?;
    scene.world_mut().add_component(
        score,
        UiElement::new(|world, holder| {
            let score = world.get_component::<Score>(holder)?;
            Some(format!("SCORE {:06}", score.value))
        })
        .anchored(Anchor::TOP_RIGHT, -16.0, 16.0),
    )?;

    prefabs.instantiate("ship", scene.world_mut(), Parent::Scene, gameplay)?;

    let mut rng = StdRng::seed_from_u64(gameplay.seed);
    for _ in 0..gameplay.asteroid_count {
        // Keep the centre clear for the ship
        let position = loop {
            let candidate = Vec2::new(
                rng.gen_range(-field.x..field.x),
                rng.gen_range(-field.y..field.y),
            );
            if candidate.norm() > 1.5 {
                break candidate;
            }
        };
        let heading = rng.gen_range(0.0..TAU);
        let props = AsteroidProps {
            size: AsteroidSize::Large,
            position,
            velocity: Vec2::new(heading.cos(), heading.sin()) * rng.gen_range(0.3_f32..1.0),
            field,
        };
        prefabs.instantiate("asteroid", scene.world_mut(), Parent::Scene, &props)?;
    }
    Ok(())
}

/// Scripted input: circle left, thrust in bursts, fire in volleys
fn autopilot(scene: &mut Scene) {
    let tick = scene.stats().ticks;
    let input = scene.input_mut();
    input.handle_key_input(KeyCode::Left, (tick / 90) % 2 == 0);
    input.handle_key_input(KeyCode::Up, tick % 120 < 15);
    input.handle_key_input(KeyCode::Space, tick % 20 < 10);
}

fn current_score(scene: &Scene) -> Result<u32, EcsError> {
    let world = scene.world();
    let holder = world
        .find_by_tag(SCORE_TAG)
        .first()
        .copied()
        .ok_or_else(|| EcsError::Behaviour("score entity missing".to_string()))?;
    Ok(world.require_component::<Score>(holder)?.value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GameConfig::load_or_default("asteroids.toml")?;
    logging::init(&config.engine.log_level);
    log::info!("Starting {}", config.engine.game_name);

    let mut prefs = PlayerPrefs::new(FileStore::open("asteroids_prefs.toml")?);
    let high_score = prefs.get_int(HIGH_SCORE_KEY, Some(0))?;

    let mut engine = Engine::new(config.engine.clone())?;
    register_prefabs(engine.prefabs_mut())?;

    let sounds = engine.sounds_mut();
    sounds.register("start", ["sounds/start.ogg"], 1.0, false);
    sounds.mixer_mut().set_volume(VolumeGroup::Master, config.audio.master_volume);
    sounds.mixer_mut().set_volume(VolumeGroup::Sfx, config.audio.sfx_volume);
    let mut audio = SilentBackend::new();

    let scene_config = config.clone();
    engine.register_scene("game", move |scene, prefabs| {
        build_game(scene, prefabs, &scene_config)
    });

    engine.sounds().play(&mut audio, "start", 1.0, None)?;
    let ticks = (config.gameplay.run_seconds * config.engine.simulation.tick_rate_hz as f32) as u64;
    let scene = engine.start_scene("game")?;
    run_scene(scene, |scene| {
        autopilot(scene);
        scene.stats().ticks < ticks
    })?;

    let score = current_score(scene)?;
    if let Some(ui) = scene.renderer::<UiRenderer>() {
        for item in ui.items() {
            log::debug!("HUD '{}' at ({:.0}, {:.0})", item.text, item.position.x, item.position.y);
        }
    }
    scene.log_performance();
    log::info!(
        "Finished after {} ticks with score {} ({} entities alive)",
        scene.stats().ticks,
        score,
        scene.world().entity_count()
    );
    engine.stop_scene()?;

    if i64::from(score) > high_score {
        log::info!("New high score: {}", score);
        prefs.set_int(HIGH_SCORE_KEY, i64::from(score))?;
    }
    Ok(())
}
