//! Native host loop
//!
//! Drives a scene from the current thread: sleep for the scene's poll
//! interval, wake the simulation, wake the renderer, repeat.

use std::time::Duration;

use super::{Scene, SceneError};

/// Run `scene` on the current thread until `keep_running` returns false or
/// the scene is stopped. Starts the scene if needed.
pub fn run_scene(
    scene: &mut Scene,
    keep_running: impl FnMut(&mut Scene) -> bool,
) -> Result<(), SceneError> {
    run_scene_with(scene, std::thread::sleep, keep_running)
}

/// [`run_scene`] with a custom sleep, for hosts that drive their own clock
pub fn run_scene_with(
    scene: &mut Scene,
    mut sleep: impl FnMut(Duration),
    mut keep_running: impl FnMut(&mut Scene) -> bool,
) -> Result<(), SceneError> {
    if !scene.is_running() {
        scene.start();
    }
    while scene.is_running() && keep_running(scene) {
        scene.wake_simulation()?;
        scene.wake_render()?;
        sleep(scene.poll_interval());
    }
    Ok(())
}
