//! Text debug overlay
//!
//! Produces a status line with the clock rates and entity count, followed by
//! an indented dump of the entity tree with each component's debug text.
//! The output depends only on the world and the stats it is given, so two
//! draws of the same state produce the same text.

use std::fmt::Write as _;

use crate::ecs::{EcsError, EntityId, RenderContext, Renderer, World};

/// Renderer producing a text overlay
#[derive(Debug, Default)]
pub struct DebugRenderer {
    output: String,
    log_output: bool,
}

impl DebugRenderer {
    /// Overlay kept in memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write every overlay to the log at debug level
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.log_output = true;
        self
    }

    /// Text of the last frame
    pub fn output(&self) -> &str {
        &self.output
    }

    fn write_entity(out: &mut String, world: &World, entity: EntityId, depth: usize) {
        let indent = "  ".repeat(depth);
        let tags = world.tags(entity);
        if tags.is_empty() {
            let _ = writeln!(out, "{indent}Entity {entity}");
        } else {
            let _ = writeln!(out, "{indent}Entity {entity} [{}]", tags.join(", "));
        }
        for &component in world.components(entity) {
            let text = world
                .component_by_id(component)
                .and_then(|c| c.render_debug())
                .or_else(|| world.component_type_name(component).map(short_type_name));
            if let Some(text) = text {
                let _ = writeln!(out, "{indent}  - {text}");
            }
        }
        for &child in world.children(entity) {
            Self::write_entity(out, world, child, depth + 1);
        }
    }
}

/// `my_game::Player` becomes `Player`; generic arguments are kept
fn short_type_name(name: &'static str) -> String {
    let base = name.split('<').next().unwrap_or(name);
    let short = base.rsplit("::").next().unwrap_or(base);
    format!("{short}{}", &name[base.len()..])
}

impl Renderer for DebugRenderer {
    fn name(&self) -> &'static str {
        "DebugRenderer"
    }

    fn draw(&mut self, ctx: &RenderContext<'_>) -> Result<(), EcsError> {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "FPS: {} TPS: {} Entities: {}",
            ctx.stats.fps,
            ctx.stats.tps,
            ctx.entities.len()
        );
        let _ = writeln!(out, "Roots: {}", ctx.world.roots().len());
        for &root in ctx.world.roots() {
            Self::write_entity(&mut out, ctx.world, root, 0);
        }

        if self.log_output {
            log::debug!("{}", out);
        }
        self.output = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{FnComponent, FrameStats, Transform};

    fn draw(renderer: &mut DebugRenderer, world: &World, stats: FrameStats) -> String {
        let entities = world.all_entities();
        let ctx = RenderContext {
            world,
            entities: &entities,
            delta_time: 0.0,
            stats,
        };
        renderer.draw(&ctx).unwrap();
        renderer.output().to_string()
    }

    #[test]
    fn test_dump_lists_tree_and_components() {
        let mut world = World::new();
        let root = world.spawn();
        world.add_component(root, Transform::from_position(1.0, 2.0)).unwrap();
        world.add_tag(root, "player").unwrap();
        world.add_root(root).unwrap();
        let child = world.create_child(root).unwrap();
        world.add_component(child, FnComponent::new(())).unwrap();

        let stats = FrameStats {
            fps: 60,
            tps: 50,
            ticks: 10,
            frames: 12,
        };
        let text = draw(&mut DebugRenderer::new(), &world, stats);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "FPS: 60 TPS: 50 Entities: 2");
        assert_eq!(lines[1], "Roots: 1");
        assert_eq!(lines[2], format!("Entity {root} [player]"));
        assert_eq!(lines[3], "  - Transform (1.00, 2.00) 0.00rad");
        assert_eq!(lines[4], format!("  Entity {child}"));
        assert_eq!(lines[5], "    - FnComponent<()>");
    }

    #[test]
    fn test_same_state_same_output() {
        let mut world = World::new();
        let root = world.spawn();
        world.add_component(root, Transform::default()).unwrap();
        world.add_root(root).unwrap();

        let mut renderer = DebugRenderer::new();
        let first = draw(&mut renderer, &world, FrameStats::default());
        let second = draw(&mut renderer, &world, FrameStats::default());
        assert_eq!(first, second);
    }
}
