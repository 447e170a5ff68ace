//! Attach, update and destroy ordering across entity trees

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::{EcsError, EntityId, FnComponent, World};
use crate::input::NullInput;

#[cfg(test)]
mod tests {
    use super::*;

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Component that writes its lifecycle events to a shared journal
    fn recorder(label: &str, journal: &Journal) -> FnComponent<(String, Journal)> {
        FnComponent::new((label.to_string(), journal.clone()))
            .on_attach(|(label, journal), _| {
                journal.borrow_mut().push(format!("attach {label}"));
                Ok(())
            })
            .on_update(|(label, journal), _| {
                journal.borrow_mut().push(format!("update {label}"));
                Ok(())
            })
            .on_destroy(|(label, journal), _| {
                journal.borrow_mut().push(format!("destroy {label}"));
                Ok(())
            })
    }

    fn entries(journal: &Journal, prefix: &str) -> Vec<String> {
        journal
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// a(a1, a2) -> [b(b1), c(c1)]
    fn build_tree(world: &mut World, journal: &Journal) -> (EntityId, EntityId, EntityId, EntityId) {
        let a = world.spawn();
        world.add_component(a, recorder("a1", journal)).unwrap();
        world.add_component(a, recorder("a2", journal)).unwrap();
        let b = world.create_child(a).unwrap();
        world.add_component(b, recorder("b1", journal)).unwrap();
        let c = world.create_child(a).unwrap();
        world.add_component(c, recorder("c1", journal)).unwrap();
        let grandchild = world.create_child(b).unwrap();
        world.add_component(grandchild, recorder("g1", journal)).unwrap();
        (a, b, c, grandchild)
    }

    #[test]
    fn test_attach_fires_once_in_pre_order() {
        let journal = Journal::default();
        let mut world = World::new();
        let parent = world.spawn();
        world.add_root(parent).unwrap();

        let (a, _, _, _) = build_tree(&mut world, &journal);
        assert!(journal.borrow().is_empty(), "detached subtree must not attach");

        world.add_child(parent, a).unwrap();
        assert_eq!(
            entries(&journal, "attach"),
            vec!["attach a1", "attach a2", "attach b1", "attach g1", "attach c1"]
        );

        // The lazy attach in the update pass must not fire again
        let entities = world.all_entities();
        world.update_entities(&entities, &NullInput, 0.016).unwrap();
        assert_eq!(entries(&journal, "attach").len(), 5);
        assert_eq!(
            entries(&journal, "update"),
            vec!["update a1", "update a2", "update b1", "update g1", "update c1"]
        );
    }

    #[test]
    fn test_component_added_to_attached_entity_attaches_immediately() {
        let journal = Journal::default();
        let mut world = World::new();
        let entity = world.spawn();
        world.add_root(entity).unwrap();

        let id = world.add_component(entity, recorder("late", &journal)).unwrap();
        assert_eq!(entries(&journal, "attach"), vec!["attach late"]);
        assert!(world.is_component_attached(id));
    }

    #[test]
    fn test_destroy_runs_children_first_then_own_components() {
        let journal = Journal::default();
        let mut world = World::new();
        let (a, b, c, grandchild) = build_tree(&mut world, &journal);
        world.add_root(a).unwrap();
        let sibling = world.spawn();
        world.add_root(sibling).unwrap();

        world.destroy(b).unwrap();
        assert_eq!(entries(&journal, "destroy"), vec!["destroy g1", "destroy b1"]);
        assert_eq!(world.children(a), &[c]);
        assert!(!world.contains(grandchild));

        journal.borrow_mut().clear();
        world.destroy(a).unwrap();
        assert_eq!(
            entries(&journal, "destroy"),
            vec!["destroy c1", "destroy a1", "destroy a2"]
        );
        assert_eq!(world.roots(), &[sibling]);
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.component_count(), 0);
    }

    #[test]
    fn test_destroying_never_attached_entity_skips_destroy_hooks() {
        let journal = Journal::default();
        let mut world = World::new();
        let (a, _, _, _) = build_tree(&mut world, &journal);

        world.destroy(a).unwrap();
        assert!(journal.borrow().is_empty());
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_parent_and_owner_fail_before_attachment() {
        let mut world = World::new();
        let entity = world.spawn();
        let component = world.insert_component(FnComponent::new(()));

        assert_eq!(world.parent(entity), Err(EcsError::NotAttached(entity)));
        assert_eq!(
            world.component_owner(component),
            Err(EcsError::ComponentNotAttached(component))
        );
    }

    #[test]
    fn test_destroy_requested_during_destroy_runs_after() {
        let journal = Journal::default();
        let mut world = World::new();
        let first = world.spawn();
        let second = world.spawn();
        world.add_component(second, recorder("second", &journal)).unwrap();
        world.add_root(first).unwrap();
        world.add_root(second).unwrap();

        let log = journal.clone();
        world
            .add_component(
                first,
                FnComponent::new(second).on_destroy(move |second, ctx| {
                    ctx.world.destroy(*second)?;
                    log.borrow_mut().push("destroy first".to_string());
                    Ok(())
                }),
            )
            .unwrap();

        world.destroy(first).unwrap();
        assert_eq!(
            entries(&journal, "destroy"),
            vec!["destroy first", "destroy second"]
        );
        assert!(world.roots().is_empty());
    }

    #[test]
    fn test_entity_spawned_during_update_attaches_but_waits_for_next_tick() {
        let journal = Journal::default();
        let mut world = World::new();
        let spawner = world.spawn();
        world.add_root(spawner).unwrap();

        let log = journal.clone();
        world
            .add_component(
                spawner,
                FnComponent::new(false).on_update(move |spawned, ctx| {
                    if !*spawned {
                        *spawned = true;
                        let child = ctx.world.create_child(ctx.entity)?;
                        ctx.world.add_component(child, recorder("spawned", &log))?;
                    }
                    Ok(())
                }),
            )
            .unwrap();

        let entities = world.all_entities();
        world.update_entities(&entities, &NullInput, 0.016).unwrap();
        assert_eq!(journal.borrow().as_slice(), ["attach spawned"]);

        let entities = world.all_entities();
        world.update_entities(&entities, &NullInput, 0.016).unwrap();
        assert_eq!(
            journal.borrow().as_slice(),
            ["attach spawned", "update spawned"]
        );
    }
}
