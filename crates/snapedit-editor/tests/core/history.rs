use proptest::prelude::*;
use snapedit_core::{Color, EventBus, EventBusConfig, EventCategory};
use snapedit_editor::{CanvasFacade, ObjectKind, Scene, SceneObject, Snapshot, UndoRedoManager};
use std::sync::Arc;

/// Scene whose content encodes `n`, so every state has a distinct snapshot.
fn scene_state(scene: &mut Scene, n: usize) {
    scene.set_dimensions(100.0 + n as f64, 100.0);
    scene.add(SceneObject::new(ObjectKind::Rect {
        width: n as f64,
        height: 1.0,
        fill: Color::BLACK,
        stroke: None,
    }));
}

fn dimension_of(snapshot: &Snapshot) -> usize {
    (snapshot.decode().unwrap().width - 100.0) as usize
}

proptest! {
    #[test]
    fn prop_undo_all_then_redo_all_restores_final_state(n in 0usize..=20) {
        let mut scene = Scene::with_dimensions(100.0, 100.0);
        let mut history = UndoRedoManager::new(20);
        history.push(&scene).unwrap();

        for i in 1..=n {
            scene_state(&mut scene, i);
            history.push(&scene).unwrap();
        }
        let final_state = scene.snapshot().unwrap();
        prop_assert_eq!(history.can_undo(), n > 0);

        for _ in 0..n {
            history.undo(&mut scene).unwrap();
        }
        for _ in 0..n {
            history.redo(&mut scene).unwrap();
        }
        prop_assert_eq!(scene.snapshot().unwrap(), final_state);
        prop_assert!(!history.can_redo());
    }

    #[test]
    fn prop_length_never_exceeds_limit(limit in 1usize..30, pushes in 0usize..60) {
        let mut history = UndoRedoManager::new(limit);
        let scene = Scene::new();
        for _ in 0..pushes {
            history.push(&scene).unwrap();
        }
        prop_assert_eq!(history.len(), pushes.min(limit));
        if pushes > 0 {
            prop_assert_eq!(history.index(), Some(pushes.min(limit) - 1));
        } else {
            prop_assert_eq!(history.index(), None);
        }
    }
}

#[test]
fn test_new_manager_is_empty() {
    let history = UndoRedoManager::new(20);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 0);
    assert_eq!(history.index(), None);
}

#[test]
fn test_push_after_undo_truncates_redo() {
    let mut scene = Scene::new();
    let mut history = UndoRedoManager::new(20);
    for n in 0..5 {
        scene_state(&mut scene, n);
        history.push(&scene).unwrap();
    }

    history.undo(&mut scene).unwrap();
    history.undo(&mut scene).unwrap();
    assert_eq!(history.redo_depth(), 2);

    scene_state(&mut scene, 99);
    history.push(&scene).unwrap();
    assert!(!history.can_redo());
    assert_eq!(history.len(), 4);
    assert_eq!(dimension_of(history.current().unwrap()), 99);
}

#[test]
fn test_oldest_states_are_evicted() {
    let mut scene = Scene::new();
    let mut history = UndoRedoManager::new(20);
    for n in 0..25 {
        scene.set_dimensions(100.0 + n as f64, 100.0);
        history.push(&scene).unwrap();
    }
    assert_eq!(history.len(), 20);

    let mut undone = 0;
    for _ in 0..20 {
        if history.undo(&mut scene).unwrap() {
            undone += 1;
        }
    }
    assert_eq!(undone, 19);
    assert_eq!(scene.dimensions().0, 105.0);
    assert!(!history.can_undo());
}

#[test]
fn test_push_during_restore_is_ignored() {
    let mut scene = Scene::new();
    let mut history = UndoRedoManager::new(20);
    for n in 0..3 {
        scene.set_dimensions(n as f64, 1.0);
        history.push(&scene).unwrap();
    }

    let snapshot = history.begin_undo().unwrap();
    scene.restore(&snapshot).unwrap();
    // A canvas re-adding objects during restore reports changes.
    assert!(!history.push(&scene).unwrap());
    assert_eq!(history.len(), 3);
    history.finish_restore();

    assert!(history.push(&scene).unwrap());
    assert_eq!(history.len(), 3);
    assert!(!history.can_redo());
}

#[test]
fn test_boundaries_are_noops() {
    let mut scene = Scene::new();
    let mut history = UndoRedoManager::new(20);
    assert!(!history.undo(&mut scene).unwrap());
    history.push(&scene).unwrap();
    assert!(!history.undo(&mut scene).unwrap());
    assert!(!history.redo(&mut scene).unwrap());
}

#[test]
fn test_failed_restore_rolls_back_cursor() {
    let mut scene = Scene::new();
    let mut history = UndoRedoManager::new(20);
    history.push_snapshot(Snapshot::from_json("not json"));
    history.push(&scene).unwrap();

    assert!(history.undo(&mut scene).is_err());
    assert_eq!(history.index(), Some(1));
    assert!(!history.is_restoring());
}

#[test]
fn test_availability_is_published() {
    let bus = Arc::new(EventBus::with_config(EventBusConfig::recording()));
    let mut history = UndoRedoManager::new(20).with_events(bus.clone());
    let mut scene = Scene::new();
    history.push(&scene).unwrap();
    history.push(&scene).unwrap();
    history.undo(&mut scene).unwrap();
    history.clear();

    let events = bus.history_of(EventCategory::History);
    // push, push, restore started, restore finished, changed, cleared, changed
    assert_eq!(events.len(), 7);
}
