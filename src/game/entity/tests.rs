use super::*;

fn record_at(x: f32, y: f32) -> EntityRecord {
    EntityRecord::new(FixedVec2::from_f32(x, y), PlayerId(1))
}

#[test]
fn test_spawn_and_get() {
    let mut arena = EntityArena::new();
    let a = arena.spawn(record_at(1.0, 2.0));
    let b = arena.spawn(record_at(3.0, 4.0));

    assert_ne!(a, b);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.get(a).unwrap().position, FixedVec2::from_f32(1.0, 2.0));
    assert_eq!(arena.get(b).unwrap().position, FixedVec2::from_f32(3.0, 4.0));
}

#[test]
fn test_stale_id_is_rejected_after_slot_reuse() {
    let mut arena = EntityArena::new();
    let a = arena.spawn(record_at(1.0, 1.0));
    arena.despawn(a).expect("live entity");

    let b = arena.spawn(record_at(2.0, 2.0));
    assert_eq!(a.index, b.index, "Slot should be reused");
    assert_ne!(a.generation, b.generation, "Generation should advance");

    assert!(arena.get(a).is_none(), "Stale id must not resolve to the new entity");
    assert!(matches!(arena.despawn(a), Err(NavError::UnknownEntity(_))));
    assert!(arena.contains(b));
}

#[test]
fn test_iteration_is_in_slot_order() {
    let mut arena = EntityArena::new();
    let ids: Vec<_> = (0..5).map(|i| arena.spawn(record_at(i as f32, 0.0))).collect();
    arena.despawn(ids[1]).unwrap();
    arena.despawn(ids[3]).unwrap();

    let seen: Vec<_> = arena.iter().map(|(id, _)| id).collect();
    assert_eq!(seen, vec![ids[0], ids[2], ids[4]]);
    assert_eq!(arena.len(), 3);
}

#[test]
fn test_arena_has_no_fixed_cap() {
    let mut arena = EntityArena::new();
    for i in 0..10_000 {
        arena.spawn(record_at(i as f32, 0.0));
    }
    assert_eq!(arena.len(), 10_000);
}

#[test]
fn test_mover_ref_reports_record() {
    let mut arena = EntityArena::new();
    let id = arena.spawn(record_at(5.0, 6.0).with_movement_class(MovementClass::Naval));
    let mover = MoverRef::from_arena(&arena, id).unwrap();

    assert_eq!(mover.entity(), Some(id));
    assert_eq!(mover.player(), PlayerId(1));
    assert_eq!(mover.movement_class(), MovementClass::Naval);
}
