use super::*;

fn id(n: u32) -> EntityId {
    EntityId { index: n, generation: 0 }
}

fn entry(n: u32, x: f32, y: f32, player: u8) -> PatchEntry {
    PatchEntry {
        id: id(n),
        position: FixedVec2::from_f32(x, y),
        footprint: FixedNum::from_num(1.0),
        player: PlayerId(player),
        blocks_movement: true,
    }
}

fn grid() -> SpatialGrid {
    SpatialGrid::new(FixedNum::from_num(100.0), FixedNum::from_num(10.0))
}

#[test]
fn test_get_in_range_filters_by_exact_distance() {
    let mut hash = grid();
    hash.insert(entry(1, 50.0, 50.0, 1));
    hash.insert(entry(2, 54.0, 50.0, 1)); // 4 away
    hash.insert(entry(3, 54.0, 54.0, 1)); // ~5.66 away, same square

    let mut out = Vec::new();
    hash.get_in_range(FixedNum::from_num(50), FixedNum::from_num(50), FixedNum::from_num(5), &mut out);

    assert_eq!(out, vec![id(1), id(2)], "Corner of the query square must be filtered out");
}

#[test]
fn test_get_in_range_spans_patch_boundaries() {
    let mut hash = grid();
    hash.insert(entry(1, 9.5, 9.5, 1));
    hash.insert(entry(2, 10.5, 10.5, 1));
    hash.insert(entry(3, 30.0, 30.0, 1));

    let mut out = Vec::new();
    hash.get_in_range(FixedNum::from_num(10), FixedNum::from_num(10), FixedNum::from_num(2), &mut out);
    assert_eq!(out, vec![id(1), id(2)]);
}

#[test]
fn test_get_in_range_matches_brute_force() {
    let mut hash = grid();
    let mut rng = fastrand::Rng::with_seed(7);
    let mut all = Vec::new();
    for n in 0..200 {
        let e = entry(n, rng.f32() * 99.0, rng.f32() * 99.0, 1);
        all.push(e);
        hash.insert(e);
    }

    let center = FixedVec2::from_f32(40.0, 60.0);
    let radius = FixedNum::from_num(17.5);
    let mut out = Vec::new();
    hash.get_in_range(center.x, center.y, radius, &mut out);

    let mut expected: Vec<_> = all
        .iter()
        .filter(|e| e.position.distance_squared(center) <= radius * radius)
        .map(|e| e.id)
        .collect();
    expected.sort_unstable();

    assert_eq!(out, expected);
}

#[test]
fn test_insert_off_map_is_rejected() {
    let mut hash = grid();
    assert!(hash.insert(entry(1, -1.0, 5.0, 1)).is_none());
    assert!(hash.insert(entry(2, 100.0, 5.0, 1)).is_none());
    assert_eq!(hash.total_entries(), 0);
}

#[test]
fn test_relocate_within_patch_keeps_bucket() {
    let mut hash = grid();
    let patch = hash.insert(entry(1, 11.0, 11.0, 1)).unwrap();

    let after = hash.relocate(id(1), patch, FixedVec2::from_f32(18.0, 12.0)).unwrap();
    assert_eq!(after, Some(patch));
    assert_eq!(hash.patch_entries(patch)[0].position, FixedVec2::from_f32(18.0, 12.0));
    assert_eq!(hash.total_entries(), 1);
}

#[test]
fn test_relocate_across_patches_moves_bucket() {
    let mut hash = grid();
    let patch = hash.insert(entry(1, 11.0, 11.0, 1)).unwrap();

    let after = hash.relocate(id(1), patch, FixedVec2::from_f32(45.0, 72.0)).unwrap().unwrap();
    assert_ne!(after, patch);
    assert!(hash.patch_entries(patch).is_empty());
    assert_eq!(hash.patch_entries(after).len(), 1);
    assert_eq!(hash.total_entries(), 1);
    assert_eq!(hash.non_empty_cells(), 1);
}

#[test]
fn test_relocate_unknown_entity_errors() {
    let mut hash = grid();
    let patch = hash.insert(entry(1, 11.0, 11.0, 1)).unwrap();
    let err = hash.relocate(id(9), patch, FixedVec2::from_f32(12.0, 12.0)).unwrap_err();
    assert!(matches!(err, crate::game::error::NavError::UnknownEntity(_)));
}

#[test]
fn test_remove() {
    let mut hash = grid();
    let patch = hash.insert(entry(1, 11.0, 11.0, 1)).unwrap();
    assert!(hash.remove(id(1), patch));
    assert!(!hash.remove(id(1), patch));
    assert_eq!(hash.total_entries(), 0);
}

#[test]
fn test_collision_object_respects_footprint_and_player() {
    let mut hash = grid();
    hash.insert(entry(4, 20.0, 20.0, 2));

    let tile_box = Aabb::centered(FixedVec2::from_f32(22.5, 20.0), FixedNum::from_num(2));
    assert_eq!(hash.get_collision_object(&tile_box, None), Some(id(4)));
    assert_eq!(hash.get_collision_object(&tile_box, Some(PlayerId(2))), None, "Own player's entities are ignored");

    let far_box = Aabb::centered(FixedVec2::from_f32(26.0, 20.0), FixedNum::from_num(2));
    assert_eq!(hash.get_collision_object(&far_box, None), None);
}

#[test]
fn test_collision_object_finds_large_footprint_in_neighbor_patch() {
    let mut hash = grid();
    let mut big = entry(1, 5.0, 5.0, 1);
    big.footprint = FixedNum::from_num(12);
    hash.insert(big);

    // Box lies entirely in another patch but inside the footprint
    let tile_box = Aabb::centered(FixedVec2::from_f32(14.0, 5.0), FixedNum::from_num(1));
    assert_eq!(hash.get_collision_object(&tile_box, None), Some(id(1)));
}

#[test]
fn test_collision_object_lowest_id_wins() {
    let mut hash = grid();
    hash.insert(entry(7, 20.0, 20.0, 1));
    hash.insert(entry(3, 20.5, 20.0, 1));
    let tile_box = Aabb::centered(FixedVec2::from_f32(20.0, 20.0), FixedNum::from_num(2));
    assert_eq!(hash.get_collision_object(&tile_box, None), Some(id(3)));
}

#[test]
fn test_non_blocking_entities_never_collide() {
    let mut hash = grid();
    let mut ghost = entry(1, 20.0, 20.0, 1);
    ghost.blocks_movement = false;
    hash.insert(ghost);
    let tile_box = Aabb::centered(FixedVec2::from_f32(20.0, 20.0), FixedNum::from_num(2));
    assert_eq!(hash.get_collision_object(&tile_box, None), None);
}
