use kestrel::game::config::{NavConfig, NavSettings};
use kestrel::game::entity::EntityRecord;
use kestrel::game::fixed_math::{FixedNum, FixedVec2};
use kestrel::game::logging::init_test_logging;
use kestrel::game::pathfinding::{AStarEngine, SearchState};
use kestrel::game::terrain::{Terrain, TileMap};
use kestrel::game::types::{MovementClass, PlayerId, TileCoord};
use kestrel::game::NavWorld;

/// 32x32 tiles of 4 world units, defaults otherwise.
fn world() -> NavWorld {
    NavWorld::from_config(&NavConfig::default(), 32)
}

/// World-space centre of a tile on a 4-unit grid.
fn at(i: i32, j: i32) -> FixedVec2 {
    FixedVec2::from_f32(i as f32 * 4.0 + 2.0, j as f32 * 4.0 + 2.0)
}

fn unit(world: &mut NavWorld, i: i32, j: i32, player: u8) -> kestrel::game::EntityId {
    world.spawn(EntityRecord::new(at(i, j), PlayerId(player)).with_footprint(FixedNum::from_num(1)))
}

fn path_tiles(world: &NavWorld, engine: &AStarEngine) -> Vec<TileCoord> {
    engine.last_path().iter().map(|&p| world.terrain().world_to_tile(p)).collect()
}

#[test]
fn test_pathfinding_around_wall() {
    init_test_logging();
    let mut world = world();
    for j in 0..28 {
        world.terrain_mut().block_all(TileCoord::new(16, j));
    }
    let mover = unit(&mut world, 4, 4, 1);
    let mut engine = AStarEngine::new(world.geometry(), world.settings());

    let solved = world.find_path(&mut engine, mover, at(28, 4), FixedNum::ZERO).unwrap();
    assert!(solved, "Path around the wall's open end should exist");

    let tiles = path_tiles(&world, &engine);
    assert_eq!(tiles.last(), Some(&TileCoord::new(28, 4)));
    assert!(tiles.iter().all(|t| t.i != 16 || t.j >= 28), "Path crosses the wall: {:?}", tiles);
    assert!(tiles.iter().any(|t| t.j >= 28), "Path must detour through the gap");
    assert_eq!(engine.state(), SearchState::Idle);
    assert_eq!(engine.last_outcome(), SearchState::Solved);
}

#[test]
fn test_scenario_single_blocked_tile() {
    let mut terrain = TileMap::new(5, FixedNum::from_num(1));
    terrain.block_all(TileCoord::new(2, 2));
    let mut world = NavWorld::new(terrain, NavSettings::default());
    let mover = world.spawn(EntityRecord::new(FixedVec2::from_f32(0.5, 0.5), PlayerId(1)));
    let mut engine = AStarEngine::new(world.geometry(), world.settings());

    assert!(world.find_path(&mut engine, mover, FixedVec2::from_f32(4.5, 4.5), FixedNum::ZERO).unwrap());

    let tiles = path_tiles(&world, &engine);
    assert!(!tiles.contains(&TileCoord::new(2, 2)));
    assert_eq!(tiles.len(), 5);
    assert_eq!(tiles.last(), Some(&TileCoord::new(4, 4)));
}

#[test]
fn test_enemy_units_block_and_unblock_a_corridor() {
    let mut world = world();
    for j in 0..32 {
        if j != 10 {
            world.terrain_mut().block_all(TileCoord::new(12, j));
        }
    }
    let mover = unit(&mut world, 2, 10, 1);
    let guard = unit(&mut world, 12, 10, 2);
    let mut engine = AStarEngine::new(world.geometry(), world.settings());
    let dest = at(25, 10);

    assert!(!world.find_path(&mut engine, mover, dest, FixedNum::ZERO).unwrap(), "Enemy guard plugs the gap");
    assert!(engine.last_path().is_empty());

    world.move_entity(guard, at(20, 20)).unwrap();
    assert!(world.find_path(&mut engine, mover, dest, FixedNum::ZERO).unwrap(), "Gap is open after the guard moves");
    assert!(path_tiles(&world, &engine).contains(&TileCoord::new(12, 10)));

    world.move_entity(guard, at(12, 10)).unwrap();
    assert!(!world.find_path(&mut engine, mover, dest, FixedNum::ZERO).unwrap());

    world.despawn(guard).unwrap();
    assert!(world.find_path(&mut engine, mover, dest, FixedNum::ZERO).unwrap(), "Despawned guard no longer blocks");
}

#[test]
fn test_allied_units_do_not_block() {
    let mut world = world();
    for j in 0..32 {
        if j != 10 {
            world.terrain_mut().block_all(TileCoord::new(12, j));
        }
    }
    let mover = unit(&mut world, 2, 10, 1);
    unit(&mut world, 12, 10, 1);
    let mut engine = AStarEngine::new(world.geometry(), world.settings());

    assert!(world.find_path(&mut engine, mover, at(25, 10), FixedNum::ZERO).unwrap());
}

#[test]
fn test_naval_movers_follow_water() {
    let mut world = world();
    for j in 0..32 {
        for i in 0..32 {
            world.terrain_mut().set_water(TileCoord::new(i, j), j < 3);
        }
    }
    let ship = world.spawn(
        EntityRecord::new(at(1, 1), PlayerId(1)).with_movement_class(MovementClass::Naval),
    );
    let mut engine = AStarEngine::new(world.geometry(), world.settings());

    assert!(world.find_path(&mut engine, ship, at(30, 1), FixedNum::ZERO).unwrap());
    assert!(path_tiles(&world, &engine).iter().all(|t| t.j < 3));
    assert!(!world.find_path(&mut engine, ship, at(30, 20), FixedNum::ZERO).unwrap(), "Ships cannot reach land");
}

#[test]
fn test_request_path_prefers_straight_line() {
    let mut world = world();
    world.terrain_mut().block_all(TileCoord::new(10, 10));
    let mover = unit(&mut world, 5, 5, 1);
    let mut engine = AStarEngine::new(world.geometry(), world.settings());

    let clear = world.request_path(&mut engine, mover, at(5, 25), FixedNum::ZERO).unwrap();
    assert!(clear.direct);
    assert_eq!(clear.waypoints, vec![at(5, 25)]);

    let blocked = world.request_path(&mut engine, mover, at(15, 15), FixedNum::ZERO).unwrap();
    assert!(blocked.solved && !blocked.direct);
    assert!(!blocked.waypoints.contains(&at(10, 10)));
}

#[test]
fn test_goal_radius_in_world_units() {
    let mut world = world();
    let mover = unit(&mut world, 0, 0, 1);
    let settings = NavSettings { radius_edge_bias: false, ..world.settings().clone() };
    let mut engine = AStarEngine::new(world.geometry(), &settings);

    // 8 world units is two 4-unit tiles
    assert!(world.find_path(&mut engine, mover, at(10, 0), FixedNum::from_num(8)).unwrap());
    assert_eq!(path_tiles(&world, &engine).last(), Some(&TileCoord::new(8, 0)));
}

#[test]
fn test_unknown_entity_is_an_error() {
    let mut world = world();
    let mover = unit(&mut world, 0, 0, 1);
    world.despawn(mover).unwrap();
    let mut engine = AStarEngine::new(world.geometry(), world.settings());

    assert!(world.find_path(&mut engine, mover, at(3, 3), FixedNum::ZERO).is_err());
}
