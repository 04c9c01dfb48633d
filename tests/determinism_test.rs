use kestrel::game::config::NavConfig;
use kestrel::game::entity::EntityRecord;
use kestrel::game::fixed_math::{FixedNum, FixedVec2};
use kestrel::game::logging::init_test_logging;
use kestrel::game::pathfinding::{AStarEngine, EnginePool};
use kestrel::game::types::{PlayerId, TileCoord};
use kestrel::game::{EntityId, NavWorld};

const SIDE: u32 = 48;

/// Build a world from a seed: random cliffs, units, and a few settlements.
fn seeded_world(seed: u64) -> (NavWorld, Vec<EntityId>) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut world = NavWorld::from_config(&NavConfig::default(), SIDE);
    let size = SIDE as f32 * 4.0;

    for _ in 0..300 {
        let tile = TileCoord::new(rng.i32(0..SIDE as i32), rng.i32(0..SIDE as i32));
        world.terrain_mut().block_all(tile);
    }

    let mut units = Vec::new();
    for n in 0..40 {
        let pos = FixedVec2::from_f32(rng.f32() * size, rng.f32() * size);
        let player = PlayerId(1 + (n % 4) as u8);
        let record = EntityRecord::new(pos, player)
            .with_footprint(FixedNum::from_num(1))
            .with_sight(rng.u32(2..6));
        units.push(world.spawn(record));
    }

    for player in 1..=4u8 {
        let pos = FixedVec2::from_f32(rng.f32() * size, rng.f32() * size);
        world.spawn(EntityRecord::new(pos, PlayerId(player)).as_territory_center());
    }

    (world, units)
}

/// Every observable output of one simulated minute, flattened for comparison.
fn run(seed: u64) -> (Vec<Vec<FixedVec2>>, Vec<Vec<FixedVec2>>, Vec<u32>) {
    let (mut world, units) = seeded_world(seed);
    let mut rng = fastrand::Rng::with_seed(seed ^ 0x5eed);
    let mut pool = EnginePool::new(world.geometry(), world.settings().clone());
    let size = SIDE as f32 * 4.0;

    let mut paths = Vec::new();
    for _ in 0..20 {
        world.tick();
        for &id in &units {
            let dest = FixedVec2::from_f32(rng.f32() * size, rng.f32() * size);
            let radius = FixedNum::from_num(rng.u32(0..8));
            let path = pool.with_engine(|engine| {
                world.find_path(engine, id, dest, radius).unwrap();
                engine.last_path().to_vec()
            });
            if let Some(&next) = path.first() {
                world.move_entity(id, next).unwrap();
            }
            paths.push(path);
        }
    }

    let boundaries = world.territory().territories().iter().map(|t| t.boundary.to_vec()).collect();

    let mut masks = Vec::new();
    for j in 0..SIDE as i32 {
        for i in 0..SIDE as i32 {
            let tile = TileCoord::new(i, j);
            masks.push(world.visibility().visible_mask(tile));
            masks.push(world.visibility().explored_mask(tile));
        }
    }

    (paths, boundaries, masks)
}

#[test]
fn test_simulation_is_deterministic() {
    init_test_logging();
    let a = run(2024);
    let b = run(2024);

    assert_eq!(a.0.len(), b.0.len());
    for (k, (pa, pb)) in a.0.iter().zip(b.0.iter()).enumerate() {
        assert_eq!(pa, pb, "Path {} diverged", k);
    }
    assert_eq!(a.1, b.1, "Territory boundaries diverged");
    assert_eq!(a.2, b.2, "LOS masks diverged");
    assert!(a.0.iter().any(|p| !p.is_empty()), "The run should produce at least some paths");
}

#[test]
fn test_engine_history_does_not_affect_results() {
    let (world, units) = seeded_world(7);
    let mut fresh = AStarEngine::new(world.geometry(), world.settings());
    let mut warmed = AStarEngine::new(world.geometry(), world.settings());

    for &id in units.iter().rev() {
        let _ = world.find_path(&mut warmed, id, FixedVec2::from_f32(100.0, 100.0), FixedNum::ZERO);
    }

    for &id in &units {
        let dest = FixedVec2::from_f32(10.0, 180.0);
        let a = world.find_path(&mut fresh, id, dest, FixedNum::ZERO).unwrap();
        let b = world.find_path(&mut warmed, id, dest, FixedNum::ZERO).unwrap();
        assert_eq!(a, b);
        assert_eq!(fresh.last_path(), warmed.last_path(), "Entity {:?} got a different path", id);
        assert_eq!(fresh.last_expansions(), warmed.last_expansions());
    }
}
