use kestrel::game::config::{NavConfig, NavSettings};
use kestrel::game::entity::Probe;
use kestrel::game::error::NavError;
use kestrel::game::fixed_math::{FixedNum, FixedVec2};
use kestrel::game::logging::init_test_logging;
use kestrel::game::pathfinding::{AStarEngine, EnginePool, NavContext, SearchState};
use kestrel::game::types::{PlayerId, TileCoord};
use kestrel::game::NavWorld;

const SIDE: u32 = 24;

fn obstacle_world(seed: u64) -> NavWorld {
    let mut world = NavWorld::from_config(&NavConfig::default(), SIDE);
    let mut rng = fastrand::Rng::with_seed(seed);
    for _ in 0..120 {
        world.terrain_mut().block_all(TileCoord::new(rng.i32(0..SIDE as i32), rng.i32(0..SIDE as i32)));
    }
    world
}

fn random_point(rng: &mut fastrand::Rng) -> FixedVec2 {
    let size = SIDE as f32 * 4.0;
    FixedVec2::from_f32(rng.f32() * size, rng.f32() * size)
}

#[test]
fn test_thousand_mixed_searches_never_leak_nodes() {
    init_test_logging();
    let world = obstacle_world(11);
    let ctx = NavContext::new(world.terrain(), &world);
    let mut engine = AStarEngine::new(world.geometry(), world.settings());
    let mut rng = fastrand::Rng::with_seed(12);

    let mut outcomes = [0usize; 2];
    let mut peak = 0;
    for _ in 0..1000 {
        engine.set_search_limit(rng.usize(1..400));
        let src = random_point(&mut rng);
        let dest = random_point(&mut rng);
        let mover = Probe::new(PlayerId(1), src);
        let radius = FixedNum::from_num(rng.u32(0..12));

        let solved = engine.find_path(&ctx, src, dest, &mover, radius).unwrap();
        outcomes[solved as usize] += 1;

        let stats = engine.pool_stats();
        assert_eq!(stats.free + stats.in_use, stats.allocated, "Node lost or double freed");
        assert_eq!(stats.in_use, 0);
        assert_eq!(engine.state(), SearchState::Idle);
        peak = peak.max(stats.allocated);
    }

    assert!(outcomes[0] > 0 && outcomes[1] > 0, "Need both outcomes, got {:?}", outcomes);
    assert!(peak <= (SIDE * SIDE) as usize, "Pool grew past one node per tile: {}", peak);
}

#[test]
fn test_pool_cap_errors_are_recoverable() {
    let world = obstacle_world(5);
    let ctx = NavContext::new(world.terrain(), &world);
    let settings = NavSettings { max_pool_nodes: 32, ..world.settings().clone() };
    let mut engine = AStarEngine::new(world.geometry(), &settings);
    let mut rng = fastrand::Rng::with_seed(6);

    let mut capped = 0;
    for _ in 0..200 {
        let src = random_point(&mut rng);
        let dest = random_point(&mut rng);
        match engine.find_path(&ctx, src, dest, &Probe::new(PlayerId(1), src), FixedNum::ZERO) {
            Err(NavError::PoolExhausted { capacity }) => {
                assert_eq!(capacity, 32);
                capped += 1;
            }
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => {}
        }
        let stats = engine.pool_stats();
        assert!(stats.allocated <= 32);
        assert_eq!(stats.in_use, 0);
    }
    assert!(capped > 0, "A 32-node cap must trip on a 24x24 map");
}

#[test]
fn test_engine_pool_reuses_engines_across_ticks() {
    let world = obstacle_world(21);
    let mut pool = EnginePool::new(world.geometry(), world.settings().clone());
    let ctx = NavContext::new(world.terrain(), &world);
    let mut rng = fastrand::Rng::with_seed(22);

    for _ in 0..50 {
        let mut engines: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        for engine in engines.iter_mut() {
            let src = random_point(&mut rng);
            let dest = random_point(&mut rng);
            engine.find_path(&ctx, src, dest, &Probe::new(PlayerId(1), src), FixedNum::ZERO).unwrap();
        }
        for engine in engines {
            assert_eq!(engine.pool_stats().in_use, 0);
            pool.release(engine);
        }
    }

    assert_eq!(pool.created_count(), 4);
    assert_eq!(pool.idle_count(), 4);
}
