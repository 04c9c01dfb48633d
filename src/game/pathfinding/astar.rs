use super::flag_cache::{NodeFlagCache, TileFlags};
use super::goal::{AStarGoal, LowLevelGoal};
use super::node_pool::NodePool;
use super::open_list::OpenList;
use super::types::{NavContext, NodeId, PoolStats, SearchState};
use crate::game::config::NavSettings;
use crate::game::entity::Mover;
use crate::game::error::NavError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::profiling::profile;
use crate::game::terrain::GridGeometry;
use crate::game::types::TileCoord;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Reusable tile-space A* search.
///
/// One engine runs one search at a time: the node pool, open list and goal
/// belong to the in-flight search. Movers that need paths in the same tick
/// either take turns on one engine or draw engines from an
/// [`super::EnginePool`].
///
/// # Algorithm
///
/// Standard A* with re-opening: a closed node reached again with a strictly
/// lower f goes back on the open list. Edge costs come from the goal and may
/// be negative when the acceptance radius bias is on, so a node is never
/// re-parented onto one of its own descendants; the parent links stay a tree
/// and path reconstruction is finite.
///
/// # Example
///
/// ```rust
/// use kestrel::game::config::NavSettings;
/// use kestrel::game::entity::Probe;
/// use kestrel::game::fixed_math::{FixedNum, FixedVec2};
/// use kestrel::game::pathfinding::{AStarEngine, NavContext};
/// use kestrel::game::spatial_hash::SpatialGrid;
/// use kestrel::game::terrain::{Terrain, TileMap};
/// use kestrel::game::types::PlayerId;
///
/// let terrain = TileMap::new(8, FixedNum::from_num(1));
/// let spatial = SpatialGrid::for_geometry(&terrain.geometry(), FixedNum::from_num(4));
/// let ctx = NavContext::new(&terrain, &spatial);
///
/// let mut engine = AStarEngine::new(terrain.geometry(), &NavSettings::default());
/// let src = FixedVec2::from_f32(0.5, 0.5);
/// let dest = FixedVec2::from_f32(6.5, 0.5);
/// let mover = Probe::new(PlayerId(1), src);
///
/// assert!(engine.find_path(&ctx, src, dest, &mover, FixedNum::ZERO).unwrap());
/// assert_eq!(engine.last_path().len(), 6);
/// ```
pub struct AStarEngine<G: AStarGoal = LowLevelGoal> {
    goal: G,
    pool: NodePool,
    open: OpenList,
    /// Open nodes by tile; only consulted once the flag cache says OPEN.
    open_nodes: FxHashMap<TileCoord, NodeId>,
    /// Closed nodes by tile; only consulted once the flag cache says CLOSED.
    closed: FxHashMap<TileCoord, NodeId>,
    flags: NodeFlagCache,
    neighbors: SmallVec<[TileCoord; 8]>,
    search_limit: usize,
    warn_fraction: FixedNum,
    state: SearchState,
    last_outcome: SearchState,
    last_path: Vec<FixedVec2>,
    last_expansions: usize,
    last_reopened: usize,
    last_closest: Option<TileCoord>,
    next_seq: u64,
}

impl AStarEngine<LowLevelGoal> {
    /// Engine over raw terrain tiles.
    pub fn new(geometry: GridGeometry, settings: &NavSettings) -> Self {
        Self::with_goal(LowLevelGoal::new(geometry, settings.radius_edge_bias), settings)
    }
}

impl<G: AStarGoal> AStarEngine<G> {
    pub fn with_goal(goal: G, settings: &NavSettings) -> Self {
        let (width, height) = goal.extent();
        Self {
            goal,
            pool: NodePool::new(settings.max_pool_nodes),
            open: OpenList::new(settings.tie_break_on_h),
            open_nodes: FxHashMap::default(),
            closed: FxHashMap::default(),
            flags: NodeFlagCache::new(width, height),
            neighbors: SmallVec::new(),
            search_limit: settings.search_limit,
            warn_fraction: settings.log_high_iteration_fraction,
            state: SearchState::Idle,
            last_outcome: SearchState::Idle,
            last_path: Vec::new(),
            last_expansions: 0,
            last_reopened: 0,
            last_closest: None,
            next_seq: 0,
        }
    }

    /// Install a new goal strategy. The flag cache is resized to its extent.
    pub fn set_goal(&mut self, goal: G) {
        let (width, height) = goal.extent();
        self.flags.resize(width, height);
        self.goal = goal;
    }

    pub fn goal(&self) -> &G {
        &self.goal
    }

    pub fn goal_mut(&mut self) -> &mut G {
        &mut self.goal
    }

    /// Cap on node expansions per search. Hitting it is a normal failure.
    pub fn set_search_limit(&mut self, limit: usize) {
        self.search_limit = limit;
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Waypoints of the last solved search, start tile excluded.
    ///
    /// Empty after an exhausted search; check the return value of
    /// [`Self::find_path`], not this.
    pub fn last_path(&self) -> &[FixedVec2] {
        &self.last_path
    }

    /// `Idle` whenever no search is running.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// `Solved` or `Exhausted` for the last search; `Idle` before the first.
    pub fn last_outcome(&self) -> SearchState {
        self.last_outcome
    }

    /// Node expansions used by the last search.
    pub fn last_expansions(&self) -> usize {
        self.last_expansions
    }

    /// Closed nodes put back on the open list by the last search.
    pub fn last_reopened(&self) -> usize {
        self.last_reopened
    }

    /// Expanded tile with the smallest heuristic in the last search.
    ///
    /// Callers may steer toward it after an exhausted search.
    pub fn last_closest(&self) -> Option<TileCoord> {
        self.last_closest
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Search for a path from `src` to within `radius` of `dest`.
    ///
    /// Returns `Ok(true)` when a path was found within the search limit and
    /// `Ok(false)` when the budget ran out or the open list emptied. Points off
    /// the map are an error. All search nodes are returned to the pool before
    /// this returns, whatever the outcome.
    #[profile(2)]
    pub fn find_path(
        &mut self,
        ctx: &NavContext<'_>,
        src: FixedVec2,
        dest: FixedVec2,
        mover: &dyn Mover,
        radius: FixedNum,
    ) -> Result<bool, NavError> {
        let start = self.goal.tile(src)?;
        let goal_tile = self.goal.tile(dest)?;

        self.goal.set_destination(dest);
        self.goal.set_radius(radius.max(FixedNum::ZERO));
        self.reset_search();
        self.state = SearchState::Searching;

        let outcome = self.search(ctx, start, mover);

        let result = match outcome {
            Ok(Some(terminal)) => {
                self.last_path = self.reconstruct_path(terminal);
                self.last_outcome = SearchState::Solved;

                let budget = FixedNum::from_num(self.search_limit) * self.warn_fraction;
                if FixedNum::from_num(self.last_expansions) > budget {
                    warn!("[PATHFINDING] A* used {} of {} expansions ({:?} -> {:?})",
                        self.last_expansions, self.search_limit, start, goal_tile);
                }
                Ok(true)
            }
            Ok(None) => {
                self.last_path.clear();
                self.last_outcome = SearchState::Exhausted;
                debug!("[PATHFINDING] Search exhausted after {} expansions ({:?} -> {:?}, radius {})",
                    self.last_expansions, start, goal_tile, self.goal.radius());
                Ok(false)
            }
            Err(e) => {
                self.last_path.clear();
                self.last_outcome = SearchState::Exhausted;
                warn!("[PATHFINDING] Search aborted: {}", e);
                Err(e)
            }
        };

        self.cleanup();
        result
    }

    fn reset_search(&mut self) {
        let (width, height) = self.goal.extent();
        if self.flags.extent() != (width, height) {
            self.flags.resize(width, height);
        } else {
            self.flags.reset();
        }
        self.open.clear(&mut self.pool);
        self.open_nodes.clear();
        self.closed.clear();
        self.next_seq = 0;
        self.last_expansions = 0;
        self.last_reopened = 0;
        self.last_closest = None;
    }

    /// Run the main loop. Returns the terminal node when solved.
    fn search(&mut self, ctx: &NavContext<'_>, start: TileCoord, mover: &dyn Mover) -> Result<Option<NodeId>, NavError> {
        let start_h = self.goal.distance_to_goal(start);
        let root = self.pool.alloc(start, FixedNum::ZERO, start_h, None)?;
        self.push_open(root);

        let mut closest = (start_h, start);
        let mut neighbors = std::mem::take(&mut self.neighbors);
        let mut solved = None;

        while self.last_expansions < self.search_limit {
            let Some(best) = self.open.pop_min(&mut self.pool) else {
                break;
            };
            self.last_expansions += 1;

            let node = *self.pool.get(best);
            self.open_nodes.remove(&node.tile);
            self.flags.remove(node.tile, TileFlags::OPEN);
            self.closed.insert(node.tile, best);
            self.flags.insert(node.tile, TileFlags::CLOSED);

            if node.h < closest.0 {
                closest = (node.h, node.tile);
            }

            if self.goal.is_at_goal(node.tile) {
                solved = Some(best);
                break;
            }

            neighbors.clear();
            self.goal.neighbors(ctx, node.tile, mover, &mut self.flags, &mut neighbors);

            for &n in neighbors.iter() {
                let g = node.g + self.goal.tile_cost(node.tile, n);
                let h = self.goal.distance_to_goal(n);
                let f = g + h;
                let flags = self.flags.get(n);

                if flags.contains(TileFlags::CLOSED) {
                    let Some(&existing) = self.closed.get(&n) else {
                        continue;
                    };
                    if self.pool.get(existing).f <= f || self.is_ancestor(existing, best) {
                        continue;
                    }
                    self.closed.remove(&n);
                    self.flags.remove(n, TileFlags::CLOSED);
                    self.pool.get_mut(existing).update(g, h, Some(best));
                    self.push_open(existing);
                    self.last_reopened += 1;
                    continue;
                }

                if flags.contains(TileFlags::OPEN) {
                    let Some(&existing) = self.open_nodes.get(&n) else {
                        continue;
                    };
                    // A re-opened node can be an ancestor while still open
                    if self.pool.get(existing).f <= f || self.is_ancestor(existing, best) {
                        continue;
                    }
                    self.pool.get_mut(existing).update(g, h, Some(best));
                    self.open.promote(&mut self.pool, existing);
                    continue;
                }

                match self.pool.alloc(n, g, h, Some(best)) {
                    Ok(id) => self.push_open(id),
                    Err(e) => {
                        self.neighbors = neighbors;
                        return Err(e);
                    }
                }
            }
        }

        self.neighbors = neighbors;
        self.last_closest = Some(closest.1);
        Ok(solved)
    }

    fn push_open(&mut self, id: NodeId) {
        let tile = {
            let node = self.pool.get_mut(id);
            node.seq = self.next_seq;
            node.tile
        };
        self.next_seq += 1;
        self.open.push(&mut self.pool, id);
        self.open_nodes.insert(tile, id);
        self.flags.insert(tile, TileFlags::OPEN);
    }

    /// Whether `candidate` lies on the parent chain of `node` (inclusive).
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.pool.get(id).parent;
        }
        false
    }

    /// Walk parents back to the start, excluding the start itself.
    fn reconstruct_path(&self, terminal: NodeId) -> Vec<FixedVec2> {
        let mut tiles = Vec::new();
        let mut cursor = terminal;
        loop {
            let node = self.pool.get(cursor);
            let Some(parent) = node.parent else {
                break;
            };
            tiles.push(node.tile);
            cursor = parent;
        }
        tiles.reverse();
        tiles.into_iter().map(|t| self.goal.coord(t)).collect()
    }

    /// Return every node to the pool and drop search bookkeeping.
    fn cleanup(&mut self) {
        self.open.clear(&mut self.pool);
        self.open_nodes.clear();
        self.closed.clear();
        self.pool.release_all();
        self.state = SearchState::Idle;
    }
}
