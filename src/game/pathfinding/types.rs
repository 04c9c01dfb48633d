use crate::game::fixed_math::FixedNum;
use crate::game::spatial_hash::SpatialQuery;
use crate::game::terrain::Terrain;
use crate::game::types::TileCoord;

/// Index of a node inside a [`super::NodePool`].
pub type NodeId = u32;

/// Moore neighbourhood in the fixed order every search uses.
///
/// Rows of decreasing-to-increasing `j`, each scanned by increasing `i`,
/// centre skipped. Changing this order changes which of several equal-cost
/// paths is returned, which would desync lockstep peers.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// One search node. Owned by the pool, referenced by id everywhere else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AStarNode {
    pub tile: TileCoord,
    /// Accumulated cost from the start.
    pub g: FixedNum,
    /// Heuristic estimate to the goal.
    pub h: FixedNum,
    /// Always `g + h`.
    pub f: FixedNum,
    pub parent: Option<NodeId>,
    /// Insertion order, last resort tie-break in the open list.
    pub(crate) seq: u64,
    /// Current slot in the open-list heap, `None` when not open.
    pub(crate) heap_slot: Option<usize>,
}

impl AStarNode {
    pub(crate) fn new(tile: TileCoord, g: FixedNum, h: FixedNum, parent: Option<NodeId>) -> Self {
        Self {
            tile,
            g,
            h,
            f: g + h,
            parent,
            seq: 0,
            heap_slot: None,
        }
    }

    /// Replace cost and parent in place after finding a cheaper route.
    pub(crate) fn update(&mut self, g: FixedNum, h: FixedNum, parent: Option<NodeId>) {
        self.g = g;
        self.h = h;
        self.f = g + h;
        self.parent = parent;
    }
}

/// Per-search lifecycle of an engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Solved,
    Exhausted,
}

/// Node accounting for leak checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Nodes ever created by the pool.
    pub allocated: usize,
    /// Nodes sitting on the free list.
    pub free: usize,
    /// Nodes handed out to the current search.
    pub in_use: usize,
}

/// The collaborators a search reads. Never mutated by the search.
#[derive(Clone, Copy)]
pub struct NavContext<'a> {
    pub terrain: &'a dyn Terrain,
    pub spatial: &'a dyn SpatialQuery,
}

impl<'a> NavContext<'a> {
    pub fn new(terrain: &'a dyn Terrain, spatial: &'a dyn SpatialQuery) -> Self {
        Self { terrain, spatial }
    }
}
