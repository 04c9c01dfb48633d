//! Tile-space A* pathfinding.
//!
//! The engine searches the Moore neighbourhood of the tile grid with fixed-point
//! costs and a fully deterministic expansion order, so lockstep peers given the
//! same world compute bit-identical paths.

mod types;
mod flag_cache;
mod node_pool;
mod open_list;
mod goal;
mod astar;
mod engine_pool;
mod direct;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{AStarNode, NavContext, NodeId, PoolStats, SearchState, NEIGHBOR_OFFSETS};
pub use goal::{AStarGoal, LowLevelGoal};
pub use astar::AStarEngine;
pub use engine_pool::EnginePool;
pub use direct::{line_is_clear, request_path, PathResult};

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

pub use flag_cache::{NodeFlagCache, TileFlags};
pub use node_pool::NodePool;
pub use open_list::OpenList;
