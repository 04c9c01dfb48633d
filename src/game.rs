//! Pathfinding and spatial-partition core of the simulation.
//!
//! Everything here is single-threaded and deterministic: identical inputs
//! produce identical paths, territories and LOS masks on every machine, which
//! is what keeps lockstep peers in sync.

pub mod config;
pub mod entity;
pub mod error;
pub mod fixed_math;
pub mod logging;
pub mod pathfinding;
pub mod profiling;
pub mod spatial_hash;
pub mod terrain;
pub mod territory;
pub mod types;
pub mod visibility;
pub mod world;

pub use config::{NavConfig, NavSettings, RevealMode};
pub use entity::{EntityArena, EntityId, EntityRecord, Mover, MoverRef, Probe};
pub use error::NavError;
pub use fixed_math::{FixedNum, FixedVec2};
pub use pathfinding::{AStarEngine, AStarGoal, EnginePool, LowLevelGoal, NavContext, SearchState};
pub use spatial_hash::{SpatialGrid, SpatialQuery};
pub use terrain::{GridGeometry, Terrain, TileMap};
pub use territory::{Territory, TerritoryId, TerritoryIndex};
pub use types::{Aabb, MovementClass, PlayerId, TileCoord};
pub use visibility::{LosStatus, VisibilityGrid};
pub use world::NavWorld;
