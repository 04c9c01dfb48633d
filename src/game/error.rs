use crate::game::entity::EntityId;
use crate::game::fixed_math::FixedNum;
use thiserror::Error;

/// Errors surfaced by the navigation core.
///
/// An exhausted search is not an error: `find_path` reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum NavError {
    /// A caller passed a point outside the map. Never clamped.
    #[error("coordinate ({x}, {z}) lies outside the map")]
    InvalidCoordinate { x: FixedNum, z: FixedNum },

    /// The search node arena hit its hard cap or could not grow.
    #[error("search node pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    #[error("unknown or despawned entity {0:?}")]
    UnknownEntity(EntityId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
