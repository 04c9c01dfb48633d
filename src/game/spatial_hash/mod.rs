use crate::game::entity::EntityId;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::terrain::GridGeometry;
use crate::game::types::{Aabb, PlayerId};

mod grid;
mod query;
#[cfg(test)]
mod tests;

/// Range and collision queries the pathfinder consumes.
pub trait SpatialQuery {
    /// First blocking entity (lowest id) whose footprint overlaps `bounds`,
    /// ignoring entities owned by `exclude_player`.
    fn collision_object(&self, bounds: &Aabb, exclude_player: Option<PlayerId>) -> Option<EntityId>;

    /// Entities whose centre lies within `radius` of (x, z), sorted by id.
    fn in_range(&self, x: FixedNum, z: FixedNum, radius: FixedNum, out: &mut Vec<EntityId>);
}

/// One entity as stored in a collision patch bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchEntry {
    pub id: EntityId,
    pub position: FixedVec2,
    pub footprint: FixedNum,
    pub player: PlayerId,
    pub blocks_movement: bool,
}

/// Uniform grid of collision patches for range and collision queries.
///
/// Patches are coarser than pathfinding tiles. Each entity lives in exactly
/// one patch (the one containing its centre); the owner of the entity tells the
/// grid when it crosses a patch boundary via [`SpatialGrid::relocate`], so the
/// grid never rescans the world.
///
/// # Example
///
/// ```rust
/// use kestrel::game::entity::EntityId;
/// use kestrel::game::fixed_math::{FixedNum, FixedVec2};
/// use kestrel::game::spatial_hash::{PatchEntry, SpatialGrid};
/// use kestrel::game::types::PlayerId;
///
/// let mut grid = SpatialGrid::new(FixedNum::from_num(128), FixedNum::from_num(16));
/// let id = EntityId { index: 0, generation: 0 };
/// let entry = PatchEntry {
///     id,
///     position: FixedVec2::from_f32(10.0, 20.0),
///     footprint: FixedNum::from_num(1),
///     player: PlayerId(1),
///     blocks_movement: true,
/// };
/// let patch = grid.insert(entry);
/// assert!(patch.is_some());
///
/// let mut found = Vec::new();
/// grid.get_in_range(FixedNum::from_num(12), FixedNum::from_num(20), FixedNum::from_num(5), &mut found);
/// assert_eq!(found, vec![id]);
/// ```
///
/// # Performance
///
/// - **Insert/Remove:** O(1) / O(bucket)
/// - **Relocate within a patch:** O(bucket), no bucket change
/// - **Range query:** O(k) over patches overlapping the query square
///
/// # Implementation Notes
///
/// - Uses fixed-point math for deterministic cross-platform behavior
/// - Buckets are `Vec`s for cache locality; query results are sorted by id
/// - Origin is at the map corner (0, 0), matching the tile grid
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    patch_size: FixedNum,
    patches_per_side: usize,
    world_size: FixedNum,
    cells: Vec<Vec<PatchEntry>>,
    /// Largest footprint ever inserted; collision queries inflate by this.
    max_footprint: FixedNum,
    entry_count: usize,
}

impl SpatialGrid {
    pub fn new(world_size: FixedNum, patch_size: FixedNum) -> Self {
        let patches_per_side = (world_size / patch_size).ceil().to_num::<usize>().max(1);

        Self {
            patch_size,
            patches_per_side,
            world_size,
            cells: vec![Vec::new(); patches_per_side * patches_per_side],
            max_footprint: FixedNum::ZERO,
            entry_count: 0,
        }
    }

    /// Grid covering the same map as a tile geometry.
    pub fn for_geometry(geometry: &GridGeometry, patch_size: FixedNum) -> Self {
        Self::new(geometry.world_size(), patch_size)
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.entry_count = 0;
    }

    /// Total number of entities held.
    pub fn total_entries(&self) -> usize {
        self.entry_count
    }

    /// Count the number of non-empty patches.
    /// Useful for debugging and diagnostics.
    pub fn non_empty_cells(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn patch_size(&self) -> FixedNum { self.patch_size }
    pub fn patches_per_side(&self) -> usize { self.patches_per_side }
    pub fn world_size(&self) -> FixedNum { self.world_size }

    pub(crate) fn cells(&self) -> &[Vec<PatchEntry>] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Vec<Vec<PatchEntry>> {
        &mut self.cells
    }
}
