use super::{SpatialGrid, SpatialQuery};
use crate::game::entity::EntityId;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::types::{Aabb, PlayerId};

impl SpatialGrid {
    /// All entities whose centre is within `radius` of (x, z).
    ///
    /// Only patches overlapping the query square are scanned; candidates are
    /// then filtered by exact squared distance. Clears `out` first and returns
    /// ids sorted ascending so callers iterate deterministically.
    pub fn get_in_range(&self, x: FixedNum, z: FixedNum, radius: FixedNum, out: &mut Vec<EntityId>) {
        out.clear();
        let center = FixedVec2::new(x, z);
        let radius_sq = radius * radius;

        let (min_col, min_row) = self.clamped_patch(x - radius, z - radius);
        let (max_col, max_row) = self.clamped_patch(x + radius, z + radius);

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let idx = row * self.patches_per_side() + col;
                for entry in &self.cells()[idx] {
                    if entry.position.distance_squared(center) <= radius_sq {
                        out.push(entry.id);
                    }
                }
            }
        }

        out.sort_unstable();
    }

    /// First blocking entity overlapping `bounds`; see [`SpatialQuery::collision_object`].
    pub fn get_collision_object(&self, bounds: &Aabb, exclude_player: Option<PlayerId>) -> Option<EntityId> {
        let search = bounds.inflate(self.max_footprint);
        let (min_col, min_row) = self.clamped_patch(search.min.x, search.min.y);
        let (max_col, max_row) = self.clamped_patch(search.max.x, search.max.y);

        let mut hit: Option<EntityId> = None;
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let idx = row * self.patches_per_side() + col;
                for entry in &self.cells()[idx] {
                    if !entry.blocks_movement || Some(entry.player) == exclude_player {
                        continue;
                    }
                    if hit.is_some_and(|h| h <= entry.id) {
                        continue;
                    }
                    if bounds.intersects_circle(entry.position, entry.footprint) {
                        hit = Some(entry.id);
                    }
                }
            }
        }
        hit
    }
}

impl SpatialQuery for SpatialGrid {
    fn collision_object(&self, bounds: &Aabb, exclude_player: Option<PlayerId>) -> Option<EntityId> {
        self.get_collision_object(bounds, exclude_player)
    }

    fn in_range(&self, x: FixedNum, z: FixedNum, radius: FixedNum, out: &mut Vec<EntityId>) {
        self.get_in_range(x, z, radius, out)
    }
}
