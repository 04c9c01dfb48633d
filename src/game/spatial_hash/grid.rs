use super::{PatchEntry, SpatialGrid};
use crate::game::entity::EntityId;
use crate::game::error::NavError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use tracing::warn;

impl SpatialGrid {
    /// Patch holding `pos`, or `None` when the point is off the map.
    pub fn patch_index(&self, pos: FixedVec2) -> Option<usize> {
        if pos.x < FixedNum::ZERO || pos.x >= self.world_size() ||
           pos.y < FixedNum::ZERO || pos.y >= self.world_size() {
            return None;
        }

        let col = (pos.x / self.patch_size()).to_num::<usize>();
        let row = (pos.y / self.patch_size()).to_num::<usize>();

        if col >= self.patches_per_side() || row >= self.patches_per_side() {
            return None;
        }

        Some(row * self.patches_per_side() + col)
    }

    /// Clamped (col, row) of the patch containing a coordinate, for range scans.
    pub(crate) fn clamped_patch(&self, x: FixedNum, z: FixedNum) -> (usize, usize) {
        let last = self.patches_per_side() as isize - 1;
        let col = (x / self.patch_size()).floor().saturating_to_num::<isize>().clamp(0, last) as usize;
        let row = (z / self.patch_size()).floor().saturating_to_num::<isize>().clamp(0, last) as usize;
        (col, row)
    }

    /// Register an entity. Returns the patch it landed in, which the caller
    /// stores on the entity for later [`Self::relocate`]/[`Self::remove`] calls.
    pub fn insert(&mut self, entry: PatchEntry) -> Option<usize> {
        let Some(idx) = self.patch_index(entry.position) else {
            warn!("[SPATIAL] Entity {:?} at ({:.2}, {:.2}) is off the map and was not registered",
                entry.id, entry.position.x.to_num::<f32>(), entry.position.y.to_num::<f32>());
            return None;
        };

        if entry.footprint > self.max_footprint {
            self.max_footprint = entry.footprint;
        }
        self.cells_mut()[idx].push(entry);
        self.entry_count += 1;
        Some(idx)
    }

    /// Remove an entity from the patch it was registered in.
    pub fn remove(&mut self, id: EntityId, patch: usize) -> bool {
        let Some(bucket) = self.cells_mut().get_mut(patch) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|e| e.id != id);
        let removed = bucket.len() != before;
        if removed {
            self.entry_count -= 1;
        }
        removed
    }

    /// Move an entity. Buckets are only touched when the patch changes.
    ///
    /// Returns the patch now holding the entity, or `None` if it left the map
    /// (in which case it is no longer registered).
    pub fn relocate(&mut self, id: EntityId, patch: usize, new_pos: FixedVec2) -> Result<Option<usize>, NavError> {
        let new_patch = self.patch_index(new_pos);

        let bucket = self.cells_mut().get_mut(patch).ok_or(NavError::UnknownEntity(id))?;
        let slot = bucket.iter().position(|e| e.id == id).ok_or(NavError::UnknownEntity(id))?;

        if new_patch == Some(patch) {
            bucket[slot].position = new_pos;
            return Ok(Some(patch));
        }

        let mut entry = bucket.swap_remove(slot);
        self.entry_count -= 1;
        entry.position = new_pos;

        match new_patch {
            Some(idx) => {
                self.cells_mut()[idx].push(entry);
                self.entry_count += 1;
                Ok(Some(idx))
            }
            None => {
                warn!("[SPATIAL] Entity {:?} moved off the map and was unregistered", id);
                Ok(None)
            }
        }
    }

    /// Entities currently registered in one patch.
    pub fn patch_entries(&self, patch: usize) -> &[PatchEntry] {
        self.cells().get(patch).map(|c| c.as_slice()).unwrap_or(&[])
    }
}
