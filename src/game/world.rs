//! Owner of every navigation index for one match.
//!
//! `NavWorld` is the explicit context object the simulation passes around in
//! place of process-wide singletons. It keeps the collision patches in step
//! with entity movement and drives the per-tick territory and LOS passes.

use crate::game::config::{NavConfig, NavSettings};
use crate::game::entity::{EntityArena, EntityId, EntityRecord, Mover, MoverRef};
use crate::game::error::NavError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::pathfinding::{request_path, AStarEngine, NavContext, PathResult};
use crate::game::spatial_hash::{PatchEntry, SpatialGrid, SpatialQuery};
use crate::game::terrain::{GridGeometry, Terrain, TileMap};
use crate::game::territory::TerritoryIndex;
use crate::game::types::{Aabb, PlayerId};
use crate::game::visibility::{LosStatus, VisibilityGrid};
use crate::profile_log;
use tracing::{debug, info};

pub struct NavWorld {
    settings: NavSettings,
    terrain: TileMap,
    entities: EntityArena,
    patches: SpatialGrid,
    territory: TerritoryIndex,
    visibility: VisibilityGrid,
    tick: u64,
}

impl NavWorld {
    /// Build the indices over an existing terrain. The terrain's geometry wins
    /// over `settings.cell_size`.
    pub fn new(terrain: TileMap, settings: NavSettings) -> Self {
        let geometry = terrain.geometry();
        let patches = SpatialGrid::for_geometry(&geometry, settings.patch_size.max(geometry.cell_size));
        info!(
            "[CONFIG] NavWorld: {}x{} tiles of {} units, {} patches per side",
            geometry.tiles_per_side, geometry.tiles_per_side, geometry.cell_size, patches.patches_per_side()
        );

        Self {
            territory: TerritoryIndex::new(geometry),
            visibility: VisibilityGrid::new(geometry, &settings),
            settings,
            terrain,
            entities: EntityArena::new(),
            patches,
            tick: 0,
        }
    }

    /// Flat, fully passable map built from a loaded config.
    pub fn from_config(config: &NavConfig, tiles_per_side: u32) -> Self {
        let settings = NavSettings::from(config);
        let terrain = TileMap::new(tiles_per_side, settings.cell_size);
        Self::new(terrain, settings)
    }

    pub fn settings(&self) -> &NavSettings {
        &self.settings
    }

    pub fn geometry(&self) -> GridGeometry {
        self.terrain.geometry()
    }

    pub fn terrain(&self) -> &TileMap {
        &self.terrain
    }

    /// Terrain edits take effect on the next search; no index caches passability.
    pub fn terrain_mut(&mut self) -> &mut TileMap {
        &mut self.terrain
    }

    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    pub fn patches(&self) -> &SpatialGrid {
        &self.patches
    }

    pub fn territory(&self) -> &TerritoryIndex {
        &self.territory
    }

    pub fn visibility(&self) -> &VisibilityGrid {
        &self.visibility
    }

    pub fn visibility_mut(&mut self) -> &mut VisibilityGrid {
        &mut self.visibility
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn spawn(&mut self, record: EntityRecord) -> EntityId {
        let center = record.territory_center;
        let id = self.entities.spawn(record);

        if let Some(record) = self.entities.get_mut(id) {
            record.patch = self.patches.insert(patch_entry(id, record));
        }
        if center {
            self.territory.delayed_recalculate();
        }
        debug!("[SPATIAL] Spawned {:?}", id);
        id
    }

    /// Remove an entity from every index. Destroying a territory center
    /// schedules a territory rebuild.
    pub fn despawn(&mut self, id: EntityId) -> Result<EntityRecord, NavError> {
        let record = self.entities.despawn(id)?;
        if let Some(patch) = record.patch {
            self.patches.remove(id, patch);
        }
        if record.territory_center {
            self.territory.delayed_recalculate();
        }
        Ok(record)
    }

    /// Move an entity, touching patch buckets only when it crosses a boundary.
    pub fn move_entity(&mut self, id: EntityId, position: FixedVec2) -> Result<(), NavError> {
        let record = self.entities.get_mut(id).ok_or(NavError::UnknownEntity(id))?;
        record.position = position;

        record.patch = match record.patch {
            Some(patch) => self.patches.relocate(id, patch, position)?,
            None => self.patches.insert(patch_entry(id, record)),
        };
        if record.territory_center {
            self.territory.delayed_recalculate();
        }
        Ok(())
    }

    /// Search for a path for an arena entity from its current position.
    pub fn find_path(
        &self,
        engine: &mut AStarEngine,
        id: EntityId,
        dest: FixedVec2,
        radius: FixedNum,
    ) -> Result<bool, NavError> {
        let mover = MoverRef::from_arena(&self.entities, id)?;
        let ctx = NavContext::new(&self.terrain, self);
        engine.find_path(&ctx, mover.position(), dest, &mover, radius)
    }

    /// Like [`Self::find_path`] but takes the straight line when it is clear.
    pub fn request_path(
        &self,
        engine: &mut AStarEngine,
        id: EntityId,
        dest: FixedVec2,
        radius: FixedNum,
    ) -> Result<PathResult, NavError> {
        let mover = MoverRef::from_arena(&self.entities, id)?;
        let ctx = NavContext::new(&self.terrain, self);
        request_path(engine, &ctx, &mover, dest, radius)
    }

    /// Advance one simulation tick: deferred territory rebuild, then LOS.
    pub fn tick(&mut self) {
        self.tick += 1;
        if self.territory.update(&mut self.entities) {
            debug!("[TERRITORY] Rebuilt on tick {}", self.tick);
        }
        self.visibility.update(&self.entities);

        profile_log!(self.tick, "[PERF] tick {}: {} entities", self.tick, self.entities.len());
    }

    /// Entities within `radius` of (x, z) standing on tiles `player` can see.
    pub fn get_in_los(&self, x: FixedNum, z: FixedNum, radius: FixedNum, player: PlayerId, out: &mut Vec<EntityId>) {
        self.patches.get_in_range(x, z, radius, out);
        out.retain(|&id| {
            self.entities
                .get(id)
                .is_some_and(|r| self.visibility.status_at_world(r.position, player) == LosStatus::Visible)
        });
    }
}

impl SpatialQuery for NavWorld {
    fn collision_object(&self, bounds: &Aabb, exclude_player: Option<PlayerId>) -> Option<EntityId> {
        self.patches.get_collision_object(bounds, exclude_player)
    }

    fn in_range(&self, x: FixedNum, z: FixedNum, radius: FixedNum, out: &mut Vec<EntityId>) {
        self.patches.get_in_range(x, z, radius, out)
    }
}

fn patch_entry(id: EntityId, record: &EntityRecord) -> PatchEntry {
    PatchEntry {
        id,
        position: record.position,
        footprint: record.footprint_radius,
        player: record.player,
        blocks_movement: record.blocks_movement,
    }
}
