//! Per-player line-of-sight and exploration masks.
//!
//! Two dense `u32` arrays, one bit per player: `visible` is rebuilt from
//! scratch every update, `explored` only ever gains bits until an explicit
//! [`VisibilityGrid::reset`].

mod snapshot;


pub use snapshot::{ExploredSnapshot, SNAPSHOT_VERSION};

use crate::game::config::{NavSettings, RevealMode};
use crate::game::entity::{EntityArena, EntityId};
use crate::game::error::NavError;
use crate::game::fixed_math::FixedVec2;
use crate::game::profiling::profile;
use crate::game::terrain::GridGeometry;
use crate::game::types::{PlayerId, TileCoord};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// What a player knows about a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LosStatus {
    Unexplored,
    Explored,
    Visible,
}

#[derive(Clone, Debug)]
pub struct VisibilityGrid {
    geometry: GridGeometry,
    max_players: usize,
    reveal_mode: RevealMode,
    explored: Vec<u32>,
    visible: Vec<u32>,
}

impl VisibilityGrid {
    pub fn new(geometry: GridGeometry, settings: &NavSettings) -> Self {
        let tiles = geometry.tile_count();
        Self {
            geometry,
            max_players: settings.max_players,
            reveal_mode: settings.reveal_mode,
            explored: vec![0; tiles],
            visible: vec![0; tiles],
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn reveal_mode(&self) -> RevealMode {
        self.reveal_mode
    }

    pub fn set_reveal_mode(&mut self, mode: RevealMode) {
        self.reveal_mode = mode;
    }

    /// Recompute visibility from every entity with a sight radius.
    ///
    /// Clears `visible`, then for each sighted entity sets its player's bit in
    /// both masks for every tile within `sight_radius` tiles (squared integer
    /// distance from the entity's tile), clamped to the map.
    #[profile]
    pub fn update(&mut self, entities: &EntityArena) {
        self.visible.fill(0);

        let side = self.geometry.tiles_per_side as i64;
        let mut sources = 0usize;
        for (id, record) in entities.iter() {
            if record.sight_radius == 0 {
                continue;
            }
            let Some(bit) = self.player_bit(record.player) else {
                warn!("[LOS] Entity {:?} belongs to untracked player {:?}", id, record.player);
                continue;
            };
            sources += 1;

            let origin = self.geometry.world_to_tile(record.position);
            let (ci, cj) = (origin.i as i64, origin.j as i64);
            let r = record.sight_radius as i64;
            let r2 = r * r;

            let j_min = (cj - r).max(0);
            let j_max = (cj + r).min(side - 1);
            let i_min = (ci - r).max(0);
            let i_max = (ci + r).min(side - 1);

            for j in j_min..=j_max {
                let dj = j - cj;
                let row = (j * side) as usize;
                for i in i_min..=i_max {
                    let di = i - ci;
                    if di * di + dj * dj <= r2 {
                        let idx = row + i as usize;
                        self.visible[idx] |= bit;
                        self.explored[idx] |= bit;
                    }
                }
            }
        }

        trace!("[LOS] Updated visibility from {} sources", sources);
    }

    fn player_bit(&self, player: PlayerId) -> Option<u32> {
        if (player.0 as usize) < self.max_players {
            player.bit()
        } else {
            None
        }
    }

    /// Status of a tile for one player. Tiles off the map are always unexplored.
    pub fn status(&self, tile: TileCoord, player: PlayerId) -> LosStatus {
        let Some(idx) = self.geometry.index(tile) else {
            return LosStatus::Unexplored;
        };
        if self.reveal_mode == RevealMode::AllVisible {
            return LosStatus::Visible;
        }
        let Some(bit) = self.player_bit(player) else {
            return match self.reveal_mode {
                RevealMode::Explored => LosStatus::Explored,
                _ => LosStatus::Unexplored,
            };
        };

        if self.visible[idx] & bit != 0 {
            LosStatus::Visible
        } else if self.explored[idx] & bit != 0 || self.reveal_mode == RevealMode::Explored {
            LosStatus::Explored
        } else {
            LosStatus::Unexplored
        }
    }

    pub fn status_at_world(&self, point: FixedVec2, player: PlayerId) -> LosStatus {
        self.status(self.geometry.world_to_tile(point), player)
    }

    /// Status of the tile an entity stands on, as seen by `player`.
    pub fn entity_status(&self, entities: &EntityArena, id: EntityId, player: PlayerId) -> Result<LosStatus, NavError> {
        let record = entities.get(id).ok_or(NavError::UnknownEntity(id))?;
        Ok(self.status_at_world(record.position, player))
    }

    /// Forget everything every player has seen.
    pub fn reset(&mut self) {
        self.visible.fill(0);
        self.explored.fill(0);
    }

    /// Raw visible bits of a tile; zero off the map.
    pub fn visible_mask(&self, tile: TileCoord) -> u32 {
        self.geometry.index(tile).map_or(0, |idx| self.visible[idx])
    }

    /// Raw explored bits of a tile; zero off the map.
    pub fn explored_mask(&self, tile: TileCoord) -> u32 {
        self.geometry.index(tile).map_or(0, |idx| self.explored[idx])
    }

    /// Tiles a player has ever seen.
    pub fn explored_count(&self, player: PlayerId) -> usize {
        let Some(bit) = self.player_bit(player) else {
            return 0;
        };
        self.explored.iter().filter(|&&m| m & bit != 0).count()
    }

    /// Tiles a player sees right now.
    pub fn visible_count(&self, player: PlayerId) -> usize {
        let Some(bit) = self.player_bit(player) else {
            return 0;
        };
        self.visible.iter().filter(|&&m| m & bit != 0).count()
    }

    pub(crate) fn explored_masks(&self) -> &[u32] {
        &self.explored
    }

    pub(crate) fn restore_explored(&mut self, explored: Vec<u32>) {
        self.explored = explored;
    }
}
