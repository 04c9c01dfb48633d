//! Voronoi territories around territory-center entities.
//!
//! Every recalculation throws away all territories and rebuilds them: each
//! center's boundary is the map square clipped against the perpendicular
//! bisector with every other center, and each tile is owned by the nearest
//! center. Recalculation is rare (center spawned or destroyed), so both steps
//! are brute force.

mod clipping;


pub use clipping::{clip_to_bisector, convex_contains, doubled_area, map_rectangle, Polygon};

use crate::game::entity::{EntityArena, EntityId};
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::profiling::profile;
use crate::game::terrain::GridGeometry;
use crate::game::types::{PlayerId, TileCoord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Index of a territory in the current [`TerritoryIndex`] generation.
///
/// Ids are reassigned on every recalculation; do not hold them across one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Territory {
    pub id: TerritoryId,
    pub owner: PlayerId,
    /// Anchoring entity. `None` for the map-wide Gaia territory.
    pub center: Option<EntityId>,
    /// Convex counter-clockwise ring, first vertex not repeated.
    pub boundary: Polygon,
}

impl Territory {
    /// Whether a world point lies inside or on the boundary polygon.
    pub fn contains(&self, point: FixedVec2) -> bool {
        convex_contains(&self.boundary, point)
    }
}

/// Per-tile territory lookup rebuilt wholesale by [`TerritoryIndex::recalculate`].
#[derive(Clone, Debug)]
pub struct TerritoryIndex {
    geometry: GridGeometry,
    territories: Vec<Territory>,
    /// One entry per tile, row-major.
    tiles: Vec<Option<TerritoryId>>,
    dirty: bool,
}

impl TerritoryIndex {
    /// Empty index over a map. Starts dirty so the first update builds it.
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            territories: Vec::new(),
            tiles: vec![None; geometry.tile_count()],
            dirty: true,
        }
    }

    /// Defer recalculation to the next [`Self::update`].
    pub fn delayed_recalculate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recalculate if marked dirty. Returns whether a rebuild ran.
    pub fn update(&mut self, entities: &mut EntityArena) -> bool {
        if !self.dirty {
            return false;
        }
        self.recalculate(entities);
        true
    }

    /// Rebuild every territory from the current territory centers.
    ///
    /// Centers are processed in arena slot order; that order also breaks
    /// distance ties during tile assignment.
    #[profile(4)]
    pub fn recalculate(&mut self, entities: &mut EntityArena) {
        for territory in self.territories.drain(..) {
            if let Some(record) = territory.center.and_then(|id| entities.get_mut(id)) {
                record.territory = None;
            }
        }

        let centers: Vec<(EntityId, PlayerId, FixedVec2)> = entities
            .iter()
            .filter(|(_, record)| record.territory_center)
            .map(|(id, record)| (id, record.player, record.position))
            .collect();

        let map = map_rectangle(self.geometry.world_size());

        if centers.is_empty() {
            self.territories.push(Territory {
                id: TerritoryId(0),
                owner: PlayerId::GAIA,
                center: None,
                boundary: map,
            });
            self.tiles.fill(Some(TerritoryId(0)));
            self.dirty = false;
            info!("[TERRITORY] No territory centers, Gaia owns all {} tiles", self.tiles.len());
            return;
        }

        for (k, &(center_id, owner, position)) in centers.iter().enumerate() {
            let mut boundary = map.clone();
            for (m, &(other_id, _, other_pos)) in centers.iter().enumerate() {
                if m == k {
                    continue;
                }
                if other_pos == position {
                    debug!("[TERRITORY] Centers {:?} and {:?} coincide, skipping bisector", center_id, other_id);
                    continue;
                }
                boundary = clip_to_bisector(&boundary, position, other_pos);
                if boundary.is_empty() {
                    break;
                }
            }

            let id = TerritoryId(k as u32);
            if let Some(record) = entities.get_mut(center_id) {
                record.territory = Some(id);
            }
            self.territories.push(Territory { id, owner, center: Some(center_id), boundary });
        }

        self.assign_tiles(&centers);
        self.dirty = false;

        info!("[TERRITORY] Recalculated {} territories over {} tiles", self.territories.len(), self.tiles.len());
    }

    /// Give every tile to the center nearest its midpoint; first strictly-closer wins.
    fn assign_tiles(&mut self, centers: &[(EntityId, PlayerId, FixedVec2)]) {
        let side = self.geometry.tiles_per_side as i32;
        for j in 0..side {
            for i in 0..side {
                let tile = TileCoord::new(i, j);
                let point = self.geometry.tile_to_world(tile);

                let mut best: Option<(usize, FixedNum)> = None;
                for (k, &(_, _, center)) in centers.iter().enumerate() {
                    let d2 = point.distance_squared(center);
                    if best.map_or(true, |(_, b)| d2 < b) {
                        best = Some((k, d2));
                    }
                }

                if let Some(idx) = self.geometry.index(tile) {
                    self.tiles[idx] = best.map(|(k, _)| TerritoryId(k as u32));
                }
            }
        }
    }

    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(id.0 as usize)
    }

    pub fn territory_at_tile(&self, tile: TileCoord) -> Option<&Territory> {
        let idx = self.geometry.index(tile)?;
        self.tiles[idx].and_then(|id| self.territory(id))
    }

    pub fn territory_at_world(&self, point: FixedVec2) -> Option<&Territory> {
        self.territory_at_tile(self.geometry.world_to_tile(point))
    }

    /// Number of tiles owned by a territory.
    pub fn tiles_of(&self, id: TerritoryId) -> usize {
        self.tiles.iter().filter(|&&t| t == Some(id)).count()
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }
}
