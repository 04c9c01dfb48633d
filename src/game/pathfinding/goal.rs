use super::flag_cache::{NodeFlagCache, TileFlags};
use super::types::{NavContext, NEIGHBOR_OFFSETS};
use crate::game::entity::Mover;
use crate::game::error::NavError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::terrain::GridGeometry;
use crate::game::types::{Aabb, TileCoord};
use smallvec::SmallVec;

/// Destination, acceptance radius and the domain rules a search runs against.
///
/// The engine is generic over this trait so that coarser goal kinds (region or
/// portal graphs) can plug into the same open/closed bookkeeping.
pub trait AStarGoal {
    fn set_destination(&mut self, destination: FixedVec2);
    /// Acceptance radius in world units.
    fn set_radius(&mut self, radius: FixedNum);
    fn radius(&self) -> FixedNum;

    /// Heuristic: Euclidean distance to the destination tile, in tiles.
    fn distance_to_goal(&self, tile: TileCoord) -> FixedNum;
    fn is_at_goal(&self, tile: TileCoord) -> bool;
    /// Cost of the step `from -> to`.
    fn tile_cost(&self, from: TileCoord, to: TileCoord) -> FixedNum;

    fn is_passable(&self, ctx: &NavContext<'_>, tile: TileCoord, mover: &dyn Mover) -> bool;

    /// Passable Moore neighbours of `tile` in [`NEIGHBOR_OFFSETS`] order.
    ///
    /// `cache` memoises passability for the current search.
    fn neighbors(
        &self,
        ctx: &NavContext<'_>,
        tile: TileCoord,
        mover: &dyn Mover,
        cache: &mut NodeFlagCache,
        out: &mut SmallVec<[TileCoord; 8]>,
    );

    /// World point of a tile (its centre).
    fn coord(&self, tile: TileCoord) -> FixedVec2;
    /// Tile of a world point; errors instead of clamping when off the map.
    fn tile(&self, point: FixedVec2) -> Result<TileCoord, NavError>;
    /// Tile extent the flag cache must cover.
    fn extent(&self) -> (u32, u32);
}

/// Goal over raw terrain tiles.
///
/// A tile is passable when it is on the map, the terrain lets the mover's
/// movement class through, and no blocking entity of another player overlaps
/// a tile-sized box centred on it.
#[derive(Clone, Debug)]
pub struct LowLevelGoal {
    geometry: GridGeometry,
    destination: FixedVec2,
    destination_tile: TileCoord,
    radius: FixedNum,
    /// `radius² / cell_size²`, the squared acceptance distance in tiles.
    accept_sq: FixedNum,
    radius_edge_bias: bool,
}

impl LowLevelGoal {
    pub fn new(geometry: GridGeometry, radius_edge_bias: bool) -> Self {
        Self {
            geometry,
            destination: FixedVec2::ZERO,
            destination_tile: TileCoord::default(),
            radius: FixedNum::ZERO,
            accept_sq: FixedNum::ZERO,
            radius_edge_bias,
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn destination(&self) -> FixedVec2 {
        self.destination
    }

    pub fn destination_tile(&self) -> TileCoord {
        self.destination_tile
    }

    pub fn radius_edge_bias(&self) -> bool {
        self.radius_edge_bias
    }
}

impl AStarGoal for LowLevelGoal {
    fn set_destination(&mut self, destination: FixedVec2) {
        self.destination = destination;
        self.destination_tile = self.geometry.world_to_tile(destination);
    }

    fn set_radius(&mut self, radius: FixedNum) {
        self.radius = radius;
        let cell = self.geometry.cell_size;
        self.accept_sq = (radius * radius) / (cell * cell);
    }

    fn radius(&self) -> FixedNum {
        self.radius
    }

    fn distance_to_goal(&self, tile: TileCoord) -> FixedNum {
        tile.distance(self.destination_tile)
    }

    fn is_at_goal(&self, tile: TileCoord) -> bool {
        FixedNum::from_num(tile.distance_squared(self.destination_tile)) <= self.accept_sq
    }

    fn tile_cost(&self, from: TileCoord, to: TileCoord) -> FixedNum {
        let step = from.distance(to);
        if self.radius_edge_bias {
            // World-unit radius subtracted from a tile-unit step, as the legacy movement expects
            step - self.radius
        } else {
            step
        }
    }

    fn is_passable(&self, ctx: &NavContext<'_>, tile: TileCoord, mover: &dyn Mover) -> bool {
        if !self.geometry.in_bounds(tile) {
            return false;
        }
        if !ctx.terrain.is_passable(tile, mover.movement_class()) {
            return false;
        }
        let half = self.geometry.cell_size / FixedNum::from_num(2);
        let bounds = Aabb::centered(self.coord(tile), half);
        ctx.spatial.collision_object(&bounds, Some(mover.player())).is_none()
    }

    fn neighbors(
        &self,
        ctx: &NavContext<'_>,
        tile: TileCoord,
        mover: &dyn Mover,
        cache: &mut NodeFlagCache,
        out: &mut SmallVec<[TileCoord; 8]>,
    ) {
        for (di, dj) in NEIGHBOR_OFFSETS {
            let n = tile.offset(di, dj);
            if !self.geometry.in_bounds(n) {
                continue;
            }

            let flags = cache.get(n);
            let passable = if flags.contains(TileFlags::PASSABLE) {
                true
            } else if flags.contains(TileFlags::BLOCKED) {
                false
            } else {
                let passable = self.is_passable(ctx, n, mover);
                cache.insert(n, if passable { TileFlags::PASSABLE } else { TileFlags::BLOCKED });
                passable
            };

            if passable {
                out.push(n);
            }
        }
    }

    fn coord(&self, tile: TileCoord) -> FixedVec2 {
        self.geometry.tile_to_world(tile)
    }

    fn tile(&self, point: FixedVec2) -> Result<TileCoord, NavError> {
        self.geometry
            .checked_world_to_tile(point)
            .ok_or(NavError::InvalidCoordinate { x: point.x, z: point.y })
    }

    fn extent(&self) -> (u32, u32) {
        (self.geometry.tiles_per_side, self.geometry.tiles_per_side)
    }
}
