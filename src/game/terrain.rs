//! Terrain collaborator: passability, height and tile/world conversion.

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::types::{MovementClass, TileCoord};
use fixedbitset::FixedBitSet;

/// Tile grid geometry shared by every grid-based index.
///
/// The map is a square of `tiles_per_side` tiles with its origin at (0, 0).
/// World points map to tiles by floor division by `cell_size`; tiles map back
/// to the world at their centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub tiles_per_side: u32,
    pub cell_size: FixedNum,
}

impl GridGeometry {
    pub fn new(tiles_per_side: u32, cell_size: FixedNum) -> Self {
        Self { tiles_per_side, cell_size }
    }

    #[inline]
    pub fn in_bounds(&self, tile: TileCoord) -> bool {
        tile.i >= 0 && tile.j >= 0 &&
        (tile.i as u32) < self.tiles_per_side && (tile.j as u32) < self.tiles_per_side
    }

    /// Floor division. Points beyond `i32` tile range saturate, which is
    /// always off the map. Use [`Self::checked_world_to_tile`] at API edges.
    #[inline]
    pub fn world_to_tile(&self, point: FixedVec2) -> TileCoord {
        TileCoord::new(
            (point.x / self.cell_size).floor().saturating_to_num::<i32>(),
            (point.y / self.cell_size).floor().saturating_to_num::<i32>(),
        )
    }

    /// Tile under `point`, or `None` when the point is off the map.
    ///
    /// The range check runs in fixed point before any integer conversion.
    pub fn checked_world_to_tile(&self, point: FixedVec2) -> Option<TileCoord> {
        let size = self.world_size();
        if point.x < FixedNum::ZERO || point.x >= size || point.y < FixedNum::ZERO || point.y >= size {
            return None;
        }
        let tile = self.world_to_tile(point);
        self.in_bounds(tile).then_some(tile)
    }

    #[inline]
    pub fn tile_to_world(&self, tile: TileCoord) -> FixedVec2 {
        let half = self.cell_size / FixedNum::from_num(2);
        FixedVec2::new(
            FixedNum::from_num(tile.i) * self.cell_size + half,
            FixedNum::from_num(tile.j) * self.cell_size + half,
        )
    }

    /// Side length of the whole map in world units.
    pub fn world_size(&self) -> FixedNum {
        FixedNum::from_num(self.tiles_per_side) * self.cell_size
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_per_side as usize * self.tiles_per_side as usize
    }

    /// Row-major index of an in-bounds tile.
    #[inline]
    pub fn index(&self, tile: TileCoord) -> Option<usize> {
        if self.in_bounds(tile) {
            Some(tile.j as usize * self.tiles_per_side as usize + tile.i as usize)
        } else {
            None
        }
    }
}

/// What the navigation core asks of the terrain.
pub trait Terrain {
    fn is_passable(&self, tile: TileCoord, class: MovementClass) -> bool;
    fn height(&self, x: FixedNum, z: FixedNum) -> FixedNum;
    fn tiles_per_side(&self) -> u32;
    fn cell_size(&self) -> FixedNum;

    fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.tiles_per_side(), self.cell_size())
    }

    fn tile_to_world(&self, tile: TileCoord) -> FixedVec2 {
        self.geometry().tile_to_world(tile)
    }

    fn world_to_tile(&self, point: FixedVec2) -> TileCoord {
        self.geometry().world_to_tile(point)
    }
}

/// Dense terrain with per-movement-class blocking and a vertex heightmap.
#[derive(Clone, Debug)]
pub struct TileMap {
    geometry: GridGeometry,
    /// One bitset per [`MovementClass`]; a set bit blocks that class.
    blocked: Vec<FixedBitSet>,
    /// `(tiles_per_side + 1)²` vertex heights, row-major.
    heights: Vec<FixedNum>,
}

impl TileMap {
    pub fn new(tiles_per_side: u32, cell_size: FixedNum) -> Self {
        let geometry = GridGeometry::new(tiles_per_side, cell_size);
        let tiles = geometry.tile_count();
        let verts = (tiles_per_side as usize + 1) * (tiles_per_side as usize + 1);
        Self {
            geometry,
            blocked: MovementClass::ALL.iter().map(|_| FixedBitSet::with_capacity(tiles)).collect(),
            heights: vec![FixedNum::ZERO; verts],
        }
    }

    pub fn set_blocked(&mut self, tile: TileCoord, class: MovementClass, blocked: bool) {
        if let Some(idx) = self.geometry.index(tile) {
            self.blocked[class.as_index()].set(idx, blocked);
        }
    }

    /// Block a tile for every movement class (cliffs, walls).
    pub fn block_all(&mut self, tile: TileCoord) {
        for class in MovementClass::ALL {
            self.set_blocked(tile, class, true);
        }
    }

    /// Block every land tile and open it to ships, or the reverse.
    pub fn set_water(&mut self, tile: TileCoord, water: bool) {
        self.set_blocked(tile, MovementClass::Land, water);
        self.set_blocked(tile, MovementClass::Naval, !water);
    }

    pub fn set_vertex_height(&mut self, vi: u32, vj: u32, height: FixedNum) {
        let side = self.geometry.tiles_per_side as usize + 1;
        if (vi as usize) < side && (vj as usize) < side {
            self.heights[vj as usize * side + vi as usize] = height;
        }
    }

    fn vertex_height(&self, vi: usize, vj: usize) -> FixedNum {
        let side = self.geometry.tiles_per_side as usize + 1;
        let vi = vi.min(side - 1);
        let vj = vj.min(side - 1);
        self.heights[vj * side + vi]
    }
}

impl Terrain for TileMap {
    fn is_passable(&self, tile: TileCoord, class: MovementClass) -> bool {
        match self.geometry.index(tile) {
            Some(idx) => !self.blocked[class.as_index()].contains(idx),
            None => false,
        }
    }

    /// Bilinear interpolation over the vertex grid, clamped to the map.
    fn height(&self, x: FixedNum, z: FixedNum) -> FixedNum {
        let size = self.geometry.world_size();
        let x = x.clamp(FixedNum::ZERO, size);
        let z = z.clamp(FixedNum::ZERO, size);

        let fx = x / self.geometry.cell_size;
        let fz = z / self.geometry.cell_size;
        let vi = fx.floor().to_num::<usize>();
        let vj = fz.floor().to_num::<usize>();
        let tx = fx.frac();
        let tz = fz.frac();

        let h00 = self.vertex_height(vi, vj);
        let h10 = self.vertex_height(vi + 1, vj);
        let h01 = self.vertex_height(vi, vj + 1);
        let h11 = self.vertex_height(vi + 1, vj + 1);

        let bottom = h00 + (h10 - h00) * tx;
        let top = h01 + (h11 - h01) * tx;
        bottom + (top - bottom) * tz
    }

    fn tiles_per_side(&self) -> u32 {
        self.geometry.tiles_per_side
    }

    fn cell_size(&self) -> FixedNum {
        self.geometry.cell_size
    }

    fn geometry(&self) -> GridGeometry {
        self.geometry
    }
}
