use crate::game::types::TileCoord;
use bitflags::bitflags;

bitflags! {
    /// Per-tile search bookkeeping.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TileFlags: u8 {
        const OPEN = 1 << 0;
        const CLOSED = 1 << 1;
        /// Passability has been evaluated and the tile is passable.
        const PASSABLE = 1 << 2;
        /// Passability has been evaluated and the tile is blocked.
        const BLOCKED = 1 << 3;
    }
}

/// Dense flag array over the active search region.
///
/// Membership tests on the hot path read this instead of hashing. Passability
/// results are memoised here as well, so each tile is evaluated against the
/// terrain and spatial grid at most once per search.
#[derive(Clone, Debug, Default)]
pub struct NodeFlagCache {
    width: u32,
    height: u32,
    flags: Vec<TileFlags>,
}

impl NodeFlagCache {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flags: vec![TileFlags::empty(); width as usize * height as usize],
        }
    }

    /// Grow or shrink to a new region. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.flags.clear();
        self.flags.resize(width as usize * height as usize, TileFlags::empty());
    }

    /// Clear every flag in the region.
    pub fn reset(&mut self) {
        self.flags.fill(TileFlags::empty());
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.i < 0 || tile.j < 0 || tile.i as u32 >= self.width || tile.j as u32 >= self.height {
            return None;
        }
        Some(tile.j as usize * self.width as usize + tile.i as usize)
    }

    /// Flags of a tile; empty outside the region.
    #[inline]
    pub fn get(&self, tile: TileCoord) -> TileFlags {
        self.index(tile).map(|idx| self.flags[idx]).unwrap_or_default()
    }

    #[inline]
    pub fn contains(&self, tile: TileCoord, flags: TileFlags) -> bool {
        self.get(tile).contains(flags)
    }

    /// Set flags on a tile. Returns false if the tile is outside the region.
    #[inline]
    pub fn insert(&mut self, tile: TileCoord, flags: TileFlags) -> bool {
        match self.index(tile) {
            Some(idx) => {
                self.flags[idx].insert(flags);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn remove(&mut self, tile: TileCoord, flags: TileFlags) {
        if let Some(idx) = self.index(tile) {
            self.flags[idx].remove(flags);
        }
    }
}
