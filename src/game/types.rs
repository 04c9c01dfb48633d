use crate::game::fixed_math::{FixedNum, FixedVec2};
use serde::{Deserialize, Serialize};

/// Integer cell index on the pathfinding/LOS/territory grid.
///
/// `i` runs along world x, `j` along world z. Ordering is (i, j) lexicographic,
/// which is only used to make ordered containers deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub i: i32,
    pub j: i32,
}

impl TileCoord {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    #[inline]
    pub fn offset(self, di: i32, dj: i32) -> Self {
        Self { i: self.i + di, j: self.j + dj }
    }

    /// Squared Euclidean distance in tile units.
    #[inline]
    pub fn distance_squared(self, other: Self) -> i64 {
        let di = (self.i - other.i) as i64;
        let dj = (self.j - other.j) as i64;
        di * di + dj * dj
    }

    /// Euclidean distance in tile units.
    pub fn distance(self, other: Self) -> FixedNum {
        let d2 = self.distance_squared(other);
        if d2 == 0 {
            return FixedNum::ZERO;
        }
        FixedNum::from_num(d2).sqrt()
    }
}

/// Owning player. Player 0 is Gaia (neutral).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const GAIA: PlayerId = PlayerId(0);

    /// Highest player count a `u32` LOS bitmask can hold.
    pub const MAX_PLAYERS: usize = 32;

    /// Bit for this player in LOS masks. `None` for ids that do not fit.
    #[inline]
    pub fn bit(self) -> Option<u32> {
        if (self.0 as usize) < Self::MAX_PLAYERS {
            Some(1u32 << self.0)
        } else {
            None
        }
    }
}

/// Movement class a terrain collaborator uses to decide passability.
///
/// The repr(u8) ensures zero-cost conversion to array indices.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MovementClass {
    #[default]
    Land = 0,
    Naval = 1,
    Amphibious = 2,
}

impl MovementClass {
    #[inline]
    pub fn as_index(self) -> usize {
        self as usize
    }

    pub const ALL: [MovementClass; 3] = [
        MovementClass::Land,
        MovementClass::Naval,
        MovementClass::Amphibious,
    ];
}

/// Axis-aligned bounding box on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: FixedVec2,
    pub max: FixedVec2,
}

impl Aabb {
    pub fn new(min: FixedVec2, max: FixedVec2) -> Self {
        Self { min, max }
    }

    /// Box of the given half extent around `center`.
    pub fn centered(center: FixedVec2, half_extent: FixedNum) -> Self {
        let half = FixedVec2::new(half_extent, half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, point: FixedVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Grow the box by `amount` on every side.
    pub fn inflate(&self, amount: FixedNum) -> Self {
        let pad = FixedVec2::new(amount, amount);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Closed test: a circle touching the boundary counts as overlapping.
    pub fn intersects_circle(&self, center: FixedVec2, radius: FixedNum) -> bool {
        let closest = FixedVec2::new(
            center.x.clamp(self.min.x, self.max.x),
            center.y.clamp(self.min.y, self.max.y),
        );
        closest.distance_squared(center) <= radius * radius
    }
}
