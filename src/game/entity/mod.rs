//! Generational entity arena.
//!
//! Stands in for a fixed-size handle table: slots grow on demand, despawned
//! slots are reused, and a generation counter makes stale ids detectable.
//! Iteration is always in ascending slot order so every pass over the
//! entities is deterministic.

use crate::game::error::NavError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::territory::TerritoryId;
use crate::game::types::{MovementClass, PlayerId};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Stable handle to an entity in an [`EntityArena`].
///
/// Ordering is by slot index first, which is the order every deterministic
/// pass over entities uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

/// Everything the navigation core needs to know about one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    pub position: FixedVec2,
    pub player: PlayerId,
    /// Collision footprint radius in world units. Zero for point entities.
    pub footprint_radius: FixedNum,
    /// Sight radius in tiles. Zero means the entity reveals nothing.
    pub sight_radius: u32,
    pub movement_class: MovementClass,
    /// Whether other movers treat this entity as an obstacle.
    pub blocks_movement: bool,
    /// Whether this entity anchors a territory (e.g. a settlement).
    pub territory_center: bool,
    /// Back-reference to the territory this entity anchors. Weak: owned by the index.
    pub territory: Option<TerritoryId>,
    /// Collision patch currently holding this entity, kept in sync by the owner.
    pub patch: Option<usize>,
}

impl EntityRecord {
    pub fn new(position: FixedVec2, player: PlayerId) -> Self {
        Self {
            position,
            player,
            footprint_radius: FixedNum::ZERO,
            sight_radius: 0,
            movement_class: MovementClass::Land,
            blocks_movement: false,
            territory_center: false,
            territory: None,
            patch: None,
        }
    }

    pub fn with_footprint(mut self, radius: FixedNum) -> Self {
        self.footprint_radius = radius;
        self.blocks_movement = true;
        self
    }

    pub fn with_sight(mut self, tiles: u32) -> Self {
        self.sight_radius = tiles;
        self
    }

    pub fn with_movement_class(mut self, class: MovementClass) -> Self {
        self.movement_class = class;
        self
    }

    pub fn as_territory_center(mut self) -> Self {
        self.territory_center = true;
        self
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    record: Option<EntityRecord>,
}

/// Growable slab of entities with generation-checked handles.
#[derive(Clone, Debug, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, record: EntityRecord) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.record = Some(record);
            return EntityId { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, record: Some(record) });
        EntityId { index, generation: 0 }
    }

    /// Remove an entity, returning its last record.
    pub fn despawn(&mut self, id: EntityId) -> Result<EntityRecord, NavError> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation && s.record.is_some())
            .ok_or(NavError::UnknownEntity(id))?;

        let record = slot.record.take().ok_or(NavError::UnknownEntity(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Ok(record)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.record.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.record.as_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record.as_ref().map(|record| {
                (EntityId { index: index as u32, generation: slot.generation }, record)
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut EntityRecord)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.record.as_mut().map(|record| (EntityId { index: index as u32, generation }, record))
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

/// The entity a path is being computed for.
pub trait Mover {
    /// Arena handle, if the mover is a real entity.
    fn entity(&self) -> Option<EntityId>;
    fn player(&self) -> PlayerId;
    fn position(&self) -> FixedVec2;
    fn movement_class(&self) -> MovementClass;
}

/// Borrowed view of an arena entity acting as a mover.
#[derive(Clone, Copy, Debug)]
pub struct MoverRef<'a> {
    pub id: EntityId,
    pub record: &'a EntityRecord,
}

impl<'a> MoverRef<'a> {
    pub fn new(id: EntityId, record: &'a EntityRecord) -> Self {
        Self { id, record }
    }

    pub fn from_arena(arena: &'a EntityArena, id: EntityId) -> Result<Self, NavError> {
        arena
            .get(id)
            .map(|record| Self { id, record })
            .ok_or(NavError::UnknownEntity(id))
    }
}

impl Mover for MoverRef<'_> {
    fn entity(&self) -> Option<EntityId> {
        Some(self.id)
    }

    fn player(&self) -> PlayerId {
        self.record.player
    }

    fn position(&self) -> FixedVec2 {
        self.record.position
    }

    fn movement_class(&self) -> MovementClass {
        self.record.movement_class
    }
}

/// A mover that is not an arena entity (UI previews, AI planning probes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Probe {
    pub player: PlayerId,
    pub position: FixedVec2,
    pub movement_class: MovementClass,
}

impl Probe {
    pub fn new(player: PlayerId, position: FixedVec2) -> Self {
        Self { player, position, movement_class: MovementClass::Land }
    }
}

impl Mover for Probe {
    fn entity(&self) -> Option<EntityId> {
        None
    }

    fn player(&self) -> PlayerId {
        self.player
    }

    fn position(&self) -> FixedVec2 {
        self.position
    }

    fn movement_class(&self) -> MovementClass {
        self.movement_class
    }
}
