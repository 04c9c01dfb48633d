use super::VisibilityGrid;
use crate::game::error::NavError;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Explored masks of a match, for save games and replays.
///
/// Visible masks are not stored; they are rebuilt by the next update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploredSnapshot {
    pub version: u32,
    pub tiles_per_side: u32,
    pub explored: Vec<u32>,
}

impl ExploredSnapshot {
    pub fn capture(grid: &VisibilityGrid) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tiles_per_side: grid.geometry().tiles_per_side,
            explored: grid.explored_masks().to_vec(),
        }
    }

    /// Overwrite the grid's explored masks. Fails if the snapshot is for another map.
    pub fn apply(self, grid: &mut VisibilityGrid) -> Result<(), NavError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(NavError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        let side = grid.geometry().tiles_per_side;
        if self.tiles_per_side != side || self.explored.len() != grid.geometry().tile_count() {
            return Err(NavError::Snapshot(format!(
                "snapshot is for a {}-tile map, grid has {} tiles per side",
                self.tiles_per_side, side
            )));
        }
        grid.restore_explored(self.explored);
        Ok(())
    }

    /// Zlib-compressed bincode.
    pub fn encode(&self) -> Result<Vec<u8>, NavError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        bincode::serialize_into(&mut encoder, self).map_err(|e| NavError::Snapshot(e.to_string()))?;
        Ok(encoder.finish()?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, NavError> {
        let mut decoder = ZlibDecoder::new(bytes);
        bincode::deserialize_from(&mut decoder).map_err(|e| NavError::Snapshot(e.to_string()))
    }
}

impl VisibilityGrid {
    /// Write the explored masks to `path`.
    pub fn save_explored(&self, path: impl AsRef<Path>) -> Result<(), NavError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let mut encoder = ZlibEncoder::new(writer, Compression::default());
        bincode::serialize_into(&mut encoder, &ExploredSnapshot::capture(self))
            .map_err(|e| NavError::Snapshot(e.to_string()))?;
        encoder.finish()?.flush()?;
        info!("[LOS] Saved explored state to {}", path.display());
        Ok(())
    }

    /// Replace the explored masks with the ones stored at `path`.
    pub fn load_explored(&mut self, path: impl AsRef<Path>) -> Result<(), NavError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut decoder = ZlibDecoder::new(reader);
        let snapshot: ExploredSnapshot =
            bincode::deserialize_from(&mut decoder).map_err(|e| NavError::Snapshot(e.to_string()))?;
        snapshot.apply(self)?;
        info!("[LOS] Loaded explored state from {}", path.display());
        Ok(())
    }
}
