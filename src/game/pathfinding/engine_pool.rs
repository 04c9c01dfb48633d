use super::astar::AStarEngine;
use crate::game::config::NavSettings;
use crate::game::terrain::GridGeometry;
use tracing::trace;

/// Stack of idle engines for running several searches in one tick.
///
/// Each engine owns its node pool and goal, so two movers never share search
/// state. Engines are created lazily and kept for reuse after release.
pub struct EnginePool {
    geometry: GridGeometry,
    settings: NavSettings,
    idle: Vec<AStarEngine>,
    created: usize,
}

impl EnginePool {
    pub fn new(geometry: GridGeometry, settings: NavSettings) -> Self {
        Self {
            geometry,
            settings,
            idle: Vec::new(),
            created: 0,
        }
    }

    /// Take an idle engine, building a fresh one if none is left.
    pub fn acquire(&mut self) -> AStarEngine {
        if let Some(engine) = self.idle.pop() {
            return engine;
        }
        self.created += 1;
        trace!("[PATHFINDING] EnginePool created engine #{}", self.created);
        AStarEngine::new(self.geometry, &self.settings)
    }

    pub fn release(&mut self, engine: AStarEngine) {
        self.idle.push(engine);
    }

    /// Run `f` with an engine that is returned to the pool afterwards.
    pub fn with_engine<R>(&mut self, f: impl FnOnce(&mut AStarEngine) -> R) -> R {
        let mut engine = self.acquire();
        let result = f(&mut engine);
        self.release(engine);
        result
    }

    /// Engines currently waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Engines built over the pool's lifetime.
    pub fn created_count(&self) -> usize {
        self.created
    }
}
