use super::astar::AStarEngine;
use super::goal::AStarGoal;
use super::types::NavContext;
use crate::game::entity::Mover;
use crate::game::error::NavError;
use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::types::TileCoord;

/// Outcome of [`request_path`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathResult {
    pub waypoints: Vec<FixedVec2>,
    pub solved: bool,
    /// True when the straight line was clear and A* never ran.
    pub direct: bool,
}

/// Whether every tile on the Bresenham line `from -> to` is passable for `mover`.
pub fn line_is_clear<G: AStarGoal>(
    goal: &G,
    ctx: &NavContext<'_>,
    from: TileCoord,
    to: TileCoord,
    mover: &dyn Mover,
) -> bool {
    let (mut x0, mut y0) = (from.i, from.j);
    let (x1, y1) = (to.i, to.j);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if !goal.is_passable(ctx, TileCoord::new(x0, y0), mover) {
            return false;
        }
        if x0 == x1 && y0 == y1 {
            return true;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Path a mover from its current position toward `dest`.
///
/// A clear straight line short-circuits to a single waypoint at `dest`;
/// anything else goes through the engine's A* search.
pub fn request_path<G: AStarGoal>(
    engine: &mut AStarEngine<G>,
    ctx: &NavContext<'_>,
    mover: &dyn Mover,
    dest: FixedVec2,
    radius: FixedNum,
) -> Result<PathResult, NavError> {
    let src = mover.position();
    let start = engine.goal().tile(src)?;
    let goal_tile = engine.goal().tile(dest)?;

    if line_is_clear(engine.goal(), ctx, start, goal_tile, mover) {
        return Ok(PathResult {
            waypoints: vec![dest],
            solved: true,
            direct: true,
        });
    }

    let solved = engine.find_path(ctx, src, dest, mover, radius)?;
    Ok(PathResult {
        waypoints: engine.last_path().to_vec(),
        solved,
        direct: false,
    })
}
