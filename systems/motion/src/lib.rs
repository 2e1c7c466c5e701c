#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Circle-versus-grid motion with axis-separated sliding.
//!
//! Each displacement is split into short sub-steps and every sub-step is
//! attempted along X and then along Y independently. A blocked axis zeroes
//! the matching velocity component while the other axis still advances, so
//! bodies slide along walls instead of sticking to corners.

use dread_maze_core::{cell_center, Body, CellCoord, Grid};
use glam::Vec2;

/// Longest displacement attempted in a single sub-step, in tiles.
pub const MAX_SUB_STEP: f32 = 0.2;

/// Upper bound on sub-steps for a single call.
const MAX_SUB_STEPS: usize = 64;

/// Scales applied to the offset from a probe centre during push-out.
const PUSH_OUT_SCALES: [f32; 4] = [0.75, 0.5, 0.25, 0.0];

/// Upper bound on candidate positions tested by a single push-out search.
pub const MAX_PUSH_OUT_PROBES: usize = 20;

/// Summary of a motion attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether any X sub-step was rejected.
    pub blocked_x: bool,
    /// Whether any Y sub-step was rejected.
    pub blocked_y: bool,
    /// Whether the body was pushed out of a wall before moving.
    pub pushed_out: bool,
}

/// Reports whether a circle overlaps any solid tile.
///
/// Uses the nearest point of each nearby solid tile's unit square; touching
/// a wall exactly is not an overlap. Non-finite centres always overlap.
#[must_use]
pub fn overlaps_wall(grid: &Grid, center: Vec2, radius: f32) -> bool {
    if !center.is_finite() || !radius.is_finite() {
        return true;
    }

    let min_column = (center.x - radius).floor() as i64;
    let max_column = (center.x + radius).floor() as i64;
    let min_row = (center.y - radius).floor() as i64;
    let max_row = (center.y + radius).floor() as i64;
    let radius_squared = radius * radius;

    for row in min_row..=max_row {
        for column in min_column..=max_column {
            if !grid.is_solid(column, row) {
                continue;
            }
            let left = column as f32;
            let top = row as f32;
            let nearest = Vec2::new(
                center.x.clamp(left, left + 1.0),
                center.y.clamp(top, top + 1.0),
            );
            if center.distance_squared(nearest) < radius_squared {
                return true;
            }
        }
    }

    false
}

/// Moves the body by `(dx, dy)` with axis-separated sliding.
///
/// The body never ends a sub-step overlapping a wall it was not already
/// overlapping. Non-finite displacements leave the body untouched.
pub fn move_body(grid: &Grid, body: &mut Body, dx: f32, dy: f32) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let displacement = Vec2::new(dx, dy);
    if !displacement.is_finite() || displacement == Vec2::ZERO {
        return outcome;
    }

    let longest = displacement.abs().max_element();
    let steps = ((longest / MAX_SUB_STEP).ceil() as usize).clamp(1, MAX_SUB_STEPS);
    let step = displacement / steps as f32;

    for _ in 0..steps {
        if step.x != 0.0 {
            let candidate = Vec2::new(body.position.x + step.x, body.position.y);
            if overlaps_wall(grid, candidate, body.radius) {
                outcome.blocked_x = true;
                body.velocity.x = 0.0;
            } else {
                body.position.x = candidate.x;
            }
        }
        if step.y != 0.0 {
            let candidate = Vec2::new(body.position.x, body.position.y + step.y);
            if overlaps_wall(grid, candidate, body.radius) {
                outcome.blocked_y = true;
                body.velocity.y = 0.0;
            } else {
                body.position.y = candidate.y;
            }
        }
    }

    outcome
}

/// Moves the body like [`move_body`], first pushing it out of any wall it
/// already overlaps (for example after knockback).
pub fn move_body_with_push_out(grid: &Grid, body: &mut Body, dx: f32, dy: f32) -> MoveOutcome {
    let pushed_out = overlaps_wall(grid, body.position, body.radius) && push_out(grid, body);
    let mut outcome = move_body(grid, body, dx, dy);
    outcome.pushed_out = pushed_out;
    outcome
}

/// Searches a bounded set of nearby positions for one that clears every wall.
///
/// Probes pull the body toward the centre of its tile and then toward the
/// centres of open cardinal neighbours. Returns `false` and leaves the body in
/// place when no probe clears.
pub fn push_out(grid: &Grid, body: &mut Body) -> bool {
    let Some(cell) = CellCoord::containing(body.position).filter(|cell| grid.contains(*cell))
    else {
        return false;
    };

    let mut anchors = Vec::with_capacity(5);
    if grid.is_floor(cell) {
        anchors.push(cell_center(cell));
    }
    anchors.extend(
        grid.cardinal_neighbors(cell)
            .filter(|neighbor| grid.is_floor(*neighbor))
            .map(cell_center),
    );

    let origin = body.position;
    let probes = anchors
        .iter()
        .flat_map(|anchor| {
            PUSH_OUT_SCALES
                .iter()
                .map(move |scale| *anchor + (origin - *anchor) * *scale)
        })
        .take(MAX_PUSH_OUT_PROBES);

    for candidate in probes {
        if !overlaps_wall(grid, candidate, body.radius) {
            body.position = candidate;
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_maze_core::Tile;

    fn room(width: u32, height: u32) -> Grid {
        let mut grid = Grid::filled(width, height, Tile::Wall);
        for row in 1..height - 1 {
            for column in 1..width - 1 {
                grid.set(CellCoord::new(column, row), Tile::Floor);
            }
        }
        grid
    }

    #[test]
    fn diagonal_move_into_wall_slides_along_open_axis() {
        let grid = room(5, 5);
        let mut body = Body::new(Vec2::new(1.35, 2.5), 0.3);
        body.velocity = Vec2::new(-12.0, 12.0);

        let outcome = move_body(&grid, &mut body, -0.2, 0.2);

        assert!(outcome.blocked_x);
        assert!(!outcome.blocked_y);
        assert_eq!(body.velocity.x, 0.0);
        assert!((body.velocity.y - 12.0).abs() < f32::EPSILON);
        assert!((body.position.x - 1.35).abs() < 1e-6);
        assert!((body.position.y - 2.7).abs() < 1e-5);
    }

    #[test]
    fn corner_move_stops_on_both_axes_without_overlap() {
        let grid = room(5, 5);
        let mut body = Body::new(Vec2::new(1.4, 1.4), 0.3);
        let outcome = move_body(&grid, &mut body, -1.0, -1.0);
        assert!(outcome.blocked_x && outcome.blocked_y);
        assert!(!overlaps_wall(&grid, body.position, body.radius));
    }

    #[test]
    fn long_moves_cannot_tunnel_through_thin_walls() {
        let mut grid = room(9, 3);
        grid.set(CellCoord::new(4, 1), Tile::Wall);
        let mut body = Body::new(Vec2::new(2.5, 1.5), 0.3);
        let _ = move_body(&grid, &mut body, 4.0, 0.0);
        assert!(body.position.x < 4.0);
    }

    #[test]
    fn touching_a_wall_is_not_an_overlap() {
        let grid = room(5, 5);
        assert!(!overlaps_wall(&grid, Vec2::new(1.5, 2.5), 0.5));
        assert!(overlaps_wall(&grid, Vec2::new(1.49, 2.5), 0.5));
    }

    #[test]
    fn push_out_recovers_a_body_embedded_in_a_wall() {
        let grid = room(5, 5);
        let mut body = Body::new(Vec2::new(1.1, 2.5), 0.3);
        assert!(overlaps_wall(&grid, body.position, body.radius));

        let outcome = move_body_with_push_out(&grid, &mut body, 0.0, 0.1);

        assert!(outcome.pushed_out);
        assert!(!overlaps_wall(&grid, body.position, body.radius));
    }

    #[test]
    fn push_out_leaves_body_in_place_when_nothing_clears() {
        let grid = Grid::filled(3, 3, Tile::Wall);
        let mut body = Body::new(Vec2::new(1.5, 1.5), 0.3);
        assert!(!push_out(&grid, &mut body));
        assert_eq!(body.position, Vec2::new(1.5, 1.5));
    }
}
