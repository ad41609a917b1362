//! Single-step move selection for pursuers.

use crate::maze::Maze;
use crate::types::{Cell, Direction, PursuerMode};

use super::utils::squared_distance;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub dir: Direction,
    pub cell: Cell,
}

/// Open neighbours of `from` in Up, Down, Left, Right order, with the reverse
/// of `current` removed unless it is the only way out.
pub fn legal_steps(maze: &Maze, from: Cell, current: Direction) -> Vec<Step> {
    let open: Vec<Step> = Direction::CARDINALS
        .into_iter()
        .filter_map(|dir| maze.open_step(from, dir).map(|cell| Step { dir, cell }))
        .collect();

    let reverse = current.opposite();
    let forward: Vec<Step> = open
        .iter()
        .copied()
        .filter(|step| step.dir != reverse)
        .collect();
    if forward.is_empty() {
        open
    } else {
        forward
    }
}

/// Picks the legal step closest to `target` (farthest when frightened).
/// Ties keep the earliest candidate in enumeration order. Returns `None` only
/// for a cell with no open neighbour at all.
pub fn resolve_step(
    maze: &Maze,
    from: Cell,
    current: Direction,
    target: Cell,
    mode: PursuerMode,
) -> Option<Step> {
    let mut best: Option<(Step, i32)> = None;
    for step in legal_steps(maze, from, current) {
        let distance = squared_distance(step.cell, target);
        let better = match best {
            None => true,
            Some((_, best_distance)) => match mode {
                PursuerMode::Chase => distance < best_distance,
                PursuerMode::Frightened => distance > best_distance,
            },
        };
        if better {
            best = Some((step, distance));
        }
    }
    best.map(|(step, _)| step)
}
