//! Per-archetype target selection.
//!
//! Every function here is pure apart from the injected [`Rng`], which is only
//! drawn from when the rule calls for a random cell.

use crate::constants::{AMBUSH_LOOKAHEAD, FLANK_LOOKAHEAD, OPPORTUNIST_RADIUS};
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Archetype, Cell, Direction, PursuerMode};

use super::utils::{ahead, manhattan};

/// World state a pursuer may look at when choosing where to go.
#[derive(Clone, Copy, Debug)]
pub struct TargetInputs {
    pub player: Cell,
    pub facing: Direction,
    /// The Chaser's position at the start of the tick.
    pub chaser: Option<Cell>,
}

pub fn compute_target(
    archetype: Archetype,
    mode: PursuerMode,
    own: Cell,
    inputs: &TargetInputs,
    maze: &Maze,
    rng: &mut Rng,
) -> Cell {
    match mode {
        PursuerMode::Frightened => random_cell(maze, rng),
        PursuerMode::Chase => match archetype {
            Archetype::Chaser => inputs.player,
            Archetype::Ambusher => ambush_target(inputs.player, inputs.facing, maze),
            Archetype::Flanker => flank_target(inputs.player, inputs.facing, inputs.chaser, maze),
            Archetype::Opportunist => opportunist_target(own, inputs.player, maze, rng),
        },
    }
}

pub fn ambush_target(player: Cell, facing: Direction, maze: &Maze) -> Cell {
    let lead = ahead(player, facing, AMBUSH_LOOKAHEAD);
    maze.clamp(lead.row, lead.col)
}

/// Doubles the vector from the Chaser to a point two cells ahead of the
/// player. Without a Chaser the player's own cell is the target.
pub fn flank_target(player: Cell, facing: Direction, chaser: Option<Cell>, maze: &Maze) -> Cell {
    let Some(chaser) = chaser else {
        return player;
    };
    let pivot = ahead(player, facing, FLANK_LOOKAHEAD);
    let row = chaser.row + (pivot.row - chaser.row) * 2;
    let col = chaser.col + (pivot.col - chaser.col) * 2;
    maze.clamp(row, col)
}

pub fn opportunist_target(own: Cell, player: Cell, maze: &Maze, rng: &mut Rng) -> Cell {
    if manhattan(own, player) < OPPORTUNIST_RADIUS {
        return random_cell(maze, rng);
    }
    player
}

fn random_cell(maze: &Maze, rng: &mut Rng) -> Cell {
    rng.cell(maze.height(), maze.width())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_maze(height: usize, width: usize) -> Maze {
        let rows = vec![".".repeat(width); height];
        Maze::from_layout(&rows).expect("open maze")
    }

    fn inputs(player: Cell, facing: Direction, chaser: Option<Cell>) -> TargetInputs {
        TargetInputs {
            player,
            facing,
            chaser,
        }
    }

    #[test]
    fn chaser_targets_player_cell() {
        let maze = open_maze(10, 10);
        let mut rng = Rng::new(1);
        let target = compute_target(
            Archetype::Chaser,
            PursuerMode::Chase,
            Cell::new(0, 0),
            &inputs(Cell::new(4, 7), Direction::Up, None),
            &maze,
            &mut rng,
        );
        assert_eq!(target, Cell::new(4, 7));
    }

    #[test]
    fn ambusher_leads_four_cells_along_facing() {
        let maze = open_maze(10, 10);
        assert_eq!(
            ambush_target(Cell::new(5, 5), Direction::Right, &maze),
            Cell::new(5, 9)
        );
        assert_eq!(
            ambush_target(Cell::new(5, 3), Direction::Left, &maze),
            Cell::new(5, 0)
        );
        assert_eq!(
            ambush_target(Cell::new(8, 2), Direction::Up, &maze),
            Cell::new(4, 2)
        );
        assert_eq!(
            ambush_target(Cell::new(8, 2), Direction::Down, &maze),
            Cell::new(9, 2)
        );
        assert_eq!(
            ambush_target(Cell::new(8, 2), Direction::None, &maze),
            Cell::new(8, 2)
        );
    }

    #[test]
    fn flanker_doubles_vector_from_chaser() {
        let maze = open_maze(20, 20);
        // pivot = (10, 12); vector from (6, 10) is (4, 2); target (14, 14)
        let target = flank_target(
            Cell::new(10, 10),
            Direction::Right,
            Some(Cell::new(6, 10)),
            &maze,
        );
        assert_eq!(target, Cell::new(14, 14));
    }

    #[test]
    fn flanker_clamps_to_bounds() {
        let maze = open_maze(10, 10);
        let target = flank_target(
            Cell::new(8, 8),
            Direction::Down,
            Some(Cell::new(0, 0)),
            &maze,
        );
        assert_eq!(target, Cell::new(9, 9));
    }

    #[test]
    fn flanker_without_chaser_targets_player() {
        let maze = open_maze(10, 10);
        let target = flank_target(Cell::new(3, 4), Direction::Left, None, &maze);
        assert_eq!(target, Cell::new(3, 4));
    }

    #[test]
    fn opportunist_chases_from_afar_and_wanders_up_close() {
        let maze = open_maze(30, 30);
        let mut rng = Rng::new(5);
        let player = Cell::new(20, 20);
        assert_eq!(
            opportunist_target(Cell::new(0, 0), player, &maze, &mut rng),
            player
        );
        // exactly on the radius still counts as far
        assert_eq!(
            opportunist_target(Cell::new(12, 20), player, &maze, &mut rng),
            player
        );

        let mut left_player = false;
        for _ in 0..32 {
            let target = opportunist_target(Cell::new(19, 20), player, &maze, &mut rng);
            assert!(maze.in_bounds(target.row, target.col));
            if target != player {
                left_player = true;
            }
        }
        assert!(left_player);
    }

    #[test]
    fn frightened_targets_are_random_and_in_bounds() {
        let maze = open_maze(7, 11);
        let mut rng = Rng::new(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let target = compute_target(
                Archetype::Chaser,
                PursuerMode::Frightened,
                Cell::new(0, 0),
                &inputs(Cell::new(3, 3), Direction::Left, None),
                &maze,
                &mut rng,
            );
            assert!(maze.in_bounds(target.row, target.col));
            seen.insert(target);
        }
        assert!(seen.len() > 10);
    }

    #[test]
    fn chase_targets_stay_in_bounds_everywhere() {
        let maze = open_maze(6, 9);
        let mut rng = Rng::new(21);
        for row in 0..maze.height() {
            for col in 0..maze.width() {
                let player = Cell::new(row, col);
                for facing in Direction::CARDINALS {
                    for archetype in Archetype::ALL {
                        let target = compute_target(
                            archetype,
                            PursuerMode::Chase,
                            Cell::new(0, 0),
                            &inputs(player, facing, Some(Cell::new(5 - row, 8 - col))),
                            &maze,
                            &mut rng,
                        );
                        assert!(
                            maze.in_bounds(target.row, target.col),
                            "{archetype:?} produced {target:?}"
                        );
                    }
                }
            }
        }
    }
}
