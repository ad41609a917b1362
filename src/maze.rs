use thiserror::Error;

use crate::types::{Cell, Direction};

pub const CLASSIC_LAYOUT: [&str; 22] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.#####.##.#####.######",
    "######.#####....#####.######",
    "######.######  ######.######",
    ".......###        ###.......",
    "######.##############.######",
    "######................######",
    "######.##.########.##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

pub const CLASSIC_PLAYER_SPAWN: Cell = Cell { row: 16, col: 13 };

/// Chaser, Ambusher, Flanker, Opportunist.
pub const CLASSIC_PURSUER_SPAWNS: [Cell; 4] = [
    Cell { row: 8, col: 13 },
    Cell { row: 10, col: 13 },
    Cell { row: 10, col: 12 },
    Cell { row: 10, col: 15 },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Empty,
    Dot,
    PowerPellet,
}

impl Tile {
    fn parse(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Self::Wall),
            ' ' => Some(Self::Empty),
            '.' => Some(Self::Dot),
            'o' => Some(Self::PowerPellet),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Empty => ' ',
            Self::Dot => '.',
            Self::PowerPellet => 'o',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("layout has no rows or an empty first row")]
    EmptyLayout,
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {symbol:?} at row {row}, col {col}")]
    UnknownTile { row: usize, col: usize, symbol: char },
    #[error("spawn ({}, {}) is outside the maze", .0.row, .0.col)]
    SpawnOutOfBounds(Cell),
    #[error("spawn ({}, {}) is inside a wall", .0.row, .0.col)]
    SpawnInWall(Cell),
}

/// Static maze grid. Walls never change during a round; only dot and
/// power-pellet content is consumed.
#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Maze {
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let expected = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .filter(|len| *len > 0)
            .ok_or(LevelError::EmptyLayout)?;

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(LevelError::RaggedRow {
                    row: row_idx,
                    expected,
                    found,
                });
            }
            for (col_idx, symbol) in row.chars().enumerate() {
                let tile = Tile::parse(symbol).ok_or(LevelError::UnknownTile {
                    row: row_idx,
                    col: col_idx,
                    symbol,
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            width: expected as i32,
            height: rows.len() as i32,
            tiles,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && row < self.height && col < self.width
    }

    pub fn tile(&self, row: i32, col: i32) -> Option<Tile> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.tiles.get(self.index(row, col)).copied()
    }

    /// Anything outside the grid reads as wall.
    pub fn is_wall(&self, row: i32, col: i32) -> bool {
        self.tile(row, col).map_or(true, |tile| tile == Tile::Wall)
    }

    /// True only for the two horizontal edge columns.
    pub fn has_wrap(&self, row: i32, col: i32) -> bool {
        self.in_bounds(row, col) && (col == 0 || col == self.width - 1)
    }

    /// Neighbouring cell in `dir`, wrapping horizontally out of a wrap cell.
    /// `None` when the step leaves the grid. Walls are not checked.
    pub fn step(&self, from: Cell, dir: Direction) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let row = from.row + dr;
        let mut col = from.col + dc;
        if self.has_wrap(from.row, from.col) && (col < 0 || col >= self.width) {
            col = col.rem_euclid(self.width);
        }
        if self.in_bounds(row, col) {
            Some(Cell { row, col })
        } else {
            None
        }
    }

    /// Open neighbour in `dir`, if any.
    pub fn open_step(&self, from: Cell, dir: Direction) -> Option<Cell> {
        self.step(from, dir)
            .filter(|cell| !self.is_wall(cell.row, cell.col))
    }

    pub fn clamp(&self, row: i32, col: i32) -> Cell {
        Cell {
            row: row.clamp(0, self.height - 1),
            col: col.clamp(0, self.width - 1),
        }
    }

    /// Clears a dot or power pellet and reports what was there.
    pub fn remove_dot(&mut self, cell: Cell) -> Option<Tile> {
        if !self.in_bounds(cell.row, cell.col) {
            return None;
        }
        let idx = self.index(cell.row, cell.col);
        let tile = self.tiles[idx];
        match tile {
            Tile::Dot | Tile::PowerPellet => {
                self.tiles[idx] = Tile::Empty;
                Some(tile)
            }
            Tile::Wall | Tile::Empty => None,
        }
    }

    pub fn dot_count(&self) -> usize {
        self.tiles.iter().filter(|tile| **tile == Tile::Dot).count()
    }

    pub fn power_pellet_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| **tile == Tile::PowerPellet)
            .count()
    }

    pub fn pickups_remaining(&self) -> usize {
        self.dot_count() + self.power_pellet_count()
    }

    pub fn to_rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|tile| tile.symbol()).collect())
            .collect()
    }

    fn index(&self, row: i32, col: i32) -> usize {
        (row * self.width + col) as usize
    }
}

/// A maze plus the fixed spawn cells of one round.
#[derive(Clone, Debug)]
pub struct Level {
    pub maze: Maze,
    pub player_spawn: Cell,
    pub pursuer_spawns: [Cell; 4],
}

impl Level {
    pub fn new(
        maze: Maze,
        player_spawn: Cell,
        pursuer_spawns: [Cell; 4],
    ) -> Result<Self, LevelError> {
        for spawn in std::iter::once(player_spawn).chain(pursuer_spawns) {
            if !maze.in_bounds(spawn.row, spawn.col) {
                return Err(LevelError::SpawnOutOfBounds(spawn));
            }
            if maze.is_wall(spawn.row, spawn.col) {
                return Err(LevelError::SpawnInWall(spawn));
            }
        }
        Ok(Self {
            maze,
            player_spawn,
            pursuer_spawns,
        })
    }

    pub fn classic() -> Result<Self, LevelError> {
        let maze = Maze::from_layout(&CLASSIC_LAYOUT)?;
        Self::new(maze, CLASSIC_PLAYER_SPAWN, CLASSIC_PURSUER_SPAWNS)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;

    fn reachable_from(maze: &Maze, start: Cell) -> HashSet<Cell> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for dir in Direction::CARDINALS {
                if let Some(next) = maze.open_step(cell, dir) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn classic_level_is_valid_and_fully_connected() {
        let level = Level::classic().expect("classic level should build");
        let maze = &level.maze;
        assert_eq!((maze.height(), maze.width()), (22, 28));

        let reachable = reachable_from(maze, level.player_spawn);
        for spawn in level.pursuer_spawns {
            assert!(reachable.contains(&spawn), "pursuer spawn unreachable");
        }
        let open = (0..maze.height())
            .flat_map(|row| (0..maze.width()).map(move |col| Cell { row, col }))
            .filter(|cell| !maze.is_wall(cell.row, cell.col))
            .count();
        assert_eq!(reachable.len(), open);
        assert_eq!(maze.power_pellet_count(), 4);
    }

    #[test]
    fn wrap_only_on_edge_columns() {
        let maze = Maze::from_layout(&["...", "...", "..."]).expect("layout");
        assert!(maze.has_wrap(1, 0));
        assert!(maze.has_wrap(1, 2));
        assert!(!maze.has_wrap(1, 1));
        assert!(!maze.has_wrap(5, 0));
    }

    #[test]
    fn step_wraps_horizontally_but_not_vertically() {
        let maze = Maze::from_layout(&["...", "...", "..."]).expect("layout");
        assert_eq!(
            maze.step(Cell::new(1, 0), Direction::Left),
            Some(Cell::new(1, 2))
        );
        assert_eq!(
            maze.step(Cell::new(1, 2), Direction::Right),
            Some(Cell::new(1, 0))
        );
        assert_eq!(maze.step(Cell::new(0, 1), Direction::Up), None);
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let maze = Maze::from_layout(&[" "]).expect("layout");
        assert!(!maze.is_wall(0, 0));
        assert!(maze.is_wall(-1, 0));
        assert!(maze.is_wall(0, 1));
    }

    #[test]
    fn remove_dot_reports_content_once() {
        let mut maze = Maze::from_layout(&[".o#"]).expect("layout");
        assert_eq!(maze.remove_dot(Cell::new(0, 0)), Some(Tile::Dot));
        assert_eq!(maze.remove_dot(Cell::new(0, 0)), None);
        assert_eq!(maze.remove_dot(Cell::new(0, 1)), Some(Tile::PowerPellet));
        assert_eq!(maze.remove_dot(Cell::new(0, 2)), None);
        assert_eq!(maze.pickups_remaining(), 0);
        assert_eq!(maze.to_rows(), vec!["  #".to_string()]);
    }

    #[test]
    fn layout_errors_are_reported() {
        let empty: [&str; 0] = [];
        assert_eq!(Maze::from_layout(&empty).unwrap_err(), LevelError::EmptyLayout);
        assert_eq!(
            Maze::from_layout(&["...", ".."]).unwrap_err(),
            LevelError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            Maze::from_layout(&[".x."]).unwrap_err(),
            LevelError::UnknownTile {
                row: 0,
                col: 1,
                symbol: 'x'
            }
        );
    }

    #[test]
    fn level_rejects_bad_spawns() {
        let maze = Maze::from_layout(&["...", ".#.", "..."]).expect("layout");
        let spawns = [Cell::new(0, 0); 4];
        assert_eq!(
            Level::new(maze.clone(), Cell::new(1, 1), spawns).unwrap_err(),
            LevelError::SpawnInWall(Cell::new(1, 1))
        );
        assert_eq!(
            Level::new(maze, Cell::new(0, 0), [Cell::new(3, 0); 4]).unwrap_err(),
            LevelError::SpawnOutOfBounds(Cell::new(3, 0))
        );
    }
}
