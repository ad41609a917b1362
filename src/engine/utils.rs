use crate::types::{Cell, Direction};

pub(super) fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.row - b.row).abs() + (a.col - b.col).abs()
}

pub(super) fn squared_distance(a: Cell, b: Cell) -> i32 {
    let dr = a.row - b.row;
    let dc = a.col - b.col;
    dr * dr + dc * dc
}

/// `steps` cells along `dir` without wrapping or clamping.
pub(super) fn ahead(cell: Cell, dir: Direction, steps: i32) -> Cell {
    let (dr, dc) = dir.delta();
    Cell {
        row: cell.row + dr * steps,
        col: cell.col + dc * steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_match_hand_computed_values() {
        let a = Cell::new(1, 2);
        let b = Cell::new(4, 6);
        assert_eq!(manhattan(a, b), 7);
        assert_eq!(squared_distance(a, b), 25);
        assert_eq!(squared_distance(b, a), 25);
    }

    #[test]
    fn ahead_with_none_stays_put() {
        let cell = Cell::new(3, 3);
        assert_eq!(ahead(cell, Direction::None, 4), cell);
        assert_eq!(ahead(cell, Direction::Left, 4), Cell::new(3, -1));
    }
}
