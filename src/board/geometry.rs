//! Pyramid geometry: cells and the moves legal from each of them

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Move;

/// Number of block rows in the pyramid.
pub const NUM_ROWS: usize = 6;

/// Number of blocks in the pyramid (1 + 2 + ... + NUM_ROWS).
pub const NUM_BLOCKS: usize = NUM_ROWS * (NUM_ROWS + 1) / 2;

const LAST_ROW: u8 = (NUM_ROWS - 1) as u8;

const ALL_MOVES: &[Move] = &[Move::Up, Move::Right, Move::Left, Move::Down];
const TOP_MOVES: &[Move] = &[Move::Right, Move::Down];
const BOTTOM_LEFT_MOVES: &[Move] = &[Move::Up];
const BOTTOM_RIGHT_MOVES: &[Move] = &[Move::Left];
const BOTTOM_MOVES: &[Move] = &[Move::Left, Move::Up];
const LEFT_EDGE_MOVES: &[Move] = &[Move::Up, Move::Right, Move::Down];
const RIGHT_EDGE_MOVES: &[Move] = &[Move::Right, Move::Left, Move::Down];

/// A block on the pyramid, `0 <= col <= row < NUM_ROWS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    row: u8,
    col: u8,
}

impl Cell {
    /// The block Qbert starts each life and level on.
    pub const TOP: Cell = Cell { row: 0, col: 0 };

    /// Create a cell, validating the triangular constraint.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCell`] when the coordinates fall off the pyramid.
    pub fn new(row: i32, col: i32) -> Result<Self, crate::Error> {
        if Self::on_pyramid(row, col) {
            Ok(Cell {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(crate::Error::InvalidCell {
                row,
                col,
                rows: NUM_ROWS,
            })
        }
    }

    fn on_pyramid(row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && col <= row && (row as usize) < NUM_ROWS
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major index into a triangular block array.
    pub fn index(self) -> usize {
        let row = self.row();
        row * (row + 1) / 2 + self.col()
    }

    /// Inverse of [`Cell::index`].
    pub fn from_index(index: usize) -> Option<Cell> {
        Self::all().nth(index)
    }

    /// All 21 cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..NUM_ROWS as u8).flat_map(|row| (0..=row).map(move |col| Cell { row, col }))
    }

    pub fn is_left_edge(self) -> bool {
        self.col == 0
    }

    pub fn is_right_edge(self) -> bool {
        self.col == self.row
    }

    pub fn is_bottom(self) -> bool {
        self.row == LAST_ROW
    }

    /// Moves that keep Qbert on the pyramid, in the emulator's preferred order.
    ///
    /// Corner rules take precedence over edge rules, which take precedence
    /// over the interior rule.
    pub fn valid_moves(self) -> &'static [Move] {
        match (self.row, self.col) {
            (0, 0) => TOP_MOVES,
            (LAST_ROW, 0) => BOTTOM_LEFT_MOVES,
            (LAST_ROW, LAST_ROW) => BOTTOM_RIGHT_MOVES,
            (LAST_ROW, _) => BOTTOM_MOVES,
            (_, 0) => LEFT_EDGE_MOVES,
            (row, col) if row == col => RIGHT_EDGE_MOVES,
            _ => ALL_MOVES,
        }
    }

    pub fn is_valid_move(self, m: Move) -> bool {
        self.valid_moves().contains(&m)
    }

    /// Cell reached by applying `m`, or `None` when the jump leaves the pyramid.
    pub fn neighbor(self, m: Move) -> Option<Cell> {
        let (dr, dc) = m.delta();
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if self.is_valid_move(m) && Self::on_pyramid(row, col) {
            Some(Cell {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Cells one legal move away, paired with the move that reaches them.
    pub fn neighbors(self) -> impl Iterator<Item = (Move, Cell)> {
        self.valid_moves()
            .iter()
            .filter_map(move |&m| self.neighbor(m).map(|cell| (m, cell)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_count() {
        assert_eq!(Cell::all().count(), NUM_BLOCKS);
        assert_eq!(NUM_BLOCKS, 21);
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, cell) in Cell::all().enumerate() {
            assert_eq!(cell.index(), i);
            assert_eq!(Cell::from_index(i), Some(cell));
        }
        assert_eq!(Cell::from_index(NUM_BLOCKS), None);
    }

    #[test]
    fn test_rejects_off_pyramid_cells() {
        assert!(Cell::new(0, 1).is_err());
        assert!(Cell::new(6, 0).is_err());
        assert!(Cell::new(-1, 0).is_err());
        assert!(Cell::new(3, -1).is_err());
        assert!(Cell::new(5, 5).is_ok());
    }

    #[test]
    fn test_corner_moves() {
        assert_eq!(Cell::TOP.valid_moves(), &[Move::Right, Move::Down]);
        assert_eq!(Cell::new(5, 0).unwrap().valid_moves(), &[Move::Up]);
        assert_eq!(Cell::new(5, 5).unwrap().valid_moves(), &[Move::Left]);
    }

    #[test]
    fn test_edge_moves() {
        assert_eq!(
            Cell::new(3, 0).unwrap().valid_moves(),
            &[Move::Up, Move::Right, Move::Down]
        );
        assert_eq!(
            Cell::new(3, 3).unwrap().valid_moves(),
            &[Move::Right, Move::Left, Move::Down]
        );
        assert_eq!(Cell::new(5, 2).unwrap().valid_moves(), &[Move::Left, Move::Up]);
        assert_eq!(Cell::new(3, 1).unwrap().valid_moves().len(), 4);
    }

    #[test]
    fn test_invalid_move_has_no_neighbor() {
        assert_eq!(Cell::TOP.neighbor(Move::Up), None);
        assert_eq!(Cell::TOP.neighbor(Move::Right), Some(Cell::new(1, 1).unwrap()));
        assert_eq!(Cell::TOP.neighbor(Move::Down), Some(Cell::new(1, 0).unwrap()));
    }
}
