//! Per-block and per-edge storage for board observations

use serde::{Deserialize, Serialize};

use super::geometry::{Cell, NUM_BLOCKS, NUM_ROWS};

/// One value per pyramid block, indexed by [`Cell`].
///
/// Every grid owns its storage; observations never share grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockGrid<T> {
    values: [T; NUM_BLOCKS],
}

impl<T: Copy + Default> BlockGrid<T> {
    pub fn new() -> Self {
        Self {
            values: [T::default(); NUM_BLOCKS],
        }
    }

    pub fn get(&self, cell: Cell) -> T {
        self.values[cell.index()]
    }

    pub fn set(&mut self, cell: Cell, value: T) {
        self.values[cell.index()] = value;
    }

    /// Values in row-major cell order.
    pub fn values(&self) -> &[T; NUM_BLOCKS] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, T)> + '_ {
        Cell::all().map(move |cell| (cell, self.get(cell)))
    }
}

impl<T: Copy + Default> Default for BlockGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGrid<bool> {
    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    pub fn all(&self) -> bool {
        self.values.iter().all(|&v| v)
    }

    pub fn any(&self) -> bool {
        self.values.iter().any(|&v| v)
    }
}

/// Side of a pyramid row on which a flying disc can hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Disc presence on each side of each row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeDiscs {
    rows: [[bool; 2]; NUM_ROWS],
}

impl EdgeDiscs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, side: Side) -> bool {
        self.rows
            .get(row)
            .map(|sides| sides[Self::side_index(side)])
            .unwrap_or(false)
    }

    pub fn set(&mut self, row: usize, side: Side, present: bool) {
        if let Some(sides) = self.rows.get_mut(row) {
            sides[Self::side_index(side)] = present;
        }
    }

    /// Whether a disc hovers beside `cell` (only edge blocks can border a disc).
    pub fn beside(&self, cell: Cell) -> bool {
        (cell.is_left_edge() && self.get(cell.row(), Side::Left))
            || (cell.is_right_edge() && self.get(cell.row(), Side::Right))
    }

    pub fn count(&self) -> usize {
        self.rows.iter().flatten().filter(|&&d| d).count()
    }

    fn side_index(side: Side) -> usize {
        match side {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}
