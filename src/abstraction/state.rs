//! Abstracted states used as Q-table keys

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{BlockGrid, Cell, Move};

/// Reduced view of an observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractState {
    /// Optional position plus one code per neighbor slot
    /// (top-left, top-right, bottom-left, bottom-right).
    Local {
        position: Option<Cell>,
        neighbors: [Option<u8>; 4],
    },
    /// Position plus the whole board: colors and agents (-1 enemy, +1 friendly).
    Verbose {
        position: Cell,
        colored: BlockGrid<bool>,
        agents: BlockGrid<i8>,
    },
}

impl AbstractState {
    /// Moves available from this state, in action-code order.
    pub fn valid_moves(&self) -> Vec<Move> {
        match self {
            AbstractState::Local { neighbors, .. } => Move::ALL
                .into_iter()
                .filter(|m| neighbors[m.slot()].is_some())
                .collect(),
            AbstractState::Verbose { position, .. } => position.valid_moves().to_vec(),
        }
    }

    pub fn is_valid_move(&self, m: Move) -> bool {
        match self {
            AbstractState::Local { neighbors, .. } => neighbors[m.slot()].is_some(),
            AbstractState::Verbose { position, .. } => position.is_valid_move(m),
        }
    }

    pub fn position(&self) -> Option<Cell> {
        match self {
            AbstractState::Local { position, .. } => *position,
            AbstractState::Verbose { position, .. } => Some(*position),
        }
    }

    /// Neighbor slots, when the flavor has them.
    pub fn neighbors(&self) -> Option<&[Option<u8>; 4]> {
        match self {
            AbstractState::Local { neighbors, .. } => Some(neighbors),
            AbstractState::Verbose { .. } => None,
        }
    }

    /// Code stored in the slot `m` leads to.
    pub fn neighbor(&self, m: Move) -> Option<u8> {
        self.neighbors().and_then(|slots| slots[m.slot()])
    }
}

impl fmt::Display for AbstractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractState::Local {
                position,
                neighbors,
            } => {
                match position {
                    Some(cell) => write!(f, "{cell} ")?,
                    None => f.write_str("* ")?,
                }
                f.write_str("[")?;
                for (i, slot) in neighbors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    match slot {
                        Some(code) => write!(f, "{code}")?,
                        None => f.write_str("-")?,
                    }
                }
                f.write_str("]")
            }
            AbstractState::Verbose {
                position, colored, ..
            } => write!(f, "{position} verbose ({}/21 colored)", colored.count()),
        }
    }
}
