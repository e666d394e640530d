//! Joystick actions and the four diagonal moves

use std::fmt;

use serde::{Deserialize, Serialize};

/// Full ALE joystick action set, numbered by the emulator's action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl Action {
    /// Every joystick action in code order.
    pub const ALL: [Action; 18] = [
        Action::Noop,
        Action::Fire,
        Action::Up,
        Action::Right,
        Action::Left,
        Action::Down,
        Action::UpRight,
        Action::UpLeft,
        Action::DownRight,
        Action::DownLeft,
        Action::UpFire,
        Action::RightFire,
        Action::LeftFire,
        Action::DownFire,
        Action::UpRightFire,
        Action::UpLeftFire,
        Action::DownRightFire,
        Action::DownLeftFire,
    ];

    /// Emulator action code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up an action by its emulator code.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidActionCode`] for codes above 17.
    pub fn from_code(code: u8) -> Result<Self, crate::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(crate::Error::InvalidActionCode { code })
    }

    /// The movement this action performs on the pyramid, if any.
    pub fn as_move(self) -> Option<Move> {
        match self {
            Action::Up => Some(Move::Up),
            Action::Right => Some(Move::Right),
            Action::Left => Some(Move::Left),
            Action::Down => Some(Move::Down),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Noop => "noop",
            Action::Fire => "fire",
            Action::Up => "up",
            Action::Right => "right",
            Action::Left => "left",
            Action::Down => "down",
            Action::UpRight => "up-right",
            Action::UpLeft => "up-left",
            Action::DownRight => "down-right",
            Action::DownLeft => "down-left",
            Action::UpFire => "up-fire",
            Action::RightFire => "right-fire",
            Action::LeftFire => "left-fire",
            Action::DownFire => "down-fire",
            Action::UpRightFire => "up-right-fire",
            Action::UpLeftFire => "up-left-fire",
            Action::DownRightFire => "down-right-fire",
            Action::DownLeftFire => "down-left-fire",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<Action> for Move {
    type Error = crate::Error;

    fn try_from(action: Action) -> Result<Self, Self::Error> {
        action.as_move().ok_or_else(|| crate::Error::NotAMove {
            action: action.name().to_string(),
        })
    }
}

/// One of the four diagonal jumps between pyramid blocks.
///
/// On screen the pyramid is drawn with row 0 at the top, so `Up` lands on
/// the upper-right block, `Left` on the upper-left, `Down` on the lower-left
/// and `Right` on the lower-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Move {
    Up,
    Right,
    Left,
    Down,
}

impl Move {
    /// All moves in action-code order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Left, Move::Down];

    /// Moves in neighbor-slot order: top-left, top-right, bottom-left, bottom-right.
    pub const SLOTS: [Move; 4] = [Move::Left, Move::Up, Move::Down, Move::Right];

    /// `(Δrow, Δcol)` applied by the move.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Right => (1, 1),
            Move::Left => (-1, -1),
            Move::Down => (1, 0),
        }
    }

    /// The move that undoes this one.
    pub fn inverse(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    /// Index of this move's neighbor slot in abstracted states.
    pub fn slot(self) -> usize {
        match self {
            Move::Left => 0,
            Move::Up => 1,
            Move::Down => 2,
            Move::Right => 3,
        }
    }

    pub fn action(self) -> Action {
        match self {
            Move::Up => Action::Up,
            Move::Right => Action::Right,
            Move::Left => Action::Left,
            Move::Down => Action::Down,
        }
    }

    /// Emulator action code (2-5).
    pub fn code(self) -> u8 {
        self.action().code()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action().name())
    }
}
