//! Qbert pyramid model: cells, joystick actions and symbolic observations

pub mod action;
pub mod geometry;
pub mod grid;
pub mod observation;

pub use action::{Action, Move};
pub use geometry::{Cell, NUM_BLOCKS, NUM_ROWS};
pub use grid::{BlockGrid, EdgeDiscs, Side};
pub use observation::{DEATH_PENALTY, Observation, StepReward};
