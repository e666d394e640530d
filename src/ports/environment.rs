//! Environment port - the symbolic game agents play against

use crate::{
    Result,
    board::{Move, Observation, StepReward},
};

/// Symbolic Qbert game.
///
/// Implemented by [`QbertWorld`](crate::world::QbertWorld) over an emulator
/// and by [`BoardSimulator`](crate::adapters::BoardSimulator) directly.
pub trait Environment {
    /// Start a new game and return the first observation.
    fn reset(&mut self) -> Result<Observation>;

    /// Current observation, including the reward of the last step.
    fn observe(&self) -> Observation;

    /// Perform one logical move and wait for the world to settle.
    ///
    /// Losing a life is reported through
    /// [`StepReward::enemy_penalty`], never as an error.
    fn perform(&mut self, action: Move) -> Result<StepReward>;

    fn is_game_over(&self) -> bool;
}
