//! Emulator port - the arcade machine the world is read from
//!
//! The learning core never talks to an emulator directly. A
//! [`QbertWorld`](crate::world::QbertWorld) wraps any implementation of this
//! trait and turns frames into observations.

use crate::{Result, board::Action, world::Frame};

/// A running Qbert cartridge.
///
/// `act` is the only blocking call: it applies one joystick action, advances
/// one frame and returns the score delta. Implementations seeded identically
/// must produce identical episodes.
pub trait Emulator {
    /// Restart the game session.
    fn reset(&mut self) -> Result<()>;

    /// Apply one joystick action for one frame; returns the score delta.
    fn act(&mut self, action: Action) -> Result<i64>;

    fn is_game_over(&self) -> bool;

    fn lives(&self) -> u32;

    /// Screen size as (width, height) in pixels.
    fn screen_dims(&self) -> (usize, usize);

    /// Copy the current screen into `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameSize`](crate::Error::FrameSize) when `frame` does
    /// not match [`screen_dims`](Emulator::screen_dims).
    fn screen_rgb(&self, frame: &mut Frame) -> Result<()>;

    /// Raw console memory.
    fn ram(&self) -> &[u8];
}
