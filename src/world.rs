//! Reading the arcade screen into symbolic observations
//!
//! [`FrameParser`] probes fixed pixels of each frame (block faces, the spots
//! just above them where sprites stand, the score area holding the target
//! color). [`QbertWorld`] drives an [`Emulator`](crate::ports::Emulator)
//! through logical moves with it.

pub mod frame;
pub mod qbert;

pub use frame::{Frame, FrameParser, ParsedFrame, Rgb, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use qbert::{MAX_SETTLE_FRAMES, QbertWorld, RamProbe, WorldConfig, classify_reward};
