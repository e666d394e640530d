//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events, allowing
//! composable reporting without coupling the training loop to specific
//! output formats.

use crate::{
    Result, board::StepReward, pipeline::EpisodeSummary, subsumption::Decision,
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - after every performed move
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - once
///
/// Every method defaults to a no-op.
///
/// # Examples
///
/// ```no_run
/// use qbert::{pipeline::EpisodeSummary, ports::Observer};
///
/// struct BestScore(i64);
///
/// impl Observer for BestScore {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> qbert::Result<()> {
///         self.0 = self.0.max(summary.score);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts (0-based index).
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each performed move, before learning.
    fn on_step(
        &mut self,
        _episode: usize,
        _step: usize,
        _decision: &Decision,
        _reward: &StepReward,
    ) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes. Use this to flush outputs.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
