//! Export functionality for training analysis
//!
//! Episode scores are written as CSV, one row per episode, so runs can be
//! compared or plotted with external tools.

mod scores;

pub use scores::{ScoreCsvWriter, ScoreRecord, read_scores, write_scores};
