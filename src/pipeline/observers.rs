//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! the episode loop to specific output formats.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::training::{EpisodeSummary, score_stats};
use crate::{
    Result,
    abstraction::PolicyKind,
    board::StepReward,
    export::{ScoreCsvWriter, ScoreRecord},
    ports::Observer,
    subsumption::Decision,
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    best_score: i64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            best_score: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.best_score = self.best_score.max(summary.score);
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(format!(
                "last {} best {}",
                summary.score, self.best_score
            ));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("best {}", self.best_score));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    scores: Vec<i64>,
    steps: Vec<usize>,
    lives_lost: u32,
    max_level: u32,
    /// Moves chosen by each policy: enemy, friendly, block
    decisions: [usize; 3],
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub mean_score: f64,
    pub std_dev: f64,
    pub max_score: i64,
    pub max_level: u32,
    pub avg_episode_length: f64,
    pub lives_lost: u32,
    pub enemy_decisions: usize,
    pub friendly_decisions: usize,
    pub block_decisions: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    /// Get average episode length in moves
    pub fn avg_episode_length(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<usize>() as f64 / self.steps.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let (mean_score, std_dev) = score_stats(&self.scores);
        MetricsSummary {
            total_episodes: self.scores.len(),
            mean_score,
            std_dev,
            max_score: self.scores.iter().copied().max().unwrap_or(0),
            max_level: self.max_level,
            avg_episode_length: self.avg_episode_length(),
            lives_lost: self.lives_lost,
            enemy_decisions: self.decisions[0],
            friendly_decisions: self.decisions[1],
            block_decisions: self.decisions[2],
        }
    }
}

impl Observer for MetricsObserver {
    fn on_step(
        &mut self,
        _episode: usize,
        _step: usize,
        decision: &Decision,
        _reward: &StepReward,
    ) -> Result<()> {
        let slot = match decision.source {
            PolicyKind::Enemy => 0,
            PolicyKind::Friendly => 1,
            PolicyKind::Block => 2,
        };
        self.decisions[slot] += 1;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.scores.push(summary.score);
        self.steps.push(summary.steps);
        self.lives_lost += summary.lives_lost;
        self.max_level = self.max_level.max(summary.level);
        Ok(())
    }
}

/// Writes one CSV row per finished episode.
pub struct ScoreCsvObserver {
    writer: ScoreCsvWriter,
}

impl ScoreCsvObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            writer: ScoreCsvWriter::create(path)?,
        })
    }
}

impl Observer for ScoreCsvObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.writer.write(&ScoreRecord::from(summary))
    }
}

/// Reports every episode through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl Observer for LoggingObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        info!(total_episodes, "training started");
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        info!(
            episode = summary.episode + 1,
            score = summary.score,
            level = summary.level,
            steps = summary.steps,
            table_size = summary.table_size,
            "episode ended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;

    fn summary(episode: usize, score: i64) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            score,
            total_reward: score as f64 - 1500.0,
            steps: 20,
            level: 1,
            lives_lost: 3,
            table_size: 10,
            truncated: false,
        }
    }

    #[test]
    fn test_metrics_observer_summarises() {
        let mut metrics = MetricsObserver::new();
        let decision = Decision {
            action: Move::Down,
            source: PolicyKind::Enemy,
            enemy_active: true,
            friendly_active: false,
        };
        metrics
            .on_step(0, 0, &decision, &StepReward::zero())
            .unwrap();
        metrics.on_episode_end(&summary(0, 250)).unwrap();
        metrics.on_episode_end(&summary(1, 750)).unwrap();

        let summary = metrics.summary();
        assert_eq!(summary.total_episodes, 2);
        assert_eq!(summary.max_score, 750);
        assert!((summary.mean_score - 500.0).abs() < 1e-9);
        assert_eq!(summary.lives_lost, 6);
        assert_eq!(summary.enemy_decisions, 1);
        assert_eq!(summary.block_decisions, 0);
        assert!((summary.avg_episode_length - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_csv_observer_writes_rows() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.csv");
        {
            let mut observer = ScoreCsvObserver::new(&path).unwrap();
            observer.on_episode_end(&summary(0, 100)).unwrap();
            observer.on_episode_end(&summary(1, 200)).unwrap();
        }
        let records = crate::export::read_scores(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].episode, 2);
        assert_eq!(records[1].score, 200);
    }
}
