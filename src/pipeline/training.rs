//! Training pipeline: the episode driver

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, info, warn};

use crate::{
    Result,
    board::Observation,
    ports::{Agent, Environment, Observer},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes (games)
    pub num_episodes: usize,

    /// Random seed handed to the agent before the first episode
    pub seed: Option<u64>,

    /// Abort an episode after this many moves
    pub max_steps_per_episode: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 100,
            seed: None,
            max_steps_per_episode: None,
        }
    }
}

/// What happened in one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// 0-based episode index
    pub episode: usize,
    /// Game score (penalties excluded)
    pub score: i64,
    /// Score plus life-loss penalties
    pub total_reward: f64,
    pub steps: usize,
    /// Highest level reached
    pub level: u32,
    pub lives_lost: u32,
    /// Q-table size after the episode
    pub table_size: usize,
    /// Whether the step cap ended the episode
    pub truncated: bool,
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    pub total_episodes: usize,
    pub total_steps: usize,
    /// Score of every episode, in order
    pub scores: Vec<i64>,
    pub max_score: i64,
    pub max_level: u32,
    pub mean_score: f64,
    /// Sample standard deviation (0 with fewer than two episodes)
    pub std_dev: f64,
    /// Q-table size at the end of training
    pub table_size: usize,
}

impl TrainingResult {
    pub fn from_episodes(episodes: &[EpisodeSummary], table_size: usize) -> Self {
        let scores: Vec<i64> = episodes.iter().map(|e| e.score).collect();
        let (mean_score, std_dev) = score_stats(&scores);
        Self {
            total_episodes: episodes.len(),
            total_steps: episodes.iter().map(|e| e.steps).sum(),
            max_score: scores.iter().copied().max().unwrap_or(0),
            max_level: episodes.iter().map(|e| e.level).max().unwrap_or(1),
            scores,
            mean_score,
            std_dev,
            table_size,
        }
    }
}

/// Mean and sample standard deviation of episode scores.
pub fn score_stats(scores: &[i64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    let values: Vec<f64> = scores.iter().map(|&s| s as f64).collect();
    let mean = values.iter().mean();
    let std_dev = if values.len() > 1 {
        values.iter().std_dev()
    } else {
        0.0
    };
    (mean, std_dev)
}

/// Plays episodes of an agent against an environment, learning every step.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run every configured episode.
    pub fn run(
        &mut self,
        agent: &mut dyn Agent,
        env: &mut dyn Environment,
    ) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed);
        }

        for observer in &mut self.observers {
            observer.on_training_start(self.config.num_episodes)?;
        }

        let mut episodes = Vec::with_capacity(self.config.num_episodes);
        for episode in 0..self.config.num_episodes {
            let summary = self.play_episode(episode, agent, env)?;
            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
            episodes.push(summary);
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result = TrainingResult::from_episodes(&episodes, agent.table_size());
        info!(
            agent = %agent.agent_type(),
            max_score = result.max_score,
            max_level = result.max_level,
            table_size = result.table_size,
            "training finished"
        );
        Ok(result)
    }

    fn play_episode(
        &mut self,
        episode: usize,
        agent: &mut dyn Agent,
        env: &mut dyn Environment,
    ) -> Result<EpisodeSummary> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut before: Observation = env.reset()?;
        let mut summary = EpisodeSummary {
            episode,
            score: 0,
            total_reward: 0.0,
            steps: 0,
            level: before.level,
            lives_lost: 0,
            table_size: 0,
            truncated: false,
        };

        while !env.is_game_over() {
            if self
                .config
                .max_steps_per_episode
                .is_some_and(|cap| summary.steps >= cap)
            {
                warn!(episode, steps = summary.steps, "episode hit the step cap");
                summary.truncated = true;
                break;
            }

            let decision = agent.decide(&before)?;
            let reward = env.perform(decision.action)?;
            let after = env.observe();

            for observer in &mut self.observers {
                observer.on_step(episode, summary.steps, &decision, &reward)?;
            }
            agent.learn(&decision, &before, &after)?;

            debug!(
                episode,
                step = summary.steps,
                action = %decision.action,
                source = %decision.source,
                score = reward.score(),
                penalty = reward.enemy_penalty,
                "step"
            );

            summary.score += reward.score();
            summary.total_reward += reward.total();
            if reward.life_lost() {
                summary.lives_lost += 1;
            }
            summary.level = summary.level.max(after.level);
            summary.steps += 1;
            before = after;
        }

        summary.table_size = agent.table_size();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(score: i64, level: u32) -> EpisodeSummary {
        EpisodeSummary {
            episode: 0,
            score,
            total_reward: score as f64,
            steps: 10,
            level,
            lives_lost: 3,
            table_size: 0,
            truncated: false,
        }
    }

    #[test]
    fn test_result_aggregates_episodes() {
        let result =
            TrainingResult::from_episodes(&[episode(100, 1), episode(300, 2), episode(200, 1)], 42);
        assert_eq!(result.total_episodes, 3);
        assert_eq!(result.total_steps, 30);
        assert_eq!(result.max_score, 300);
        assert_eq!(result.max_level, 2);
        assert!((result.mean_score - 200.0).abs() < 1e-9);
        assert!((result.std_dev - 100.0).abs() < 1e-9);
        assert_eq!(result.scores, vec![100, 300, 200]);
    }

    #[test]
    fn test_single_episode_has_zero_spread() {
        assert_eq!(score_stats(&[75]), (75.0, 0.0));
        assert_eq!(score_stats(&[]), (0.0, 0.0));
    }
}
