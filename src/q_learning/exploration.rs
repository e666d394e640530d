//! Exploration strategies and generalization metrics
//!
//! Both axes are closed enums parsed once from configuration text.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How a learner trades off stored values against trying something new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ExplorationMode {
    /// Greedy with respect to stored Q. Used for evaluation and tie-breaking.
    None,
    /// ε-greedy: a uniformly random valid move with probability ε.
    Random,
    /// Under-visited pairs are valued at the unexplored bonus.
    Optimistic,
    /// ε-greedy gate around the optimistic rule.
    #[default]
    Combined,
}

impl ExplorationMode {
    /// Whether this mode rolls the ε gate before choosing.
    pub fn uses_epsilon(self) -> bool {
        matches!(self, ExplorationMode::Random | ExplorationMode::Combined)
    }

    /// Whether this mode consults (and maintains) visit counts.
    pub fn uses_visits(self) -> bool {
        matches!(
            self,
            ExplorationMode::Optimistic | ExplorationMode::Combined
        )
    }
}

impl fmt::Display for ExplorationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExplorationMode::None => "none",
            ExplorationMode::Random => "random",
            ExplorationMode::Optimistic => "optimistic",
            ExplorationMode::Combined => "combined",
        };
        f.write_str(label)
    }
}

impl FromStr for ExplorationMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "greedy" => Ok(ExplorationMode::None),
            "random" | "epsilon" | "epsilon-greedy" => Ok(ExplorationMode::Random),
            "optimistic" => Ok(ExplorationMode::Optimistic),
            "combined" => Ok(ExplorationMode::Combined),
            _ => Err(crate::Error::ParseExplorationMode {
                input: s.to_string(),
                expected: "none, random, optimistic, combined".to_string(),
            }),
        }
    }
}

/// Rule for copying a fresh Q-value into neighboring states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DistanceMetric {
    /// No propagation.
    #[default]
    None,
    /// Same action, written at every cell one valid move away.
    Simple,
    /// Inverse action, written at every cell one valid move away.
    Adjacent,
    /// Every move that lands on the same cell the update's move landed on.
    SameResult,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DistanceMetric::None => "none",
            DistanceMetric::Simple => "simple",
            DistanceMetric::Adjacent => "adjacent",
            DistanceMetric::SameResult => "same_result",
        };
        f.write_str(label)
    }
}

impl FromStr for DistanceMetric {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalised.as_str() {
            "none" => Ok(DistanceMetric::None),
            "simple" | "manhattan" => Ok(DistanceMetric::Simple),
            "adjacent" | "hamming" => Ok(DistanceMetric::Adjacent),
            "same_result" => Ok(DistanceMetric::SameResult),
            _ => Err(crate::Error::ParseDistanceMetric {
                input: s.to_string(),
                expected: "none, simple/manhattan, adjacent/hamming, same_result".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exploration_parsing() {
        assert_eq!("none".parse::<ExplorationMode>().unwrap(), ExplorationMode::None);
        assert_eq!(
            " Optimistic ".parse::<ExplorationMode>().unwrap(),
            ExplorationMode::Optimistic
        );
        assert!("softmax".parse::<ExplorationMode>().is_err());
    }

    #[test]
    fn test_exploration_capabilities() {
        assert!(ExplorationMode::Combined.uses_epsilon());
        assert!(ExplorationMode::Combined.uses_visits());
        assert!(!ExplorationMode::Random.uses_visits());
        assert!(!ExplorationMode::Optimistic.uses_epsilon());
        assert!(!ExplorationMode::None.uses_epsilon());
    }

    #[test]
    fn test_metric_aliases() {
        assert_eq!(
            "manhattan".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Simple
        );
        assert_eq!(
            "hamming".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Adjacent
        );
        assert_eq!(
            "same-result".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::SameResult
        );
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        let err = "euclid".parse::<DistanceMetric>().unwrap_err();
        assert!(matches!(err, crate::Error::ParseDistanceMetric { .. }));
    }
}
