//! Configuration types for agent creation.

use serde::{Deserialize, Serialize};

use crate::{abstraction::PolicyReprs, agents::AgentType, q_learning::LearnerConfig};

/// Configuration for creating a Qbert agent.
///
/// # Examples
///
/// ```
/// use qbert::abstraction::{PolicyReprs, StateRepr};
/// use qbert::agents::AgentType;
/// use qbert::app::AgentConfig;
/// use qbert::q_learning::{ExplorationMode, LearnerConfig};
///
/// let config = AgentConfig::new(AgentType::Subsumption)
///     .with_reprs(PolicyReprs::uniform(StateRepr::Simple))
///     .with_learner(LearnerConfig::default().with_exploration(ExplorationMode::Random))
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent_type: AgentType,
    /// Representation of each sub-policy; single-policy agents use their own slot
    pub reprs: PolicyReprs,
    pub learner: LearnerConfig,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Defaults: per-policy representations, combined exploration, no seed.
    pub fn new(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            reprs: PolicyReprs::default(),
            learner: LearnerConfig::default(),
            seed: None,
        }
    }

    pub fn with_reprs(mut self, reprs: PolicyReprs) -> Self {
        self.reprs = reprs;
        self
    }

    pub fn with_learner(mut self, learner: LearnerConfig) -> Self {
        self.learner = learner;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(AgentType::default())
    }
}
