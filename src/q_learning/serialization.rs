//! Serialization support for trained Q-learning agents.

use serde::{Deserialize, Serialize};

use crate::{
    abstraction::{PolicyKind, StateRepr},
    agents::AgentType,
    error::{Error, Result},
    q_learning::{
        exploration::{DistanceMetric, ExplorationMode},
        q_table::{QTable, VisitTable},
    },
};

/// Tables of one sub-policy engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPolicy {
    pub kind: PolicyKind,
    pub repr: StateRepr,
    pub q_table: QTable,
    pub visits: VisitTable,
}

/// Serializable representation of a trained agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    /// Version of the save format
    pub version: u32,
    pub agent_type: AgentType,
    /// One entry per engine, in the agent's engine order
    pub policies: Vec<SavedPolicy>,
    pub metadata: TrainingMetadata,
}

/// Metadata about the training process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Episodes played, summed over every run that touched the tables
    pub episodes_trained: usize,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    pub exploration: Option<ExplorationMode>,
    pub distance_metric: Option<DistanceMetric>,
    /// Best episode score seen while training
    pub max_score: Option<i64>,
    /// Highest level reached while training
    pub max_level: Option<u32>,
}

impl SavedAgent {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn new(
        agent_type: AgentType,
        policies: Vec<SavedPolicy>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            version: Self::VERSION,
            agent_type,
            policies,
            metadata,
        }
    }

    /// Refuse saves written by another format version.
    pub fn check_version(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(())
    }

    /// Tables saved for the given sub-policy.
    pub fn policy(&self, kind: PolicyKind) -> Option<&SavedPolicy> {
        self.policies.iter().find(|policy| policy.kind == kind)
    }

    /// Total number of stored Q-values.
    pub fn table_size(&self) -> usize {
        self.policies
            .iter()
            .map(|policy| policy.q_table.size())
            .sum()
    }
}
