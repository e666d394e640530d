//! Agent layouts: one engine, or three engines under subsumption

pub mod policy;
pub mod subsumption;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::abstraction::{PolicyKind, StateRepr};

pub use policy::PolicyAgent;
pub use subsumption::SubsumptionAgent;

/// Which agent layout to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum AgentType {
    /// Block explorer alone, learning from block points.
    Block,
    /// Enemy avoider alone, learning from enemy points and the life-loss penalty.
    Enemy,
    /// Friendly pursuer alone, learning from friendly points.
    Friendly,
    /// All three engines behind the arbiter.
    #[default]
    Subsumption,
    /// One engine on full board snapshots, learning from the total reward.
    CombinedVerbose,
}

impl AgentType {
    /// Engine concern for single-policy layouts.
    pub fn policy_kind(self) -> Option<PolicyKind> {
        match self {
            AgentType::Block | AgentType::CombinedVerbose => Some(PolicyKind::Block),
            AgentType::Enemy => Some(PolicyKind::Enemy),
            AgentType::Friendly => Some(PolicyKind::Friendly),
            AgentType::Subsumption => None,
        }
    }

    /// Representation forced by the layout, if any.
    pub fn forced_repr(self) -> Option<StateRepr> {
        match self {
            AgentType::CombinedVerbose => Some(StateRepr::Verbose),
            _ => None,
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgentType::Block => "block",
            AgentType::Enemy => "enemy",
            AgentType::Friendly => "friendly",
            AgentType::Subsumption => "subsumption",
            AgentType::CombinedVerbose => "combined_verbose",
        };
        f.write_str(label)
    }
}

impl FromStr for AgentType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalised.as_str() {
            "block" => Ok(AgentType::Block),
            "enemy" => Ok(AgentType::Enemy),
            "friendly" => Ok(AgentType::Friendly),
            "subsumption" => Ok(AgentType::Subsumption),
            "combined_verbose" => Ok(AgentType::CombinedVerbose),
            _ => Err(crate::Error::ParseAgentType {
                input: s.to_string(),
                expected: "block, enemy, friendly, subsumption, combined_verbose".to_string(),
            }),
        }
    }
}
