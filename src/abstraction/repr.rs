//! Configuration axes for state abstraction

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The concern a sub-policy is specialised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Explore the pyramid and color blocks.
    Block,
    /// Keep away from Coily and the other pursuers.
    Enemy,
    /// Catch the green ball and Sam.
    Friendly,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Enemy, PolicyKind::Friendly, PolicyKind::Block];

    /// Representation each policy uses when none is given explicitly.
    pub fn default_repr(self) -> StateRepr {
        match self {
            PolicyKind::Block => StateRepr::Simple,
            PolicyKind::Enemy => StateRepr::AdjacentConservative,
            PolicyKind::Friendly => StateRepr::Simple,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PolicyKind::Block => "block",
            PolicyKind::Enemy => "enemy",
            PolicyKind::Friendly => "friendly",
        };
        f.write_str(label)
    }
}

/// How an observation is reduced to a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StateRepr {
    /// Position plus the raw flag of each neighbor block.
    #[default]
    Simple,
    /// Local density of the policy's feature around each neighbor block.
    Adjacent,
    /// Neighbors within reach of an enemy collapse into a single danger code.
    AdjacentConservative,
    /// Feature count met walking in each direction.
    AlongDirection,
    /// Full board snapshot (ablation baseline).
    Verbose,
}

/// Representation chosen for each sub-policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyReprs {
    pub block: StateRepr,
    pub enemy: StateRepr,
    pub friendly: StateRepr,
}

impl PolicyReprs {
    /// The same representation for every policy.
    pub fn uniform(repr: StateRepr) -> Self {
        Self {
            block: repr,
            enemy: repr,
            friendly: repr,
        }
    }

    pub fn get(&self, kind: PolicyKind) -> StateRepr {
        match kind {
            PolicyKind::Block => self.block,
            PolicyKind::Enemy => self.enemy,
            PolicyKind::Friendly => self.friendly,
        }
    }
}

impl Default for PolicyReprs {
    fn default() -> Self {
        Self {
            block: PolicyKind::Block.default_repr(),
            enemy: PolicyKind::Enemy.default_repr(),
            friendly: PolicyKind::Friendly.default_repr(),
        }
    }
}

impl fmt::Display for StateRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StateRepr::Simple => "simple",
            StateRepr::Adjacent => "adjacent",
            StateRepr::AdjacentConservative => "adjacent_conservative",
            StateRepr::AlongDirection => "along_direction",
            StateRepr::Verbose => "verbose",
        };
        f.write_str(label)
    }
}

impl FromStr for StateRepr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalised.as_str() {
            "simple" => Ok(StateRepr::Simple),
            "adjacent" => Ok(StateRepr::Adjacent),
            "adjacent_conservative" | "conservative" => Ok(StateRepr::AdjacentConservative),
            "along_direction" | "direction" => Ok(StateRepr::AlongDirection),
            "verbose" => Ok(StateRepr::Verbose),
            _ => Err(crate::Error::ParseStateRepr {
                input: s.to_string(),
                expected: "simple, adjacent, adjacent_conservative, along_direction, verbose"
                    .to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Simple".parse::<StateRepr>().unwrap(), StateRepr::Simple);
        assert_eq!(
            "adjacent-conservative".parse::<StateRepr>().unwrap(),
            StateRepr::AdjacentConservative
        );
        assert_eq!(
            "along_direction".parse::<StateRepr>().unwrap(),
            StateRepr::AlongDirection
        );
    }

    #[test]
    fn test_unknown_repr_is_rejected() {
        let err = "pixels".parse::<StateRepr>().unwrap_err();
        assert!(err.to_string().contains("pixels"));
    }

    #[test]
    fn test_policy_defaults() {
        let reprs = PolicyReprs::default();
        assert_eq!(reprs.get(PolicyKind::Enemy), StateRepr::AdjacentConservative);
        assert_eq!(reprs.get(PolicyKind::Block), StateRepr::Simple);
        assert_eq!(
            PolicyReprs::uniform(StateRepr::Verbose).get(PolicyKind::Friendly),
            StateRepr::Verbose
        );
    }

    #[test]
    fn test_display_parses_back() {
        for repr in [
            StateRepr::Simple,
            StateRepr::Adjacent,
            StateRepr::AdjacentConservative,
            StateRepr::AlongDirection,
            StateRepr::Verbose,
        ] {
            assert_eq!(repr.to_string().parse::<StateRepr>().unwrap(), repr);
        }
    }
}
