//! Single-engine agents

use crate::{
    Result,
    abstraction::{PolicyKind, StateAbstractor, StateRepr},
    agents::AgentType,
    board::{Observation, StepReward},
    error::Error,
    ports::Agent,
    q_learning::{LearnerConfig, QLearner, SavedAgent, SavedPolicy},
    subsumption::Decision,
};

/// Agent driven by one Q-learning engine.
#[derive(Debug, Clone)]
pub struct PolicyAgent {
    agent_type: AgentType,
    kind: PolicyKind,
    engine: QLearner,
}

impl PolicyAgent {
    /// Build a single-policy agent; `repr` is ignored when the layout forces one.
    pub fn new(agent_type: AgentType, config: LearnerConfig, repr: StateRepr) -> Result<Self> {
        let kind = agent_type
            .policy_kind()
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!("'{agent_type}' is not a single-policy agent"),
            })?;
        let repr = agent_type.forced_repr().unwrap_or(repr);
        let engine = QLearner::new(config, StateAbstractor::new(repr, kind))?;
        Ok(Self {
            agent_type,
            kind,
            engine,
        })
    }

    pub fn engine(&self) -> &QLearner {
        &self.engine
    }

    /// Reward channel this layout learns from.
    fn reward(&self, reward: &StepReward) -> f64 {
        match self.agent_type {
            AgentType::CombinedVerbose => reward.total(),
            _ => match self.kind {
                PolicyKind::Block => reward.block_reward(),
                PolicyKind::Enemy => reward.enemy_reward(),
                PolicyKind::Friendly => reward.friendly_reward(),
            },
        }
    }
}

impl Agent for PolicyAgent {
    fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    fn decide(&mut self, obs: &Observation) -> Result<Decision> {
        let state = self.engine.abstract_state(obs);
        let action = self.engine.best_action(&state)?;
        Ok(Decision {
            action,
            source: self.kind,
            enemy_active: obs.enemy_nearby(),
            friendly_active: obs.friendly_nearby(),
        })
    }

    fn learn(
        &mut self,
        decision: &Decision,
        before: &Observation,
        after: &Observation,
    ) -> Result<()> {
        let reward = self.reward(&after.reward);
        self.engine.learn_step(before, decision.action, after, reward);
        Ok(())
    }

    fn table_size(&self) -> usize {
        self.engine.table_size()
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }

    fn snapshot(&self) -> Vec<SavedPolicy> {
        vec![self.engine.to_saved()]
    }

    fn restore(&mut self, saved: &SavedAgent) -> Result<()> {
        if saved.agent_type != self.agent_type {
            return Err(Error::IncompatibleSave {
                agent: self.agent_type.to_string(),
                saved: saved.agent_type.to_string(),
            });
        }
        let policy = saved
            .policy(self.kind)
            .ok_or_else(|| Error::IncompatibleSave {
                agent: self.agent_type.to_string(),
                saved: format!("tables without a {} policy", self.kind),
            })?;
        self.engine = QLearner::from_saved(*self.engine.config(), policy.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{Cell, Move},
        q_learning::{ExplorationMode, TrainingMetadata},
    };

    fn config() -> LearnerConfig {
        LearnerConfig::default()
            .with_exploration(ExplorationMode::None)
            .with_seed(Some(5))
    }

    #[test]
    fn test_subsumption_is_not_a_single_policy() {
        let result = PolicyAgent::new(AgentType::Subsumption, config(), StateRepr::Simple);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_combined_verbose_forces_verbose_states() {
        let agent =
            PolicyAgent::new(AgentType::CombinedVerbose, config(), StateRepr::Simple).unwrap();
        assert_eq!(agent.engine().abstractor().repr(), StateRepr::Verbose);
    }

    #[test]
    fn test_enemy_agent_learns_penalty() {
        let mut agent = PolicyAgent::new(AgentType::Enemy, config(), StateRepr::Simple).unwrap();
        let before = Observation::new(3);
        let decision = agent.decide(&before).unwrap();
        let landing = Cell::TOP.neighbor(decision.action).unwrap();
        let mut after = before.projected(landing);
        after.reward.block = 25;
        after.reward.enemy_penalty = -500.0;
        agent.learn(&decision, &before, &after).unwrap();

        let state = agent.engine().abstract_state(&before);
        // Block points are ignored by the enemy channel.
        let q = agent.engine().q_table().get(&state, decision.action);
        assert!((q + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_restore_rejects_other_layouts() {
        let mut agent = PolicyAgent::new(AgentType::Block, config(), StateRepr::Simple).unwrap();
        let other = PolicyAgent::new(AgentType::Friendly, config(), StateRepr::Simple).unwrap();
        let saved = SavedAgent::new(
            AgentType::Friendly,
            other.snapshot(),
            TrainingMetadata::default(),
        );
        assert!(matches!(
            agent.restore(&saved),
            Err(Error::IncompatibleSave { .. })
        ));
    }

    #[test]
    fn test_restore_replaces_tables() {
        let mut trained = PolicyAgent::new(AgentType::Block, config(), StateRepr::Simple).unwrap();
        let before = Observation::new(3);
        let after = before.projected(Cell::new(1, 0).unwrap());
        let decision = Decision {
            action: Move::Down,
            source: PolicyKind::Block,
            enemy_active: false,
            friendly_active: false,
        };
        trained.learn(&decision, &before, &after).unwrap();

        let saved = SavedAgent::new(
            AgentType::Block,
            trained.snapshot(),
            TrainingMetadata::default(),
        );
        let mut fresh = PolicyAgent::new(AgentType::Block, config(), StateRepr::Simple).unwrap();
        fresh.restore(&saved).unwrap();
        assert_eq!(fresh.table_size(), 1);
    }
}
