//! The three-engine agent

use crate::{
    Result,
    abstraction::PolicyReprs,
    agents::AgentType,
    board::Observation,
    error::Error,
    ports::Agent,
    q_learning::{LearnerConfig, SavedAgent, SavedPolicy},
    subsumption::{Decision, SubsumptionArbiter},
};

/// Enemy, friendly and block engines under priority arbitration.
#[derive(Debug, Clone)]
pub struct SubsumptionAgent {
    config: LearnerConfig,
    arbiter: SubsumptionArbiter,
}

impl SubsumptionAgent {
    pub fn new(config: LearnerConfig, reprs: PolicyReprs) -> Result<Self> {
        Ok(Self {
            config,
            arbiter: SubsumptionArbiter::new(config, reprs)?,
        })
    }

    pub fn arbiter(&self) -> &SubsumptionArbiter {
        &self.arbiter
    }
}

impl Agent for SubsumptionAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Subsumption
    }

    fn decide(&mut self, obs: &Observation) -> Result<Decision> {
        self.arbiter.decide(obs)
    }

    fn learn(
        &mut self,
        decision: &Decision,
        before: &Observation,
        after: &Observation,
    ) -> Result<()> {
        self.arbiter.learn(decision, before, after);
        Ok(())
    }

    fn table_size(&self) -> usize {
        self.arbiter.table_size()
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.arbiter.reseed(seed);
    }

    fn snapshot(&self) -> Vec<SavedPolicy> {
        self.arbiter.to_saved()
    }

    fn restore(&mut self, saved: &SavedAgent) -> Result<()> {
        if saved.agent_type != AgentType::Subsumption {
            return Err(Error::IncompatibleSave {
                agent: AgentType::Subsumption.to_string(),
                saved: saved.agent_type.to_string(),
            });
        }
        self.arbiter = SubsumptionArbiter::from_saved(self.config, &saved.policies)?;
        Ok(())
    }
}
