//! Subsumption arbitration between the enemy, friendly and block policies
//!
//! Every step the arbiter checks which concerns are active around Qbert,
//! asks the matching engines for their tied-best moves and lets the highest
//! priority active concern decide: enemy avoidance, then friendly pursuit,
//! then block exploration. Ties inside the winning proposal are ranked by
//! the block engine's stored values, and only then broken at random.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tracing::debug;

use crate::{
    abstraction::{AbstractState, PolicyKind, PolicyReprs, StateAbstractor},
    board::{Move, Observation},
    error::{Error, Result},
    q_learning::{LearnerConfig, QLearner, SavedPolicy},
};

/// Outcome of one arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Move,
    /// Policy whose proposal won.
    pub source: PolicyKind,
    pub enemy_active: bool,
    pub friendly_active: bool,
}

/// Distinct seed for one random stream of an agent.
pub(crate) fn stream_seed(seed: u64, stream: u64) -> u64 {
    seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn derive_seed(seed: Option<u64>, stream: u64) -> Option<u64> {
    seed.map(|seed| stream_seed(seed, stream))
}

/// Three independent engines behind a fixed priority order.
#[derive(Debug, Clone)]
pub struct SubsumptionArbiter {
    enemy: QLearner,
    friendly: QLearner,
    block: QLearner,
    rng: StdRng,
}

impl SubsumptionArbiter {
    pub fn new(config: LearnerConfig, reprs: PolicyReprs) -> Result<Self> {
        let engine = |kind: PolicyKind, stream: u64| {
            QLearner::new(
                config.with_seed(derive_seed(config.seed, stream)),
                StateAbstractor::new(reprs.get(kind), kind),
            )
        };
        Ok(Self {
            enemy: engine(PolicyKind::Enemy, 1)?,
            friendly: engine(PolicyKind::Friendly, 2)?,
            block: engine(PolicyKind::Block, 3)?,
            rng: build_rng(derive_seed(config.seed, 4)),
        })
    }

    /// Rebuild the arbiter around saved tables; every policy must be present.
    pub fn from_saved(config: LearnerConfig, policies: &[SavedPolicy]) -> Result<Self> {
        let mut arbiter = Self::new(config, PolicyReprs::default())?;
        for kind in PolicyKind::ALL {
            let saved = policies
                .iter()
                .find(|policy| policy.kind == kind)
                .ok_or_else(|| Error::IncompatibleSave {
                    agent: "subsumption".to_string(),
                    saved: format!("tables without a {kind} policy"),
                })?;
            let engine = arbiter.engine_mut(kind);
            let seed = engine.config().seed;
            *engine = QLearner::from_saved(config.with_seed(seed), saved.clone())?;
        }
        Ok(arbiter)
    }

    /// Tables of every engine, in priority order.
    pub fn to_saved(&self) -> Vec<SavedPolicy> {
        PolicyKind::ALL
            .iter()
            .map(|&kind| self.engine(kind).to_saved())
            .collect()
    }

    pub fn engine(&self, kind: PolicyKind) -> &QLearner {
        match kind {
            PolicyKind::Enemy => &self.enemy,
            PolicyKind::Friendly => &self.friendly,
            PolicyKind::Block => &self.block,
        }
    }

    pub fn engine_mut(&mut self, kind: PolicyKind) -> &mut QLearner {
        match kind {
            PolicyKind::Enemy => &mut self.enemy,
            PolicyKind::Friendly => &mut self.friendly,
            PolicyKind::Block => &mut self.block,
        }
    }

    pub fn table_size(&self) -> usize {
        PolicyKind::ALL
            .iter()
            .map(|&kind| self.engine(kind).table_size())
            .sum()
    }

    pub fn reseed(&mut self, seed: u64) {
        let kinds = [PolicyKind::Enemy, PolicyKind::Friendly, PolicyKind::Block];
        for (stream, kind) in (1u64..).zip(kinds) {
            self.engine_mut(kind).reseed(stream_seed(seed, stream));
        }
        self.rng = StdRng::seed_from_u64(stream_seed(seed, 4));
    }

    /// Pick the move for this step.
    pub fn decide(&mut self, obs: &Observation) -> Result<Decision> {
        let enemy_active = obs.enemy_nearby();
        let friendly_active = obs.friendly_nearby();

        let enemy_best = if enemy_active {
            let state = self.enemy.abstract_state(obs);
            Some(self.enemy.best_actions(&state)?)
        } else {
            None
        };
        let friendly_best = if friendly_active {
            let state = self.friendly.abstract_state(obs);
            Some(self.friendly.best_actions(&state)?)
        } else {
            None
        };
        let block_state = self.block.abstract_state(obs);
        let block_best = self.block.best_actions(&block_state)?;

        let (source, action) = if let Some(proposals) = enemy_best {
            (PolicyKind::Enemy, self.resolve(&block_state, &proposals)?)
        } else if let Some(proposals) = friendly_best {
            (
                PolicyKind::Friendly,
                self.resolve(&block_state, &proposals)?,
            )
        } else {
            (PolicyKind::Block, self.pick(&block_state, &block_best)?)
        };

        debug!(
            %action,
            source = %source,
            enemy_active,
            friendly_active,
            "arbitration"
        );
        Ok(Decision {
            action,
            source,
            enemy_active,
            friendly_active,
        })
    }

    /// Learn from the transition `decision` produced.
    ///
    /// Active concern engines learn from their own reward channel; the block
    /// engine always learns, using the arbiter-chosen action.
    pub fn learn(&mut self, decision: &Decision, before: &Observation, after: &Observation) {
        let reward = after.reward;
        if decision.enemy_active {
            self.enemy
                .learn_step(before, decision.action, after, reward.enemy_reward());
        }
        if decision.friendly_active {
            self.friendly
                .learn_step(before, decision.action, after, reward.friendly_reward());
        }
        self.block
            .learn_step(before, decision.action, after, reward.block_reward());
    }

    /// A single proposal is taken as is; several are ranked by block values.
    fn resolve(&mut self, block_state: &AbstractState, proposals: &[Move]) -> Result<Move> {
        match proposals {
            [only] => Ok(*only),
            _ => {
                let ranked = self.block.rank(block_state, proposals);
                self.pick(block_state, &ranked)
            }
        }
    }

    fn pick(&mut self, state: &AbstractState, candidates: &[Move]) -> Result<Move> {
        candidates
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| Error::NoValidActions {
                state: state.to_string(),
            })
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}
