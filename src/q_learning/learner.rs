//! Tabular Q-learning engine for one sub-policy
//!
//! A [`QLearner`] owns its abstractor, its Q and N tables and its random
//! source. Nothing is shared between learners.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    abstraction::{AbstractState, StateAbstractor},
    board::{Move, Observation},
    error::{Error, Result},
    q_learning::{
        exploration::{DistanceMetric, ExplorationMode},
        q_table::{QTable, VisitTable},
        serialization::SavedPolicy,
    },
};

/// Value substituted for under-visited pairs by optimistic exploration.
pub const UNEXPLORED_BONUS: f64 = 50.0;
/// Visits after which a pair is valued by its learned Q.
pub const VISIT_THRESHOLD: u32 = 5;

/// Hyper-parameters shared by every engine of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// α, in (0, 1]
    pub learning_rate: f64,
    /// γ, in (0, 1]
    pub discount_factor: f64,
    pub exploration: ExplorationMode,
    /// ε, in [0, 1]
    pub epsilon: f64,
    pub unexplored_bonus: f64,
    pub visit_threshold: u32,
    pub distance_metric: DistanceMetric,
    /// Seed for the learner's random source; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration: ExplorationMode::default(),
            epsilon: 0.1,
            unexplored_bonus: UNEXPLORED_BONUS,
            visit_threshold: VISIT_THRESHOLD,
            distance_metric: DistanceMetric::default(),
            seed: None,
        }
    }
}

impl LearnerConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_exploration(mut self, exploration: ExplorationMode) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_unexplored_bonus(mut self, bonus: f64, visit_threshold: u32) -> Self {
        self.unexplored_bonus = bonus;
        self.visit_threshold = visit_threshold;
        self
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Reject parameters outside their ranges.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |value: f64| value > 0.0 && value <= 1.0;
        if !in_unit(self.learning_rate) {
            return Err(invalid(format!(
                "learning rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !in_unit(self.discount_factor) {
            return Err(invalid(format!(
                "discount factor must be in (0, 1], got {}",
                self.discount_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(invalid(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !self.unexplored_bonus.is_finite() {
            return Err(invalid(format!(
                "unexplored bonus must be finite, got {}",
                self.unexplored_bonus
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfiguration { message }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning engine (off-policy TD control) over abstracted states
#[derive(Debug, Clone)]
pub struct QLearner {
    config: LearnerConfig,
    abstractor: StateAbstractor,
    q_table: QTable,
    visits: VisitTable,
    rng: StdRng,
}

impl QLearner {
    /// Create an engine with empty tables.
    pub fn new(config: LearnerConfig, abstractor: StateAbstractor) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            abstractor,
            q_table: QTable::new(),
            visits: VisitTable::new(),
            rng: build_rng(config.seed),
        })
    }

    /// Rebuild an engine around previously saved tables.
    pub fn from_saved(config: LearnerConfig, saved: SavedPolicy) -> Result<Self> {
        let abstractor = StateAbstractor::new(saved.repr, saved.kind);
        let mut learner = Self::new(config, abstractor)?;
        learner.q_table = saved.q_table;
        learner.visits = saved.visits;
        Ok(learner)
    }

    /// Snapshot of the tables for persistence.
    pub fn to_saved(&self) -> SavedPolicy {
        SavedPolicy {
            kind: self.abstractor.concern(),
            repr: self.abstractor.repr(),
            q_table: self.q_table.clone(),
            visits: self.visits.clone(),
        }
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn abstractor(&self) -> StateAbstractor {
        self.abstractor
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn visits(&self) -> &VisitTable {
        &self.visits
    }

    pub fn table_size(&self) -> usize {
        self.q_table.size()
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Reduce an observation with this engine's abstractor.
    pub fn abstract_state(&self, obs: &Observation) -> AbstractState {
        self.abstractor.abstract_state(obs)
    }

    /// Stored Q, or the unexplored bonus while the pair is under-visited.
    fn exploration_value(&self, state: &AbstractState, action: Move) -> f64 {
        if self.config.exploration.uses_visits()
            && self.visits.get(state, action) < self.config.visit_threshold
        {
            self.config.unexplored_bonus
        } else {
            self.q_table.get(state, action)
        }
    }

    /// The tied-best valid moves under the configured exploration mode.
    ///
    /// Valid moves are shuffled first, so the returned order is uniformly
    /// random among ties. When the ε gate fires, the single returned move is
    /// a uniformly random valid move.
    pub fn best_actions(&mut self, state: &AbstractState) -> Result<Vec<Move>> {
        let mut moves = state.valid_moves();
        if moves.is_empty() {
            return Err(Error::NoValidActions {
                state: state.to_string(),
            });
        }
        moves.shuffle(&mut self.rng);

        if self.config.exploration.uses_epsilon() && self.rng.random::<f64>() < self.config.epsilon
        {
            moves.truncate(1);
            return Ok(moves);
        }

        let valued: Vec<(Move, f64)> = moves
            .iter()
            .map(|&action| (action, self.exploration_value(state, action)))
            .collect();
        Ok(tied_best(&valued).unwrap_or(moves))
    }

    /// One best move; uniformly random among ties.
    pub fn best_action(&mut self, state: &AbstractState) -> Result<Move> {
        let best = self.best_actions(state)?;
        best.first().copied().ok_or_else(|| Error::NoValidActions {
            state: state.to_string(),
        })
    }

    /// The candidates with the highest stored Q, in the given order.
    ///
    /// Pure greedy lookup; exploration settings do not apply.
    pub fn rank(&self, state: &AbstractState, candidates: &[Move]) -> Vec<Move> {
        let valued: Vec<(Move, f64)> = candidates
            .iter()
            .map(|&action| (action, self.q_table.get(state, action)))
            .collect();
        tied_best(&valued).unwrap_or_else(|| candidates.to_vec())
    }

    /// One-step backup of Q(state, action); returns the new value.
    pub fn update(
        &mut self,
        state: &AbstractState,
        action: Move,
        next_state: &AbstractState,
        reward: f64,
    ) -> f64 {
        if self.config.exploration.uses_visits() {
            self.visits.increment(state.clone(), action);
        }
        let new_q = self.q_table.q_learning_update(
            state.clone(),
            action,
            reward,
            next_state,
            self.config.learning_rate,
            self.config.discount_factor,
        );
        if !new_q.is_finite() {
            warn!(
                policy = %self.abstractor.concern(),
                state = %state,
                action = %action,
                value = new_q,
                "non-finite Q-value"
            );
        }
        new_q
    }

    /// Copy `new_q` into neighboring states according to the distance metric.
    ///
    /// Neighbor states are abstractions of `origin` projected onto the
    /// neighbor cell. Returns the number of entries written.
    pub fn update_close(&mut self, origin: &Observation, action: Move, new_q: f64) -> usize {
        let here = origin.position;
        let targets: Vec<(_, Move)> = match self.config.distance_metric {
            DistanceMetric::None => Vec::new(),
            DistanceMetric::Simple => here.neighbors().map(|(_, cell)| (cell, action)).collect(),
            DistanceMetric::Adjacent => here
                .neighbors()
                .map(|(_, cell)| (cell, action.inverse()))
                .collect(),
            DistanceMetric::SameResult => match here.neighbor(action) {
                // Every other cell with a single move onto `landing`.
                Some(landing) => landing
                    .neighbors()
                    .filter(|&(_, cell)| cell != here)
                    .map(|(step, cell)| (cell, step.inverse()))
                    .collect(),
                None => Vec::new(),
            },
        };

        for &(cell, write) in &targets {
            let state = self.abstractor.abstract_state(&origin.projected(cell));
            self.q_table.set(state, write, new_q);
        }
        targets.len()
    }

    /// Abstract both observations, back up, then generalize.
    pub fn learn_step(
        &mut self,
        before: &Observation,
        action: Move,
        after: &Observation,
        reward: f64,
    ) -> f64 {
        let state = self.abstract_state(before);
        let next_state = self.abstract_state(after);
        let new_q = self.update(&state, action, &next_state, reward);
        let written = self.update_close(before, action, new_q);
        debug!(
            policy = %self.abstractor.concern(),
            state = %state,
            action = %action,
            reward,
            new_q,
            written,
            "q update"
        );
        new_q
    }
}

/// Entries sharing the maximum value, in input order. `None` when no value
/// compares (empty input or all NaN).
fn tied_best(valued: &[(Move, f64)]) -> Option<Vec<Move>> {
    let best = valued
        .iter()
        .map(|&(_, value)| value)
        .filter(|value| !value.is_nan())
        .reduce(f64::max)?;
    Some(
        valued
            .iter()
            .filter(|&&(_, value)| value == best)
            .map(|&(action, _)| action)
            .collect(),
    )
}
