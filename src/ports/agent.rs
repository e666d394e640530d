//! Agent port - one interface over every agent layout
//!
//! Single-policy agents and the subsumption agent differ only in how many
//! engines they hold and how they pick between them, so the training
//! pipeline drives them all through this trait.

use crate::{
    Result,
    agents::AgentType,
    board::Observation,
    q_learning::{SavedAgent, SavedPolicy},
    subsumption::Decision,
};

/// A learning agent driven one step at a time.
///
/// # Step Sequence
///
/// 1. `decide(before)` picks a move.
/// 2. The pipeline performs it against an
///    [`Environment`](crate::ports::Environment).
/// 3. `learn(decision, before, after)` backs up the transition; the reward is
///    read from `after.reward`.
///
/// # Examples
///
/// ```no_run
/// use qbert::ports::{Agent, Environment};
///
/// fn play_step<A: Agent, E: Environment>(agent: &mut A, env: &mut E) -> qbert::Result<()> {
///     let before = env.observe();
///     let decision = agent.decide(&before)?;
///     env.perform(decision.action)?;
///     agent.learn(&decision, &before, &env.observe())
/// }
/// ```
pub trait Agent: Send {
    fn agent_type(&self) -> AgentType;

    /// Select a move for the observation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValidActions`](crate::Error::NoValidActions) when no
    /// engine can propose a move.
    fn decide(&mut self, obs: &Observation) -> Result<Decision>;

    /// Update the tables after `decision` turned `before` into `after`.
    fn learn(&mut self, decision: &Decision, before: &Observation, after: &Observation)
    -> Result<()>;

    /// Total number of stored Q-values.
    fn table_size(&self) -> usize;

    /// Seed the agent's random sources.
    ///
    /// Training pipelines call this when given a deterministic seed.
    fn set_rng_seed(&mut self, seed: u64);

    /// Tables of every engine, for persistence.
    fn snapshot(&self) -> Vec<SavedPolicy>;

    /// Replace the tables with previously saved ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleSave`](crate::Error::IncompatibleSave)
    /// when the save was written by a different agent type.
    fn restore(&mut self, saved: &SavedAgent) -> Result<()>;
}
