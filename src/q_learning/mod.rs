//! Tabular Q-learning over abstracted Qbert states
//!
//! Each sub-policy owns one [`QLearner`]: a sparse Q-table, a visit-count
//! table and a seeded random source. The engine backs up one transition at a
//! time and can copy the fresh value into neighboring states, which stands in
//! for function approximation.
//!
//! ## Exploration
//!
//! | Mode | Rule |
//! |------|------|
//! | `none` | greedy on stored Q, ties uniformly at random |
//! | `random` | ε-greedy |
//! | `optimistic` | pairs visited fewer than the threshold are valued at the bonus |
//! | `combined` | ε-greedy gate around the optimistic rule |
//!
//! ## Usage Example
//!
//! ```no_run
//! use qbert::{
//!     abstraction::{PolicyKind, StateAbstractor},
//!     board::Observation,
//!     q_learning::{DistanceMetric, ExplorationMode, LearnerConfig, QLearner},
//! };
//!
//! let config = LearnerConfig::default()
//!     .with_exploration(ExplorationMode::Combined)
//!     .with_distance_metric(DistanceMetric::Simple)
//!     .with_seed(Some(123));
//! let mut engine = QLearner::new(config, StateAbstractor::for_policy(PolicyKind::Block))?;
//!
//! let obs = Observation::new(4);
//! let action = engine.best_action(&engine.abstract_state(&obs))?;
//! # Ok::<(), qbert::Error>(())
//! ```

pub mod exploration;
pub mod learner;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use exploration::{DistanceMetric, ExplorationMode};
pub use learner::{LearnerConfig, QLearner, UNEXPLORED_BONUS, VISIT_THRESHOLD};
pub use q_table::{QTable, VisitTable};
pub use serialization::{SavedAgent, SavedPolicy, TrainingMetadata};
