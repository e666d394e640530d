//! Common test utilities for the qbert test suite.
//!
//! Builders for cells, observations and seeded learners shared by the
//! integration tests.

#![allow(dead_code)]

use qbert::{
    abstraction::{PolicyKind, StateAbstractor, StateRepr},
    adapters::{BoardSimulator, SimulatorConfig},
    board::{Cell, Observation},
    q_learning::{ExplorationMode, LearnerConfig, QLearner},
};

pub fn cell(row: i32, col: i32) -> Cell {
    Cell::new(row, col).expect("cell on the pyramid")
}

/// Fresh observation with Qbert standing on `position`.
pub fn obs_at(position: Cell) -> Observation {
    Observation::new(4).with_position(position)
}

/// Learner config that never explores, with a fixed seed.
pub fn greedy(seed: u64) -> LearnerConfig {
    LearnerConfig::default()
        .with_exploration(ExplorationMode::None)
        .with_seed(Some(seed))
}

pub fn engine(config: LearnerConfig, repr: StateRepr, kind: PolicyKind) -> QLearner {
    QLearner::new(config, StateAbstractor::new(repr, kind)).expect("valid learner config")
}

/// Simulator with the given seed and a short game.
pub fn simulator(seed: u64, max_steps: usize) -> BoardSimulator {
    BoardSimulator::new(SimulatorConfig {
        seed: Some(seed),
        max_steps: Some(max_steps),
        ..SimulatorConfig::default()
    })
    .expect("valid simulator config")
}

/// Every slotted state representation.
pub const SLOTTED: [StateRepr; 4] = [
    StateRepr::Simple,
    StateRepr::Adjacent,
    StateRepr::AdjacentConservative,
    StateRepr::AlongDirection,
];
