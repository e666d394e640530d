//! CLI infrastructure for the Qbert learner
//!
//! Commands for training agents on the board simulator and inspecting saved
//! Q-tables.

pub mod commands;
pub mod output;
