//! Tabular multi-policy Q-learning for Qbert
//!
//! This crate provides:
//! - The pyramid model: cells, legal moves, symbolic observations
//! - State abstraction into small per-concern states
//! - Tabular Q-learning with optimistic/ε-greedy exploration and
//!   neighbor-state value propagation
//! - Subsumption arbitration between enemy, friendly and block policies
//! - A frame-parsing world over any emulator and a seeded board simulator
//! - Training pipeline, persistence and a CLI

pub mod abstraction;
pub mod adapters;
pub mod agents;
pub mod app;
pub mod board;
pub mod cli;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod subsumption;
pub mod world;

pub use error::{Error, Result};
