//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning core and
//! infrastructure. Following hexagonal architecture, these traits are owned
//! by the domain and implemented by adapters (emulator bindings, the board
//! simulator, file repositories) or by the agents themselves.

pub mod agent;
pub mod emulator;
pub mod environment;
pub mod observer;
pub mod repository;

pub use agent::Agent;
pub use emulator::Emulator;
pub use environment::Environment;
pub use observer::Observer;
pub use repository::TableRepository;
