//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits defined in the ports module:
//! table repositories and the symbolic board simulator. Adapters depend on
//! the ports, never the other way around.

pub mod in_memory_repository;
pub mod msgpack_repository;
pub mod simulator;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
pub use simulator::{BoardSimulator, SimulatorConfig};
