//! Core deterministic primitives.
//!
//! Value types and helpers shared by the simulation and its consumers.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, HashInto, StateHash, StateHasher};
