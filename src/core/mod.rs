//! Core deterministic primitives.
//!
//! Integer-only value types shared by every simulation module. Nothing in
//! here reads a clock or touches global state.

pub mod grid;
pub mod time;
pub mod rng;
pub mod hash;

// Re-export core types
pub use grid::{ArenaBounds, GridVec};
pub use time::{Millis, Timestamp};
pub use rng::DeterministicRng;
pub use hash::{Digestible, StateHash, StateHasher};
