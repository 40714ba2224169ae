//! # Duel Arena
//!
//! Frame-stepped two-combatant duel simulation on a bounded grid, with a
//! discrete vertical level (crouch / normal / jump) that gates which shots
//! can hit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        DUEL ARENA                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── grid.rs      - Integer grid vectors and arena bounds    │
//! │  ├── time.rs      - Millisecond timestamps                   │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs      - State hashing for replay checks          │
//! │                                                              │
//! │  game/            - Simulation (deterministic)               │
//! │  ├── config.rs    - Tuning, rule sets, arena presets         │
//! │  ├── input.rs     - Action tokens and replay log             │
//! │  ├── state.rs     - Combatants, projectiles, powerups        │
//! │  ├── action.rs    - Action resolver                          │
//! │  ├── projectile.rs- Projectile advance and hits              │
//! │  ├── powerup.rs   - Powerup spawn, expiry, pickup            │
//! │  ├── round.rs     - Round end and reset                      │
//! │  ├── bot.rs       - Random bot policy                        │
//! │  ├── snapshot.rs  - Render snapshot                          │
//! │  └── tick.rs      - Per-frame advance and replay             │
//! │                                                              │
//! │  driver/          - Frame loop (non-deterministic clock)     │
//! │  ├── source.rs    - Input sources                            │
//! │  └── runner.rs    - Fixed-interval tokio loop                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Order
//!
//! input resolution → level reversion / held movement / charge release →
//! powerups → projectiles and hits → round termination → snapshot.
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - Integer millisecond time, no floating point in game logic
//! - Fixed P1-then-P2 iteration everywhere
//! - All randomness from seeded Xorshift128+ streams
//!
//! Given the same config, clock readings and inputs, a match replays to the
//! same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod driver;

// Re-export commonly used types
pub use crate::core::grid::{ArenaBounds, GridVec};
pub use crate::core::rng::DeterministicRng;
pub use crate::core::time::{Millis, Timestamp};
pub use crate::game::config::{ArenaPreset, GameConfig, RuleSet};
pub use crate::game::input::{ActionToken, FrameInput};
pub use crate::game::state::{CombatantId, MatchState};
pub use crate::game::tick::{tick, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frames per second at the fixed frame interval
pub const FRAME_RATE: u32 = (1_000 / crate::game::config::FRAME_INTERVAL_MS) as u32;
