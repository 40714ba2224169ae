//! Game Logic Module
//!
//! All simulation code. Deterministic and synchronous.
//!
//! ## Module Structure
//!
//! - `config`: Tuning constants, rule sets, arena presets
//! - `input`: Action tokens, per-frame input, replay log
//! - `state`: Combatants, projectiles, powerups, trails, match state
//! - `action`: Action resolver (movement, levels, dash, shoot, charge)
//! - `projectile`: Projectile advance, hit detection, trail pruning
//! - `powerup`: Powerup spawn, expiry and pickup
//! - `round`: Round end detection and reset
//! - `bot`: Random bot policy
//! - `events`: Game events for logging and replay checks
//! - `snapshot`: Read-only render snapshot
//! - `tick`: Per-frame state advance and replay

pub mod config;
pub mod input;
pub mod state;
pub mod action;
pub mod projectile;
pub mod powerup;
pub mod round;
pub mod bot;
pub mod events;
pub mod snapshot;
pub mod tick;

// Re-export key types
pub use config::{ArenaPreset, ConfigError, GameConfig, MovementMode, RuleSet};
pub use input::{ActionToken, FrameInput, ReplayLog};
pub use state::{CombatantId, Level, MatchState, RoundPhase};
pub use round::{start_next_round, RoundOutcome};
pub use bot::BotPolicy;
pub use events::{GameEvent, GameEventData};
pub use snapshot::WorldSnapshot;
pub use tick::{replay, tick, TickResult};
