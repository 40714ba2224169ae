//! Frame Advance
//!
//! The per-frame state advance. Given the same starting state, inputs and
//! clock readings it always produces the same result, which is what replay
//! verification relies on.

use crate::core::time::Timestamp;
use crate::game::action::{resolve_inputs, update_combatants};
use crate::game::events::GameEvent;
use crate::game::input::{FrameInput, ReplayEntry, ReplayLog};
use crate::game::powerup::update_powerups;
use crate::game::projectile::{advance_projectiles, prune_trails};
use crate::game::round::{check_round_end, start_next_round, RoundOutcome};
use crate::game::state::MatchState;

/// Result of a frame.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this frame, in `(frame, priority, combatant)` order
    pub events: Vec<GameEvent>,
    /// Set on the frame the round resolved
    pub round_end: Option<RoundOutcome>,
    /// Exit token seen; nothing was simulated
    pub exit_requested: bool,
}

/// Advance the match by one frame.
///
/// Phase order is fixed:
/// 1. input resolution
/// 2. level reversion, held movement, charge release
/// 3. powerup spawn, expiry and pickup
/// 4. projectile advance and hits, trail pruning
/// 5. round termination
///
/// An exit request returns at once without touching the state. A resolved
/// round is frozen until `start_next_round`.
pub fn tick(state: &mut MatchState, input: &FrameInput, now: Timestamp) -> TickResult {
    let mut result = TickResult::default();

    if input.exit {
        result.exit_requested = true;
        return result;
    }
    if !state.is_active() {
        return result;
    }

    state.frame += 1;

    // 1. Tokens
    resolve_inputs(state, input, now);

    // 2. Time-driven combatant updates
    update_combatants(state, now);

    // 3. Powerups
    update_powerups(state, now);

    // 4. Projectiles and effects
    let scorer = advance_projectiles(state, now);
    prune_trails(state, now);

    // 5. Round end
    result.round_end = check_round_end(state, scorer, now);

    result.events = state.take_events();
    result.events.sort();

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        frame = state.frame,
        projectiles = state.projectiles.len(),
        events = result.events.len(),
        "frame advanced"
    );

    result
}

/// Replay a recorded match from scratch.
///
/// Returns the final state and every event produced.
pub fn replay(log: &ReplayLog) -> (MatchState, Vec<GameEvent>) {
    let mut state = MatchState::new(log.config, log.started_at);
    let mut all_events = Vec::new();

    for entry in log.entries() {
        match entry {
            ReplayEntry::Frame { now, input } => {
                let result = tick(&mut state, input, *now);
                all_events.extend(result.events);
            }
            ReplayEntry::NextRound { now } => start_next_round(&mut state, *now),
        }
    }

    (state, all_events)
}
