//! Round/Match Controller
//!
//! Detects the end of a round, credits the scorer, and resets the arena for
//! the next round while keeping persistent scores.

use tracing::info;

use crate::core::time::Timestamp;
use crate::game::events::GameEvent;
use crate::game::state::{Combatant, CombatantId, MatchState, RoundPhase};

/// Result of a round that just resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundOutcome {
    /// Round that ended
    pub round: u32,
    /// Credited combatant (`None` if both fell in the same frame)
    pub scorer: Option<CombatantId>,
    /// Scores after crediting
    pub scores: [u32; 2],
}

/// Decide who scores, if the round is over.
///
/// A scorer found by the projectile engine wins. Otherwise, if exactly one
/// combatant is dead by any means, the survivor scores.
pub fn determine_scorer(state: &MatchState, hit_scorer: Option<CombatantId>) -> Option<Option<CombatantId>> {
    if hit_scorer.is_some() {
        return Some(hit_scorer);
    }

    let alive = CombatantId::ALL.map(|id| state.combatant(id).alive);
    match alive {
        [true, true] => None,
        [true, false] => Some(Some(CombatantId::One)),
        [false, true] => Some(Some(CombatantId::Two)),
        [false, false] => Some(None),
    }
}

/// Move Active -> Resolved if the round is over this frame.
///
/// Happens at most once per round; a resolved round is left untouched.
pub fn check_round_end(state: &mut MatchState, hit_scorer: Option<CombatantId>, now: Timestamp) -> Option<RoundOutcome> {
    if !state.is_active() {
        return None;
    }
    let scorer = determine_scorer(state, hit_scorer)?;

    if let Some(id) = scorer {
        state.scores[id.index()] += 1;
    }
    state.phase = RoundPhase::Resolved { scorer };

    let outcome = RoundOutcome {
        round: state.round,
        scorer,
        scores: state.scores,
    };

    info!(
        round = outcome.round,
        frame = state.frame,
        scorer = scorer.map_or("none", CombatantId::name),
        p1 = outcome.scores[0],
        p2 = outcome.scores[1],
        "round over"
    );
    state.push_event(GameEvent::round_ended(state.frame, now, outcome.round, scorer, outcome.scores));

    Some(outcome)
}

/// Start the next round: fresh combatants, empty arena, reset spawn timer.
///
/// Scores, the match seed's RNG stream, and the frame counter carry over.
pub fn start_next_round(state: &mut MatchState, now: Timestamp) {
    let bounds = state.bounds;
    state.combatants = CombatantId::ALL.map(|id| Combatant::spawn(id, bounds));
    state.projectiles.clear();
    state.powerups.clear();
    state.trails.clear();
    state.last_spawn_at = now;
    state.round += 1;
    state.phase = RoundPhase::Active;

    info!(round = state.round, "round started");
}
