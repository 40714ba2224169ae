//! Projectile & Effect Engine
//!
//! Advances projectiles in single-cell sub-steps with level-gated hit
//! detection, and prunes expired dash trails.

use crate::core::time::Timestamp;
use crate::game::config::PROJECTILE_SUBSTEPS;
use crate::game::events::GameEvent;
use crate::game::state::{CombatantId, MatchState, Projectile};

/// What a qualifying hit did to its defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Shield consumed; defender unharmed
    Absorbed { defender: CombatantId },
    /// Defender killed; projectile owner scores
    Eliminated { victim: CombatantId },
}

/// Find the defender a projectile hits at its current cell, if any.
///
/// Never the owner, never a dead combatant, and never across levels.
/// Size tier N reaches Manhattan distance N - 1 (tier 1 is the exact cell).
pub fn find_target(state: &MatchState, projectile: &Projectile) -> Option<CombatantId> {
    CombatantId::ALL.into_iter().find(|&id| {
        let defender = state.combatant(id);
        id != projectile.owner
            && defender.alive
            && defender.level() == projectile.level
            && defender.position.manhattan(projectile.position) <= projectile.size.radius()
    })
}

/// Apply a hit to its defender.
fn resolve_hit(state: &mut MatchState, projectile: &Projectile, defender: CombatantId, now: Timestamp) -> HitOutcome {
    let frame = state.frame;
    let target = state.combatant_mut(defender);

    if target.shield {
        target.shield = false;
        state.push_event(GameEvent::shield_absorbed(frame, now, defender, projectile.owner));
        HitOutcome::Absorbed { defender }
    } else {
        target.alive = false;
        state.push_event(GameEvent::eliminated(frame, now, defender, projectile.owner));
        HitOutcome::Eliminated { victim: defender }
    }
}

/// Advance every projectile by `PROJECTILE_SUBSTEPS` single-cell steps.
///
/// Projectiles leaving the arena or hitting a defender are removed. Returns
/// the scorer of the first lethal hit; remaining sub-steps are skipped once
/// a scorer is found.
pub fn advance_projectiles(state: &mut MatchState, now: Timestamp) -> Option<CombatantId> {
    let bounds = state.bounds;

    for _ in 0..PROJECTILE_SUBSTEPS {
        let mut pending = std::mem::take(&mut state.projectiles).into_iter();
        let mut survivors = Vec::with_capacity(pending.len());
        let mut scorer = None;

        while let Some(mut projectile) = pending.next() {
            projectile.position = projectile.position + projectile.velocity;
            if !bounds.contains(projectile.position) {
                continue;
            }

            let Some(defender) = find_target(state, &projectile) else {
                survivors.push(projectile);
                continue;
            };

            if let HitOutcome::Eliminated { .. } = resolve_hit(state, &projectile, defender, now) {
                scorer = Some(projectile.owner);
                survivors.extend(pending.by_ref());
                break;
            }
        }

        state.projectiles = survivors;
        if scorer.is_some() {
            return scorer;
        }
    }

    None
}

/// Drop trail cells whose expiry has been reached.
pub fn prune_trails(state: &mut MatchState, now: Timestamp) {
    state.trails.retain(|trail| !now.has_reached(trail.expires_at));
}
