//! PowerUp System
//!
//! Interval-gated spawning, lifetime expiry, and pickup of temporary buffs.

use tracing::debug;

use crate::core::time::Timestamp;
use crate::game::config::{
    DASH_BOOST_DURATION_MS, POWERUP_EDGE_MARGIN, POWERUP_LIFETIME_MS,
    POWERUP_SPAWN_INTERVAL_MS, POWERUP_SPAWN_TRIES, SHOTGUN_DURATION_MS,
};
use crate::game::events::GameEvent;
use crate::game::state::{Combatant, CombatantId, MatchState, PowerUp, PowerUpKind};

/// Run the powerup phase of a frame: spawn, expire, then pickups.
pub fn update_powerups(state: &mut MatchState, now: Timestamp) {
    spawn_if_due(state, now);
    expire_powerups(state, now);
    collect_pickups(state, now);
}

/// Spawn one powerup if the spawn interval has elapsed.
///
/// Gives up silently for this cycle when no free cell turns up within
/// `POWERUP_SPAWN_TRIES` attempts. Returns the spawned powerup's id.
pub fn spawn_if_due(state: &mut MatchState, now: Timestamp) -> Option<u32> {
    if now.since(state.last_spawn_at) < POWERUP_SPAWN_INTERVAL_MS {
        return None;
    }
    state.last_spawn_at = now;

    for _ in 0..POWERUP_SPAWN_TRIES {
        let cell = state.rng.random_cell(state.bounds, POWERUP_EDGE_MARGIN);
        if state.is_occupied(cell) || state.powerup_at(cell).is_some() {
            continue;
        }

        let kind = state
            .rng
            .choose(&PowerUpKind::ALL)
            .copied()
            .unwrap_or(PowerUpKind::Shield);
        let id = state.next_powerup_id;
        state.next_powerup_id += 1;

        state.powerups.push(PowerUp {
            id,
            position: cell,
            kind,
            spawned_at: now,
        });
        debug!(id, kind = kind.name(), %cell, "powerup spawned");
        state.push_event(GameEvent::powerup_spawned(state.frame, now, id, kind, cell));
        return Some(id);
    }

    debug!(tries = POWERUP_SPAWN_TRIES, "no free cell for powerup");
    None
}

/// Remove powerups older than their lifetime.
pub fn expire_powerups(state: &mut MatchState, now: Timestamp) {
    let (expired, live): (Vec<PowerUp>, Vec<PowerUp>) = std::mem::take(&mut state.powerups)
        .into_iter()
        .partition(|p| p.age(now) > POWERUP_LIFETIME_MS);
    state.powerups = live;

    for p in expired {
        state.push_event(GameEvent::powerup_expired(state.frame, now, p.id, p.kind));
    }
}

/// Living combatants standing on a powerup collect it, P1 first.
pub fn collect_pickups(state: &mut MatchState, now: Timestamp) {
    for id in CombatantId::ALL {
        let c = state.combatant(id);
        if !c.alive {
            continue;
        }
        let Some(index) = state.powerup_at(c.position) else {
            continue;
        };

        let powerup = state.powerups.remove(index);
        apply_powerup(state.combatant_mut(id), powerup.kind, now);
        debug!(combatant = %id, kind = powerup.kind.name(), "powerup collected");
        state.push_event(GameEvent::powerup_collected(state.frame, now, powerup.id, powerup.kind, id));
    }
}

/// Apply a powerup effect. Buffs extend to `now + duration` but never shorten.
pub fn apply_powerup(combatant: &mut Combatant, kind: PowerUpKind, now: Timestamp) {
    match kind {
        PowerUpKind::Shotgun => {
            combatant.shotgun_until = combatant.shotgun_until.max(now.after(SHOTGUN_DURATION_MS));
        }
        PowerUpKind::DashBoost => {
            combatant.dash_boost_until = combatant.dash_boost_until.max(now.after(DASH_BOOST_DURATION_MS));
        }
        PowerUpKind::Shield => combatant.shield = true,
    }
}
