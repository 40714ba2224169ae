//! Render Snapshot
//!
//! Read-only view of the world handed to renderers after each frame. It owns
//! copies of everything it shows, so nothing a renderer does can reach back
//! into the simulation.

use serde::{Serialize, Deserialize};

use crate::core::grid::GridVec;
use crate::core::time::{Millis, Timestamp};
use crate::game::round::RoundOutcome;
use crate::game::state::{CombatantId, Level, MatchState, PowerUpKind, ShotSize};

/// One combatant as a renderer sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantView {
    /// Slot
    pub id: CombatantId,
    /// Display name
    pub name: String,
    /// Current cell
    pub position: GridVec,
    /// Current level
    pub level: Level,
    /// Aim direction
    pub facing: GridVec,
    /// Still in the round
    pub alive: bool,
    /// Shield up
    pub shield: bool,
    /// Shotgun buff active
    pub shotgun: bool,
    /// Dash-boost buff active
    pub dash_boost: bool,
    /// Milliseconds until the next shot is allowed
    pub shot_ready_in: Millis,
    /// Milliseconds until the next dash is allowed
    pub dash_ready_in: Millis,
    /// Charge hold time so far, if charging
    pub charging_for: Option<Millis>,
}

/// A live projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileView {
    /// Current cell
    pub position: GridVec,
    /// Level it can hit
    pub level: Level,
    /// Size tier (picks the glyph)
    pub size: ShotSize,
    /// Who fired it
    pub owner: CombatantId,
}

/// A powerup waiting to be picked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpView {
    /// Cell
    pub position: GridVec,
    /// Effect
    pub kind: PowerUpKind,
}

/// A dash trail cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailView {
    /// Cell
    pub position: GridVec,
    /// Character to draw
    pub glyph: char,
}

/// Complete render state for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Arena width in cells
    pub width: i32,
    /// Arena height in cells
    pub height: i32,
    /// Frames simulated so far
    pub frame: u64,
    /// Current round (1-based)
    pub round: u32,
    /// Rounds won per side
    pub scores: [u32; 2],
    /// Both combatants, P1 first
    pub combatants: [CombatantView; 2],
    /// Live projectiles
    pub projectiles: Vec<ProjectileView>,
    /// Live powerups
    pub powerups: Vec<PowerUpView>,
    /// Live dash trails
    pub trails: Vec<TrailView>,
    /// Set only on the frame the round resolved
    pub round_end: Option<RoundOutcome>,
}

impl WorldSnapshot {
    /// Capture the world at `now`.
    pub fn capture(state: &MatchState, now: Timestamp, round_end: Option<RoundOutcome>) -> Self {
        let combatants = CombatantId::ALL.map(|id| {
            let c = state.combatant(id);
            CombatantView {
                id,
                name: c.name.clone(),
                position: c.position,
                level: c.level(),
                facing: c.facing,
                alive: c.alive,
                shield: c.shield,
                shotgun: c.has_shotgun(now),
                dash_boost: c.has_dash_boost(now),
                shot_ready_in: c.shot_ready_in(now),
                dash_ready_in: c.dash_ready_in(now),
                charging_for: c.charge.map(|charge| charge.held_for(now)),
            }
        });

        Self {
            width: state.bounds.width,
            height: state.bounds.height,
            frame: state.frame,
            round: state.round,
            scores: state.scores,
            combatants,
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    position: p.position,
                    level: p.level,
                    size: p.size,
                    owner: p.owner,
                })
                .collect(),
            powerups: state
                .powerups
                .iter()
                .map(|p| PowerUpView { position: p.position, kind: p.kind })
                .collect(),
            trails: state
                .trails
                .iter()
                .map(|t| TrailView { position: t.position, glyph: t.glyph })
                .collect(),
            round_end,
        }
    }

    /// View of one combatant.
    pub fn combatant(&self, id: CombatantId) -> &CombatantView {
        &self.combatants[id.index()]
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
