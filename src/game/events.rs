//! Game Events
//!
//! Events generated during simulation for logging, renderers and replay checks.

use serde::{Serialize, Deserialize};
use crate::core::grid::GridVec;
use crate::core::time::{Millis, Timestamp};
use crate::game::state::{CombatantId, PowerUpKind, ShotSize};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Round results first
    RoundResult = 0,
    /// Then hits
    Combat = 1,
    /// Then pickups
    PowerUp = 2,
    /// Then actions
    Action = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Projectiles spawned by a shot
    ShotFired {
        owner: CombatantId,
        count: u8,
        size: ShotSize,
    },

    /// Charge began
    ChargeStarted { combatant: CombatantId },

    /// Charge let go; the shot follows in the same frame
    ChargeReleased {
        combatant: CombatantId,
        held: Millis,
        size: ShotSize,
    },

    /// Dash performed
    Dashed {
        combatant: CombatantId,
        from: GridVec,
        to: GridVec,
    },

    /// A shield absorbed a hit
    ShieldAbsorbed {
        defender: CombatantId,
        attacker: CombatantId,
    },

    /// Combatant was hit with no shield
    Eliminated {
        victim: CombatantId,
        scorer: CombatantId,
    },

    /// Powerup appeared
    PowerUpSpawned {
        id: u32,
        kind: PowerUpKind,
        position: GridVec,
    },

    /// Powerup picked up
    PowerUpCollected {
        id: u32,
        kind: PowerUpKind,
        combatant: CombatantId,
    },

    /// Powerup timed out unclaimed
    PowerUpExpired { id: u32, kind: PowerUpKind },

    /// Round resolved
    RoundEnded {
        round: u32,
        scorer: Option<CombatantId>,
        scores: [u32; 2],
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame when event occurred
    pub frame: u64,

    /// Clock reading of that frame
    pub at: Timestamp,

    /// Processing priority
    pub priority: EventPriority,

    /// Combatant involved (for tie-breaking)
    pub combatant: Option<CombatantId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(frame: u64, at: Timestamp, priority: EventPriority, data: GameEventData) -> Self {
        let combatant = match &data {
            GameEventData::ShotFired { owner, .. } => Some(*owner),
            GameEventData::ChargeStarted { combatant } => Some(*combatant),
            GameEventData::ChargeReleased { combatant, .. } => Some(*combatant),
            GameEventData::Dashed { combatant, .. } => Some(*combatant),
            GameEventData::ShieldAbsorbed { defender, .. } => Some(*defender),
            GameEventData::Eliminated { victim, .. } => Some(*victim),
            GameEventData::PowerUpCollected { combatant, .. } => Some(*combatant),
            GameEventData::RoundEnded { scorer, .. } => *scorer,
            GameEventData::PowerUpSpawned { .. } | GameEventData::PowerUpExpired { .. } => None,
        };

        Self {
            frame,
            at,
            priority,
            combatant,
            data,
        }
    }

    /// Create shot fired event.
    pub fn shot_fired(frame: u64, at: Timestamp, owner: CombatantId, count: u8, size: ShotSize) -> Self {
        Self::new(frame, at, EventPriority::Action, GameEventData::ShotFired { owner, count, size })
    }

    /// Create charge started event.
    pub fn charge_started(frame: u64, at: Timestamp, combatant: CombatantId) -> Self {
        Self::new(frame, at, EventPriority::Action, GameEventData::ChargeStarted { combatant })
    }

    /// Create charge released event.
    pub fn charge_released(frame: u64, at: Timestamp, combatant: CombatantId, held: Millis, size: ShotSize) -> Self {
        Self::new(
            frame,
            at,
            EventPriority::Action,
            GameEventData::ChargeReleased { combatant, held, size },
        )
    }

    /// Create dash event.
    pub fn dashed(frame: u64, at: Timestamp, combatant: CombatantId, from: GridVec, to: GridVec) -> Self {
        Self::new(frame, at, EventPriority::Action, GameEventData::Dashed { combatant, from, to })
    }

    /// Create shield absorbed event.
    pub fn shield_absorbed(frame: u64, at: Timestamp, defender: CombatantId, attacker: CombatantId) -> Self {
        Self::new(
            frame,
            at,
            EventPriority::Combat,
            GameEventData::ShieldAbsorbed { defender, attacker },
        )
    }

    /// Create eliminated event.
    pub fn eliminated(frame: u64, at: Timestamp, victim: CombatantId, scorer: CombatantId) -> Self {
        Self::new(frame, at, EventPriority::Combat, GameEventData::Eliminated { victim, scorer })
    }

    /// Create powerup spawned event.
    pub fn powerup_spawned(frame: u64, at: Timestamp, id: u32, kind: PowerUpKind, position: GridVec) -> Self {
        Self::new(
            frame,
            at,
            EventPriority::PowerUp,
            GameEventData::PowerUpSpawned { id, kind, position },
        )
    }

    /// Create powerup collected event.
    pub fn powerup_collected(frame: u64, at: Timestamp, id: u32, kind: PowerUpKind, combatant: CombatantId) -> Self {
        Self::new(
            frame,
            at,
            EventPriority::PowerUp,
            GameEventData::PowerUpCollected { id, kind, combatant },
        )
    }

    /// Create powerup expired event.
    pub fn powerup_expired(frame: u64, at: Timestamp, id: u32, kind: PowerUpKind) -> Self {
        Self::new(frame, at, EventPriority::Other, GameEventData::PowerUpExpired { id, kind })
    }

    /// Create round ended event.
    pub fn round_ended(frame: u64, at: Timestamp, round: u32, scorer: Option<CombatantId>, scores: [u32; 2]) -> Self {
        Self::new(
            frame,
            at,
            EventPriority::RoundResult,
            GameEventData::RoundEnded { round, scorer, scores },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
            && self.priority == other.priority
            && self.combatant == other.combatant
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: frame, then priority, then combatant
        self.frame
            .cmp(&other.frame)
            .then(self.priority.cmp(&other.priority))
            .then(self.combatant.cmp(&other.combatant))
    }
}
