//! Game State Definitions
//!
//! All state types for the duel simulation. Exactly two combatants exist,
//! stored in a fixed array indexed by `CombatantId`, so iteration order is
//! always P1 then P2.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::grid::{ArenaBounds, GridVec};
use crate::core::hash::{Digestible, StateHash, StateHasher};
use crate::core::rng::DeterministicRng;
use crate::core::time::{remaining, Millis, Timestamp};
use crate::game::config::{
    GameConfig, CHARGE_TIER2_MS, CHARGE_TIER3_MS, CHARGE_MAX_MS,
    DASH_BOOST_COOLDOWN_MS, DASH_COOLDOWN_MS, SHOT_COOLDOWN_MS, SPAWN_EDGE_OFFSET,
};
use crate::game::events::GameEvent;

// =============================================================================
// COMBATANT ID
// =============================================================================

/// One of the two duel slots.
///
/// Implements Ord so that P1 is always processed before P2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CombatantId {
    /// Left side
    One = 0,
    /// Right side
    Two = 1,
}

impl CombatantId {
    /// Both slots in processing order.
    pub const ALL: [CombatantId; 2] = [CombatantId::One, CombatantId::Two];

    /// Array index of this slot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The opposing slot.
    #[inline]
    pub const fn other(self) -> CombatantId {
        match self {
            CombatantId::One => CombatantId::Two,
            CombatantId::Two => CombatantId::One,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            CombatantId::One => "P1",
            CombatantId::Two => "P2",
        }
    }

    /// Direction toward the opponent's starting side.
    ///
    /// Used while no directional token has been issued yet and as the
    /// dash fallback for a zero facing.
    #[inline]
    pub const fn outward(self) -> GridVec {
        match self {
            CombatantId::One => GridVec::RIGHT,
            CombatantId::Two => GridVec::LEFT,
        }
    }

    /// Round-start cell for this slot.
    pub fn spawn_position(self, bounds: ArenaBounds) -> GridVec {
        let x = match self {
            CombatantId::One => SPAWN_EDGE_OFFSET,
            CombatantId::Two => bounds.width - 1 - SPAWN_EDGE_OFFSET,
        };
        bounds.clamp(GridVec::new(x, bounds.mid_row()))
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// LEVEL / STANCE
// =============================================================================

/// Discrete vertical plane. Projectiles only hit on the same level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Level {
    /// Below normal shots
    Crouch = 0,
    /// Default plane
    #[default]
    Normal = 1,
    /// Above normal shots
    Jump = 2,
}

impl Level {
    /// Uppercase name, as shown in HUDs.
    pub const fn name(self) -> &'static str {
        match self {
            Level::Crouch => "CROUCH",
            Level::Normal => "NORMAL",
            Level::Jump => "JUMP",
        }
    }
}

/// Current level plus, for non-normal levels, when it reverts to Normal.
///
/// `until: None` means the level holds until an explicit stand token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    /// Normal level
    #[default]
    Standing,
    /// Jump level
    Jumping { until: Option<Timestamp> },
    /// Crouch level
    Crouching { until: Option<Timestamp> },
}

impl Stance {
    /// The level this stance occupies.
    #[inline]
    pub fn level(self) -> Level {
        match self {
            Stance::Standing => Level::Normal,
            Stance::Jumping { .. } => Level::Jump,
            Stance::Crouching { .. } => Level::Crouch,
        }
    }

    /// When this stance reverts to Normal, if timed.
    #[inline]
    pub fn reverts_at(self) -> Option<Timestamp> {
        match self {
            Stance::Standing => None,
            Stance::Jumping { until } | Stance::Crouching { until } => until,
        }
    }
}

// =============================================================================
// COMBATANT
// =============================================================================

/// An in-progress shot charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChargeState {
    /// When the charge began
    pub started_at: Timestamp,
    /// Last shoot token seen while charging
    pub last_input_at: Timestamp,
}

impl ChargeState {
    /// Hold time so far, clamped to `[0, CHARGE_MAX_MS]`.
    #[inline]
    pub fn held_for(&self, now: Timestamp) -> Millis {
        now.since(self.started_at).clamp(0, CHARGE_MAX_MS)
    }
}

/// Movement vector set by directional tokens in the held-movement variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeldMove {
    /// Unit direction applied once per frame
    pub direction: GridVec,
    /// Applied while `now < until`
    pub until: Timestamp,
}

/// State of a single combatant in the current round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Slot
    pub id: CombatantId,

    /// Display name
    pub name: String,

    /// Current cell, always inside the arena
    pub position: GridVec,

    /// Aim direction (one of 8 unit vectors, or ZERO)
    pub facing: GridVec,

    /// Level and its reversion deadline
    pub stance: Stance,

    /// Still in the round?
    pub alive: bool,

    /// Absorbs the next qualifying hit
    pub shield: bool,

    /// Shotgun spread active while `now < shotgun_until`
    pub shotgun_until: Timestamp,

    /// Reduced dash cooldown while `now < dash_boost_until`
    pub dash_boost_until: Timestamp,

    /// Last time a shot was fired
    pub last_shot_at: Timestamp,

    /// Last time a dash was performed
    pub last_dash_at: Timestamp,

    /// Shot charge in progress (charge variant)
    pub charge: Option<ChargeState>,

    /// Pending held movement (held-movement variant)
    pub held_move: Option<HeldMove>,
}

impl Combatant {
    /// Create a combatant at its round-start layout.
    pub fn spawn(id: CombatantId, bounds: ArenaBounds) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            position: id.spawn_position(bounds),
            facing: id.outward(),
            stance: Stance::Standing,
            alive: true,
            shield: false,
            shotgun_until: Timestamp::NEVER,
            dash_boost_until: Timestamp::NEVER,
            last_shot_at: Timestamp::NEVER,
            last_dash_at: Timestamp::NEVER,
            charge: None,
            held_move: None,
        }
    }

    /// Current level.
    #[inline]
    pub fn level(&self) -> Level {
        self.stance.level()
    }

    /// Is the shotgun buff active?
    #[inline]
    pub fn has_shotgun(&self, now: Timestamp) -> bool {
        now < self.shotgun_until
    }

    /// Is the dash-boost buff active?
    #[inline]
    pub fn has_dash_boost(&self, now: Timestamp) -> bool {
        now < self.dash_boost_until
    }

    /// Dash cooldown in effect at `now`.
    #[inline]
    pub fn dash_cooldown(&self, now: Timestamp) -> Millis {
        if self.has_dash_boost(now) {
            DASH_BOOST_COOLDOWN_MS
        } else {
            DASH_COOLDOWN_MS
        }
    }

    /// Has the shot cooldown elapsed?
    #[inline]
    pub fn can_shoot(&self, now: Timestamp) -> bool {
        now.since(self.last_shot_at) >= SHOT_COOLDOWN_MS
    }

    /// Has the dash cooldown elapsed?
    #[inline]
    pub fn can_dash(&self, now: Timestamp) -> bool {
        now.since(self.last_dash_at) >= self.dash_cooldown(now)
    }

    /// Time until the next shot is allowed.
    pub fn shot_ready_in(&self, now: Timestamp) -> Millis {
        remaining(now, self.last_shot_at.after(SHOT_COOLDOWN_MS))
    }

    /// Time until the next dash is allowed.
    pub fn dash_ready_in(&self, now: Timestamp) -> Millis {
        remaining(now, self.last_dash_at.after(self.dash_cooldown(now)))
    }

    /// Is a charge in progress?
    #[inline]
    pub fn is_charging(&self) -> bool {
        self.charge.is_some()
    }
}

// =============================================================================
// PROJECTILE
// =============================================================================

/// Projectile size tier. Tier N hits within Manhattan distance N - 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShotSize {
    /// Tier 1: exact cell
    #[default]
    Small = 1,
    /// Tier 2: radius 1
    Medium = 2,
    /// Tier 3: radius 2
    Large = 3,
}

impl ShotSize {
    /// Tier number (1-3).
    #[inline]
    pub const fn tier(self) -> u8 {
        self as u8
    }

    /// Hit radius in Manhattan distance.
    #[inline]
    pub const fn radius(self) -> u32 {
        self as u32 - 1
    }

    /// Size for a charge held this long. Reaching a threshold moves up a tier.
    pub fn from_charge(held: Millis) -> ShotSize {
        let held = held.clamp(0, CHARGE_MAX_MS);
        if held < CHARGE_TIER2_MS {
            ShotSize::Small
        } else if held < CHARGE_TIER3_MS {
            ShotSize::Medium
        } else {
            ShotSize::Large
        }
    }
}

/// A live projectile. Its level never changes after firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Current cell
    pub position: GridVec,
    /// Per-substep displacement
    pub velocity: GridVec,
    /// Level at time of firing
    pub level: Level,
    /// Who fired it (never hit by its own shot)
    pub owner: CombatantId,
    /// Size tier
    pub size: ShotSize,
}

// =============================================================================
// POWERUP
// =============================================================================

/// Type of powerup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PowerUpKind {
    /// Three-way spread shots
    Shotgun = 0,
    /// Reduced dash cooldown
    DashBoost = 1,
    /// One-hit shield
    Shield = 2,
}

impl PowerUpKind {
    /// All kinds, equally likely at spawn.
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Shotgun, PowerUpKind::DashBoost, PowerUpKind::Shield];

    /// Snake-case name.
    pub const fn name(self) -> &'static str {
        match self {
            PowerUpKind::Shotgun => "shotgun",
            PowerUpKind::DashBoost => "dash_boost",
            PowerUpKind::Shield => "shield",
        }
    }
}

/// A powerup lying in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowerUp {
    /// Monotonic id within the match
    pub id: u32,
    /// Cell (at most one powerup per cell)
    pub position: GridVec,
    /// Effect
    pub kind: PowerUpKind,
    /// Spawn time
    pub spawned_at: Timestamp,
}

impl PowerUp {
    /// Age at `now`.
    #[inline]
    pub fn age(&self, now: Timestamp) -> Millis {
        now.since(self.spawned_at)
    }
}

// =============================================================================
// DASH TRAIL
// =============================================================================

/// Cosmetic marker left on a cell a dash passed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DashTrail {
    /// Cell
    pub position: GridVec,
    /// Glyph matching the dash direction
    pub glyph: char,
    /// Removed once `now >= expires_at`
    pub expires_at: Timestamp,
}

// =============================================================================
// ROUND PHASE
// =============================================================================

/// Round lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Simulation advancing
    #[default]
    Active,
    /// Round over; waiting for the next round to start
    Resolved { scorer: Option<CombatantId> },
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete simulation context for one match.
///
/// Owns every entity collection; subsystems receive it by reference each
/// frame and keep nothing across frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Immutable match configuration
    pub config: GameConfig,

    /// Arena bounds (from `config.arena`)
    pub bounds: ArenaBounds,

    /// Frames advanced while a round was active
    pub frame: u64,

    /// Current round number (starts at 1)
    pub round: u32,

    /// Round lifecycle
    pub phase: RoundPhase,

    /// Rounds won per combatant; survives round resets
    pub scores: [u32; 2],

    /// Both combatants, indexed by `CombatantId::index()`
    pub combatants: [Combatant; 2],

    /// Live projectiles in firing order
    pub projectiles: Vec<Projectile>,

    /// Live powerups in spawn order
    pub powerups: Vec<PowerUp>,

    /// Live dash trail cells
    pub trails: Vec<DashTrail>,

    /// Last powerup spawn attempt
    pub last_spawn_at: Timestamp,

    /// Next powerup id (monotonic counter)
    pub next_powerup_id: u32,

    /// Deterministic RNG for powerup spawns
    #[serde(skip)]
    pub rng: DeterministicRng,

    /// Events generated this frame (cleared each frame)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a match and start its first round at `now`.
    pub fn new(config: GameConfig, now: Timestamp) -> Self {
        let bounds = config.bounds();
        Self {
            config,
            bounds,
            frame: 0,
            round: 1,
            phase: RoundPhase::Active,
            scores: [0; 2],
            combatants: CombatantId::ALL.map(|id| Combatant::spawn(id, bounds)),
            projectiles: Vec::new(),
            powerups: Vec::new(),
            trails: Vec::new(),
            last_spawn_at: now,
            next_powerup_id: 0,
            rng: DeterministicRng::for_stream(config.seed, b"powerups"),
            pending_events: Vec::new(),
        }
    }

    /// Get a combatant.
    #[inline]
    pub fn combatant(&self, id: CombatantId) -> &Combatant {
        &self.combatants[id.index()]
    }

    /// Get a combatant mutably.
    #[inline]
    pub fn combatant_mut(&mut self, id: CombatantId) -> &mut Combatant {
        &mut self.combatants[id.index()]
    }

    /// Rounds won by a combatant.
    #[inline]
    pub fn score(&self, id: CombatantId) -> u32 {
        self.scores[id.index()]
    }

    /// Is the current round still being simulated?
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, RoundPhase::Active)
    }

    /// Number of living combatants.
    pub fn alive_count(&self) -> usize {
        self.combatants.iter().filter(|c| c.alive).count()
    }

    /// Is any living combatant standing on `cell`?
    pub fn is_occupied(&self, cell: GridVec) -> bool {
        self.combatants.iter().any(|c| c.alive && c.position == cell)
    }

    /// Index of the powerup on `cell`, if any.
    pub fn powerup_at(&self, cell: GridVec) -> Option<usize> {
        self.powerups.iter().position(|p| p.position == cell)
    }

    /// Hash of everything that affects future frames.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(STATE_HASH_DOMAIN);
        hasher
            .put(&self.frame)
            .put(&self.config.seed)
            .put(&self.round)
            .put(&self.phase)
            .put(&self.scores)
            .put(&self.combatants)
            .put(&self.projectiles[..])
            .put(&self.powerups[..])
            .put(&self.trails[..])
            .put(&self.last_spawn_at)
            .put(&self.next_powerup_id)
            .put(&self.rng);
        hasher.finish()
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// STATE HASH
// =============================================================================

const STATE_HASH_DOMAIN: &[u8] = b"DUEL_ARENA_STATE_V1";

macro_rules! digest_as_u8 {
    ($($ty:ty),*) => {
        $(
            impl Digestible for $ty {
                #[inline]
                fn digest(&self, hasher: &mut StateHasher) {
                    hasher.put(&(*self as u8));
                }
            }
        )*
    };
}

digest_as_u8!(CombatantId, Level, ShotSize, PowerUpKind);

impl Digestible for Stance {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.level()).put(&self.reverts_at());
    }
}

impl Digestible for Combatant {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher
            .put(&self.id)
            .put(&self.position)
            .put(&self.facing)
            .put(&self.stance)
            .put(&self.alive)
            .put(&self.shield)
            .put(&self.shotgun_until)
            .put(&self.dash_boost_until)
            .put(&self.last_shot_at)
            .put(&self.last_dash_at)
            .put(&self.charge.map(|c| (c.started_at, c.last_input_at)))
            .put(&self.held_move.map(|h| (h.direction, h.until)));
    }
}

impl Digestible for Projectile {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher
            .put(&self.position)
            .put(&self.velocity)
            .put(&self.level)
            .put(&self.owner)
            .put(&self.size);
    }
}

impl Digestible for PowerUp {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.id).put(&self.position).put(&self.kind).put(&self.spawned_at);
    }
}

impl Digestible for DashTrail {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.position).put(&self.glyph).put(&self.expires_at);
    }
}

impl Digestible for RoundPhase {
    fn digest(&self, hasher: &mut StateHasher) {
        match self {
            RoundPhase::Active => hasher.put(&0u8),
            RoundPhase::Resolved { scorer } => hasher.put(&1u8).put(scorer),
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================
