//! Rules and Tuning
//!
//! Gameplay constants, the rule-set capability switches that select a game
//! variant, and arena presets. A `GameConfig` is fixed for the lifetime of a
//! round; changing it means starting a new match.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::grid::ArenaBounds;
use crate::core::time::Millis;
use crate::game::state::CombatantId;

// =============================================================================
// TUNING CONSTANTS (milliseconds unless noted)
// =============================================================================

/// Fixed frame interval: 50 ms = 20 frames per second
pub const FRAME_INTERVAL_MS: Millis = 50;

/// Minimum time between shots
pub const SHOT_COOLDOWN_MS: Millis = 220;

/// Base dash cooldown
pub const DASH_COOLDOWN_MS: Millis = 2_200;

/// Dash cooldown while the dash-boost buff is active
pub const DASH_BOOST_COOLDOWN_MS: Millis = 600;

/// Cells travelled by one dash
pub const DASH_DISTANCE: i32 = 4;

/// Single-cell projectile advances per frame
pub const PROJECTILE_SUBSTEPS: u32 = 2;

/// Time between powerup spawn attempts
pub const POWERUP_SPAWN_INTERVAL_MS: Millis = 8_000;

/// Powerups older than this are removed
pub const POWERUP_LIFETIME_MS: Millis = 14_000;

/// Random cell attempts per spawn cycle
pub const POWERUP_SPAWN_TRIES: u32 = 30;

/// Powerups never spawn closer than this to an edge (cells)
pub const POWERUP_EDGE_MARGIN: i32 = 2;

/// Shotgun buff duration
pub const SHOTGUN_DURATION_MS: Millis = 10_000;

/// Dash-boost buff duration
pub const DASH_BOOST_DURATION_MS: Millis = 10_000;

/// Held-movement vector lifetime after the last directional token
pub const HELD_MOVE_WINDOW_MS: Millis = 120;

/// A charge with no shoot token for longer than this is released
pub const CHARGE_RELEASE_WINDOW_MS: Millis = 150;

/// A charge auto-releases once it has been held this long
pub const CHARGE_MAX_MS: Millis = 1_200;

/// Charge duration at which shots reach size tier 2
pub const CHARGE_TIER2_MS: Millis = 350;

/// Charge duration at which shots reach size tier 3
pub const CHARGE_TIER3_MS: Millis = 750;

/// Dash trail cell lifetime
pub const TRAIL_TTL_MS: Millis = 250;

/// Jump window in the timed-level variant
pub const JUMP_WINDOW_MS: Millis = 600;

/// Crouch window in the timed-level variant
pub const CROUCH_WINDOW_MS: Millis = 600;

/// Minimum time between bot actions
pub const BOT_ACTION_INTERVAL_MS: Millis = 150;

/// Spawn column offset from each side wall
pub const SPAWN_EDGE_OFFSET: i32 = 8;

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unknown arena preset name.
    #[error("unknown arena preset: {0}")]
    UnknownArena(String),

    /// Unknown rule-set name.
    #[error("unknown rule set: {0}")]
    UnknownRules(String),

    /// Unknown combatant name for bot control.
    #[error("unknown bot side: {0}")]
    UnknownBotSide(String),

    /// Malformed seed.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}

// =============================================================================
// ARENA PRESETS
// =============================================================================

/// Selectable arena sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArenaPreset {
    /// 50 x 18
    Compact,
    /// 70 x 24
    #[default]
    Standard,
    /// 90 x 30
    Wide,
}

impl ArenaPreset {
    /// All presets, smallest first.
    pub const ALL: [ArenaPreset; 3] = [ArenaPreset::Compact, ArenaPreset::Standard, ArenaPreset::Wide];

    /// Grid dimensions for this preset.
    pub const fn bounds(self) -> ArenaBounds {
        match self {
            ArenaPreset::Compact => ArenaBounds::new(50, 18),
            ArenaPreset::Standard => ArenaBounds::new(70, 24),
            ArenaPreset::Wide => ArenaBounds::new(90, 30),
        }
    }

    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            ArenaPreset::Compact => "compact",
            ArenaPreset::Standard => "standard",
            ArenaPreset::Wide => "wide",
        }
    }
}

impl fmt::Display for ArenaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bounds();
        write!(f, "{} ({}x{})", self.name(), b.width, b.height)
    }
}

impl FromStr for ArenaPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "small" => Ok(ArenaPreset::Compact),
            "standard" | "default" => Ok(ArenaPreset::Standard),
            "wide" | "large" => Ok(ArenaPreset::Wide),
            other => Err(ConfigError::UnknownArena(other.to_string())),
        }
    }
}

// =============================================================================
// RULE SET
// =============================================================================

/// How directional tokens move a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    /// Each directional token moves one cell immediately.
    Step,
    /// Directional tokens set a movement vector applied once per frame
    /// until it expires.
    Held,
}

/// Capability switches selecting one game variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSet {
    /// Shoot tokens charge a shot whose size scales with hold time
    pub has_charged_shots: bool,
    /// The crouch level exists
    pub has_crouch: bool,
    /// Dashes leave a cosmetic trail
    pub has_dash_trail: bool,
    /// Movement model
    pub movement: MovementMode,
    /// Jump duration; `None` keeps the jump until a stand token
    pub jump_hold: Option<Millis>,
    /// Crouch duration; `None` keeps the crouch until a stand token
    pub crouch_hold: Option<Millis>,
}

impl RuleSet {
    /// Three levels, step movement, levels held until a stand token.
    pub const fn classic() -> Self {
        Self {
            has_charged_shots: false,
            has_crouch: true,
            has_dash_trail: false,
            movement: MovementMode::Step,
            jump_hold: None,
            crouch_hold: None,
        }
    }

    /// Timed levels, held movement, dash trails and charged shots.
    pub const fn arcade() -> Self {
        Self {
            has_charged_shots: true,
            has_crouch: true,
            has_dash_trail: true,
            movement: MovementMode::Held,
            jump_hold: Some(JUMP_WINDOW_MS),
            crouch_hold: Some(CROUCH_WINDOW_MS),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::classic()
    }
}

impl FromStr for RuleSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(RuleSet::classic()),
            "arcade" => Ok(RuleSet::arcade()),
            other => Err(ConfigError::UnknownRules(other.to_string())),
        }
    }
}

// =============================================================================
// GAME CONFIG
// =============================================================================

/// Everything supplied once at match start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Arena size preset
    pub arena: ArenaPreset,
    /// Variant switches
    pub rules: RuleSet,
    /// Side driven by the bot policy, if any
    pub bot: Option<CombatantId>,
    /// Seed for powerup spawns and bot choices
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaPreset::Standard,
            rules: RuleSet::classic(),
            bot: None,
            seed: 0x5EED,
        }
    }
}

impl GameConfig {
    /// Arena bounds for the selected preset.
    #[inline]
    pub fn bounds(&self) -> ArenaBounds {
        self.arena.bounds()
    }

    /// Create config from environment variables.
    ///
    /// - `DUEL_ARENA`: `compact` | `standard` | `wide`
    /// - `DUEL_RULES`: `classic` | `arcade`
    /// - `DUEL_BOT`: `p1` | `p2` | `none`
    /// - `DUEL_SEED`: unsigned integer
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup (unset keys keep defaults).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(arena) = lookup("DUEL_ARENA") {
            config.arena = arena.parse()?;
        }
        if let Some(rules) = lookup("DUEL_RULES") {
            config.rules = rules.parse()?;
        }
        if let Some(bot) = lookup("DUEL_BOT") {
            config.bot = match bot.trim().to_ascii_lowercase().as_str() {
                "" | "none" | "off" => None,
                "p1" | "1" => Some(CombatantId::One),
                "p2" | "2" => Some(CombatantId::Two),
                other => return Err(ConfigError::UnknownBotSide(other.to_string())),
            };
        }
        if let Some(seed) = lookup("DUEL_SEED") {
            config.seed = seed
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidSeed(seed.clone()))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_preset_bounds() {
        assert_eq!(ArenaPreset::Standard.bounds(), ArenaBounds::new(70, 24));
        assert_eq!(ArenaPreset::Compact.bounds(), ArenaBounds::new(50, 18));
        assert_eq!(ArenaPreset::Wide.bounds(), ArenaBounds::new(90, 30));
        for preset in ArenaPreset::ALL {
            assert!(preset.bounds().width > 2 * SPAWN_EDGE_OFFSET);
        }
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("Wide".parse::<ArenaPreset>(), Ok(ArenaPreset::Wide));
        assert_eq!(" compact ".parse::<ArenaPreset>(), Ok(ArenaPreset::Compact));
        assert_eq!(
            "huge".parse::<ArenaPreset>(),
            Err(ConfigError::UnknownArena("huge".into()))
        );
    }

    #[test]
    fn test_rule_presets() {
        let classic = RuleSet::classic();
        assert!(!classic.has_charged_shots);
        assert_eq!(classic.movement, MovementMode::Step);
        assert_eq!(classic.jump_hold, None);

        let arcade: RuleSet = "arcade".parse().unwrap();
        assert!(arcade.has_charged_shots && arcade.has_dash_trail);
        assert_eq!(arcade.crouch_hold, Some(CROUCH_WINDOW_MS));
    }

    #[test]
    fn test_charge_thresholds_ordered() {
        assert!(CHARGE_TIER2_MS < CHARGE_TIER3_MS);
        assert!(CHARGE_TIER3_MS < CHARGE_MAX_MS);
        assert!(DASH_BOOST_COOLDOWN_MS < DASH_COOLDOWN_MS);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = GameConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_from_lookup_values() {
        let config = GameConfig::from_lookup(lookup_from(&[
            ("DUEL_ARENA", "compact"),
            ("DUEL_RULES", "arcade"),
            ("DUEL_BOT", "p2"),
            ("DUEL_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.arena, ArenaPreset::Compact);
        assert_eq!(config.rules, RuleSet::arcade());
        assert_eq!(config.bot, Some(CombatantId::Two));
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_from_lookup_errors() {
        let err = GameConfig::from_lookup(lookup_from(&[("DUEL_BOT", "p3")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownBotSide("p3".into()));

        let err = GameConfig::from_lookup(lookup_from(&[("DUEL_SEED", "abc")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidSeed("abc".into()));
    }
}
