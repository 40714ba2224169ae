//! Input Tokens and Recording
//!
//! The simulation consumes normalized action tokens, never raw keys. Each
//! frame carries an ordered token list per combatant plus a frame-level exit
//! flag. Frames are recorded into a `ReplayLog` for determinism checks.

use serde::{Serialize, Deserialize};

use crate::core::grid::GridVec;
use crate::core::time::Timestamp;
use crate::game::config::GameConfig;
use crate::game::state::CombatantId;

// =============================================================================
// ACTION TOKENS
// =============================================================================

/// Logical action scoped to one combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionToken {
    /// Move / aim up
    Up = 0,
    /// Move / aim down
    Down = 1,
    /// Move / aim left
    Left = 2,
    /// Move / aim right
    Right = 3,
    /// Go to the jump level
    Jump = 4,
    /// Go to the crouch level
    Crouch = 5,
    /// Return to the normal level
    Stand = 6,
    /// Dash along facing
    Dash = 7,
    /// Fire, or start/refresh a charge
    Shoot = 8,
}

impl ActionToken {
    /// Every token.
    pub const ALL: [ActionToken; 9] = [
        ActionToken::Up,
        ActionToken::Down,
        ActionToken::Left,
        ActionToken::Right,
        ActionToken::Jump,
        ActionToken::Crouch,
        ActionToken::Stand,
        ActionToken::Dash,
        ActionToken::Shoot,
    ];

    /// Parse a token name. Unknown names yield `None` and are ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("move-").unwrap_or(&name);
        match name {
            "up" => Some(ActionToken::Up),
            "down" => Some(ActionToken::Down),
            "left" => Some(ActionToken::Left),
            "right" => Some(ActionToken::Right),
            "jump" => Some(ActionToken::Jump),
            "crouch" => Some(ActionToken::Crouch),
            "stand" | "normal" => Some(ActionToken::Stand),
            "dash" => Some(ActionToken::Dash),
            "shoot" => Some(ActionToken::Shoot),
            _ => None,
        }
    }

    /// Unit direction for directional tokens.
    #[inline]
    pub fn direction(self) -> Option<GridVec> {
        match self {
            ActionToken::Up => Some(GridVec::UP),
            ActionToken::Down => Some(GridVec::DOWN),
            ActionToken::Left => Some(GridVec::LEFT),
            ActionToken::Right => Some(GridVec::RIGHT),
            _ => None,
        }
    }
}

// =============================================================================
// FRAME INPUT
// =============================================================================

/// All input for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Ordered tokens per combatant, indexed by `CombatantId::index()`
    tokens: [Vec<ActionToken>; 2],
    /// Abort the loop
    pub exit: bool,
}

impl FrameInput {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit-only frame.
    pub fn exit() -> Self {
        Self {
            exit: true,
            ..Self::default()
        }
    }

    /// Builder: append a token for a combatant.
    pub fn with(mut self, id: CombatantId, token: ActionToken) -> Self {
        self.push(id, token);
        self
    }

    /// Append a token for a combatant.
    pub fn push(&mut self, id: CombatantId, token: ActionToken) {
        self.tokens[id.index()].push(token);
    }

    /// Append a token by name; unknown names are ignored.
    ///
    /// Returns whether the name was recognized.
    pub fn push_named(&mut self, id: CombatantId, name: &str) -> bool {
        match ActionToken::from_name(name) {
            Some(token) => {
                self.push(id, token);
                true
            }
            None => false,
        }
    }

    /// Tokens for a combatant, in arrival order.
    #[inline]
    pub fn tokens(&self, id: CombatantId) -> &[ActionToken] {
        &self.tokens[id.index()]
    }

    /// Replace one combatant's tokens (used when a bot drives that side).
    pub fn set_tokens(&mut self, id: CombatantId, tokens: Vec<ActionToken>) {
        self.tokens[id.index()] = tokens;
    }

    /// Merge another frame's tokens after this frame's.
    pub fn merge(&mut self, other: FrameInput) {
        let [a, b] = other.tokens;
        self.tokens[0].extend(a);
        self.tokens[1].extend(b);
        self.exit |= other.exit;
    }

    /// Check if this is an idle frame (no tokens, no exit).
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.exit && self.tokens.iter().all(Vec::is_empty)
    }
}

// =============================================================================
// REPLAY LOG
// =============================================================================

/// One recorded step of the frame driver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// A simulation frame
    Frame { now: Timestamp, input: FrameInput },
    /// The driver started the next round
    NextRound { now: Timestamp },
}

/// Complete input recording for one match.
///
/// Replaying it against a fresh `MatchState` reproduces the match exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Match configuration (includes the seed)
    pub config: GameConfig,

    /// Clock reading when the match was created
    pub started_at: Timestamp,

    entries: Vec<ReplayEntry>,
}

impl ReplayLog {
    /// Create an empty log.
    pub fn new(config: GameConfig, started_at: Timestamp) -> Self {
        Self {
            config,
            started_at,
            entries: Vec::with_capacity(1024),
        }
    }

    /// Record a simulated frame.
    pub fn record_frame(&mut self, now: Timestamp, input: &FrameInput) {
        self.entries.push(ReplayEntry::Frame {
            now,
            input: input.clone(),
        });
    }

    /// Record a round restart.
    pub fn record_next_round(&mut self, now: Timestamp) {
        self.entries.push(ReplayEntry::NextRound { now });
    }

    /// All entries in order.
    pub fn entries(&self) -> &[ReplayEntry] {
        &self.entries
    }

    /// Number of recorded frames.
    pub fn frame_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ReplayEntry::Frame { .. }))
            .count()
    }

    /// Serialize to binary (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary (bincode).
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_names() {
        assert_eq!(ActionToken::from_name("up"), Some(ActionToken::Up));
        assert_eq!(ActionToken::from_name("move-left"), Some(ActionToken::Left));
        assert_eq!(ActionToken::from_name(" SHOOT "), Some(ActionToken::Shoot));
        assert_eq!(ActionToken::from_name("normal"), Some(ActionToken::Stand));
        assert_eq!(ActionToken::from_name("teleport"), None);
        assert_eq!(ActionToken::from_name(""), None);
    }

    #[test]
    fn test_token_directions() {
        assert_eq!(ActionToken::Up.direction(), Some(GridVec::new(0, -1)));
        assert_eq!(ActionToken::Right.direction(), Some(GridVec::new(1, 0)));
        assert_eq!(ActionToken::Dash.direction(), None);
        let directional = ActionToken::ALL.iter().filter(|t| t.direction().is_some()).count();
        assert_eq!(directional, 4);
    }

    #[test]
    fn test_frame_input_scoping() {
        let mut frame = FrameInput::new()
            .with(CombatantId::One, ActionToken::Right)
            .with(CombatantId::Two, ActionToken::Shoot)
            .with(CombatantId::One, ActionToken::Dash);

        assert_eq!(frame.tokens(CombatantId::One), &[ActionToken::Right, ActionToken::Dash]);
        assert_eq!(frame.tokens(CombatantId::Two), &[ActionToken::Shoot]);

        assert!(!frame.push_named(CombatantId::Two, "fly"));
        assert!(frame.push_named(CombatantId::Two, "jump"));
        assert_eq!(frame.tokens(CombatantId::Two).len(), 2);
    }

    #[test]
    fn test_frame_input_idle_and_merge() {
        let mut frame = FrameInput::new();
        assert!(frame.is_idle());

        frame.merge(FrameInput::new().with(CombatantId::Two, ActionToken::Up));
        assert!(!frame.is_idle());

        frame.merge(FrameInput::exit());
        assert!(frame.exit);
        assert_eq!(frame.tokens(CombatantId::Two), &[ActionToken::Up]);
    }

    #[test]
    fn test_replay_log_binary_encoding() {
        let mut log = ReplayLog::new(GameConfig::default(), Timestamp::ZERO);
        log.record_frame(
            Timestamp::from_millis(50),
            &FrameInput::new().with(CombatantId::One, ActionToken::Shoot),
        );
        log.record_frame(Timestamp::from_millis(100), &FrameInput::new());
        log.record_next_round(Timestamp::from_millis(150));

        assert_eq!(log.frame_count(), 2);
        assert_eq!(log.entries().len(), 3);

        let bytes = log.to_bytes().unwrap();
        let decoded = ReplayLog::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, log);
    }

    #[test]
    fn test_replay_log_rejects_garbage() {
        assert!(ReplayLog::from_bytes(&[0xFF, 0x01]).is_err());
    }
}
