//! Bot Policy
//!
//! Rate-limited weighted-random controller for one side. It only produces
//! action tokens, which go through the same resolver as human input.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::core::time::Timestamp;
use crate::game::config::{GameConfig, BOT_ACTION_INTERVAL_MS};
use crate::game::input::ActionToken;
use crate::game::state::CombatantId;

/// Kind of action the bot rolls before picking details.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BotChoice {
    Move,
    Shoot,
    Jump,
    Crouch,
    Stand,
    Dash,
}

const MOVES: [ActionToken; 4] = [ActionToken::Up, ActionToken::Down, ActionToken::Left, ActionToken::Right];

/// Random policy driving one combatant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotPolicy {
    side: CombatantId,
    rng: DeterministicRng,
    last_action_at: Timestamp,
    weights: [u32; 6],
}

impl BotPolicy {
    /// Create a bot for `side`, seeded from the match seed.
    ///
    /// Crouch is never chosen when the rules lack it; stand is only chosen
    /// when levels are sticky.
    pub fn new(side: CombatantId, config: &GameConfig) -> Self {
        let stream: &[u8] = match side {
            CombatantId::One => b"bot:p1",
            CombatantId::Two => b"bot:p2",
        };
        let rules = config.rules;
        let sticky = rules.jump_hold.is_none() || rules.crouch_hold.is_none();

        Self {
            side,
            rng: DeterministicRng::for_stream(config.seed, stream),
            last_action_at: Timestamp::NEVER,
            weights: [
                6,
                3,
                1,
                if rules.has_crouch { 1 } else { 0 },
                if sticky { 1 } else { 0 },
                1,
            ],
        }
    }

    /// Side this bot controls.
    pub fn side(&self) -> CombatantId {
        self.side
    }

    /// At most one token per `BOT_ACTION_INTERVAL_MS`.
    pub fn decide(&mut self, now: Timestamp) -> Option<ActionToken> {
        if now.since(self.last_action_at) < BOT_ACTION_INTERVAL_MS {
            return None;
        }
        self.last_action_at = now;

        let table = [
            (BotChoice::Move, self.weights[0]),
            (BotChoice::Shoot, self.weights[1]),
            (BotChoice::Jump, self.weights[2]),
            (BotChoice::Crouch, self.weights[3]),
            (BotChoice::Stand, self.weights[4]),
            (BotChoice::Dash, self.weights[5]),
        ];

        let token = match self.rng.choose_weighted(&table)? {
            BotChoice::Move => *self.rng.choose(&MOVES)?,
            BotChoice::Shoot => ActionToken::Shoot,
            BotChoice::Jump => ActionToken::Jump,
            BotChoice::Crouch => ActionToken::Crouch,
            BotChoice::Stand => ActionToken::Stand,
            BotChoice::Dash => ActionToken::Dash,
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::RuleSet;

    fn t(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_rate_limit() {
        let mut bot = BotPolicy::new(CombatantId::Two, &GameConfig::default());

        assert!(bot.decide(t(0)).is_some());
        assert!(bot.decide(t(50)).is_none());
        assert!(bot.decide(t(BOT_ACTION_INTERVAL_MS - 1)).is_none());
        assert!(bot.decide(t(BOT_ACTION_INTERVAL_MS)).is_some());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let config = GameConfig::default();
        let mut a = BotPolicy::new(CombatantId::Two, &config);
        let mut b = BotPolicy::new(CombatantId::Two, &config);

        for i in 0..200 {
            let now = t(i * BOT_ACTION_INTERVAL_MS);
            assert_eq!(a.decide(now), b.decide(now));
        }
    }

    #[test]
    fn test_sides_use_separate_streams() {
        let config = GameConfig::default();
        let mut p1 = BotPolicy::new(CombatantId::One, &config);
        let mut p2 = BotPolicy::new(CombatantId::Two, &config);

        let a: Vec<_> = (0..50).map(|i| p1.decide(t(i * 1_000))).collect();
        let b: Vec<_> = (0..50).map(|i| p2.decide(t(i * 1_000))).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_moves_dominate() {
        let mut bot = BotPolicy::new(CombatantId::One, &GameConfig::default());
        let mut moves = 0;
        let mut shots = 0;
        for i in 0..3_000 {
            match bot.decide(t(i * BOT_ACTION_INTERVAL_MS)) {
                Some(token) if token.direction().is_some() => moves += 1,
                Some(ActionToken::Shoot) => shots += 1,
                _ => {}
            }
        }
        assert!(moves > shots);
        assert!(shots > 0);
    }

    #[test]
    fn test_respects_rules() {
        let mut rules = RuleSet::arcade();
        rules.has_crouch = false;
        let config = GameConfig { rules, ..GameConfig::default() };
        let mut bot = BotPolicy::new(CombatantId::One, &config);

        for i in 0..2_000 {
            let token = bot.decide(t(i * BOT_ACTION_INTERVAL_MS));
            assert_ne!(token, Some(ActionToken::Crouch));
            assert_ne!(token, Some(ActionToken::Stand));
        }
    }
}
