//! Input Sources
//!
//! Non-blocking providers of per-frame input. The frame driver polls its
//! source exactly once per frame; a poll never waits for input to arrive.

use std::collections::VecDeque;
use tokio::sync::mpsc;

use crate::core::time::Timestamp;
use crate::game::bot::BotPolicy;
use crate::game::input::{ActionToken, FrameInput};
use crate::game::state::CombatantId;

/// Escape key.
pub const KEY_ESCAPE: char = '\u{1b}';

/// Anything that can supply one frame of input on demand.
pub trait InputSource: Send {
    /// Everything that arrived since the last poll (possibly nothing).
    fn poll(&mut self, now: Timestamp) -> FrameInput;
}

// =============================================================================
// IDLE / SCRIPTED
// =============================================================================

/// Never produces input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl InputSource for Idle {
    fn poll(&mut self, _now: Timestamp) -> FrameInput {
        FrameInput::new()
    }
}

/// Plays back a fixed list of frames, then idles (or exits).
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<FrameInput>,
    exit_when_done: bool,
}

impl ScriptedSource {
    /// Create from frames in order.
    pub fn new(frames: impl IntoIterator<Item = FrameInput>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            exit_when_done: false,
        }
    }

    /// Request exit once the script runs out.
    pub fn then_exit(mut self) -> Self {
        self.exit_when_done = true;
        self
    }

    /// Frames not yet played.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedSource {
    fn poll(&mut self, _now: Timestamp) -> FrameInput {
        match self.frames.pop_front() {
            Some(frame) => frame,
            None if self.exit_when_done => FrameInput::exit(),
            None => FrameInput::new(),
        }
    }
}

// =============================================================================
// KEYBOARD NORMALIZATION
// =============================================================================

/// One side's key bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct KeyBindings {
    pub up: char,
    pub down: char,
    pub left: char,
    pub right: char,
    pub jump: char,
    pub crouch: char,
    pub stand: char,
    pub dash: char,
    pub shoot: char,
}

impl KeyBindings {
    fn token_for(&self, key: char) -> Option<ActionToken> {
        let table = [
            (self.up, ActionToken::Up),
            (self.down, ActionToken::Down),
            (self.left, ActionToken::Left),
            (self.right, ActionToken::Right),
            (self.jump, ActionToken::Jump),
            (self.crouch, ActionToken::Crouch),
            (self.stand, ActionToken::Stand),
            (self.dash, ActionToken::Dash),
            (self.shoot, ActionToken::Shoot),
        ];
        table.iter().find(|(k, _)| *k == key).map(|(_, token)| *token)
    }
}

/// Maps raw key characters to per-side action tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMap {
    sides: [KeyBindings; 2],
}

impl Default for KeyMap {
    /// Two players on one keyboard: WASD side and IJKL side.
    fn default() -> Self {
        Self {
            sides: [
                KeyBindings {
                    up: 'w',
                    down: 's',
                    left: 'a',
                    right: 'd',
                    jump: 'r',
                    crouch: 'f',
                    stand: 'v',
                    dash: 'g',
                    shoot: 't',
                },
                KeyBindings {
                    up: 'i',
                    down: 'k',
                    left: 'j',
                    right: 'l',
                    jump: 'u',
                    crouch: 'o',
                    stand: 'm',
                    dash: 'p',
                    shoot: 'y',
                },
            ],
        }
    }
}

impl KeyMap {
    /// Bindings for one side.
    pub fn bindings(&self, id: CombatantId) -> &KeyBindings {
        &self.sides[id.index()]
    }

    /// Fold one key into a frame. Letters are case-insensitive; unbound keys
    /// are ignored; escape requests exit.
    pub fn apply(&self, key: char, frame: &mut FrameInput) {
        if key == KEY_ESCAPE {
            frame.exit = true;
            return;
        }
        let key = key.to_ascii_lowercase();
        for id in CombatantId::ALL {
            if let Some(token) = self.bindings(id).token_for(key) {
                frame.push(id, token);
            }
        }
    }

    /// Normalize a batch of keys, in arrival order.
    pub fn normalize(&self, keys: impl IntoIterator<Item = char>) -> FrameInput {
        let mut frame = FrameInput::new();
        for key in keys {
            self.apply(key, &mut frame);
        }
        frame
    }
}

/// Drains raw keys from a channel fed by a terminal reader task.
///
/// A closed channel means the keyboard went away and is treated as exit.
#[derive(Debug)]
pub struct KeyChannelSource {
    keys: mpsc::UnboundedReceiver<char>,
    keymap: KeyMap,
}

impl KeyChannelSource {
    /// Create a source and the sender a key reader should feed.
    pub fn new(keymap: KeyMap) -> (mpsc::UnboundedSender<char>, Self) {
        let (tx, keys) = mpsc::unbounded_channel();
        (tx, Self { keys, keymap })
    }
}

impl InputSource for KeyChannelSource {
    fn poll(&mut self, _now: Timestamp) -> FrameInput {
        let mut frame = FrameInput::new();
        loop {
            match self.keys.try_recv() {
                Ok(key) => self.keymap.apply(key, &mut frame),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    frame.exit = true;
                    break;
                }
            }
        }
        frame
    }
}

// =============================================================================
// BOT
// =============================================================================

/// Replaces one side of an inner source with a bot policy.
#[derive(Debug)]
pub struct BotSource<S> {
    inner: S,
    bot: BotPolicy,
}

impl<S: InputSource> BotSource<S> {
    /// Wrap `inner`; the bot's side ignores whatever `inner` produced for it.
    pub fn new(inner: S, bot: BotPolicy) -> Self {
        Self { inner, bot }
    }
}

impl<S: InputSource> InputSource for BotSource<S> {
    fn poll(&mut self, now: Timestamp) -> FrameInput {
        let mut frame = self.inner.poll(now);
        let tokens = self.bot.decide(now).into_iter().collect();
        frame.set_tokens(self.bot.side(), tokens);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::{GameConfig, BOT_ACTION_INTERVAL_MS};

    #[test]
    fn test_scripted_source() {
        let mut source = ScriptedSource::new([
            FrameInput::new().with(CombatantId::One, ActionToken::Up),
            FrameInput::new(),
        ]);
        assert_eq!(source.remaining(), 2);

        assert_eq!(source.poll(Timestamp::ZERO).tokens(CombatantId::One), &[ActionToken::Up]);
        assert!(source.poll(Timestamp::ZERO).is_idle());
        assert!(source.poll(Timestamp::ZERO).is_idle());

        let mut exiting = ScriptedSource::new([]).then_exit();
        assert!(exiting.poll(Timestamp::ZERO).exit);
    }

    #[test]
    fn test_keymap_scopes_tokens() {
        let keymap = KeyMap::default();
        let frame = keymap.normalize("wTkpz".chars());

        assert_eq!(frame.tokens(CombatantId::One), &[ActionToken::Up, ActionToken::Shoot]);
        assert_eq!(frame.tokens(CombatantId::Two), &[ActionToken::Down, ActionToken::Dash]);
        assert!(!frame.exit);
    }

    #[test]
    fn test_keymap_stand_and_escape() {
        let keymap = KeyMap::default();
        let frame = keymap.normalize(['v', 'M', KEY_ESCAPE]);

        assert_eq!(frame.tokens(CombatantId::One), &[ActionToken::Stand]);
        assert_eq!(frame.tokens(CombatantId::Two), &[ActionToken::Stand]);
        assert!(frame.exit);
    }

    #[test]
    fn test_key_channel_drains_without_blocking() {
        let (tx, mut source) = KeyChannelSource::new(KeyMap::default());
        assert!(source.poll(Timestamp::ZERO).is_idle());

        tx.send('d').unwrap();
        tx.send('d').unwrap();
        let frame = source.poll(Timestamp::ZERO);
        assert_eq!(frame.tokens(CombatantId::One), &[ActionToken::Right, ActionToken::Right]);
        assert!(source.poll(Timestamp::ZERO).is_idle());

        drop(tx);
        assert!(source.poll(Timestamp::ZERO).exit);
    }

    #[test]
    fn test_bot_source_overrides_its_side() {
        let config = GameConfig::default();
        let human = ScriptedSource::new([FrameInput::new()
            .with(CombatantId::One, ActionToken::Left)
            .with(CombatantId::Two, ActionToken::Left)]);
        let mut source = BotSource::new(human, BotPolicy::new(CombatantId::Two, &config));

        let frame = source.poll(Timestamp::ZERO);
        assert_eq!(frame.tokens(CombatantId::One), &[ActionToken::Left]);
        assert_eq!(frame.tokens(CombatantId::Two).len(), 1);

        // Rate limited: nothing for the bot side on the next frame
        let frame = source.poll(Timestamp::from_millis(BOT_ACTION_INTERVAL_MS - 1));
        assert!(frame.tokens(CombatantId::Two).is_empty());
    }
}
