//! Frame Driver and Input Sources
//!
//! Everything outside the deterministic core: the fixed-interval loop, the
//! clock, and where input comes from.

pub mod source;
pub mod runner;

pub use source::{BotSource, Idle, InputSource, KeyChannelSource, KeyMap, ScriptedSource};
pub use runner::{verify_replay, DriverError, FrameClock, FrameDriver, MatchReport, StepOutcome};
