//! Frame Driver
//!
//! Owns the match state and runs it at a fixed frame interval on a tokio
//! timer. Each frame polls the input source once, records the input, and
//! advances the simulation exactly once. All mutation happens on this one
//! task; nothing in a frame awaits.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::hash::StateHash;
use crate::core::time::{Millis, Timestamp};
use crate::driver::source::InputSource;
use crate::game::config::{GameConfig, FRAME_INTERVAL_MS};
use crate::game::input::ReplayLog;
use crate::game::round::{start_next_round, RoundOutcome};
use crate::game::snapshot::WorldSnapshot;
use crate::game::state::MatchState;
use crate::game::tick::{replay, tick};

/// Driver errors.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Snapshot could not be encoded.
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Replay log could not be encoded or decoded.
    #[error("replay log encoding failed: {0}")]
    ReplayCodec(#[from] bincode::Error),

    /// Replaying the log produced a different final state.
    #[error("replay diverged: expected {expected}, got {actual}")]
    ReplayDiverged { expected: String, actual: String },
}

/// What one driver step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Frame simulated; round continues
    Continue,
    /// Frame simulated and the round resolved
    RoundOver(RoundOutcome),
    /// Exit requested; nothing simulated
    Exit,
}

/// Where frame timestamps come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameClock {
    /// Monotonic wall time since the driver started
    #[default]
    Wall,
    /// Exactly one frame interval per frame, however fast frames run
    Simulated,
}

/// Summary of a finished match.
#[derive(Clone, Debug)]
pub struct MatchReport {
    /// Rounds won per side
    pub scores: [u32; 2],
    /// Rounds that resolved
    pub rounds_played: u32,
    /// Frames simulated
    pub frames: u64,
    /// Hash of the final state
    pub final_hash: StateHash,
    /// Ended by an exit request rather than the round limit
    pub exited: bool,
    /// Everything needed to reproduce the match
    pub log: ReplayLog,
}

/// Fixed-interval match runner.
pub struct FrameDriver<S> {
    state: MatchState,
    source: S,
    log: ReplayLog,
    frame_interval: Duration,
    clock: FrameClock,
    max_rounds: Option<u32>,
    rounds_played: u32,
    last_round_end: Option<RoundOutcome>,
}

impl<S: InputSource> FrameDriver<S> {
    /// Create a driver whose clock starts at `started_at`.
    pub fn new(config: GameConfig, source: S, started_at: Timestamp) -> Self {
        Self {
            state: MatchState::new(config, started_at),
            source,
            log: ReplayLog::new(config, started_at),
            frame_interval: Duration::from_millis(FRAME_INTERVAL_MS as u64),
            clock: FrameClock::Wall,
            max_rounds: None,
            rounds_played: 0,
            last_round_end: None,
        }
    }

    /// Builder: stop after this many resolved rounds.
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Builder: override the frame interval.
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// Builder: choose the frame clock.
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Current match state (read-only).
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Rounds resolved so far.
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Has the round limit been reached?
    pub fn is_finished(&self) -> bool {
        self.max_rounds.is_some_and(|max| self.rounds_played >= max)
    }

    /// Render snapshot at `now`. The round-end result is attached only on
    /// the first snapshot after the round resolved.
    pub fn take_snapshot(&mut self, now: Timestamp) -> WorldSnapshot {
        WorldSnapshot::capture(&self.state, now, self.last_round_end.take())
    }

    /// Render snapshot as JSON.
    pub fn snapshot_json(&mut self, now: Timestamp) -> Result<String, DriverError> {
        Ok(self.take_snapshot(now).to_json()?)
    }

    /// Run one frame at `now`.
    ///
    /// A resolved round is replaced by a fresh one before input is polled.
    pub fn step(&mut self, now: Timestamp) -> StepOutcome {
        if !self.state.is_active() {
            start_next_round(&mut self.state, now);
            self.log.record_next_round(now);
        }

        let input = self.source.poll(now);
        if input.exit {
            info!(frame = self.state.frame, "exit requested");
            return StepOutcome::Exit;
        }

        self.log.record_frame(now, &input);
        let result = tick(&mut self.state, &input, now);

        for event in &result.events {
            debug!(frame = event.frame, data = ?event.data, "event");
        }

        match result.round_end {
            Some(outcome) => {
                self.rounds_played += 1;
                self.last_round_end = Some(outcome);
                StepOutcome::RoundOver(outcome)
            }
            None => StepOutcome::Continue,
        }
    }

    /// Drive frames on a fixed interval until exit or the round limit.
    ///
    /// Late frames are skipped rather than bunched up.
    pub async fn run(mut self) -> MatchReport {
        let origin = Instant::now();
        let started_at = self.log.started_at;
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            arena = %self.state.config.arena,
            interval_ms = self.frame_interval.as_millis() as u64,
            clock = ?self.clock,
            "match started"
        );

        let mut ticks: Millis = 0;
        let exited = loop {
            ticker.tick().await;
            ticks += 1;
            let now = match self.clock {
                FrameClock::Wall => started_at.after(origin.elapsed().as_millis() as Millis),
                FrameClock::Simulated => started_at.after(ticks * FRAME_INTERVAL_MS),
            };

            match self.step(now) {
                StepOutcome::Exit => break true,
                StepOutcome::RoundOver(outcome) => {
                    debug!(
                        round = outcome.round,
                        rounds_played = self.rounds_played,
                        "round resolved"
                    );
                    if self.is_finished() {
                        break false;
                    }
                }
                StepOutcome::Continue => {}
            }
        };

        self.finish(exited)
    }

    /// Stop and report.
    pub fn finish(self, exited: bool) -> MatchReport {
        MatchReport {
            scores: self.state.scores,
            rounds_played: self.rounds_played,
            frames: self.state.frame,
            final_hash: self.state.compute_hash(),
            exited,
            log: self.log,
        }
    }
}

/// Re-run a recorded match through its binary encoding and compare hashes.
pub fn verify_replay(report: &MatchReport) -> Result<(), DriverError> {
    let bytes = report.log.to_bytes()?;
    let log = ReplayLog::from_bytes(&bytes)?;
    let (state, _events) = replay(&log);

    let actual = state.compute_hash();
    if actual != report.final_hash {
        let expected = hex::encode(report.final_hash);
        let actual = hex::encode(actual);
        warn!(%expected, %actual, "replay diverged");
        return Err(DriverError::ReplayDiverged { expected, actual });
    }

    debug!(bytes = bytes.len(), frames = log.frame_count(), "replay verified");
    Ok(())
}
