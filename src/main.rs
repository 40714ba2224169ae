//! Duel Arena
//!
//! Headless driver. With no `DUEL_BOT` set, both sides are bots and the
//! match fast-forwards for `DUEL_ROUNDS` rounds. With `DUEL_BOT` set, that
//! side is a bot and the other side reads keys from stdin in real time.
//! Either way the recorded match is replayed to verify determinism.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use duel_arena::{
    VERSION,
    core::time::Timestamp,
    driver::{verify_replay, BotSource, FrameClock, FrameDriver, Idle, KeyChannelSource, KeyMap, MatchReport},
    game::{bot::BotPolicy, config::FRAME_INTERVAL_MS, CombatantId, GameConfig},
};

const DEFAULT_ROUNDS: u32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GameConfig::from_env().context("reading DUEL_* configuration")?;
    let rounds = match std::env::var("DUEL_ROUNDS") {
        Ok(value) => value.trim().parse().with_context(|| format!("DUEL_ROUNDS={value}"))?,
        Err(_) => DEFAULT_ROUNDS,
    };

    info!("Duel Arena v{}", VERSION);
    info!("Arena: {}", config.arena);
    info!("Frame interval: {} ms", FRAME_INTERVAL_MS);
    info!("Seed: {}", config.seed);

    let report = match config.bot {
        None => bot_match(config, rounds).await,
        Some(side) => keyboard_match(config, side).await,
    };

    info!("=== Match Results ===");
    info!("Rounds played: {}", report.rounds_played);
    for id in CombatantId::ALL {
        info!("{}: {}", id, report.scores[id.index()]);
    }
    info!("Frames: {}", report.frames);
    info!("Final state hash: {}", hex::encode(report.final_hash));

    info!("=== Verifying Determinism ===");
    verify_replay(&report).context("replaying recorded match")?;
    info!("Replay reproduced the final state");

    Ok(())
}

/// Bot vs bot on a simulated clock.
async fn bot_match(config: GameConfig, rounds: u32) -> MatchReport {
    info!("Headless: both sides bot-controlled, {} rounds", rounds);

    let source = BotSource::new(
        BotSource::new(Idle, BotPolicy::new(CombatantId::One, &config)),
        BotPolicy::new(CombatantId::Two, &config),
    );
    FrameDriver::new(config, source, Timestamp::ZERO)
        .with_clock(FrameClock::Simulated)
        .with_frame_interval(Duration::from_millis(1))
        .with_max_rounds(rounds)
        .run()
        .await
}

/// Bot on one side, stdin keys on the other. Ends on escape or end of input.
async fn keyboard_match(config: GameConfig, bot_side: CombatantId) -> MatchReport {
    info!("{} is a bot; {} reads keys from stdin (escape quits)", bot_side, bot_side.other());

    let (keys, source) = KeyChannelSource::new(KeyMap::default());
    tokio::task::spawn_blocking(move || {
        for byte in std::io::stdin().lock().bytes() {
            let Ok(byte) = byte else { break };
            if keys.send(char::from(byte)).is_err() {
                break;
            }
        }
    });

    let source = BotSource::new(source, BotPolicy::new(bot_side, &config));
    FrameDriver::new(config, source, Timestamp::ZERO).run().await
}
