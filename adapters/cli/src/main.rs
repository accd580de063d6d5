#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Scream In Space session.

mod console;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use scream_in_space_core::{QualityTier, SessionPhase, Setting};
use scream_in_space_runtime::{GameSession, Host, SessionConfig};
use scream_in_space_settings::{FileStorage, SettingsStorage, SettingsStore, SETTINGS_KEY};
use scream_in_space_world::query;

use self::console::{Autopilot, AudioLog, ConsoleUi, SimulatedClock};

/// Headless simulation with an autopilot at the controls.
#[derive(Parser, Debug)]
#[command(name = "scream-in-space")]
#[command(about = "Runs a headless Scream In Space session driven by an autopilot")]
struct Args {
    /// Seconds of play to simulate before giving up.
    #[arg(long, default_value_t = 140)]
    duration: u64,
    /// Seed for every random roll in the session.
    #[arg(long, default_value_t = 0x5c2e_a111_d00d_f00d)]
    seed: u64,
    /// Frame rate the simulated host reports and steps at.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Overrides the persisted quality tier.
    #[arg(long, value_enum)]
    quality: Option<CliQuality>,
    /// Directory holding the persisted settings.
    #[arg(long, default_value = ".scream-in-space")]
    settings_dir: PathBuf,
    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliQuality {
    Low,
    Medium,
    High,
}

impl From<CliQuality> for QualityTier {
    fn from(value: CliQuality) -> Self {
        match value {
            CliQuality::Low => Self::Low,
            CliQuality::Medium => Self::Medium,
            CliQuality::High => Self::High,
        }
    }
}

/// Entry point for the Scream In Space command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    ensure!(
        args.fps.is_finite() && args.fps > 0.0,
        "--fps must be positive, got {}",
        args.fps
    );
    std::fs::create_dir_all(&args.settings_dir).with_context(|| {
        format!(
            "failed to create settings directory {}",
            args.settings_dir.display()
        )
    })?;

    let storage = FileStorage::new(&args.settings_dir);
    let first_run = storage
        .read(SETTINGS_KEY)
        .context("failed to inspect persisted settings")?
        .is_none();
    let mut store = SettingsStore::new(storage);
    let _ = store.load();

    let host = Host::new(
        ConsoleUi::default(),
        AudioLog::default(),
        SimulatedClock::new(args.fps),
    );
    let config = SessionConfig {
        rng_seed: args.seed,
        ..SessionConfig::default()
    };
    let mut session = GameSession::new(config, store, host);

    if let Some(quality) = args.quality {
        session.set_setting(Setting::Quality(quality.into()));
    } else if first_run {
        let cores = std::thread::available_parallelism().map_or(1, |count| count.get());
        let detected = QualityTier::detect(false, u32::try_from(cores).unwrap_or(u32::MAX));
        log::info!("first run on {cores} hardware threads, using {detected:?} quality");
        session.set_setting(Setting::Quality(detected));
    }

    session
        .start()
        .context("session refused to start from the boot screen")?;

    let frame = Duration::from_secs_f32(1.0 / args.fps);
    let limit = Duration::from_secs(args.duration);
    let mut autopilot = Autopilot::default();
    let mut simulated = Duration::ZERO;
    while simulated < limit {
        let input = autopilot.steer(session.world());
        let report = session.tick(frame, &input);
        simulated += frame;
        if report.phase == SessionPhase::GameOver {
            break;
        }
    }

    let summary = query::summary(session.world());
    let outcome = match query::phase(session.world()) {
        SessionPhase::GameOver => "destroyed",
        _ => "survived",
    };
    println!(
        "{outcome} after {:.1}s: score {} with {} kills",
        query::elapsed(session.world()).as_secs_f32(),
        summary.score,
        summary.kills
    );
    println!("{}", session.host().audio.describe());
    Ok(())
}
