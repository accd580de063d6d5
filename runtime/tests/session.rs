use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use scream_in_space_core::{
    Arena, EntityKind, Event, FeedbackEffect, GameOverSummary, HudSnapshot, PilotInput, QualityTier,
    SessionPhase, Setting, Signal, SoundCue, Transition,
};
use scream_in_space_runtime::{Audio, FrameClock, GameSession, Host, SessionConfig, Ui};
use scream_in_space_settings::{MemoryStorage, SettingsStore};
use scream_in_space_world::query;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Default)]
struct RecordingUi {
    huds: Vec<HudSnapshot>,
    game_overs: Vec<GameOverSummary>,
    effects: Vec<FeedbackEffect>,
    pause_menu_visible: bool,
    start_screen_visible: bool,
}

impl Ui for RecordingUi {
    fn update_hud(&mut self, hud: HudSnapshot) {
        self.huds.push(hud);
    }

    fn show_game_over(&mut self, summary: GameOverSummary) {
        self.game_overs.push(summary);
    }

    fn show_pause_menu(&mut self) {
        self.pause_menu_visible = true;
    }

    fn hide_pause_menu(&mut self) {
        self.pause_menu_visible = false;
    }

    fn show_start_screen(&mut self) {
        self.start_screen_visible = true;
    }

    fn hide_start_screen(&mut self) {
        self.start_screen_visible = false;
    }

    fn feedback(&mut self, effect: FeedbackEffect) {
        self.effects.push(effect);
    }
}

#[derive(Debug, Default)]
struct RecordingAudio {
    played: Vec<SoundCue>,
    log: Vec<&'static str>,
}

impl Audio for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
        if cue == SoundCue::Scream {
            self.log.push("scream");
        }
    }

    fn stop_all(&mut self) {
        self.log.push("stop_all");
    }
}

#[derive(Debug)]
struct FixedClock {
    fps: f32,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self { fps: 60.0 }
    }
}

impl FrameClock for FixedClock {
    fn actual_fps(&self) -> f32 {
        self.fps
    }

    fn memory_bytes(&self) -> Option<u64> {
        None
    }
}

type TestSession = GameSession<MemoryStorage, RecordingUi, RecordingAudio, FixedClock>;

fn session_with(seed: u64, fps: f32) -> TestSession {
    let config = SessionConfig {
        rng_seed: seed,
        ..SessionConfig::default()
    };
    session_from(config, fps)
}

fn session_from(config: SessionConfig, fps: f32) -> TestSession {
    let mut store = SettingsStore::new(MemoryStorage::new());
    let _ = store.load();
    let host = Host::new(
        RecordingUi::default(),
        RecordingAudio::default(),
        FixedClock { fps },
    );
    GameSession::new(config, store, host)
}

fn started(seed: u64) -> TestSession {
    let mut session = session_with(seed, 60.0);
    session.start().expect("boot to playing");
    session
}

fn idle() -> PilotInput {
    PilotInput::default()
}

#[test]
fn boot_screen_is_shown_until_start() {
    let mut session = session_with(1, 60.0);
    assert!(session.host().ui.start_screen_visible);
    let report = session.tick(FRAME, &idle());
    assert_eq!(report.phase, SessionPhase::Boot);
    assert!(report.events.is_empty());

    session.start().expect("start");
    assert!(!session.host().ui.start_screen_visible);
    assert_eq!(session.host().ui.huds.len(), 1);
}

#[test]
fn invalid_transitions_are_returned_as_errors() {
    let mut session = session_with(1, 60.0);
    let error = session.pause().expect_err("cannot pause on boot");
    assert_eq!(error.phase, SessionPhase::Boot);
    assert_eq!(error.transition, Transition::Pause);
    assert!(session.resume().is_err());
    assert_eq!(query::phase(session.world()), SessionPhase::Boot);
}

#[test]
fn long_idle_run_ends_in_exactly_one_game_over() {
    let mut session = started(0xdead_beef);
    let mut deaths = 0;
    let mut last_health = 100;
    let mut ticks_after_death = 0;
    let capacity = query::pool_usage(session.world(), EntityKind::Enemy).capacity;

    let mut elapsed = Duration::ZERO;
    while elapsed < Duration::from_millis(140_000) {
        let report = session.tick(FRAME, &idle());
        elapsed += FRAME;
        if deaths > 0 {
            assert!(report.events.is_empty(), "world advanced after game over");
            ticks_after_death += 1;
        }
        for event in &report.events {
            match event {
                Event::PlayerDamaged { health, .. } => {
                    assert!(*health <= last_health);
                    last_health = *health;
                }
                Event::PlayerDied { .. } => deaths += 1,
                _ => {}
            }
        }
        assert!(query::enemies(session.world()).len() <= capacity);
    }

    assert_eq!(deaths, 1);
    assert!(ticks_after_death > 0);
    assert_eq!(last_health, 0);
    assert_eq!(query::phase(session.world()), SessionPhase::GameOver);

    let host = session.host();
    assert_eq!(host.ui.game_overs.len(), 1);
    assert_eq!(host.audio.log, vec!["stop_all", "scream"]);
}

#[test]
fn pause_preserves_the_spawn_timer() {
    let mut session = started(7);
    for _ in 0..10 {
        let _ = session.tick(Duration::from_millis(100), &idle());
    }
    assert_eq!(session.spawning().pending(), Duration::from_millis(1_000));

    session.pause().expect("pause");
    assert!(session.host().ui.pause_menu_visible);
    for _ in 0..3 {
        let report = session.tick(Duration::from_secs(5), &idle());
        assert_eq!(report.phase, SessionPhase::Paused);
        assert!(report.events.is_empty());
    }
    assert_eq!(session.spawning().pending(), Duration::from_millis(1_000));
    assert_eq!(query::elapsed(session.world()), Duration::from_millis(1_000));

    session.resume().expect("resume");
    assert!(!session.host().ui.pause_menu_visible);
    let report = session.tick(Duration::from_millis(400), &idle());
    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
}

#[test]
fn quality_changes_apply_before_the_next_tick() {
    let mut session = started(3);
    session.set_setting(Setting::Quality(QualityTier::High));

    let usage = query::pool_usage(session.world(), EntityKind::Enemy);
    assert_eq!(usage.capacity, 80);
    assert_eq!(
        query::pool_usage(session.world(), EntityKind::Bullet).capacity,
        40
    );
    assert_eq!(session.settings().quality, QualityTier::High);
    assert!(session
        .settings_store()
        .storage()
        .get(scream_in_space_settings::SETTINGS_KEY)
        .is_some());

    for _ in 0..3 {
        assert!(session.tick(FRAME, &idle()).vision_refresh);
    }

    session.set_setting(Setting::Quality(QualityTier::Low));
    let refreshes = (0..6)
        .filter(|_| session.tick(FRAME, &idle()).vision_refresh)
        .count();
    assert_eq!(refreshes, 2);
}

#[test]
fn hud_refreshes_every_tenth_tick() {
    let mut session = started(5);
    for _ in 0..25 {
        let _ = session.tick(FRAME, &idle());
    }
    // One refresh on start, then ticks 10 and 20.
    assert_eq!(session.host().ui.huds.len(), 3);
}

#[test]
fn muted_sessions_play_no_cues() {
    let mut session = started(9);
    session.set_setting(Setting::Sound(false));
    let firing = PilotInput {
        thrust: Vec2::ZERO,
        aim: 0.0,
        trigger: true,
    };

    let mut fired = 0;
    for _ in 0..30 {
        let report = session.tick(FRAME, &firing);
        fired += report
            .events
            .iter()
            .filter(|event| matches!(event, Event::BulletFired { .. }))
            .count();
    }
    assert!(fired > 0);
    assert!(session.host().audio.played.is_empty());
}

#[test]
fn firing_plays_the_laser_cue() {
    let mut session = started(9);
    let firing = PilotInput {
        trigger: true,
        ..PilotInput::default()
    };
    let _ = session.tick(FRAME, &firing);
    assert_eq!(session.host().audio.played, vec![SoundCue::Laser]);
}

fn run_until_first_wound(session: &mut TestSession) {
    for _ in 0..20_000 {
        let report = session.tick(FRAME, &idle());
        let wounded = report
            .events
            .iter()
            .any(|event| matches!(event, Event::PlayerDamaged { health, .. } if *health > 0));
        if wounded {
            return;
        }
    }
    panic!("player was never wounded");
}

#[test]
fn wounds_trigger_full_feedback_by_default() {
    let mut session = started(21);
    run_until_first_wound(&mut session);
    let effects = &session.host().ui.effects;
    assert!(effects.contains(&FeedbackEffect::CameraShake));
    assert!(effects.contains(&FeedbackEffect::DamageOverlay));
    assert!(effects.contains(&FeedbackEffect::Glitch));
    assert!(session.host().audio.played.contains(&SoundCue::Hit));
}

#[test]
fn reduced_motion_keeps_only_the_camera_shake() {
    let mut session = started(21);
    session.set_setting(Setting::ReducedMotion(true));
    run_until_first_wound(&mut session);
    assert_eq!(session.host().ui.effects, vec![FeedbackEffect::CameraShake]);
}

#[test]
fn low_frame_rate_enters_low_performance_mode() {
    let mut session = session_with(4, 30.0);
    session.start().expect("start");

    let mut signals = Vec::new();
    for _ in 0..70 {
        signals.extend(session.tick(FRAME, &idle()).signals);
    }
    assert_eq!(signals, vec![Signal::PerfLow]);
    assert!(session.monitor().is_low_perf());
    assert_eq!(session.tick(FRAME, &idle()).engine_particle_cap, 30);

    session.host_mut().clock.fps = 60.0;
    for _ in 0..70 {
        signals.extend(session.tick(FRAME, &idle()).signals);
    }
    assert_eq!(signals, vec![Signal::PerfLow, Signal::PerfHigh]);
    assert_eq!(session.tick(FRAME, &idle()).engine_particle_cap, 50);
}

#[test]
fn restart_clears_low_performance_mode_for_listeners() {
    let mut session = session_with(4, 30.0);
    session.start().expect("start");

    let mut signals = Vec::new();
    for _ in 0..70 {
        signals.extend(session.tick(FRAME, &idle()).signals);
    }
    assert_eq!(signals, vec![Signal::PerfLow]);

    session.pause().expect("pause");
    session.restart().expect("restart");
    assert!(!session.monitor().is_low_perf());

    session.host_mut().clock.fps = 60.0;
    for _ in 0..120 {
        signals.extend(session.tick(FRAME, &idle()).signals);
    }
    assert_eq!(signals, vec![Signal::PerfLow, Signal::PerfHigh]);
    assert_eq!(session.tick(FRAME, &idle()).engine_particle_cap, 50);
}

#[test]
fn difficulty_tiers_retime_the_spawn_loop() {
    // Wide enough that no enemy reaches the idle player within the run.
    let config = SessionConfig {
        arena: Arena::new(60_000.0, 60_000.0),
        rng_seed: 12,
        ..SessionConfig::default()
    };
    let mut session = session_from(config, 60.0);
    session.start().expect("start");
    assert_eq!(session.spawning().delay(), Duration::from_millis(1_400));

    let step = Duration::from_millis(100);
    let mut observed = Vec::new();
    for tick in 1..=1_600_u32 {
        let report = session.tick(step, &idle());
        assert_eq!(report.phase, SessionPhase::Playing);
        let delay = session.spawning().delay();
        match tick {
            199 => assert_eq!(delay, Duration::from_millis(1_400)),
            t if t % 200 == 0 => observed.push((t, delay.as_millis())),
            t if t >= 1_200 => assert_eq!(delay, Duration::from_millis(560)),
            _ => {}
        }
    }
    assert_eq!(
        observed,
        vec![
            (200, 1_260),
            (400, 1_120),
            (600, 980),
            (800, 840),
            (1_000, 700),
            (1_200, 560),
            (1_400, 560),
            (1_600, 560),
        ]
    );

    session.pause().expect("pause");
    session.restart().expect("restart");
    assert_eq!(session.spawning().delay(), Duration::from_millis(1_400));
    let _ = session.tick(step, &idle());
    assert_eq!(session.spawning().delay(), Duration::from_millis(1_400));
}

#[test]
fn restart_from_pause_begins_a_fresh_session() {
    let mut session = started(8);
    for _ in 0..200 {
        let _ = session.tick(FRAME, &idle());
    }
    session.pause().expect("pause");
    session.restart().expect("restart from pause menu");

    assert_eq!(query::phase(session.world()), SessionPhase::Playing);
    assert_eq!(query::elapsed(session.world()), Duration::ZERO);
    assert!(query::enemies(session.world()).is_empty());
    assert_eq!(session.spawning().pending(), Duration::ZERO);
    assert!(!session.host().ui.pause_menu_visible);
}

#[test]
fn quit_to_menu_shows_the_start_screen() {
    let mut session = started(8);
    session.pause().expect("pause");
    session.quit_to_menu().expect("quit");
    assert!(session.host().ui.start_screen_visible);
    assert_eq!(query::phase(session.world()), SessionPhase::Boot);
}

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(0x1234_5678);
    let second = replay(0x1234_5678);
    assert_eq!(first, second, "replay diverged between runs");

    let other = replay(0x8765_4321);
    assert_ne!(first, other, "different seeds should diverge");
}

fn replay(seed: u64) -> u64 {
    let mut session = started(seed);
    let mut hasher = DefaultHasher::new();
    for step in 0..3_000_u32 {
        let input = PilotInput {
            thrust: Vec2::new(((step / 120) % 3) as f32 - 1.0, 0.0),
            aim: step as f32 * 0.05,
            trigger: step % 200 < 150,
        };
        let report = session.tick(FRAME, &input);
        format!("{:?}", report.events).hash(&mut hasher);
    }
    query::summary(session.world()).hash(&mut hasher);
    hasher.finish()
}
