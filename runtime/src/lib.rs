#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session driver that runs the Scream In Space gameplay loop.
//!
//! [`GameSession`] owns the authoritative world, every gameplay system, the
//! settings store and the performance monitor. Each [`GameSession::tick`]
//! runs them in a fixed order and forwards the outcome to the host through
//! the [`Ui`], [`Audio`] and [`FrameClock`] collaborators.

mod host;

use std::{collections::VecDeque, time::Duration};

use scream_in_space_core::{
    Arena, Command, Event, FeedbackEffect, PilotInput, QualityConfig, SessionPhase, Setting,
    Settings, Signal, SoundCue, TransitionError,
};
use scream_in_space_settings::{SettingsStorage, SettingsStore};
use scream_in_space_system_collision::CollisionResolver;
use scream_in_space_system_difficulty::{self as difficulty, Difficulty};
use scream_in_space_system_heartbeat::Heartbeat;
use scream_in_space_system_movement::Movement;
use scream_in_space_system_performance::PerformanceMonitor;
use scream_in_space_system_spawning::{self as spawning, Spawning};
use scream_in_space_system_weapon::Weapon;
use scream_in_space_world::{self as world, query, World};

pub use host::{Audio, Host, Ui};
pub use scream_in_space_system_performance::FrameClock;

/// Tuning for a [`GameSession`].
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Play area the player is confined to.
    pub arena: Arena,
    /// Seed for every random roll, so equal seeds replay identically.
    pub rng_seed: u64,
    /// The HUD is refreshed every this many ticks.
    pub hud_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            rng_seed: 0x5c2e_a111_d00d_f00d,
            hud_interval: 10,
        }
    }
}

/// Outcome of a single [`GameSession::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Phase after the tick.
    pub phase: SessionPhase,
    /// Every world event produced during the tick, in order.
    pub events: Vec<Event>,
    /// Signals drained at the start of the tick.
    pub signals: Vec<Signal>,
    /// Whether the vision cone should be resampled this frame.
    pub vision_refresh: bool,
    /// Live engine particle cap for the current quality and performance mode.
    pub engine_particle_cap: u32,
}

/// Drives one player's sessions from boot to game over and back.
#[derive(Debug)]
pub struct GameSession<S, U, A, C> {
    config: SessionConfig,
    world: World,
    settings: SettingsStore<S>,
    host: Host<U, A, C>,
    difficulty: Difficulty,
    spawning: Spawning,
    movement: Movement,
    weapon: Weapon,
    collision: CollisionResolver,
    heartbeat: Heartbeat,
    monitor: PerformanceMonitor,
    signals: VecDeque<Signal>,
    host_time: Duration,
}

impl<S, U, A, C> GameSession<S, U, A, C>
where
    S: SettingsStorage,
    U: Ui,
    A: Audio,
    C: FrameClock,
{
    /// Creates a session on the boot screen.
    ///
    /// Pools are sized from the quality stored in `settings`, so load the
    /// store before handing it over.
    pub fn new(config: SessionConfig, settings: SettingsStore<S>, mut host: Host<U, A, C>) -> Self {
        let quality = QualityConfig::resolve(settings.settings().quality);
        host.ui.show_start_screen();
        Self {
            world: World::new(config.arena, quality),
            settings,
            host,
            difficulty: Difficulty::new(),
            spawning: Spawning::new(spawning::Config::new(
                Duration::from_millis(difficulty::spawn_delay_ms(0)),
                config.rng_seed,
            )),
            movement: Movement,
            weapon: Weapon::new(),
            collision: CollisionResolver::new(config.rng_seed.rotate_left(17)),
            heartbeat: Heartbeat::default(),
            monitor: PerformanceMonitor::new(),
            signals: VecDeque::new(),
            host_time: Duration::ZERO,
            config,
        }
    }

    /// Leaves the boot screen and begins a fresh session.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.lifecycle(Command::StartSession)
    }

    /// Freezes the running session.
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.lifecycle(Command::PauseSession)
    }

    /// Unfreezes a paused session.
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.lifecycle(Command::ResumeSession)
    }

    /// Begins a fresh session from game over or the pause menu.
    pub fn restart(&mut self) -> Result<(), TransitionError> {
        self.lifecycle(Command::RestartSession)
    }

    /// Abandons the session and returns to the boot screen.
    pub fn quit_to_menu(&mut self) -> Result<(), TransitionError> {
        self.lifecycle(Command::QuitToMenu)
    }

    /// Changes a setting, persists it and applies any resulting signal
    /// before returning.
    pub fn set_setting(&mut self, setting: Setting) {
        if let Some(signal) = self.settings.set(setting) {
            self.signals.push_back(signal);
        }
        let _ = self.drain_signals();
    }

    /// Advances the session by `dt` using the pilot intent for this frame.
    pub fn tick(&mut self, dt: Duration, input: &PilotInput) -> TickReport {
        self.host_time = self.host_time.saturating_add(dt);
        let signals = self.drain_signals();
        let mut report = TickReport {
            phase: query::phase(&self.world),
            events: Vec::new(),
            signals,
            vision_refresh: false,
            engine_particle_cap: self.engine_particle_cap(),
        };
        if report.phase != SessionPhase::Playing {
            return report;
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let tick_events = events.clone();

        if let Some(change) = self.difficulty.handle(&tick_events) {
            log::debug!("tier {} spawns every {:?}", change.tier, change.spawn_delay);
            self.spawning.set_delay(change.spawn_delay);
        }

        let mut commands = Vec::new();
        self.spawning
            .handle(&tick_events, &self.config.arena, &mut commands);
        self.apply_all(&mut commands, &mut events);

        self.movement.handle(
            &tick_events,
            input,
            &query::player(&self.world),
            &query::enemies(&self.world),
            &mut commands,
        );
        self.weapon.handle(&tick_events, input, &mut commands);
        self.apply_all(&mut commands, &mut events);

        self.collision.handle(
            &tick_events,
            &query::player(&self.world),
            &query::enemies(&self.world),
            &query::bullets(&self.world),
            &mut commands,
        );
        self.apply_all(&mut commands, &mut events);

        self.present(&events);

        let still_playing = query::phase(&self.world) == SessionPhase::Playing;
        if still_playing {
            let mut cues = Vec::new();
            self.heartbeat.handle(&events, &mut cues);
            for cue in cues {
                self.play(cue);
            }

            if let Some(signal) = self.monitor.update(self.host_time, &self.host.clock) {
                self.signals.push_back(signal);
            }

            let tick_index = query::tick_index(&self.world);
            if tick_index % self.config.hud_interval.max(1) == 0 {
                self.host.ui.update_hud(query::hud(&self.world));
            }
            let vision_rate = u64::from(query::quality(&self.world).vision_update_rate.max(1));
            report.vision_refresh = tick_index % vision_rate == 0;
        }

        report.phase = query::phase(&self.world);
        report.events = events;
        report.engine_particle_cap = self.engine_particle_cap();
        report
    }

    /// Authoritative world state, for read-only queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Live user settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    /// Settings store, including its storage backend.
    #[must_use]
    pub fn settings_store(&self) -> &SettingsStore<S> {
        &self.settings
    }

    /// Enemy spawn loop.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Frame-rate monitor.
    #[must_use]
    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    /// Host collaborators.
    #[must_use]
    pub fn host(&self) -> &Host<U, A, C> {
        &self.host
    }

    /// Mutable host collaborators.
    pub fn host_mut(&mut self) -> &mut Host<U, A, C> {
        &mut self.host
    }

    fn lifecycle(&mut self, command: Command) -> Result<(), TransitionError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        if let Some(change) = self.difficulty.handle(&events) {
            self.spawning.set_delay(change.spawn_delay);
        }
        let mut ignored = Vec::new();
        self.spawning
            .handle(&events, &self.config.arena, &mut ignored);
        self.weapon
            .handle(&events, &PilotInput::default(), &mut ignored);
        let mut cues = Vec::new();
        self.heartbeat.handle(&events, &mut cues);
        self.present(&events);

        let rejected = events.iter().find_map(|event| match event {
            Event::TransitionRejected { error } => Some(*error),
            _ => None,
        });
        rejected.map_or(Ok(()), Err)
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }

    fn drain_signals(&mut self) -> Vec<Signal> {
        let drained: Vec<Signal> = self.signals.drain(..).collect();
        for signal in &drained {
            match *signal {
                Signal::QualityChanged(tier) => {
                    let mut events = Vec::new();
                    world::apply(
                        &mut self.world,
                        Command::ConfigureQuality {
                            config: QualityConfig::resolve(tier),
                        },
                        &mut events,
                    );
                    log::info!("quality set to {tier:?}");
                }
                Signal::PerfLow => log::debug!("low performance mode active"),
                Signal::PerfHigh => log::debug!("low performance mode cleared"),
            }
        }
        drained
    }

    fn engine_particle_cap(&self) -> u32 {
        query::quality(&self.world)
            .particles
            .engine_max_particles(self.monitor.is_low_perf())
    }

    fn play(&mut self, cue: SoundCue) {
        if self.settings.settings().sound {
            self.host.audio.play(cue);
        }
    }

    fn feedback(&mut self, effect: FeedbackEffect) {
        let cosmetic = !matches!(effect, FeedbackEffect::CameraShake);
        if cosmetic && self.settings.settings().reduced_motion {
            return;
        }
        if !cosmetic && self.monitor.is_low_perf() {
            return;
        }
        self.host.ui.feedback(effect);
    }

    fn present(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PhaseChanged { from, to } => {
                    if *from == SessionPhase::Boot {
                        self.host.ui.hide_start_screen();
                    }
                    if *from == SessionPhase::Paused {
                        self.host.ui.hide_pause_menu();
                    }
                    match to {
                        SessionPhase::Paused => self.host.ui.show_pause_menu(),
                        SessionPhase::Boot => self.host.ui.show_start_screen(),
                        SessionPhase::Playing | SessionPhase::GameOver => {}
                    }
                }
                Event::SessionStarted => {
                    log::info!("session started");
                    if self.monitor.is_low_perf() {
                        self.signals.push_back(Signal::PerfHigh);
                    }
                    self.monitor.reset();
                    self.host.ui.update_hud(query::hud(&self.world));
                }
                Event::BulletFired { .. } => self.play(SoundCue::Laser),
                Event::EnemyDestroyed {
                    position, reward, ..
                } => {
                    self.play(SoundCue::Reward);
                    self.feedback(FeedbackEffect::ScorePopup {
                        position: *position,
                        points: *reward,
                    });
                }
                Event::PlayerDamaged { health, .. } => {
                    self.play(SoundCue::Hit);
                    if *health > 0 {
                        self.feedback(FeedbackEffect::CameraShake);
                        self.feedback(FeedbackEffect::DamageOverlay);
                        self.feedback(FeedbackEffect::Glitch);
                    }
                }
                Event::PlayerDied { summary } => {
                    log::info!(
                        "game over with {} points and {} kills",
                        summary.score,
                        summary.kills
                    );
                    self.host.audio.stop_all();
                    self.play(SoundCue::Scream);
                    self.host.ui.show_game_over(*summary);
                }
                _ => {}
            }
        }
    }
}
