#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Scream In Space gameplay engine.
//!
//! This crate defines the message surface that connects the session runtime,
//! the authoritative world, and pure systems. The runtime submits [`Command`]
//! values describing desired mutations. The world executes them through its
//! `apply` entry point and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams and immutable snapshots, and they
//! respond only with new command batches.

mod quality;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use quality::{ParticleBudget, QualityConfig, QualityTier};

/// Health the player starts every session with.
pub const PLAYER_MAX_HEALTH: u32 = 100;

/// Points awarded for destroying a single enemy.
pub const KILL_REWARD: u32 = 25;

/// Span after a hit during which further player hits are ignored.
pub const INVULNERABILITY_WINDOW: Duration = Duration::from_millis(500);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Leaves the boot screen and begins a fresh session.
    StartSession,
    /// Freezes the running session.
    PauseSession,
    /// Unfreezes a paused session.
    ResumeSession,
    /// Begins a fresh session after game over or from the pause menu.
    RestartSession,
    /// Discards the current session and returns to the boot screen.
    QuitToMenu,
    /// Applies a new quality budget to the entity pools immediately.
    ConfigureQuality {
        /// Limits resolved from the selected quality tier.
        config: QualityConfig,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Updates the acceleration and aim applied to the player ship.
    SteerPlayer {
        /// Acceleration in world units per second squared.
        acceleration: Vec2,
        /// Aim angle in radians, measured from the positive x axis.
        aim: f32,
    },
    /// Updates the velocity of a single live enemy.
    SteerEnemy {
        /// Enemy whose velocity should change.
        enemy: EntityId,
        /// New velocity in world units per second.
        velocity: Vec2,
    },
    /// Requests that a new enemy enter the arena.
    SpawnEnemy {
        /// Spawn location, usually just beyond an arena edge.
        position: Vec2,
        /// Chase speed assigned to the enemy.
        speed: f32,
    },
    /// Requests that the player fire a bullet along the provided angle.
    FireBullet {
        /// Firing angle in radians.
        angle: f32,
    },
    /// Resolves a bullet overlapping an enemy by destroying both.
    ResolveBulletHit {
        /// Bullet that struck the enemy.
        bullet: EntityId,
        /// Enemy that was struck.
        enemy: EntityId,
    },
    /// Applies damage from an enemy contact to the player.
    DamagePlayer {
        /// Health points to subtract.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the session moved between phases.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: SessionPhase,
        /// Phase that is active after the transition.
        to: SessionPhase,
    },
    /// Confirms that score, health and pools were reset for a new session.
    SessionStarted,
    /// Reports that a phase transition request was not valid.
    TransitionRejected {
        /// Description of the rejected transition.
        error: TransitionError,
    },
    /// Confirms that the entity pools adopted new capacities.
    PoolsConfigured {
        /// Maximum number of live enemies.
        enemy_capacity: usize,
        /// Maximum number of live bullets.
        bullet_capacity: usize,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Total play time since the session started, excluding pauses.
        elapsed: Duration,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Handle assigned to the enemy.
        enemy: EntityId,
        /// Location the enemy spawned at.
        position: Vec2,
        /// Chase speed assigned to the enemy.
        speed: f32,
    },
    /// Reports that a pool had no free capacity, so the request was dropped.
    SpawnSkipped {
        /// Kind of entity that could not be allocated.
        kind: EntityKind,
    },
    /// Confirms that the player fired a bullet.
    BulletFired {
        /// Handle assigned to the bullet.
        bullet: EntityId,
        /// Muzzle position.
        position: Vec2,
        /// Firing angle in radians.
        angle: f32,
    },
    /// Reports that a bullet ran out of lifespan and returned to its pool.
    BulletExpired {
        /// Handle of the expired bullet.
        bullet: EntityId,
    },
    /// Confirms that a bullet destroyed an enemy.
    EnemyDestroyed {
        /// Handle of the destroyed enemy.
        enemy: EntityId,
        /// Handle of the bullet that struck it.
        bullet: EntityId,
        /// Location of the enemy when it was destroyed.
        position: Vec2,
        /// Points awarded for the kill.
        reward: u32,
    },
    /// Confirms that the player took damage.
    PlayerDamaged {
        /// Health points subtracted.
        amount: u32,
        /// Remaining health after the hit.
        health: u32,
        /// Session time until which further hits are ignored.
        invulnerable_until: Duration,
    },
    /// Announces that the player ran out of health.
    PlayerDied {
        /// Final score and kills for the session.
        summary: GameOverSummary,
    },
}

/// Kinds of pooled entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Hostile entity chasing the player.
    Enemy,
    /// Projectile fired by the player.
    Bullet,
}

/// Handle to a pooled entity.
///
/// The generation changes every time a slot is released, so stale handles held
/// across a release never match the slot's next occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates a handle for the provided slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the owning pool.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Top-level phases of a game session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Start screen; no session is running.
    #[default]
    Boot,
    /// Session is running and every gameplay system ticks.
    Playing,
    /// Session is frozen; no gameplay system advances.
    Paused,
    /// Player died; final results are on screen.
    GameOver,
}

/// Requests that move a session between phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Boot to playing.
    Start,
    /// Playing to paused.
    Pause,
    /// Paused to playing.
    Resume,
    /// Playing to game over.
    Die,
    /// Game over or paused to a fresh playing session.
    Restart,
    /// Game over or paused back to boot.
    QuitToMenu,
}

impl SessionPhase {
    /// Resolves the phase reached by applying `transition`, if it is legal.
    pub fn transition(self, transition: Transition) -> Result<Self, TransitionError> {
        let next = match (self, transition) {
            (Self::Boot, Transition::Start) => Self::Playing,
            (Self::Playing, Transition::Pause) => Self::Paused,
            (Self::Paused, Transition::Resume) => Self::Playing,
            (Self::Playing, Transition::Die) => Self::GameOver,
            (Self::GameOver | Self::Paused, Transition::Restart) => Self::Playing,
            (Self::GameOver | Self::Paused, Transition::QuitToMenu) => Self::Boot,
            (phase, transition) => return Err(TransitionError { phase, transition }),
        };
        Ok(next)
    }
}

/// Error raised when a transition is not permitted from the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("transition {transition:?} is not permitted while {phase:?}")]
pub struct TransitionError {
    /// Phase the session was in when the request arrived.
    pub phase: SessionPhase,
    /// Transition that was requested.
    pub transition: Transition,
}

/// Rectangular play area the player is confined to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    width: f32,
    height: f32,
}

impl Arena {
    /// Creates an arena with the provided dimensions in world units.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the arena.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the arena.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre point, where the player starts.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Clamps a point so it lies inside the arena bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(0.0, self.width),
            point.y.clamp(0.0, self.height),
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Persisted user preferences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Whether sound cues are played.
    pub sound: bool,
    /// Whether the CRT overlay is drawn.
    pub crt_effects: bool,
    /// Whether cosmetic motion such as popups and flashes is suppressed.
    pub reduced_motion: bool,
    /// Selected resource budget preset.
    pub quality: QualityTier,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: true,
            crt_effects: true,
            reduced_motion: false,
            quality: QualityTier::Medium,
        }
    }
}

impl Settings {
    /// Writes a single setting, reporting whether the stored value changed.
    pub fn apply(&mut self, setting: Setting) -> bool {
        let before = *self;
        match setting {
            Setting::Sound(value) => self.sound = value,
            Setting::CrtEffects(value) => self.crt_effects = value,
            Setting::ReducedMotion(value) => self.reduced_motion = value,
            Setting::Quality(value) => self.quality = value,
        }
        before != *self
    }
}

/// A single typed settings mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    /// Toggles sound playback.
    Sound(bool),
    /// Toggles the CRT overlay.
    CrtEffects(bool),
    /// Toggles reduced motion.
    ReducedMotion(bool),
    /// Selects a quality tier.
    Quality(QualityTier),
}

/// Notifications queued for the runtime and drained at fixed points of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The user picked a new quality tier.
    QualityChanged(QualityTier),
    /// Sustained low frame rate was detected.
    PerfLow,
    /// Frame rate recovered.
    PerfHigh,
}

/// Pilot intent sampled from input devices for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PilotInput {
    /// Movement direction with each axis in `-1.0..=1.0`.
    pub thrust: Vec2,
    /// Aim angle in radians.
    pub aim: f32,
    /// Whether the fire button is held.
    pub trigger: bool,
}

/// Values shown on the heads-up display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HudSnapshot {
    /// Current score.
    pub score: u32,
    /// Enemies destroyed this session.
    pub kills: u32,
    /// Remaining player health.
    pub health: u32,
}

/// Final results carried into the game over screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GameOverSummary {
    /// Final score.
    pub score: u32,
    /// Enemies destroyed.
    pub kills: u32,
}

/// Sound effects the gameplay core asks the audio collaborator to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Player fired.
    Laser,
    /// Player took damage.
    Hit,
    /// Enemy destroyed.
    Reward,
    /// Player died.
    Scream,
    /// Looping low-health pulse.
    Heartbeat,
}

/// Cosmetic feedback the gameplay core asks the presentation layer to show.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeedbackEffect {
    /// Short camera shake after a non-fatal hit.
    CameraShake,
    /// Red overlay flash after a non-fatal hit.
    DamageOverlay,
    /// Screen glitch after a non-fatal hit.
    Glitch,
    /// Floating points label at a kill location.
    ScorePopup {
        /// Where the kill happened.
        position: Vec2,
        /// Points awarded.
        points: u32,
    },
}

/// Immutable representation of a live enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub id: EntityId,
    /// Current position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Chase speed.
    pub speed: f32,
}

/// Immutable representation of a live bullet used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Handle of the bullet.
    pub id: EntityId,
    /// Current position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Time left before the bullet expires.
    pub lifespan: Duration,
}

/// Immutable representation of the player ship used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Aim angle in radians.
    pub aim: f32,
    /// Remaining health.
    pub health: u32,
    /// Session time until which hits are ignored.
    pub invulnerable_until: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_machine_follows_session_lifecycle() {
        let playing = SessionPhase::Boot.transition(Transition::Start).unwrap();
        assert_eq!(playing, SessionPhase::Playing);
        let paused = playing.transition(Transition::Pause).unwrap();
        assert_eq!(paused, SessionPhase::Paused);
        assert_eq!(
            paused.transition(Transition::Resume),
            Ok(SessionPhase::Playing)
        );
        assert_eq!(
            playing.transition(Transition::Die),
            Ok(SessionPhase::GameOver)
        );
        assert_eq!(
            SessionPhase::GameOver.transition(Transition::Restart),
            Ok(SessionPhase::Playing)
        );
        assert_eq!(
            SessionPhase::GameOver.transition(Transition::QuitToMenu),
            Ok(SessionPhase::Boot)
        );
        assert_eq!(
            SessionPhase::Paused.transition(Transition::QuitToMenu),
            Ok(SessionPhase::Boot)
        );
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let error = SessionPhase::Boot
            .transition(Transition::Pause)
            .expect_err("cannot pause from boot");
        assert_eq!(error.phase, SessionPhase::Boot);
        assert_eq!(error.transition, Transition::Pause);
        assert!(SessionPhase::GameOver.transition(Transition::Die).is_err());
        assert!(SessionPhase::Playing.transition(Transition::QuitToMenu).is_err());
        assert!(SessionPhase::Playing.transition(Transition::Start).is_err());
    }

    #[test]
    fn settings_apply_reports_changes() {
        let mut settings = Settings::default();
        assert!(!settings.apply(Setting::Sound(true)));
        assert!(settings.apply(Setting::Quality(QualityTier::High)));
        assert_eq!(settings.quality, QualityTier::High);
    }

    #[test]
    fn settings_use_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "sound": true,
                "crtEffects": true,
                "reducedMotion": false,
                "quality": "medium",
            })
        );
    }

    #[test]
    fn arena_clamp_keeps_points_inside() {
        let arena = Arena::new(100.0, 50.0);
        assert_eq!(arena.clamp(Vec2::new(-5.0, 80.0)), Vec2::new(0.0, 50.0));
        assert_eq!(arena.center(), Vec2::new(50.0, 25.0));
    }
}
