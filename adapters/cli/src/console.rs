//! Terminal stand-ins for the host collaborators and a simple autopilot.

use std::collections::BTreeMap;

use glam::Vec2;
use scream_in_space_core::{FeedbackEffect, GameOverSummary, HudSnapshot, PilotInput, SoundCue};
use scream_in_space_runtime::{Audio, FrameClock, Ui};
use scream_in_space_world::{query, World};

const FIRING_RANGE: f32 = 420.0;
const EVADE_RANGE: f32 = 140.0;

/// Aims at the nearest enemy and backs away from anything too close.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    aim: f32,
}

impl Autopilot {
    /// Samples pilot intent for the current frame.
    pub(crate) fn steer(&mut self, world: &World) -> PilotInput {
        let player = query::player(world).position;
        let nearest = query::enemies(world)
            .into_iter()
            .map(|enemy| (enemy.position, enemy.position.distance(player)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((target, distance)) = nearest else {
            return PilotInput {
                thrust: Vec2::ZERO,
                aim: self.aim,
                trigger: false,
            };
        };

        let offset = target - player;
        self.aim = offset.y.atan2(offset.x);
        let thrust = if distance < EVADE_RANGE {
            -offset.normalize_or_zero()
        } else {
            Vec2::ZERO
        };
        PilotInput {
            thrust,
            aim: self.aim,
            trigger: distance < FIRING_RANGE,
        }
    }
}

/// Logs presentation requests instead of drawing them.
#[derive(Debug, Default)]
pub(crate) struct ConsoleUi {
    last_hud: HudSnapshot,
}

impl Ui for ConsoleUi {
    fn update_hud(&mut self, hud: HudSnapshot) {
        if hud != self.last_hud {
            log::debug!(
                "score {} kills {} health {}",
                hud.score,
                hud.kills,
                hud.health
            );
        }
        self.last_hud = hud;
    }

    fn show_game_over(&mut self, summary: GameOverSummary) {
        log::info!("GAME OVER: score {} kills {}", summary.score, summary.kills);
    }

    fn show_pause_menu(&mut self) {
        log::info!("paused");
    }

    fn hide_pause_menu(&mut self) {
        log::info!("resumed");
    }

    fn show_start_screen(&mut self) {
        log::info!("SCREAM IN SPACE");
    }

    fn hide_start_screen(&mut self) {
        log::debug!("launching");
    }

    fn feedback(&mut self, effect: FeedbackEffect) {
        log::trace!("{effect:?}");
    }
}

/// Counts cues instead of playing them.
#[derive(Debug, Default)]
pub(crate) struct AudioLog {
    played: BTreeMap<&'static str, u32>,
    silenced: u32,
}

impl AudioLog {
    /// One-line tally of the cues that were requested.
    pub(crate) fn describe(&self) -> String {
        let tally: Vec<String> = self
            .played
            .iter()
            .map(|(name, count)| format!("{name} x{count}"))
            .collect();
        format!(
            "audio: {} (silenced {} times)",
            if tally.is_empty() {
                "none".to_owned()
            } else {
                tally.join(", ")
            },
            self.silenced
        )
    }
}

impl Audio for AudioLog {
    fn play(&mut self, cue: SoundCue) {
        let name = match cue {
            SoundCue::Laser => "laser",
            SoundCue::Hit => "hit",
            SoundCue::Reward => "reward",
            SoundCue::Scream => "scream",
            SoundCue::Heartbeat => "heartbeat",
        };
        *self.played.entry(name).or_default() += 1;
    }

    fn stop_all(&mut self) {
        self.silenced += 1;
    }
}

/// Reports a constant frame rate.
#[derive(Debug)]
pub(crate) struct SimulatedClock {
    fps: f32,
}

impl SimulatedClock {
    pub(crate) fn new(fps: f32) -> Self {
        Self { fps }
    }
}

impl FrameClock for SimulatedClock {
    fn actual_fps(&self) -> f32 {
        self.fps
    }

    fn memory_bytes(&self) -> Option<u64> {
        None
    }
}
