#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Looping heartbeat cue that quickens as the player loses health.

use std::time::Duration;

use scream_in_space_core::{Event, SoundCue, PLAYER_MAX_HEALTH};
use scream_in_space_system_difficulty::heartbeat_delay_ms;

/// Delay of the first beat in a fresh session.
pub const INITIAL_HEARTBEAT_DELAY: Duration = Duration::from_millis(1_200);

/// Pure system that emits heartbeat cues on a health-driven loop.
///
/// Like spawning, the loop only advances on [`Event::TimeAdvanced`], so it
/// holds its phase while the session is paused.
#[derive(Debug)]
pub struct Heartbeat {
    delay: Duration,
    accumulator: Duration,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            delay: INITIAL_HEARTBEAT_DELAY,
            accumulator: Duration::ZERO,
        }
    }
}

impl Heartbeat {
    /// Current delay between beats.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Consumes world events and emits one cue per elapsed beat.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<SoundCue>) {
        for event in events {
            match event {
                Event::SessionStarted => *self = Self::default(),
                Event::PlayerDamaged { health, .. } => {
                    let ratio = *health as f32 / PLAYER_MAX_HEALTH as f32;
                    self.delay = Duration::from_millis(heartbeat_delay_ms(ratio));
                }
                Event::TimeAdvanced { dt, .. } => {
                    if self.delay.is_zero() {
                        continue;
                    }
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    while self.accumulator >= self.delay {
                        self.accumulator -= self.delay;
                        out.push(SoundCue::Heartbeat);
                    }
                }
                _ => {}
            }
        }
    }
}
