#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trigger handling for the player's blaster.

use std::time::Duration;

use scream_in_space_core::{Command, Event, PilotInput};

/// Minimum time between two shots.
pub const FIRE_COOLDOWN: Duration = Duration::from_millis(150);

/// Pure system that emits fire commands while the trigger is held.
#[derive(Debug, Default)]
pub struct Weapon {
    cooldown: Duration,
}

impl Weapon {
    /// Creates a weapon that is ready to fire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and pilot intent to emit fire commands.
    pub fn handle(&mut self, events: &[Event], input: &PilotInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SessionStarted => self.cooldown = Duration::ZERO,
                Event::TimeAdvanced { dt, .. } => {
                    self.cooldown = self.cooldown.saturating_sub(*dt);
                    if input.trigger && self.cooldown.is_zero() {
                        out.push(Command::FireBullet { angle: input.aim });
                        self.cooldown = FIRE_COOLDOWN;
                    }
                }
                _ => {}
            }
        }
    }
}
