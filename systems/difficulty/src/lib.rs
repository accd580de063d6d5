#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-driven difficulty curves and the system that tracks the active tier.

use std::time::Duration;

use rand::Rng;
use scream_in_space_core::Event;

/// Play time each difficulty tier lasts, in milliseconds.
pub const TIER_DURATION_MS: u64 = 20_000;
/// Highest reachable tier.
pub const MAX_TIER: u32 = 6;

const INITIAL_SPAWN_DELAY_MS: u64 = 1_400;
const SPAWN_DELAY_STEP_MS: u64 = 140;
const MIN_SPAWN_DELAY_MS: u64 = 500;

const BASE_SPEED_MIN: u32 = 70;
const BASE_SPEED_MAX: u32 = 130;
const MAX_SPEED_BONUS: f32 = 80.0;

const HEARTBEAT_FASTEST_MS: f32 = 300.0;
const HEARTBEAT_SLOWEST_MS: f32 = 1_200.0;

/// Difficulty tier reached after `elapsed_ms` of play, in `0..=MAX_TIER`.
#[must_use]
pub fn tier(elapsed_ms: u64) -> u32 {
    let tier = (elapsed_ms / TIER_DURATION_MS).min(u64::from(MAX_TIER));
    tier as u32
}

/// Delay between enemy spawns at `tier`.
///
/// Falls by 140ms per tier from 1400ms and never drops below 500ms.
#[must_use]
pub fn spawn_delay_ms(tier: u32) -> u64 {
    INITIAL_SPAWN_DELAY_MS
        .saturating_sub(SPAWN_DELAY_STEP_MS.saturating_mul(u64::from(tier)))
        .max(MIN_SPAWN_DELAY_MS)
}

/// Rolls the chase speed of an enemy spawned after `elapsed_ms` of play.
///
/// A random base in `70..=130` plus one unit per second of play, with the
/// bonus capped at 80.
pub fn enemy_speed<R: Rng + ?Sized>(elapsed_ms: u64, rng: &mut R) -> f32 {
    let base = rng.gen_range(BASE_SPEED_MIN..=BASE_SPEED_MAX) as f32;
    let bonus = (elapsed_ms as f32 / 1_000.0).min(MAX_SPEED_BONUS);
    base + bonus
}

/// Heartbeat interval for the player's remaining health fraction.
///
/// Full health beats every 1200ms and near-death every 300ms.
#[must_use]
pub fn heartbeat_delay_ms(health_ratio: f32) -> u64 {
    let ratio = health_ratio.clamp(0.0, 1.0);
    let delay = HEARTBEAT_FASTEST_MS + (HEARTBEAT_SLOWEST_MS - HEARTBEAT_FASTEST_MS) * ratio;
    delay.round() as u64
}

/// Reports a tier change together with the spawn delay it implies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyChange {
    /// Newly reached tier.
    pub tier: u32,
    /// Spawn delay for the new tier.
    pub spawn_delay: Duration,
}

/// Tracks the active tier from the session clock.
#[derive(Debug)]
pub struct Difficulty {
    tier: u32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new()
    }
}

impl Difficulty {
    /// Creates a tracker at tier zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { tier: 0 }
    }

    /// Active tier.
    #[must_use]
    pub const fn tier(&self) -> u32 {
        self.tier
    }

    /// Spawn delay for the active tier.
    #[must_use]
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(spawn_delay_ms(self.tier))
    }

    /// Consumes world events and reports when the tier changes.
    pub fn handle(&mut self, events: &[Event]) -> Option<DifficultyChange> {
        let mut changed = false;
        for event in events {
            match event {
                Event::SessionStarted => {
                    changed |= self.tier != 0;
                    self.tier = 0;
                }
                Event::TimeAdvanced { elapsed, .. } => {
                    let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                    let next = tier(millis);
                    if next != self.tier {
                        log::debug!("difficulty tier {} -> {next}", self.tier);
                        self.tier = next;
                        changed = true;
                    }
                }
                _ => {}
            }
        }

        changed.then(|| DifficultyChange {
            tier: self.tier,
            spawn_delay: self.spawn_delay(),
        })
    }
}
