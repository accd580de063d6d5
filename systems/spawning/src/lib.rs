#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scream_in_space_core::{Arena, Command, Event};
use scream_in_space_system_difficulty as difficulty;

/// Distance beyond the arena edge at which enemies appear.
pub const SPAWN_MARGIN: f32 = 40.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    initial_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided opening cadence and seed.
    #[must_use]
    pub const fn new(initial_delay: Duration, rng_seed: u64) -> Self {
        Self {
            initial_delay,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(difficulty::spawn_delay_ms(0)), 0)
    }
}

/// Arena edge an enemy enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Above the arena.
    Top,
    /// Right of the arena.
    Right,
    /// Below the arena.
    Bottom,
    /// Left of the arena.
    Left,
}

impl Edge {
    const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Places a point [`SPAWN_MARGIN`] beyond this edge, `along` units from
    /// the edge's origin.
    #[must_use]
    pub fn spawn_point(self, arena: &Arena, along: f32) -> Vec2 {
        match self {
            Self::Top => Vec2::new(along, -SPAWN_MARGIN),
            Self::Right => Vec2::new(arena.width() + SPAWN_MARGIN, along),
            Self::Bottom => Vec2::new(along, arena.height() + SPAWN_MARGIN),
            Self::Left => Vec2::new(-SPAWN_MARGIN, along),
        }
    }

    fn length(self, arena: &Arena) -> f32 {
        match self {
            Self::Top | Self::Bottom => arena.width(),
            Self::Right | Self::Left => arena.height(),
        }
    }
}

/// Pure system that emits spawn commands on a looping timer.
///
/// The timer only advances on [`Event::TimeAdvanced`], which the world never
/// emits while paused, so the remaining delay survives a pause untouched.
#[derive(Debug)]
pub struct Spawning {
    initial_delay: Duration,
    delay: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            initial_delay: config.initial_delay,
            delay: config.initial_delay,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Current delay between spawns.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time accumulated towards the next spawn.
    #[must_use]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Restarts the loop with a new delay, discarding the partial interval.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
        self.accumulator = Duration::ZERO;
    }

    /// Consumes world events and emits one spawn command per elapsed delay.
    pub fn handle(&mut self, events: &[Event], arena: &Arena, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SessionStarted => self.set_delay(self.initial_delay),
                Event::TimeAdvanced { dt, elapsed } => {
                    if self.delay.is_zero() {
                        continue;
                    }
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    while self.accumulator >= self.delay {
                        self.accumulator -= self.delay;
                        out.push(self.roll_spawn(arena, *elapsed));
                    }
                }
                _ => {}
            }
        }
    }

    fn roll_spawn(&mut self, arena: &Arena, elapsed: Duration) -> Command {
        let edge = Edge::ALL[self.rng.gen_range(0..Edge::ALL.len())];
        let along = self.rng.gen_range(0.0..=edge.length(arena));
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Command::SpawnEnemy {
            position: edge.spawn_point(arena, along),
            speed: difficulty::enemy_speed(elapsed_ms, &mut self.rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_never_spawns() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 1));
        let mut commands = Vec::new();
        spawning.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(10),
                elapsed: Duration::from_secs(10),
            }],
            &Arena::default(),
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn spawn_points_sit_outside_each_edge() {
        let arena = Arena::new(200.0, 100.0);
        assert_eq!(Edge::Top.spawn_point(&arena, 10.0), Vec2::new(10.0, -40.0));
        assert_eq!(Edge::Right.spawn_point(&arena, 10.0), Vec2::new(240.0, 10.0));
        assert_eq!(Edge::Bottom.spawn_point(&arena, 10.0), Vec2::new(10.0, 140.0));
        assert_eq!(Edge::Left.spawn_point(&arena, 10.0), Vec2::new(-40.0, 10.0));
    }
}
