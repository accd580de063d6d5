#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Steering system that turns pilot intent and chase logic into velocity
//! commands.

use glam::Vec2;
use scream_in_space_core::{Command, EnemySnapshot, Event, PilotInput, PlayerSnapshot};

/// Acceleration applied along each thrusting axis, in world units per second squared.
pub const PLAYER_ACCELERATION: f32 = 420.0;

/// Pure system that steers the player ship and points every enemy at it.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits steering commands for the tick described by `events`.
    ///
    /// Nothing is emitted unless the session clock advanced, so a paused
    /// session keeps its last velocities.
    pub fn handle(
        &self,
        events: &[Event],
        input: &PilotInput,
        player: &PlayerSnapshot,
        enemies: &[EnemySnapshot],
        out: &mut Vec<Command>,
    ) {
        let advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !advanced {
            return;
        }

        out.push(Command::SteerPlayer {
            acceleration: thrust_acceleration(input.thrust),
            aim: input.aim,
        });

        for enemy in enemies {
            out.push(Command::SteerEnemy {
                enemy: enemy.id,
                velocity: chase_velocity(enemy, player.position),
            });
        }
    }
}

fn thrust_acceleration(thrust: Vec2) -> Vec2 {
    thrust.clamp(Vec2::splat(-1.0), Vec2::ONE) * PLAYER_ACCELERATION
}

fn chase_velocity(enemy: &EnemySnapshot, target: Vec2) -> Vec2 {
    (target - enemy.position).normalize_or_zero() * enemy.speed
}
