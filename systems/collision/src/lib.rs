#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision system that turns overlaps into hit and damage commands.
//!
//! Overlap detection is delegated to an [`Overlaps`] implementation. The
//! resolver only decides what each overlap means: bullets destroy the first
//! enemy they touch, and an enemy touching a vulnerable player deals damage.

use std::{collections::HashSet, time::Duration};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scream_in_space_core::{BulletSnapshot, Command, EnemySnapshot, EntityId, Event, PlayerSnapshot};

/// Smallest damage an enemy contact deals.
pub const CONTACT_DAMAGE_MIN: u32 = 8;
/// Largest damage an enemy contact deals.
pub const CONTACT_DAMAGE_MAX: u32 = 14;
/// Share of a sprite's display size that counts as its hitbox.
pub const HITBOX_SCALE: f32 = 0.6;

/// Broad-phase overlap queries.
pub trait Overlaps {
    /// Appends every `(bullet, enemy)` pair whose bodies overlap.
    fn bullet_enemy(
        &self,
        bullets: &[BulletSnapshot],
        enemies: &[EnemySnapshot],
        out: &mut Vec<(EntityId, EntityId)>,
    );

    /// Appends every enemy overlapping the player.
    fn player_enemy(
        &self,
        player: &PlayerSnapshot,
        enemies: &[EnemySnapshot],
        out: &mut Vec<EntityId>,
    );
}

/// Brute-force circle test over every candidate pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleOverlaps {
    player_radius: f32,
    enemy_radius: f32,
    bullet_radius: f32,
}

impl CircleOverlaps {
    /// Builds hit circles from sprite display sizes, scaled by [`HITBOX_SCALE`].
    #[must_use]
    pub fn from_display_sizes(player: f32, enemy: f32, bullet: f32) -> Self {
        Self {
            player_radius: player * 0.5 * HITBOX_SCALE,
            enemy_radius: enemy * 0.5 * HITBOX_SCALE,
            bullet_radius: bullet * 0.5 * HITBOX_SCALE,
        }
    }
}

impl Default for CircleOverlaps {
    fn default() -> Self {
        Self::from_display_sizes(64.0, 64.0, 12.0)
    }
}

fn circles_touch(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

impl Overlaps for CircleOverlaps {
    fn bullet_enemy(
        &self,
        bullets: &[BulletSnapshot],
        enemies: &[EnemySnapshot],
        out: &mut Vec<(EntityId, EntityId)>,
    ) {
        for bullet in bullets {
            for enemy in enemies {
                if circles_touch(
                    bullet.position,
                    self.bullet_radius,
                    enemy.position,
                    self.enemy_radius,
                ) {
                    out.push((bullet.id, enemy.id));
                }
            }
        }
    }

    fn player_enemy(
        &self,
        player: &PlayerSnapshot,
        enemies: &[EnemySnapshot],
        out: &mut Vec<EntityId>,
    ) {
        out.extend(
            enemies
                .iter()
                .filter(|enemy| {
                    circles_touch(
                        player.position,
                        self.player_radius,
                        enemy.position,
                        self.enemy_radius,
                    )
                })
                .map(|enemy| enemy.id),
        );
    }
}

/// Pure system resolving overlaps into world commands.
#[derive(Debug)]
pub struct CollisionResolver<O = CircleOverlaps> {
    overlaps: O,
    rng: ChaCha8Rng,
    pairs: Vec<(EntityId, EntityId)>,
    contacts: Vec<EntityId>,
    spent_bullets: HashSet<EntityId>,
    spent_enemies: HashSet<EntityId>,
}

impl CollisionResolver<CircleOverlaps> {
    /// Creates a resolver using circle hitboxes and the provided damage seed.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self::with_overlaps(CircleOverlaps::default(), rng_seed)
    }
}

impl<O: Overlaps> CollisionResolver<O> {
    /// Creates a resolver using a custom broad phase.
    #[must_use]
    pub fn with_overlaps(overlaps: O, rng_seed: u64) -> Self {
        Self {
            overlaps,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            pairs: Vec::new(),
            contacts: Vec::new(),
            spent_bullets: HashSet::new(),
            spent_enemies: HashSet::new(),
        }
    }

    /// Emits hit and damage commands for the tick described by `events`.
    ///
    /// Every bullet and enemy takes part in at most one hit per tick, and the
    /// player takes at most one damage roll per tick. Enemies destroyed by a
    /// bullet this tick no longer count as touching the player.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        enemies: &[EnemySnapshot],
        bullets: &[BulletSnapshot],
        out: &mut Vec<Command>,
    ) {
        let Some(now) = latest_elapsed(events) else {
            return;
        };

        self.pairs.clear();
        self.spent_bullets.clear();
        self.spent_enemies.clear();
        self.overlaps.bullet_enemy(bullets, enemies, &mut self.pairs);
        for &(bullet, enemy) in &self.pairs {
            if self.spent_bullets.contains(&bullet) || self.spent_enemies.contains(&enemy) {
                continue;
            }
            let _ = self.spent_bullets.insert(bullet);
            let _ = self.spent_enemies.insert(enemy);
            out.push(Command::ResolveBulletHit { bullet, enemy });
        }

        if now < player.invulnerable_until {
            return;
        }
        self.contacts.clear();
        self.overlaps.player_enemy(player, enemies, &mut self.contacts);
        let touched = self
            .contacts
            .iter()
            .any(|enemy| !self.spent_enemies.contains(enemy));
        if touched {
            let amount = self.rng.gen_range(CONTACT_DAMAGE_MIN..=CONTACT_DAMAGE_MAX);
            out.push(Command::DamagePlayer { amount });
        }
    }
}

fn latest_elapsed(events: &[Event]) -> Option<Duration> {
    events.iter().rev().find_map(|event| match event {
        Event::TimeAdvanced { elapsed, .. } => Some(*elapsed),
        _ => None,
    })
}
