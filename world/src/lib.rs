#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Scream In Space.

mod pool;

use std::time::Duration;

use glam::Vec2;
use scream_in_space_core::{
    Arena, Command, EntityId, EntityKind, Event, GameOverSummary, QualityConfig, QualityTier,
    SessionPhase, Transition, INVULNERABILITY_WINDOW, KILL_REWARD, PLAYER_MAX_HEALTH,
};

pub use pool::{EntityPool, PoolError};

/// Velocity cap applied to each axis of the player ship.
pub const PLAYER_MAX_VELOCITY: f32 = 280.0;
/// Fraction of player velocity retained per second on axes without thrust.
pub const PLAYER_DRAG: f32 = 0.9;
/// Muzzle speed of player bullets in world units per second.
pub const BULLET_SPEED: f32 = 600.0;
/// Time a bullet stays live before returning to its pool.
pub const BULLET_LIFESPAN: Duration = Duration::from_millis(1000);

/// Represents the authoritative Scream In Space session state.
#[derive(Debug)]
pub struct World {
    arena: Arena,
    quality: QualityConfig,
    phase: SessionPhase,
    session: SessionState,
    player: Player,
    enemies: EntityPool<Enemy>,
    bullets: EntityPool<Bullet>,
    tick_index: u64,
}

impl World {
    /// Creates a world on the boot screen with pools sized from `quality`.
    #[must_use]
    pub fn new(arena: Arena, quality: QualityConfig) -> Self {
        Self {
            arena,
            quality,
            phase: SessionPhase::Boot,
            session: SessionState::default(),
            player: Player::at(arena.center()),
            enemies: EntityPool::new(quality.enemy_max_count),
            bullets: EntityPool::new(quality.bullet_max_size),
            tick_index: 0,
        }
    }

    fn transition(&mut self, transition: Transition, out_events: &mut Vec<Event>) -> bool {
        match self.phase.transition(transition) {
            Ok(next) => {
                let from = self.phase;
                self.phase = next;
                log::debug!("session phase {from:?} -> {next:?}");
                out_events.push(Event::PhaseChanged { from, to: next });
                true
            }
            Err(error) => {
                log::warn!("{error}");
                out_events.push(Event::TransitionRejected { error });
                false
            }
        }
    }

    fn begin_session(&mut self, transition: Transition, out_events: &mut Vec<Event>) {
        if !self.transition(transition, out_events) {
            return;
        }
        self.reset_session();
        out_events.push(Event::SessionStarted);
    }

    fn reset_session(&mut self) {
        self.session = SessionState::default();
        self.player = Player::at(self.arena.center());
        self.enemies = EntityPool::new(self.quality.enemy_max_count);
        self.bullets = EntityPool::new(self.quality.bullet_max_size);
        self.tick_index = 0;
    }

    fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.session.elapsed = self.session.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            elapsed: self.session.elapsed,
        });

        let seconds = dt.as_secs_f32();
        self.player.integrate(seconds, &self.arena);

        self.enemies.for_each_active_mut(|_, enemy| {
            enemy.position += enemy.velocity * seconds;
        });

        let mut expired = Vec::new();
        self.bullets.for_each_active_mut(|id, bullet| {
            bullet.position += bullet.velocity * seconds;
            bullet.lifespan = bullet.lifespan.saturating_sub(dt);
            if bullet.lifespan.is_zero() {
                expired.push(id);
            }
        });
        for bullet in expired {
            release_checked(&mut self.bullets, bullet);
            out_events.push(Event::BulletExpired { bullet });
        }
    }

    fn spawn_enemy(&mut self, position: Vec2, speed: f32, out_events: &mut Vec<Event>) {
        match self.enemies.acquire() {
            Ok(id) => {
                if let Some(enemy) = self.enemies.entity_mut(id) {
                    *enemy = Enemy {
                        position,
                        velocity: Vec2::ZERO,
                        speed,
                    };
                }
                out_events.push(Event::EnemySpawned {
                    enemy: id,
                    position,
                    speed,
                });
            }
            Err(error) => {
                log::trace!("enemy spawn skipped: {error}");
                out_events.push(Event::SpawnSkipped {
                    kind: EntityKind::Enemy,
                });
            }
        }
    }

    fn fire_bullet(&mut self, angle: f32, out_events: &mut Vec<Event>) {
        match self.bullets.acquire() {
            Ok(id) => {
                let position = self.player.position;
                if let Some(bullet) = self.bullets.entity_mut(id) {
                    *bullet = Bullet {
                        position,
                        velocity: Vec2::new(angle.cos(), angle.sin()) * BULLET_SPEED,
                        lifespan: BULLET_LIFESPAN,
                    };
                }
                out_events.push(Event::BulletFired {
                    bullet: id,
                    position,
                    angle,
                });
            }
            Err(error) => {
                log::trace!("shot skipped: {error}");
                out_events.push(Event::SpawnSkipped {
                    kind: EntityKind::Bullet,
                });
            }
        }
    }

    fn resolve_bullet_hit(
        &mut self,
        bullet: EntityId,
        enemy: EntityId,
        out_events: &mut Vec<Event>,
    ) {
        if !self.bullets.is_active(bullet) {
            return;
        }
        let Some(position) = self.enemies.entity(enemy).map(|enemy| enemy.position) else {
            return;
        };

        release_checked(&mut self.bullets, bullet);
        release_checked(&mut self.enemies, enemy);
        self.session.score = self.session.score.saturating_add(KILL_REWARD);
        self.session.kills = self.session.kills.saturating_add(1);
        out_events.push(Event::EnemyDestroyed {
            enemy,
            bullet,
            position,
            reward: KILL_REWARD,
        });
    }

    fn damage_player(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        let now = self.session.elapsed;
        if now < self.session.invulnerable_until {
            return;
        }

        let health = self.session.health.saturating_sub(amount);
        self.session.health = health;
        self.session.invulnerable_until = now + INVULNERABILITY_WINDOW;
        out_events.push(Event::PlayerDamaged {
            amount,
            health,
            invulnerable_until: self.session.invulnerable_until,
        });

        if health == 0 && self.transition(Transition::Die, out_events) {
            out_events.push(Event::PlayerDied {
                summary: self.session.summary(),
            });
        }
    }

    fn configure_quality(&mut self, config: QualityConfig, out_events: &mut Vec<Event>) {
        self.quality = config;
        self.enemies.set_max_size(config.enemy_max_count);
        self.bullets.set_max_size(config.bullet_max_size);
        out_events.push(Event::PoolsConfigured {
            enemy_capacity: config.enemy_max_count,
            bullet_capacity: config.bullet_max_size,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(
            Arena::default(),
            QualityConfig::resolve(QualityTier::default()),
        )
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Gameplay commands are ignored unless the session is playing, so a paused
/// or finished session never advances.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => world.begin_session(Transition::Start, out_events),
        Command::RestartSession => world.begin_session(Transition::Restart, out_events),
        Command::PauseSession => {
            let _ = world.transition(Transition::Pause, out_events);
        }
        Command::ResumeSession => {
            let _ = world.transition(Transition::Resume, out_events);
        }
        Command::QuitToMenu => {
            if world.transition(Transition::QuitToMenu, out_events) {
                world.reset_session();
            }
        }
        Command::ConfigureQuality { config } => world.configure_quality(config, out_events),
        Command::Tick { dt } => {
            if world.is_playing() {
                world.advance(dt, out_events);
            }
        }
        Command::SteerPlayer { acceleration, aim } => {
            if world.is_playing() {
                world.player.acceleration = acceleration;
                world.player.aim = aim;
            }
        }
        Command::SteerEnemy { enemy, velocity } => {
            if world.is_playing() {
                if let Some(enemy) = world.enemies.entity_mut(enemy) {
                    enemy.velocity = velocity;
                }
            }
        }
        Command::SpawnEnemy { position, speed } => {
            if world.is_playing() {
                world.spawn_enemy(position, speed, out_events);
            }
        }
        Command::FireBullet { angle } => {
            if world.is_playing() {
                world.fire_bullet(angle, out_events);
            }
        }
        Command::ResolveBulletHit { bullet, enemy } => {
            if world.is_playing() {
                world.resolve_bullet_hit(bullet, enemy, out_events);
            }
        }
        Command::DamagePlayer { amount } => {
            if world.is_playing() {
                world.damage_player(amount, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use scream_in_space_core::{
        Arena, BulletSnapshot, EnemySnapshot, EntityKind, GameOverSummary, HudSnapshot,
        PlayerSnapshot, QualityConfig, SessionPhase,
    };

    /// Current session phase.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Play area bounds.
    #[must_use]
    pub fn arena(world: &World) -> Arena {
        world.arena
    }

    /// Quality limits the pools are sized from.
    #[must_use]
    pub fn quality(world: &World) -> QualityConfig {
        world.quality
    }

    /// Play time since the session started, excluding pauses.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.session.elapsed
    }

    /// Number of ticks processed since the session started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Values shown on the heads-up display.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        HudSnapshot {
            score: world.session.score,
            kills: world.session.kills,
            health: world.session.health,
        }
    }

    /// Score and kills accumulated so far.
    #[must_use]
    pub fn summary(world: &World) -> GameOverSummary {
        world.session.summary()
    }

    /// Captures the player ship.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            velocity: world.player.velocity,
            aim: world.player.aim,
            health: world.session.health,
            invulnerable_until: world.session.invulnerable_until,
        }
    }

    /// Captures every live enemy ordered by handle.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter_active()
            .map(|(id, enemy)| EnemySnapshot {
                id,
                position: enemy.position,
                velocity: enemy.velocity,
                speed: enemy.speed,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures every live bullet ordered by handle.
    #[must_use]
    pub fn bullets(world: &World) -> Vec<BulletSnapshot> {
        let mut snapshots: Vec<BulletSnapshot> = world
            .bullets
            .iter_active()
            .map(|(id, bullet)| BulletSnapshot {
                id,
                position: bullet.position,
                velocity: bullet.velocity,
                lifespan: bullet.lifespan,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Occupancy of the pool backing `kind`.
    #[must_use]
    pub fn pool_usage(world: &World, kind: EntityKind) -> PoolUsage {
        match kind {
            EntityKind::Enemy => PoolUsage {
                active: world.enemies.active_len(),
                free: world.enemies.free_len(),
                capacity: world.enemies.max_size(),
            },
            EntityKind::Bullet => PoolUsage {
                active: world.bullets.active_len(),
                free: world.bullets.free_len(),
                capacity: world.bullets.max_size(),
            },
        }
    }

    /// Occupancy counters of an entity pool.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PoolUsage {
        /// Live entities.
        pub active: usize,
        /// Released entities ready for reuse.
        pub free: usize,
        /// Maximum number of live entities.
        pub capacity: usize,
    }
}

#[derive(Clone, Copy, Debug)]
struct SessionState {
    score: u32,
    kills: u32,
    health: u32,
    elapsed: Duration,
    invulnerable_until: Duration,
}

impl SessionState {
    fn summary(&self) -> GameOverSummary {
        GameOverSummary {
            score: self.score,
            kills: self.kills,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            kills: 0,
            health: PLAYER_MAX_HEALTH,
            elapsed: Duration::ZERO,
            invulnerable_until: Duration::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    aim: f32,
}

impl Player {
    fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            aim: 0.0,
        }
    }

    fn integrate(&mut self, seconds: f32, arena: &Arena) {
        self.velocity = Vec2::new(
            step_axis(self.velocity.x, self.acceleration.x, seconds),
            step_axis(self.velocity.y, self.acceleration.y, seconds),
        );
        let moved = self.position + self.velocity * seconds;
        let clamped = arena.clamp(moved);
        if clamped.x != moved.x {
            self.velocity.x = 0.0;
        }
        if clamped.y != moved.y {
            self.velocity.y = 0.0;
        }
        self.position = clamped;
    }
}

fn step_axis(velocity: f32, acceleration: f32, seconds: f32) -> f32 {
    let next = if acceleration == 0.0 {
        velocity * PLAYER_DRAG.powf(seconds)
    } else {
        velocity + acceleration * seconds
    };
    next.clamp(-PLAYER_MAX_VELOCITY, PLAYER_MAX_VELOCITY)
}

#[derive(Clone, Copy, Debug, Default)]
struct Enemy {
    position: Vec2,
    velocity: Vec2,
    speed: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct Bullet {
    position: Vec2,
    velocity: Vec2,
    lifespan: Duration,
}

fn release_checked<T>(pool: &mut EntityPool<T>, id: EntityId) {
    if let Err(error) = pool.release(id) {
        debug_assert!(false, "{error}");
        log::error!("{error}");
    }
}
