//! Quality presets and the resource budgets they resolve to.

use serde::{Deserialize, Serialize};

/// User-selected preset controlling resource budgets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Smallest budgets, for low-end hosts.
    Low,
    /// Default budgets.
    #[default]
    Medium,
    /// Largest budgets.
    High,
}

impl QualityTier {
    /// Picks a starting tier from host capabilities.
    ///
    /// Mobile hosts and hosts reporting two or fewer hardware threads are
    /// treated as low-end.
    #[must_use]
    pub const fn detect(is_mobile: bool, hardware_concurrency: u32) -> Self {
        if is_mobile || hardware_concurrency <= 2 {
            Self::Low
        } else {
            Self::Medium
        }
    }
}

/// Particle emitter limits for a quality tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleBudget {
    /// Milliseconds between engine exhaust particles; lower is denser.
    pub engine_interval_ms: u32,
    /// Particles emitted per explosion.
    pub explosion: u32,
    /// Live engine particle cap in normal mode.
    pub engine_max: u32,
    /// Live engine particle cap in low-performance mode.
    pub engine_max_low_perf: u32,
}

impl ParticleBudget {
    /// Engine particle cap for the current performance mode.
    #[must_use]
    pub const fn engine_max_particles(&self, low_perf: bool) -> u32 {
        if low_perf {
            self.engine_max_low_perf
        } else {
            self.engine_max
        }
    }
}

/// Bundle of tunable limits resolved from a [`QualityTier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityConfig {
    /// Particle emitter limits.
    pub particles: ParticleBudget,
    /// Capacity of the enemy pool.
    pub enemy_max_count: usize,
    /// Capacity of the bullet pool.
    pub bullet_max_size: usize,
    /// Vision cone is resampled every this many frames.
    pub vision_update_rate: u32,
}

impl QualityConfig {
    /// Resolves the limits for `tier`.
    #[must_use]
    pub const fn resolve(tier: QualityTier) -> Self {
        match tier {
            QualityTier::Low => Self {
                particles: ParticleBudget {
                    engine_interval_ms: 60,
                    explosion: 12,
                    engine_max: 50,
                    engine_max_low_perf: 30,
                },
                enemy_max_count: 30,
                bullet_max_size: 20,
                vision_update_rate: 3,
            },
            QualityTier::Medium => Self {
                particles: ParticleBudget {
                    engine_interval_ms: 40,
                    explosion: 20,
                    engine_max: 50,
                    engine_max_low_perf: 30,
                },
                enemy_max_count: 50,
                bullet_max_size: 30,
                vision_update_rate: 2,
            },
            QualityTier::High => Self {
                particles: ParticleBudget {
                    engine_interval_ms: 25,
                    explosion: 32,
                    engine_max: 50,
                    engine_max_low_perf: 30,
                },
                enemy_max_count: 80,
                bullet_max_size: 40,
                vision_update_rate: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_caps_grow_with_quality() {
        assert_eq!(QualityConfig::resolve(QualityTier::Low).enemy_max_count, 30);
        assert_eq!(QualityConfig::resolve(QualityTier::Medium).enemy_max_count, 50);
        assert_eq!(QualityConfig::resolve(QualityTier::High).enemy_max_count, 80);
    }

    #[test]
    fn higher_quality_samples_vision_more_often() {
        assert_eq!(QualityConfig::resolve(QualityTier::Low).vision_update_rate, 3);
        assert_eq!(QualityConfig::resolve(QualityTier::High).vision_update_rate, 1);
        assert_eq!(
            QualityConfig::resolve(QualityTier::Low)
                .particles
                .engine_interval_ms,
            60
        );
        assert_eq!(
            QualityConfig::resolve(QualityTier::High)
                .particles
                .engine_interval_ms,
            25
        );
    }

    #[test]
    fn low_performance_mode_trims_engine_particles() {
        let budget = QualityConfig::resolve(QualityTier::Medium).particles;
        assert_eq!(budget.engine_max_particles(false), 50);
        assert_eq!(budget.engine_max_particles(true), 30);
    }

    #[test]
    fn low_end_hosts_start_on_low_quality() {
        assert_eq!(QualityTier::detect(true, 8), QualityTier::Low);
        assert_eq!(QualityTier::detect(false, 2), QualityTier::Low);
        assert_eq!(QualityTier::detect(false, 8), QualityTier::Medium);
    }
}
