#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-rate monitoring with hysteresis between normal and low-performance
//! modes.

use std::time::Duration;

use scream_in_space_core::Signal;

/// Frame rate below which low-performance mode is entered.
pub const LOW_FPS_THRESHOLD: f32 = 45.0;
/// Frame rate above which low-performance mode is left.
pub const HIGH_FPS_THRESHOLD: f32 = 55.0;
/// Minimum time between two samples.
pub const CHECK_INTERVAL: Duration = Duration::from_millis(1_000);

const INITIAL_FPS: f32 = 60.0;
const INITIAL_FRAME_TIME_MS: f32 = 16.67;

/// Host-side frame statistics.
pub trait FrameClock {
    /// Frame rate the host currently achieves.
    fn actual_fps(&self) -> f32;

    /// Heap usage in bytes, when the host exposes it.
    fn memory_bytes(&self) -> Option<u64>;
}

/// Samples the host frame rate and flips between performance modes.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceMonitor {
    fps: f32,
    frame_time_ms: f32,
    memory_bytes: u64,
    low_perf: bool,
    last_check: Duration,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self {
            fps: INITIAL_FPS,
            frame_time_ms: INITIAL_FRAME_TIME_MS,
            memory_bytes: 0,
            low_perf: false,
            last_check: Duration::ZERO,
        }
    }
}

impl PerformanceMonitor {
    /// Creates a monitor assuming a healthy 60 fps host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples `clock` when [`CHECK_INTERVAL`] has passed since the last
    /// sample, returning a signal when the performance mode flips.
    pub fn update(&mut self, now: Duration, clock: &impl FrameClock) -> Option<Signal> {
        if now.saturating_sub(self.last_check) < CHECK_INTERVAL {
            return None;
        }
        self.last_check = now;

        self.fps = clock.actual_fps();
        self.frame_time_ms = if self.fps > 0.0 {
            1_000.0 / self.fps
        } else {
            f32::INFINITY
        };
        if let Some(bytes) = clock.memory_bytes() {
            self.memory_bytes = bytes;
        }

        if self.fps < LOW_FPS_THRESHOLD && !self.low_perf {
            self.low_perf = true;
            log::info!("entering low performance mode at {:.1} fps", self.fps);
            Some(Signal::PerfLow)
        } else if self.fps > HIGH_FPS_THRESHOLD && self.low_perf {
            self.low_perf = false;
            log::info!("leaving low performance mode at {:.1} fps", self.fps);
            Some(Signal::PerfHigh)
        } else {
            None
        }
    }

    /// Restores the initial readings.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether low-performance mode is active.
    #[must_use]
    pub fn is_low_perf(&self) -> bool {
        self.low_perf
    }

    /// Last sampled frame rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frame time derived from the last sample, in milliseconds.
    #[must_use]
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Last sampled heap usage in bytes.
    #[must_use]
    pub fn memory_bytes(&self) -> u64 {
        self.memory_bytes
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct FakeClock {
        fps: Cell<f32>,
        memory: Option<u64>,
    }

    impl FakeClock {
        fn new(fps: f32) -> Self {
            Self {
                fps: Cell::new(fps),
                memory: None,
            }
        }
    }

    impl FrameClock for FakeClock {
        fn actual_fps(&self) -> f32 {
            self.fps.get()
        }

        fn memory_bytes(&self) -> Option<u64> {
            self.memory
        }
    }

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn samples_only_after_the_check_interval() {
        let mut monitor = PerformanceMonitor::new();
        let clock = FakeClock::new(30.0);
        assert_eq!(monitor.update(Duration::from_millis(999), &clock), None);
        assert_eq!(monitor.fps(), 60.0);
        assert_eq!(monitor.update(secs(1), &clock), Some(Signal::PerfLow));
        assert!((monitor.frame_time_ms() - 33.333).abs() < 1e-2);
    }

    #[test]
    fn hysteresis_band_holds_the_current_mode() {
        let mut monitor = PerformanceMonitor::new();
        let clock = FakeClock::new(40.0);
        assert_eq!(monitor.update(secs(1), &clock), Some(Signal::PerfLow));

        clock.fps.set(50.0);
        assert_eq!(monitor.update(secs(2), &clock), None);
        assert!(monitor.is_low_perf());

        clock.fps.set(30.0);
        assert_eq!(monitor.update(secs(3), &clock), None);

        clock.fps.set(58.0);
        assert_eq!(monitor.update(secs(4), &clock), Some(Signal::PerfHigh));
        assert!(!monitor.is_low_perf());

        clock.fps.set(50.0);
        assert_eq!(monitor.update(secs(5), &clock), None);
        assert!(!monitor.is_low_perf());
    }

    #[test]
    fn boundary_values_do_not_flip() {
        let mut monitor = PerformanceMonitor::new();
        let clock = FakeClock::new(45.0);
        assert_eq!(monitor.update(secs(1), &clock), None);
    }

    #[test]
    fn memory_is_kept_when_the_host_stops_reporting() {
        let mut monitor = PerformanceMonitor::new();
        let mut clock = FakeClock::new(60.0);
        clock.memory = Some(4_096);
        let _ = monitor.update(secs(1), &clock);
        clock.memory = None;
        let _ = monitor.update(secs(2), &clock);
        assert_eq!(monitor.memory_bytes(), 4_096);
    }

    #[test]
    fn reset_restores_initial_readings() {
        let mut monitor = PerformanceMonitor::new();
        let _ = monitor.update(secs(1), &FakeClock::new(20.0));
        monitor.reset();
        assert_eq!(monitor, PerformanceMonitor::default());
        assert_eq!(monitor.memory_bytes(), 0);
    }
}
