//! Frame timing and the clocks that drive the frame loop.
//!
//! This module provides:
//! - [`Time`] - per-tick delta tracking with a time scale (1 = running, 0 = paused)
//! - [`FrameClock`] - source of elapsed time between ticks
//! - [`WallClock`] - real time, what [`EcsManager::process`](crate::EcsManager::process) uses
//! - [`FixedClock`] - constant step, for deterministic runs and tests
//!
//! # Examples
//!
//! ```
//! use bullet_purgatory::time::{FixedClock, FrameClock, Time};
//!
//! let mut time = Time::new();
//! let mut clock = FixedClock::new(60);
//!
//! time.pause();
//! let dt = time.advance(clock.elapsed());
//! assert_eq!(dt, 0.0);
//! assert!(time.raw_delta_seconds() > 0.0);
//! ```

use std::time::{Duration, Instant};

/// Time resource for tracking frame timing
#[derive(Clone, Debug)]
pub struct Time {
    /// Unscaled time since last tick
    raw_delta: f32,
    /// Scaled time since last tick
    delta: f32,
    /// Total scaled time
    elapsed: f64,
    /// Tick counter
    frame_count: u64,
    /// Time scale multiplier (1.0 = running, 0.0 = paused)
    time_scale: f32,
}

impl Time {
    pub fn new() -> Self {
        Self {
            raw_delta: 0.0,
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            time_scale: 1.0,
        }
    }

    /// Record a tick of `raw` seconds and return the scaled delta
    pub fn advance(&mut self, raw: f32) -> f32 {
        self.raw_delta = raw.max(0.0);
        self.delta = self.raw_delta * self.time_scale;
        self.elapsed += f64::from(self.delta);
        self.frame_count += 1;
        self.delta
    }

    /// Scaled delta of the last tick
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Unscaled delta of the last tick. Keeps flowing while paused.
    pub fn raw_delta_seconds(&self) -> f32 {
        self.raw_delta
    }

    /// Total scaled time
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Set time scale (1.0 = normal, 0.5 = half speed, 2.0 = double speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Pause time (set scale to 0)
    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    /// Resume time (set scale to 1)
    pub fn unpause(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of per-tick elapsed time
pub trait FrameClock {
    /// Seconds since the previous call
    fn elapsed(&mut self) -> f32;
}

/// Wall-clock time. The first tick reports zero.
#[derive(Debug, Default)]
pub struct WallClock {
    last: Option<Instant>,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameClock for WallClock {
    fn elapsed(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last = Some(now);
        dt
    }
}

/// Constant timestep clock
#[derive(Clone, Debug)]
pub struct FixedClock {
    step: f32,
}

impl FixedClock {
    /// Create with given frequency (Hz)
    pub fn new(hz: u32) -> Self {
        Self {
            step: 1.0 / hz.max(1) as f32,
        }
    }

    /// Create with explicit timestep duration
    pub fn from_duration(step: Duration) -> Self {
        Self {
            step: step.as_secs_f32(),
        }
    }

    pub fn from_seconds(step: f32) -> Self {
        Self { step }
    }

    pub fn step_seconds(&self) -> f32 {
        self.step
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(60) // 60 Hz default
    }
}

impl FrameClock for FixedClock {
    fn elapsed(&mut self) -> f32 {
        self.step
    }
}
