//! Frame delta timer
//!
//! Converts raw animation-frame timestamps (milliseconds) into clamped
//! simulation steps. Frame callbacks can be delayed arbitrarily while the tab
//! is in the background, so the step is capped at `MAX_DELTA`.

use crate::consts::MAX_DELTA;

/// Per-frame time input (seconds). Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTick {
    /// Clamped step since the previous frame
    pub delta: f32,
    /// Normalized timestamp of this frame
    pub time: f64,
}

/// Clamp a raw step into `[0, MAX_DELTA]`. NaN maps to zero.
#[inline]
pub fn clamp_delta(delta: f32) -> f32 {
    if delta.is_nan() {
        return 0.0;
    }
    delta.clamp(0.0, MAX_DELTA)
}

/// Tracks the previous frame time
#[derive(Debug, Clone)]
pub struct DeltaTimer {
    prev_time: f64,
}

impl DeltaTimer {
    /// Start timing from a raw timestamp in milliseconds
    pub fn new(start_ms: f64) -> Self {
        Self {
            prev_time: start_ms * 0.001,
        }
    }

    /// Previous normalized time (seconds)
    pub fn prev_time(&self) -> f64 {
        self.prev_time
    }

    /// Consume a new raw timestamp and produce the clamped step
    pub fn advance(&mut self, now_ms: f64) -> FrameTick {
        let time = now_ms * 0.001;
        let delta = clamp_delta((time - self.prev_time) as f32);
        self.prev_time = time;
        FrameTick { delta, time }
    }
}
