//! Runtime configuration knobs.

use serde::{Deserialize, Serialize};

/// Default step granularity: two steps per frame of a 60 Hz host loop.
pub const DEFAULT_TIME_RESOLUTION: f32 = 1.0 / 120.0;

/// Playback configuration, mutable while the runtime is running.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seconds per frame step. Lower values give smoother slow motion.
    pub time_resolution: f32,
    /// Multiplier on elapsed time; negative plays in reverse.
    pub playback_speed: f32,
    /// Emit per-tick diagnostics through `log`. Never affects poses.
    pub debug_mode: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            time_resolution: DEFAULT_TIME_RESOLUTION,
            playback_speed: 1.0,
            debug_mode: false,
        }
    }
}

impl RuntimeConfig {
    pub fn with_time_resolution(mut self, seconds: f32) -> Self {
        if is_valid_resolution(seconds) {
            self.time_resolution = seconds;
        }
        self
    }

    pub fn with_playback_speed(mut self, speed: f32) -> Self {
        if speed.is_finite() {
            self.playback_speed = speed;
        }
        self
    }
}

#[inline]
pub(crate) fn is_valid_resolution(seconds: f32) -> bool {
    seconds.is_finite() && seconds > 0.0
}
