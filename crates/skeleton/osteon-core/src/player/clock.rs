//! Quantized time accumulation.
//!
//! Elapsed time collects in a buffer and leaves it in whole signed steps of
//! the configured resolution; the remainder carries to the next tick.

/// Fraction of a step forgiven to absorb float noise.
const STEP_EPS: f64 = 1e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    buffer: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` seconds (may be negative) and return the whole steps consumed.
    pub fn advance(&mut self, delta: f32, resolution: f32) -> i64 {
        if !delta.is_finite() || !resolution.is_finite() || resolution <= 0.0 {
            return 0;
        }
        let resolution = resolution as f64;
        self.buffer += delta as f64;
        let ratio = self.buffer / resolution;
        let steps = (ratio + STEP_EPS.copysign(ratio)).trunc();
        self.buffer -= steps * resolution;
        steps as i64
    }

    /// Unconsumed time in seconds.
    pub fn pending(&self) -> f64 {
        self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer = 0.0;
    }
}
