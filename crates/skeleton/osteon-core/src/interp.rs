//! Keyframe segment easing:
//! - Linear (default)
//! - Stepped (hold the left key until the next one)
//! - Bezier (cubic-bezier timing over the segment, then a linear blend)

use serde::{Deserialize, Serialize};

/// How a keyframe's value travels towards the next keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    #[default]
    Linear,
    Stepped,
    /// Control points `(x1, y1, x2, y2)` in the normalized segment domain.
    Bezier([f32; 4]),
}

impl Curve {
    /// Map normalized segment time `t` in `[0, 1]` to a blend factor.
    pub fn ease(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Curve::Linear => t,
            Curve::Stepped => 0.0,
            Curve::Bezier([x1, y1, x2, y2]) => bezier_ease_t(t, x1, y1, x2, y2),
        }
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x bezier by bisection, then evaluate y at the found parameter.
#[inline]
fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_holds_left_value() {
        assert_eq!(Curve::Stepped.ease(0.0), 0.0);
        assert_eq!(Curve::Stepped.ease(0.99), 0.0);
    }

    #[test]
    fn linear_bezier_matches_linear() {
        let c = Curve::Bezier([0.0, 0.0, 1.0, 1.0]);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((c.ease(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn ease_in_out_hits_endpoints_and_midpoint() {
        let c = Curve::Bezier([0.42, 0.0, 0.58, 1.0]);
        assert!(c.ease(0.0).abs() < 1e-4);
        assert!((c.ease(1.0) - 1.0).abs() < 1e-4);
        // Symmetric curve passes through the center.
        assert!((c.ease(0.5) - 0.5).abs() < 1e-3);
        // Slow start.
        assert!(c.ease(0.1) < 0.1);
    }
}
