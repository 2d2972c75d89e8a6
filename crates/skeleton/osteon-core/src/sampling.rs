//! Timeline sampling at an absolute time in seconds.
//!
//! Model:
//! - Before a timeline's first key the target keeps its setup value (`None`).
//! - Between keys the left key's curve eases the segment time.
//! - After the last key the last value holds.
//! - Attachment and draw-order keys are discrete: a key applies from its own time on.

use crate::data::animation::{AttachmentKey, DrawOrderKey, Keyframe};
use crate::math::{lerp, lerp_angle};
use crate::value::Color;

/// Locate `t` among sorted keys: `(left, right, eased)`; `right == left` on holds.
fn locate<T>(keys: &[Keyframe<T>], t: f32) -> Option<(usize, usize, f32)> {
    let after = keys.partition_point(|k| k.time <= t);
    if after == 0 {
        return None;
    }
    let left = after - 1;
    if after == keys.len() {
        return Some((left, left, 0.0));
    }
    let (t0, t1) = (keys[left].time, keys[after].time);
    let local = ((t - t0) / (t1 - t0).max(f32::EPSILON)).clamp(0.0, 1.0);
    Some((left, after, keys[left].curve.ease(local)))
}

/// Rotation in degrees, interpolated along the shortest arc.
pub fn sample_rotation(keys: &[Keyframe<f32>], t: f32) -> Option<f32> {
    let (l, r, e) = locate(keys, t)?;
    Some(lerp_angle(keys[l].value, keys[r].value, e))
}

pub fn sample_pair(keys: &[Keyframe<[f32; 2]>], t: f32) -> Option<[f32; 2]> {
    let (l, r, e) = locate(keys, t)?;
    let (a, b) = (keys[l].value, keys[r].value);
    Some([lerp(a[0], b[0], e), lerp(a[1], b[1], e)])
}

pub fn sample_color(keys: &[Keyframe<Color>], t: f32) -> Option<Color> {
    let (l, r, e) = locate(keys, t)?;
    Some(keys[l].value.lerp(&keys[r].value, e))
}

/// Attachment in effect at `t`; `Some(None)` means keyed to hidden.
pub fn attachment_at(keys: &[AttachmentKey], t: f32) -> Option<Option<&str>> {
    let after = keys.partition_point(|k| k.time <= t);
    if after == 0 {
        return None;
    }
    Some(keys[after - 1].attachment.as_deref())
}

pub fn draw_order_at(keys: &[DrawOrderKey], t: f32) -> Option<&DrawOrderKey> {
    let after = keys.partition_point(|k| k.time <= t);
    if after == 0 {
        return None;
    }
    keys.get(after - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::Curve;

    fn key<T>(time: f32, value: T) -> Keyframe<T> {
        Keyframe {
            time,
            value,
            curve: Curve::Linear,
        }
    }

    #[test]
    fn before_first_key_is_unset() {
        let keys = vec![key(0.5, 10.0), key(1.0, 20.0)];
        assert_eq!(sample_rotation(&keys, 0.25), None);
    }

    #[test]
    fn interpolates_and_holds_after_last_key() {
        let keys = vec![key(0.0, [0.0, 0.0]), key(1.0, [10.0, -4.0])];
        assert_eq!(sample_pair(&keys, 0.5), Some([5.0, -2.0]));
        assert_eq!(sample_pair(&keys, 3.0), Some([10.0, -4.0]));
        assert_eq!(sample_pair(&keys, 1.0), Some([10.0, -4.0]));
    }

    #[test]
    fn stepped_key_holds_until_next() {
        let mut keys = vec![key(0.0, 0.0), key(0.25, 15.0)];
        keys[0].curve = Curve::Stepped;
        assert_eq!(sample_rotation(&keys, 0.2), Some(0.0));
        assert_eq!(sample_rotation(&keys, 0.25), Some(15.0));
    }

    #[test]
    fn rotation_wraps_through_zero() {
        let keys = vec![key(0.0, 350.0), key(1.0, 10.0)];
        let mid = sample_rotation(&keys, 0.5).unwrap();
        assert!((mid - 360.0).abs() < 1e-4, "mid={mid}");
    }

    #[test]
    fn attachment_keys_are_discrete() {
        let keys = vec![
            AttachmentKey {
                time: 0.0,
                attachment: Some("open".into()),
            },
            AttachmentKey {
                time: 0.5,
                attachment: None,
            },
        ];
        assert_eq!(attachment_at(&keys, 0.49), Some(Some("open")));
        assert_eq!(attachment_at(&keys, 0.5), Some(None));
    }
}
