//! Animation timelines: bone transforms, slot attachments, slot colors and draw order.
//!
//! Every timeline is a time-sorted keyframe sequence, validated at load time.

use crate::interp::Curve;
use crate::value::Color;

/// The kind of state a timeline drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimelineKind {
    BoneTransform,
    SlotAttachment,
    SlotColor,
    DrawOrder,
}

/// A keyed value and the easing toward the next key.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
    pub curve: Curve,
}

/// Keys for one bone. Values are relative to the setup pose: rotation and
/// translation add, scale multiplies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneTimeline {
    pub bone: usize,
    pub rotate: Vec<Keyframe<f32>>,
    pub translate: Vec<Keyframe<[f32; 2]>>,
    pub scale: Vec<Keyframe<[f32; 2]>>,
}

/// Discrete attachment switch; `None` hides the slot.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentKey {
    pub time: f32,
    pub attachment: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotTimeline {
    pub slot: usize,
    pub attachment: Vec<AttachmentKey>,
    pub color: Vec<Keyframe<Color>>,
}

/// Draw order from this key on. `order[i]` is the slot drawn at position `i`;
/// `None` restores the setup order.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawOrderKey {
    pub time: f32,
    pub order: Option<Vec<usize>>,
}

/// Reference to one timeline inside an animation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimelineRef {
    pub kind: TimelineKind,
    /// Bone or slot index; `None` for the draw order timeline.
    pub target: Option<usize>,
}

/// A named set of timelines.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Time of the last key across all timelines, in seconds.
    pub duration: f32,
    pub bones: Vec<BoneTimeline>,
    pub slots: Vec<SlotTimeline>,
    pub draw_order: Vec<DrawOrderKey>,
}

impl Animation {
    /// Index of the last frame for a given step size.
    pub fn last_frame(&self, time_resolution: f32) -> i64 {
        if self.duration <= 0.0 || time_resolution <= 0.0 {
            return 0;
        }
        // Tolerate float noise so 1.0 / 0.25 stays 4 rather than 5.
        ((self.duration / time_resolution) - 1e-3).ceil().max(0.0) as i64
    }

    /// Timestamp of a frame, clamped to the animation length.
    pub fn time_for_frame(&self, frame: i64, time_resolution: f32) -> f32 {
        (frame.max(0) as f32 * time_resolution).min(self.duration)
    }

    /// Every timeline in this animation, tagged with its kind.
    pub fn timelines(&self) -> Vec<TimelineRef> {
        let mut out = Vec::new();
        for t in &self.bones {
            out.push(TimelineRef {
                kind: TimelineKind::BoneTransform,
                target: Some(t.bone),
            });
        }
        for t in &self.slots {
            if !t.attachment.is_empty() {
                out.push(TimelineRef {
                    kind: TimelineKind::SlotAttachment,
                    target: Some(t.slot),
                });
            }
            if !t.color.is_empty() {
                out.push(TimelineRef {
                    kind: TimelineKind::SlotColor,
                    target: Some(t.slot),
                });
            }
        }
        if !self.draw_order.is_empty() {
            out.push(TimelineRef {
                kind: TimelineKind::DrawOrder,
                target: None,
            });
        }
        out
    }

    pub fn timeline_count(&self, kind: TimelineKind) -> usize {
        self.timelines().iter().filter(|t| t.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim(duration: f32) -> Animation {
        Animation {
            name: "a".into(),
            duration,
            bones: Vec::new(),
            slots: Vec::new(),
            draw_order: Vec::new(),
        }
    }

    #[test]
    fn last_frame_rounds_partial_steps_up() {
        assert_eq!(anim(1.0).last_frame(0.25), 4);
        assert_eq!(anim(1.1).last_frame(0.25), 5);
        assert_eq!(anim(0.0).last_frame(0.25), 0);
        assert_eq!(anim(1.0).last_frame(1.0 / 120.0), 120);
    }

    #[test]
    fn frame_time_is_clamped_to_duration() {
        let a = anim(1.1);
        assert_eq!(a.time_for_frame(0, 0.25), 0.0);
        assert_eq!(a.time_for_frame(2, 0.25), 0.5);
        assert_eq!(a.time_for_frame(5, 0.25), 1.1);
        assert_eq!(a.time_for_frame(-3, 0.25), 0.0);
    }
}
