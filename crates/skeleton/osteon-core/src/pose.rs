//! Mutable per-instance skeleton state: bone transforms, slot attachments,
//! slot colors and draw order.
//!
//! Bones live in a flat arena in parent-before-child order, so one forward
//! pass computes every world transform after its parent's.

use crate::data::{Animation, SkeletonData};
use crate::math::{Affine2, LocalTransform};
use crate::sampling::{attachment_at, draw_order_at, sample_color, sample_pair, sample_rotation};
use crate::value::Color;

/// Runtime bone: current local transform and derived world transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    index: usize,
    name: String,
    parent: Option<usize>,
    pub(crate) local: LocalTransform,
    world: Affine2,
}

impl Bone {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    pub fn local(&self) -> &LocalTransform {
        &self.local
    }

    /// World transform as of the last update.
    pub fn world(&self) -> &Affine2 {
        &self.world
    }

    pub fn world_x(&self) -> f32 {
        self.world.x
    }

    pub fn world_y(&self) -> f32 {
        self.world.y
    }

    pub fn world_rotation(&self) -> f32 {
        self.world.rotation()
    }

    pub fn world_scale_x(&self) -> f32 {
        self.world.scale_x()
    }

    pub fn world_scale_y(&self) -> f32 {
        self.world.scale_y()
    }

    /// Map a point in this bone's space to skeleton space.
    pub fn local_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        self.world.transform_point(x, y)
    }
}

#[derive(Clone, Debug)]
pub struct Pose {
    bones: Vec<Bone>,
    attachments: Vec<Option<String>>,
    colors: Vec<Color>,
    draw_order: Vec<usize>,
    world_dirty: bool,
}

impl Pose {
    /// Setup pose with world transforms already computed.
    pub fn setup(data: &SkeletonData) -> Self {
        let bones = data
            .bones()
            .iter()
            .map(|b| Bone {
                index: b.index,
                name: b.name.clone(),
                parent: b.parent,
                local: b.setup,
                world: Affine2::IDENTITY,
            })
            .collect();
        let mut pose = Self {
            bones,
            attachments: data.slots().iter().map(|s| s.attachment.clone()).collect(),
            colors: data.slots().iter().map(|s| s.color).collect(),
            draw_order: (0..data.slots().len()).collect(),
            world_dirty: true,
        };
        pose.update_world_transforms();
        pose
    }

    /// Restore setup locals, slots and draw order. World transforms go stale
    /// until the next [`Pose::update_world_transforms`].
    pub fn reset_to_setup(&mut self, data: &SkeletonData) {
        for (bone, bd) in self.bones.iter_mut().zip(data.bones()) {
            bone.local = bd.setup;
        }
        for (slot, sd) in data.slots().iter().enumerate() {
            self.attachments[slot].clone_from(&sd.attachment);
            self.colors[slot] = sd.color;
        }
        for (i, d) in self.draw_order.iter_mut().enumerate() {
            *d = i;
        }
        self.world_dirty = true;
    }

    /// Single top-down pass: world = parent.world ∘ local.
    pub fn update_world_transforms(&mut self) {
        for i in 0..self.bones.len() {
            let local = self.bones[i].local.to_affine();
            let world = match self.bones[i].parent {
                Some(p) => self.bones[p].world.mul(&local),
                None => local,
            };
            self.bones[i].world = world;
        }
        self.world_dirty = false;
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    /// Setup pose plus `animation` sampled at `time`.
    pub fn apply_animation(&mut self, data: &SkeletonData, animation: &Animation, time: f32) {
        self.reset_to_setup(data);

        for timeline in &animation.bones {
            let setup = &data.bones()[timeline.bone].setup;
            let local = &mut self.bones[timeline.bone].local;
            if let Some(angle) = sample_rotation(&timeline.rotate, time) {
                local.rotation = setup.rotation + angle;
            }
            if let Some([x, y]) = sample_pair(&timeline.translate, time) {
                local.x = setup.x + x;
                local.y = setup.y + y;
            }
            if let Some([sx, sy]) = sample_pair(&timeline.scale, time) {
                local.scale_x = setup.scale_x * sx;
                local.scale_y = setup.scale_y * sy;
            }
        }

        for timeline in &animation.slots {
            if let Some(name) = attachment_at(&timeline.attachment, time) {
                self.attachments[timeline.slot] = name.map(str::to_string);
            }
            if let Some(color) = sample_color(&timeline.color, time) {
                self.colors[timeline.slot] = color;
            }
        }

        if let Some(key) = draw_order_at(&animation.draw_order, time) {
            if let Some(order) = &key.order {
                self.draw_order.copy_from_slice(order);
            }
        }
    }

    /// Replace bone locals with `lerp(from, current, alpha)`.
    pub fn blend_bones_from(&mut self, from: &[LocalTransform], alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        for (bone, start) in self.bones.iter_mut().zip(from) {
            bone.local = start.lerp(&bone.local, alpha);
        }
        self.world_dirty = true;
    }

    pub fn local_snapshot(&self) -> Vec<LocalTransform> {
        self.bones.iter().map(|b| b.local).collect()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Attachment name active in a slot before skin resolution.
    pub fn attachment(&self, slot: usize) -> Option<&str> {
        self.attachments.get(slot).and_then(|a| a.as_deref())
    }

    /// Animated slot color (setup color when unkeyed).
    pub fn color(&self, slot: usize) -> Color {
        self.colors.get(slot).copied().unwrap_or(Color::WHITE)
    }

    /// `draw_order()[i]` is the slot drawn at position `i`.
    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }
}
