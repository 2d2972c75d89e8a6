//! Skeleton model: bones, slots, skins and animations.
//!
//! Built once from a skeleton document plus an atlas and shared read-only
//! (behind an `Arc`) by every runtime that plays it.

pub mod animation;
pub mod json;

use std::sync::Arc;

use hashbrown::HashMap;

use crate::atlas::TextureAtlas;
use crate::error::LoadError;
use crate::math::LocalTransform;
use crate::value::Color;

pub use animation::{
    Animation, AttachmentKey, BoneTimeline, DrawOrderKey, Keyframe, SlotTimeline, TimelineKind,
    TimelineRef,
};

/// Name of the skin used as fallback for attachments the current skin lacks.
pub const DEFAULT_SKIN: &str = "default";

#[derive(Clone, Debug, PartialEq)]
pub struct BoneData {
    pub index: usize,
    pub name: String,
    /// Always lower than `index`: parents precede children.
    pub parent: Option<usize>,
    pub length: f32,
    pub setup: LocalTransform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlotData {
    pub index: usize,
    pub name: String,
    pub bone: usize,
    /// Attachment shown in the setup pose.
    pub attachment: Option<String>,
    pub color: Color,
}

/// A textured quad placed relative to its slot's bone.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentData {
    /// Key under which the skin stores this attachment.
    pub name: String,
    /// Atlas region rendered for this attachment.
    pub region: String,
    pub offset: LocalTransform,
    pub width: f32,
    pub height: f32,
}

/// Named mapping slot -> (attachment name -> attachment).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinData {
    pub name: String,
    attachments: HashMap<usize, HashMap<String, AttachmentData>>,
}

impl SkinData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: HashMap::new(),
        }
    }

    pub fn insert(&mut self, slot: usize, attachment: AttachmentData) {
        self.attachments
            .entry(slot)
            .or_default()
            .insert(attachment.name.clone(), attachment);
    }

    #[inline]
    pub fn attachment(&self, slot: usize, name: &str) -> Option<&AttachmentData> {
        self.attachments.get(&slot).and_then(|m| m.get(name))
    }

    /// Attachments this skin defines for a slot.
    pub fn slot_attachments(&self, slot: usize) -> impl Iterator<Item = &AttachmentData> {
        self.attachments.get(&slot).into_iter().flat_map(|m| m.values())
    }

    pub fn len(&self) -> usize {
        self.attachments.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable skeleton definition.
#[derive(Debug)]
pub struct SkeletonData {
    pub(crate) bones: Vec<BoneData>,
    pub(crate) slots: Vec<SlotData>,
    pub(crate) skins: HashMap<String, SkinData>,
    pub(crate) animations: HashMap<String, Animation>,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) atlas: Arc<TextureAtlas>,
    pub(crate) bone_lookup: HashMap<String, usize>,
    pub(crate) slot_lookup: HashMap<String, usize>,
}

impl SkeletonData {
    /// Parse and validate a skeleton document against an atlas.
    pub fn from_json(document: &str, atlas: Arc<TextureAtlas>) -> Result<Self, LoadError> {
        json::parse_skeleton(document, atlas)
    }

    /// Bones in parent-before-child order.
    pub fn bones(&self) -> &[BoneData] {
        &self.bones
    }

    /// Slots in setup draw order.
    pub fn slots(&self) -> &[SlotData] {
        &self.slots
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_lookup.get(name).copied()
    }

    pub fn find_bone(&self, name: &str) -> Option<&BoneData> {
        self.bone_index(name).map(|i| &self.bones[i])
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slot_lookup.get(name).copied()
    }

    pub fn find_slot(&self, name: &str) -> Option<&SlotData> {
        self.slot_index(name).map(|i| &self.slots[i])
    }

    pub fn skin(&self, name: &str) -> Option<&SkinData> {
        self.skins.get(name)
    }

    pub fn default_skin(&self) -> Option<&SkinData> {
        self.skins.get(DEFAULT_SKIN)
    }

    pub fn skins(&self) -> impl Iterator<Item = &SkinData> {
        self.skins.values()
    }

    /// Skin names, sorted for stable output.
    pub fn skin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.skins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// The full animation table.
    pub fn animations(&self) -> &HashMap<String, Animation> {
        &self.animations
    }

    /// Animation names, sorted for stable output.
    pub fn animation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Bounding width recorded in the document.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Bounding height recorded in the document.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }
}
