//! Texture substitutions and slot tints, kept apart from skins and playback.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::atlas::TextureAtlas;
use crate::data::SkeletonData;
use crate::error::RuntimeError;
use crate::value::Color;

/// `attachment name -> atlas region` replacing the rendered texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureOverrides {
    regions: HashMap<String, String>,
}

impl TextureOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge substitutions; every target region must exist in `atlas`.
    pub fn change<I, A, R>(&mut self, atlas: &TextureAtlas, overrides: I) -> Result<(), RuntimeError>
    where
        I: IntoIterator<Item = (A, R)>,
        A: Into<String>,
        R: Into<String>,
    {
        let staged: Vec<(String, String)> = overrides
            .into_iter()
            .map(|(a, r)| (a.into(), r.into()))
            .collect();
        if let Some((_, region)) = staged.iter().find(|(_, r)| !atlas.contains(r)) {
            log::warn!("texture override names unknown region '{region}'");
            return Err(RuntimeError::UnknownRegion {
                name: region.clone(),
            });
        }
        self.regions.extend(staged);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.regions.clear();
    }

    pub fn region_for(&self, attachment: &str) -> Option<&str> {
        self.regions.get(attachment).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Tint color and how strongly it applies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotTint {
    pub color: Color,
    /// In `[0, 1]`.
    pub intensity: f32,
}

impl Default for SlotTint {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl SlotTint {
    pub const NEUTRAL: Self = Self {
        color: Color::WHITE,
        intensity: 1.0,
    };

    pub fn new(color: Color, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { color, intensity }
    }

    /// Blend `base` toward `base * color` by the intensity.
    pub fn apply(&self, base: &Color) -> Color {
        base.lerp(&base.modulate(&self.color), self.intensity)
    }

    pub fn is_neutral(&self) -> bool {
        self.color == Color::WHITE || self.intensity == 0.0
    }
}

/// Slot-indexed tints. Slots without an entry report [`SlotTint::NEUTRAL`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorOverrides {
    tints: HashMap<usize, SlotTint>,
}

impl ColorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colorize_all(&mut self, slot_count: usize, tint: SlotTint) {
        self.tints.extend((0..slot_count).map(|slot| (slot, tint)));
    }

    /// Tint the named slots; unknown names reject the whole call.
    pub fn colorize<I, S>(&mut self, data: &SkeletonData, slots: I, tint: SlotTint) -> Result<(), RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut staged = Vec::new();
        for name in slots {
            let name = name.as_ref();
            let slot = data.slot_index(name).ok_or_else(|| {
                log::warn!("colorize names unknown slot '{name}'");
                RuntimeError::UnknownSlot {
                    name: name.to_string(),
                }
            })?;
            staged.push(slot);
        }
        self.tints.extend(staged.into_iter().map(|slot| (slot, tint)));
        Ok(())
    }

    pub fn reset(&mut self) {
        self.tints.clear();
    }

    pub fn get(&self, slot: usize) -> SlotTint {
        self.tints.get(&slot).copied().unwrap_or(SlotTint::NEUTRAL)
    }

    /// Number of tracked overrides.
    pub fn len(&self) -> usize {
        self.tints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tints.is_empty()
    }
}
