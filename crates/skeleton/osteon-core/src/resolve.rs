//! Per-slot resolution: skin -> partial -> texture -> color.
//!
//! Each layer is a small function over the previous layer's output, so the
//! order is explicit and every step can be checked on its own.

use serde::{Deserialize, Serialize};

use crate::data::SkeletonData;
use crate::math::LocalTransform;
use crate::overrides::{ColorOverrides, SlotTint, TextureOverrides};
use crate::pose::Pose;
use crate::skin::SkinResolver;
use crate::value::Color;

/// The override state a slot is resolved against.
#[derive(Clone, Copy, Debug)]
pub struct SlotLayers<'a> {
    pub skins: &'a SkinResolver,
    pub textures: &'a TextureOverrides,
    pub colors: &'a ColorOverrides,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAttachment {
    pub name: String,
    /// Region to render, after texture substitution.
    pub region: String,
    pub offset: LocalTransform,
    pub width: f32,
    pub height: f32,
    /// Chosen by a partial skin override rather than the active attachment.
    pub from_partial: bool,
    /// `region` comes from a texture override.
    pub texture_override: bool,
}

/// Everything a host needs to draw one slot this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotPose {
    pub slot: usize,
    pub name: String,
    pub bone: usize,
    /// Position in the current draw order.
    pub draw_index: usize,
    pub attachment: Option<ResolvedAttachment>,
    /// Setup or animated slot color.
    pub color: Color,
    pub tint: SlotTint,
}

impl SlotPose {
    /// Slot color with the tint applied.
    pub fn final_color(&self) -> Color {
        self.tint.apply(&self.color)
    }
}

fn skin_layer(data: &SkeletonData, pose: &Pose, skins: &SkinResolver, slot: usize) -> Option<ResolvedAttachment> {
    let name = pose.attachment(slot)?;
    let att = skins.skin_attachment(data, slot, name)?;
    Some(ResolvedAttachment {
        name: att.name.clone(),
        region: att.region.clone(),
        offset: att.offset,
        width: att.width,
        height: att.height,
        from_partial: false,
        texture_override: false,
    })
}

fn partial_layer(
    data: &SkeletonData,
    skins: &SkinResolver,
    slot: usize,
    below: Option<ResolvedAttachment>,
) -> Option<ResolvedAttachment> {
    let Some(name) = skins.partial(slot) else {
        return below;
    };
    match skins.partial_attachment(data, slot, name) {
        Some(att) => Some(ResolvedAttachment {
            name: att.name.clone(),
            region: att.region.clone(),
            offset: att.offset,
            width: att.width,
            height: att.height,
            from_partial: true,
            texture_override: false,
        }),
        None => below,
    }
}

fn texture_layer(textures: &TextureOverrides, below: Option<ResolvedAttachment>) -> Option<ResolvedAttachment> {
    below.map(|mut att| {
        if let Some(region) = textures.region_for(&att.name) {
            att.region = region.to_string();
            att.texture_override = true;
        }
        att
    })
}

fn color_layer(colors: &ColorOverrides, slot: usize) -> SlotTint {
    colors.get(slot)
}

/// Compose the four layers for one slot.
pub fn resolve_slot(
    data: &SkeletonData,
    pose: &Pose,
    layers: &SlotLayers<'_>,
    slot: usize,
    draw_index: usize,
) -> SlotPose {
    let skinned = skin_layer(data, pose, layers.skins, slot);
    let partial = partial_layer(data, layers.skins, slot, skinned);
    let attachment = texture_layer(layers.textures, partial);
    let (name, bone) = data
        .slots()
        .get(slot)
        .map(|s| (s.name.clone(), s.bone))
        .unwrap_or_default();
    SlotPose {
        slot,
        name,
        bone,
        draw_index,
        attachment,
        color: pose.color(slot),
        tint: color_layer(layers.colors, slot),
    }
}

/// Every slot, in current draw order.
pub fn resolve_slots(data: &SkeletonData, pose: &Pose, layers: &SlotLayers<'_>) -> Vec<SlotPose> {
    pose.draw_order()
        .iter()
        .enumerate()
        .map(|(draw_index, &slot)| resolve_slot(data, pose, layers, slot, draw_index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{AtlasRegion, TextureAtlas};
    use serde_json::json;
    use std::sync::Arc;

    fn data() -> SkeletonData {
        let atlas = ["arm", "arm-armor", "glove", "gold"]
            .into_iter()
            .fold(TextureAtlas::new(), |atlas, r| {
                atlas.with_region(AtlasRegion::new(r, "page.png"))
            });
        let doc = json!({
            "bones": [{"name": "root"}],
            "slots": [
                {"name": "arm", "bone": "root", "attachment": "arm"},
                {"name": "empty", "bone": "root"}
            ],
            "skins": {
                "default": {"arm": {"arm": {"width": 4, "height": 8}, "glove": {}}},
                "armor": {"arm": {"arm": {"path": "arm-armor"}}}
            }
        });
        SkeletonData::from_json(&doc.to_string(), Arc::new(atlas)).unwrap()
    }

    #[test]
    fn layers_apply_in_order() {
        let data = data();
        let pose = Pose::setup(&data);
        let mut skins = SkinResolver::new(Some("armor".into()));
        let mut textures = TextureOverrides::new();
        let mut colors = ColorOverrides::new();

        let base = skin_layer(&data, &pose, &skins, 0).unwrap();
        assert_eq!(base.region, "arm-armor");

        skins.change_partial(&data, [("arm", "glove")]).unwrap();
        let partial = partial_layer(&data, &skins, 0, Some(base)).unwrap();
        assert_eq!(partial.name, "glove");
        assert!(partial.from_partial);

        textures.change(data.atlas(), [("glove", "gold")]).unwrap();
        colors.colorize_all(2, SlotTint::new(Color::BLACK, 0.5));
        let layers = SlotLayers {
            skins: &skins,
            textures: &textures,
            colors: &colors,
        };
        let slot = resolve_slot(&data, &pose, &layers, 0, 0);
        let att = slot.attachment.unwrap();
        assert_eq!(att.name, "glove");
        assert_eq!(att.region, "gold");
        assert!(att.texture_override);
        assert_eq!(slot.tint.intensity, 0.5);
    }

    #[test]
    fn texture_override_keeps_attachment_choice() {
        let data = data();
        let pose = Pose::setup(&data);
        let skins = SkinResolver::new(Some("default".into()));
        let mut textures = TextureOverrides::new();
        textures.change(data.atlas(), [("arm", "gold")]).unwrap();
        let att = texture_layer(&textures, skin_layer(&data, &pose, &skins, 0)).unwrap();
        assert_eq!(att.name, "arm");
        assert_eq!(att.region, "gold");
        assert_eq!(att.width, 4.0);
    }

    #[test]
    fn empty_slot_resolves_to_nothing_with_neutral_tint() {
        let data = data();
        let pose = Pose::setup(&data);
        let skins = SkinResolver::new(Some("default".into()));
        let textures = TextureOverrides::new();
        let colors = ColorOverrides::new();
        let layers = SlotLayers {
            skins: &skins,
            textures: &textures,
            colors: &colors,
        };
        let all = resolve_slots(&data, &pose, &layers);
        assert_eq!(all.len(), 2);
        assert!(all[1].attachment.is_none());
        assert_eq!(all[1].tint, SlotTint::NEUTRAL);
        assert_eq!(all[1].final_color(), Color::WHITE);
    }
}
