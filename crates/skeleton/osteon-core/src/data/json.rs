//! Skeleton document loader (Spine 2.x style JSON).
//!
//! Raw serde shapes are converted into the canonical model in `data/mod.rs`.
//! All structural checks happen here so playback never re-validates:
//! - bones are declared parent-before-child (rules out cycles)
//! - slot, skin and timeline references resolve
//! - every skin attachment's region exists in the atlas
//! - keyframe times are finite, non-negative and non-decreasing
//! - draw order offsets produce a permutation of the slots

use std::sync::Arc;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::atlas::TextureAtlas;
use crate::data::animation::{
    Animation, AttachmentKey, BoneTimeline, DrawOrderKey, Keyframe, SlotTimeline,
};
use crate::data::{AttachmentData, BoneData, SkeletonData, SkinData, SlotData};
use crate::error::LoadError;
use crate::interp::Curve;
use crate::math::LocalTransform;
use crate::value::Color;

fn one() -> f32 {
    1.0
}

#[derive(Debug, Default, Deserialize)]
struct RawHeader {
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    spine: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBone {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    length: f32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "one", rename = "scaleX")]
    scale_x: f32,
    #[serde(default = "one", rename = "scaleY")]
    scale_y: f32,
}

#[derive(Debug, Deserialize)]
struct RawSlot {
    name: String,
    bone: String,
    #[serde(default)]
    attachment: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAttachment {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "one", rename = "scaleX")]
    scale_x: f32,
    #[serde(default = "one", rename = "scaleY")]
    scale_y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCurve {
    Named(String),
    Bezier([f32; 4]),
}

#[derive(Debug, Deserialize)]
struct RawRotateKey {
    #[serde(default)]
    time: f32,
    #[serde(default)]
    angle: f32,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Deserialize)]
struct RawTranslateKey {
    #[serde(default)]
    time: f32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Deserialize)]
struct RawScaleKey {
    #[serde(default)]
    time: f32,
    #[serde(default = "one")]
    x: f32,
    #[serde(default = "one")]
    y: f32,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBoneTimelines {
    #[serde(default)]
    rotate: Option<Vec<RawRotateKey>>,
    #[serde(default)]
    translate: Option<Vec<RawTranslateKey>>,
    #[serde(default)]
    scale: Option<Vec<RawScaleKey>>,
}

#[derive(Debug, Deserialize)]
struct RawAttachmentKey {
    #[serde(default)]
    time: f32,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawColorKey {
    #[serde(default)]
    time: f32,
    color: String,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSlotTimelines {
    #[serde(default)]
    attachment: Option<Vec<RawAttachmentKey>>,
    #[serde(default)]
    color: Option<Vec<RawColorKey>>,
}

#[derive(Debug, Deserialize)]
struct RawOffset {
    slot: String,
    offset: i64,
}

#[derive(Debug, Deserialize)]
struct RawDrawOrderKey {
    #[serde(default)]
    time: f32,
    #[serde(default)]
    offsets: Option<Vec<RawOffset>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnimation {
    #[serde(default)]
    bones: HashMap<String, RawBoneTimelines>,
    #[serde(default)]
    slots: HashMap<String, RawSlotTimelines>,
    #[serde(default, rename = "drawOrder", alias = "draworder")]
    draw_order: Option<Vec<RawDrawOrderKey>>,
}

type RawSkin = HashMap<String, HashMap<String, RawAttachment>>;

#[derive(Debug, Deserialize)]
struct RawSkeleton {
    #[serde(default)]
    skeleton: RawHeader,
    #[serde(default)]
    bones: Vec<RawBone>,
    #[serde(default)]
    slots: Vec<RawSlot>,
    #[serde(default)]
    skins: HashMap<String, RawSkin>,
    #[serde(default)]
    animations: HashMap<String, RawAnimation>,
}

/// Parse a skeleton document and validate it against `atlas`.
pub fn parse_skeleton(document: &str, atlas: Arc<TextureAtlas>) -> Result<SkeletonData, LoadError> {
    let raw: RawSkeleton = serde_json::from_str(document)?;

    let (bones, bone_lookup) = convert_bones(raw.bones)?;
    let (slots, slot_lookup) = convert_slots(raw.slots, &bone_lookup)?;

    let mut skins = HashMap::with_capacity(raw.skins.len());
    for (name, raw_skin) in raw.skins {
        let skin = convert_skin(&name, raw_skin, &slot_lookup, &atlas)?;
        skins.insert(name, skin);
    }

    for slot in &slots {
        if let Some(att) = &slot.attachment {
            if !skins.values().any(|s: &SkinData| s.attachment(slot.index, att).is_some()) {
                log::warn!(
                    "slot '{}' setup attachment '{}' is not defined by any skin",
                    slot.name,
                    att
                );
            }
        }
    }

    let mut animations = HashMap::with_capacity(raw.animations.len());
    for (name, raw_anim) in raw.animations {
        let anim = convert_animation(&name, raw_anim, &bone_lookup, &slot_lookup, slots.len())?;
        animations.insert(name, anim);
    }

    log::debug!(
        "loaded skeleton (spine {:?}, hash {:?}): {} bones, {} slots, {} skins, {} animations",
        raw.skeleton.spine,
        raw.skeleton.hash,
        bones.len(),
        slots.len(),
        skins.len(),
        animations.len()
    );

    Ok(SkeletonData {
        bones,
        slots,
        skins,
        animations,
        width: raw.skeleton.width,
        height: raw.skeleton.height,
        atlas,
        bone_lookup,
        slot_lookup,
    })
}

fn convert_bones(
    raw: Vec<RawBone>,
) -> Result<(Vec<BoneData>, HashMap<String, usize>), LoadError> {
    let declared: Vec<String> = raw.iter().map(|b| b.name.clone()).collect();
    let mut lookup: HashMap<String, usize> = HashMap::with_capacity(raw.len());
    let mut bones = Vec::with_capacity(raw.len());

    for (index, rb) in raw.into_iter().enumerate() {
        if lookup.contains_key(&rb.name) {
            return Err(LoadError::DuplicateName {
                kind: "bone".into(),
                name: rb.name,
            });
        }
        let parent = match rb.parent {
            None => None,
            Some(parent_name) => match lookup.get(&parent_name) {
                Some(&p) => Some(p),
                None if declared.contains(&parent_name) => {
                    return Err(LoadError::BoneOrder {
                        bone: rb.name,
                        parent: parent_name,
                    })
                }
                None => {
                    return Err(LoadError::UnknownBone {
                        name: parent_name,
                        referenced_by: format!("bone '{}'", rb.name),
                    })
                }
            },
        };
        lookup.insert(rb.name.clone(), index);
        bones.push(BoneData {
            index,
            name: rb.name,
            parent,
            length: rb.length,
            setup: LocalTransform {
                x: rb.x,
                y: rb.y,
                rotation: rb.rotation,
                scale_x: rb.scale_x,
                scale_y: rb.scale_y,
            },
        });
    }
    Ok((bones, lookup))
}

fn convert_slots(
    raw: Vec<RawSlot>,
    bone_lookup: &HashMap<String, usize>,
) -> Result<(Vec<SlotData>, HashMap<String, usize>), LoadError> {
    let mut lookup: HashMap<String, usize> = HashMap::with_capacity(raw.len());
    let mut slots = Vec::with_capacity(raw.len());
    for (index, rs) in raw.into_iter().enumerate() {
        if lookup.contains_key(&rs.name) {
            return Err(LoadError::DuplicateName {
                kind: "slot".into(),
                name: rs.name,
            });
        }
        let bone = *bone_lookup
            .get(&rs.bone)
            .ok_or_else(|| LoadError::UnknownBone {
                name: rs.bone.clone(),
                referenced_by: format!("slot '{}'", rs.name),
            })?;
        let color = match rs.color.as_deref() {
            None => Color::WHITE,
            Some(hex) => parse_color(hex, &format!("slot '{}'", rs.name))?,
        };
        lookup.insert(rs.name.clone(), index);
        slots.push(SlotData {
            index,
            name: rs.name,
            bone,
            attachment: rs.attachment,
            color,
        });
    }
    Ok((slots, lookup))
}

fn convert_skin(
    name: &str,
    raw: RawSkin,
    slot_lookup: &HashMap<String, usize>,
    atlas: &TextureAtlas,
) -> Result<SkinData, LoadError> {
    let mut skin = SkinData::new(name);
    for (slot_name, attachments) in raw {
        let slot = *slot_lookup
            .get(&slot_name)
            .ok_or_else(|| LoadError::UnknownSlot {
                name: slot_name.clone(),
                referenced_by: format!("skin '{name}'"),
            })?;
        for (key, ra) in attachments {
            match ra.kind.as_deref() {
                None | Some("region") => {}
                Some(other) => {
                    log::debug!("skin '{name}': skipping {other} attachment '{key}'");
                    continue;
                }
            }
            let region = ra.path.or(ra.name).unwrap_or_else(|| key.clone());
            if !atlas.contains(&region) {
                return Err(LoadError::MissingRegion {
                    attachment: key,
                    region,
                });
            }
            skin.insert(
                slot,
                AttachmentData {
                    name: key,
                    region,
                    offset: LocalTransform {
                        x: ra.x,
                        y: ra.y,
                        rotation: ra.rotation,
                        scale_x: ra.scale_x,
                        scale_y: ra.scale_y,
                    },
                    width: ra.width,
                    height: ra.height,
                },
            );
        }
    }
    Ok(skin)
}

fn convert_curve(raw: Option<RawCurve>, timeline: &str) -> Result<Curve, LoadError> {
    match raw {
        None => Ok(Curve::Linear),
        Some(RawCurve::Named(name)) => match name.as_str() {
            "linear" => Ok(Curve::Linear),
            "stepped" => Ok(Curve::Stepped),
            other => Err(LoadError::InvalidKeyframes {
                timeline: timeline.to_string(),
                reason: format!("unknown curve '{other}'"),
            }),
        },
        Some(RawCurve::Bezier(points)) => {
            if points.iter().all(|p| p.is_finite()) {
                Ok(Curve::Bezier(points))
            } else {
                Err(LoadError::InvalidKeyframes {
                    timeline: timeline.to_string(),
                    reason: "non-finite bezier control point".into(),
                })
            }
        }
    }
}

fn parse_color(hex: &str, owner: &str) -> Result<Color, LoadError> {
    Color::from_hex(hex).ok_or_else(|| LoadError::Parse {
        reason: format!("invalid color '{hex}' in {owner}"),
    })
}

/// A timeline that is present must carry at least one key.
fn timeline_keys<K>(keys: Option<Vec<K>>, timeline: &str) -> Result<Vec<K>, LoadError> {
    match keys {
        Some(keys) if keys.is_empty() => Err(LoadError::InvalidKeyframes {
            timeline: timeline.to_string(),
            reason: "timeline has no keys".to_string(),
        }),
        keys => Ok(keys.unwrap_or_default()),
    }
}

/// Times must be finite, non-negative and non-decreasing.
fn check_times(times: impl Iterator<Item = f32>, timeline: &str) -> Result<f32, LoadError> {
    let mut last = 0.0f32;
    for t in times {
        if !t.is_finite() || t < 0.0 {
            return Err(LoadError::InvalidKeyframes {
                timeline: timeline.to_string(),
                reason: format!("key time {t} must be finite and >= 0"),
            });
        }
        if t < last {
            return Err(LoadError::InvalidKeyframes {
                timeline: timeline.to_string(),
                reason: format!("key time {t} precedes {last}"),
            });
        }
        last = t;
    }
    Ok(last)
}

fn convert_animation(
    name: &str,
    raw: RawAnimation,
    bone_lookup: &HashMap<String, usize>,
    slot_lookup: &HashMap<String, usize>,
    slot_count: usize,
) -> Result<Animation, LoadError> {
    let mut duration = 0.0f32;

    let mut bones = Vec::with_capacity(raw.bones.len());
    for (bone_name, rt) in raw.bones {
        let bone = *bone_lookup
            .get(&bone_name)
            .ok_or_else(|| LoadError::UnknownBone {
                name: bone_name.clone(),
                referenced_by: format!("animation '{name}'"),
            })?;
        let path = format!("{name}/bones/{bone_name}");
        let mut timeline = BoneTimeline {
            bone,
            ..BoneTimeline::default()
        };

        let label = format!("{path}/rotate");
        let keys = timeline_keys(rt.rotate, &label)?;
        duration = duration.max(check_times(keys.iter().map(|k| k.time), &label)?);
        for k in keys {
            timeline.rotate.push(Keyframe {
                time: k.time,
                value: k.angle,
                curve: convert_curve(k.curve, &label)?,
            });
        }

        let label = format!("{path}/translate");
        let keys = timeline_keys(rt.translate, &label)?;
        duration = duration.max(check_times(keys.iter().map(|k| k.time), &label)?);
        for k in keys {
            timeline.translate.push(Keyframe {
                time: k.time,
                value: [k.x, k.y],
                curve: convert_curve(k.curve, &label)?,
            });
        }

        let label = format!("{path}/scale");
        let keys = timeline_keys(rt.scale, &label)?;
        duration = duration.max(check_times(keys.iter().map(|k| k.time), &label)?);
        for k in keys {
            timeline.scale.push(Keyframe {
                time: k.time,
                value: [k.x, k.y],
                curve: convert_curve(k.curve, &label)?,
            });
        }

        if !(timeline.rotate.is_empty() && timeline.translate.is_empty() && timeline.scale.is_empty())
        {
            bones.push(timeline);
        }
    }
    bones.sort_by_key(|t| t.bone);

    let mut slots = Vec::with_capacity(raw.slots.len());
    for (slot_name, rt) in raw.slots {
        let slot = *slot_lookup
            .get(&slot_name)
            .ok_or_else(|| LoadError::UnknownSlot {
                name: slot_name.clone(),
                referenced_by: format!("animation '{name}'"),
            })?;
        let path = format!("{name}/slots/{slot_name}");
        let mut timeline = SlotTimeline {
            slot,
            ..SlotTimeline::default()
        };

        let label = format!("{path}/attachment");
        let keys = timeline_keys(rt.attachment, &label)?;
        duration = duration.max(check_times(keys.iter().map(|k| k.time), &label)?);
        timeline.attachment = keys
            .into_iter()
            .map(|k| AttachmentKey {
                time: k.time,
                attachment: k.name,
            })
            .collect();

        let label = format!("{path}/color");
        let keys = timeline_keys(rt.color, &label)?;
        duration = duration.max(check_times(keys.iter().map(|k| k.time), &label)?);
        for k in keys {
            timeline.color.push(Keyframe {
                time: k.time,
                value: parse_color(&k.color, &label)?,
                curve: convert_curve(k.curve, &label)?,
            });
        }

        if !(timeline.attachment.is_empty() && timeline.color.is_empty()) {
            slots.push(timeline);
        }
    }
    slots.sort_by_key(|t| t.slot);

    let label = format!("{name}/drawOrder");
    let keys = timeline_keys(raw.draw_order, &label)?;
    duration = duration.max(check_times(keys.iter().map(|k| k.time), &label)?);
    let mut draw_order = Vec::with_capacity(keys.len());
    for key in keys {
        let order = match key.offsets {
            None => None,
            Some(offsets) => Some(resolve_offsets(name, &offsets, slot_lookup, slot_count)?),
        };
        draw_order.push(DrawOrderKey {
            time: key.time,
            order,
        });
    }

    Ok(Animation {
        name: name.to_string(),
        duration,
        bones,
        slots,
        draw_order,
    })
}

/// Expand sparse draw-order offsets into a full permutation: moved slots land at
/// `index + offset`, untouched slots fill the remaining positions in setup order.
fn resolve_offsets(
    animation: &str,
    offsets: &[RawOffset],
    slot_lookup: &HashMap<String, usize>,
    slot_count: usize,
) -> Result<Vec<usize>, LoadError> {
    let invalid = |reason: String| LoadError::InvalidDrawOrder {
        animation: animation.to_string(),
        reason,
    };

    let mut order: Vec<Option<usize>> = vec![None; slot_count];
    let mut unchanged: Vec<usize> = Vec::with_capacity(slot_count);
    let mut original = 0usize;

    for off in offsets {
        let slot = *slot_lookup
            .get(&off.slot)
            .ok_or_else(|| LoadError::UnknownSlot {
                name: off.slot.clone(),
                referenced_by: format!("animation '{animation}' draw order"),
            })?;
        if slot < original {
            return Err(invalid(format!(
                "offsets must be listed in slot order ('{}' out of order)",
                off.slot
            )));
        }
        while original != slot {
            unchanged.push(original);
            original += 1;
        }
        let target = original as i64 + off.offset;
        if target < 0 || target >= slot_count as i64 {
            return Err(invalid(format!(
                "slot '{}' offset {} moves outside the draw order",
                off.slot, off.offset
            )));
        }
        let target = target as usize;
        if order[target].is_some() {
            return Err(invalid(format!(
                "slot '{}' collides at draw position {target}",
                off.slot
            )));
        }
        order[target] = Some(original);
        original += 1;
    }
    while original < slot_count {
        unchanged.push(original);
        original += 1;
    }
    for position in (0..slot_count).rev() {
        if order[position].is_none() {
            order[position] = unchanged.pop();
        }
    }

    order
        .into_iter()
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| invalid("offsets do not form a permutation".into()))
}
