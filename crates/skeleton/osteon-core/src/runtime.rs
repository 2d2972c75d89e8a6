//! Host-facing runtime: one skeleton instance with its own pose, player and
//! override layers, sharing an immutable [`SkeletonData`].

use std::sync::Arc;

use crate::assets::{AssetProvider, AtlasSource};
use crate::config::{is_valid_resolution, RuntimeConfig};
use crate::data::{SkeletonData, DEFAULT_SKIN};
use crate::error::{LoadError, RuntimeError};
use crate::events::PlayerEvent;
use crate::overrides::{ColorOverrides, SlotTint, TextureOverrides};
use crate::player::{AnimationPlayer, PlayerState, QueueEntry, Repeat};
use crate::pose::{Bone, Pose};
use crate::resolve::{resolve_slots, SlotLayers, SlotPose};
use crate::skin::SkinResolver;
use crate::value::Color;

/// Mutable state of a loaded skeleton.
#[derive(Debug)]
struct Instance {
    data: Arc<SkeletonData>,
    pose: Pose,
    player: AnimationPlayer,
    skins: SkinResolver,
    textures: TextureOverrides,
    colors: ColorOverrides,
}

impl Instance {
    fn new(data: Arc<SkeletonData>, skin: Option<&str>) -> Result<Self, LoadError> {
        let current = match skin {
            Some(name) if data.skin(name).is_none() => {
                return Err(LoadError::UnknownSkin {
                    name: name.to_string(),
                })
            }
            Some(name) => Some(name.to_string()),
            None => data.default_skin().map(|_| DEFAULT_SKIN.to_string()),
        };
        Ok(Self {
            pose: Pose::setup(&data),
            player: AnimationPlayer::new(),
            skins: SkinResolver::new(current),
            textures: TextureOverrides::new(),
            colors: ColorOverrides::new(),
            data,
        })
    }

    fn refresh_world(&mut self) {
        if self.pose.is_world_dirty() {
            self.pose.update_world_transforms();
        }
    }
}

/// A skeleton runtime. Starts unconfigured until a load succeeds.
#[derive(Debug, Default)]
pub struct SkeletonRuntime {
    config: RuntimeConfig,
    instance: Option<Instance>,
}

impl SkeletonRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            instance: None,
        }
    }

    /// Runtime over an already loaded skeleton, which may be shared.
    pub fn from_data(
        data: Arc<SkeletonData>,
        skin: Option<&str>,
        config: RuntimeConfig,
    ) -> Result<Self, LoadError> {
        let mut runtime = Self::new(config);
        runtime.load_data(data, skin)?;
        Ok(runtime)
    }

    /// Resolve, parse and install a skeleton. On failure the runtime is left
    /// unconfigured.
    pub fn skeleton_from_file_named(
        &mut self,
        name: &str,
        atlas: impl Into<AtlasSource>,
        skin: Option<&str>,
        assets: &dyn AssetProvider,
    ) -> Result<(), LoadError> {
        self.instance = None;
        let document = assets
            .skeleton_document(name)
            .ok_or_else(|| LoadError::MissingSkeleton {
                name: name.to_string(),
            })?;
        let atlas = atlas.into().resolve(assets)?;
        let data = SkeletonData::from_json(&document, atlas).map_err(|err| {
            log::warn!("loading skeleton '{name}' failed ({}): {err}", err.category());
            err
        })?;
        self.load_data(Arc::new(data), skin)
    }

    /// Install a parsed skeleton, replacing any previous instance.
    pub fn load_data(&mut self, data: Arc<SkeletonData>, skin: Option<&str>) -> Result<(), LoadError> {
        self.instance = None;
        let instance = Instance::new(data, skin)?;
        log::debug!(
            "runtime configured: {} bones, skin {:?}",
            instance.pose.bones().len(),
            instance.skins.current()
        );
        self.instance = Some(instance);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.instance.is_some()
    }

    fn parts(&mut self) -> Result<(&RuntimeConfig, &mut Instance), RuntimeError> {
        match self.instance.as_mut() {
            Some(instance) => Ok((&self.config, instance)),
            None => {
                log::warn!("ignoring request: no skeleton loaded");
                Err(RuntimeError::NotLoaded)
            }
        }
    }

    // --- playback ---

    /// Play `name` immediately, `repeat` times.
    pub fn run_animation(&mut self, name: &str, repeat: impl Into<Repeat>) -> crate::Result<()> {
        self.run_animation_with(name, repeat, 0.0, false)
    }

    /// Play `name` now, or after the current animation when `use_queue` is set.
    /// `intro` seconds of blending lead in from the previous pose.
    pub fn run_animation_with(
        &mut self,
        name: &str,
        repeat: impl Into<Repeat>,
        intro: f32,
        use_queue: bool,
    ) -> crate::Result<()> {
        let entry = QueueEntry::new(name, repeat).with_intro(intro);
        let (cfg, inst) = self.parts()?;
        inst.player
            .run(&inst.data, &mut inst.pose, entry, use_queue, cfg)?;
        inst.refresh_world();
        Ok(())
    }

    /// Play each animation once, in order.
    pub fn run_animation_sequence<I, S>(&mut self, names: I, use_queue: bool) -> crate::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .map(|name| QueueEntry::new(name, Repeat::Times(1)))
            .collect();
        let (cfg, inst) = self.parts()?;
        inst.player
            .run_sequence(&inst.data, &mut inst.pose, entries, use_queue, cfg)?;
        inst.refresh_world();
        Ok(())
    }

    pub fn stop_animation(&mut self) {
        if let Some(inst) = self.instance.as_mut() {
            inst.player.stop();
        }
    }

    pub fn jump_to_frame(&mut self, frame: i64) -> crate::Result<()> {
        let (cfg, inst) = self.parts()?;
        inst.player.jump_to_frame(&inst.data, &mut inst.pose, frame, cfg);
        Ok(())
    }

    pub fn jump_to_next_frame(&mut self) -> crate::Result<()> {
        let (cfg, inst) = self.parts()?;
        inst.player.step_frames(&inst.data, &mut inst.pose, 1, cfg);
        Ok(())
    }

    pub fn jump_to_previous_frame(&mut self) -> crate::Result<()> {
        let (cfg, inst) = self.parts()?;
        inst.player.step_frames(&inst.data, &mut inst.pose, -1, cfg);
        Ok(())
    }

    /// Per-frame driver: advance by `dt` seconds and refresh world transforms.
    pub fn activate_animations(&mut self, dt: f32) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        inst.player.tick(&inst.data, &mut inst.pose, dt, &self.config);
        inst.refresh_world();
    }

    /// Restore the setup pose. Playback and the queue are untouched.
    pub fn reset_skeleton(&mut self) {
        if let Some(inst) = self.instance.as_mut() {
            inst.pose.reset_to_setup(&inst.data);
            inst.player.invalidate_pose();
        }
    }

    // --- skins and overrides ---

    pub fn change_skin_to(&mut self, name: &str) -> crate::Result<()> {
        let (_, inst) = self.parts()?;
        inst.skins.change_skin_to(&inst.data, name)
    }

    /// Force attachments onto slots (`slot name -> attachment name`).
    pub fn change_skin_partial<I, S, A>(&mut self, overrides: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = (S, A)>,
        S: AsRef<str>,
        A: AsRef<str>,
    {
        let (_, inst) = self.parts()?;
        inst.skins.change_partial(&inst.data, overrides)
    }

    pub fn reset_skin_partial(&mut self) {
        if let Some(inst) = self.instance.as_mut() {
            inst.skins.reset_partial();
        }
    }

    /// Render other regions for attachments (`attachment name -> region`).
    pub fn change_texture_partial<I, A, R>(&mut self, overrides: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = (A, R)>,
        A: Into<String>,
        R: Into<String>,
    {
        let (_, inst) = self.parts()?;
        inst.textures.change(inst.data.atlas(), overrides)
    }

    pub fn reset_texture_partial(&mut self) {
        if let Some(inst) = self.instance.as_mut() {
            inst.textures.reset();
        }
    }

    pub fn colorize_all_slots_with_color(&mut self, color: Color, intensity: f32) -> crate::Result<()> {
        let (_, inst) = self.parts()?;
        inst.colors
            .colorize_all(inst.data.slots().len(), SlotTint::new(color, intensity));
        Ok(())
    }

    pub fn colorize_slots<I, S>(&mut self, slots: I, color: Color, intensity: f32) -> crate::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (_, inst) = self.parts()?;
        inst.colors
            .colorize(&inst.data, slots, SlotTint::new(color, intensity))
    }

    pub fn reset_colorized_slots(&mut self) {
        if let Some(inst) = self.instance.as_mut() {
            inst.colors.reset();
        }
    }

    /// Tracked tint overrides.
    pub fn colorized_slot_count(&self) -> usize {
        self.instance.as_ref().map_or(0, |inst| inst.colors.len())
    }

    // --- queries ---

    /// Read-only view of a bone's current transforms.
    pub fn find_bone_named(&self, name: &str) -> Option<&Bone> {
        let inst = self.instance.as_ref()?;
        inst.data.bone_index(name).and_then(|i| inst.pose.bone(i))
    }

    pub fn is_running_animation(&self) -> bool {
        self.instance
            .as_ref()
            .is_some_and(|inst| inst.player.state().is_running())
    }

    pub fn current_animation(&self) -> Option<&str> {
        let inst = self.instance.as_ref()?;
        inst.player
            .state()
            .playback()
            .map(|pb| pb.animation.as_str())
    }

    /// Current animation followed by the queued ones.
    pub fn current_animation_sequence(&self) -> Vec<&str> {
        let Some(inst) = self.instance.as_ref() else {
            return Vec::new();
        };
        let current = inst
            .player
            .state()
            .playback()
            .filter(|_| inst.player.state().is_running())
            .map(|pb| pb.animation.as_str());
        current.into_iter().chain(inst.player.queue().names()).collect()
    }

    /// Play-throughs left for the current animation, including this one.
    pub fn animation_count(&self) -> Option<Repeat> {
        let inst = self.instance.as_ref()?;
        inst.player.state().playback().map(|pb| pb.remaining)
    }

    pub fn current_frame(&self) -> Option<i64> {
        self.instance.as_ref()?.player.current_frame()
    }

    pub fn bones(&self) -> &[Bone] {
        self.instance
            .as_ref()
            .map_or(&[][..], |inst| inst.pose.bones())
    }

    /// Resolved slots in draw order.
    pub fn skin_slots(&self) -> Vec<SlotPose> {
        let Some(inst) = self.instance.as_ref() else {
            return Vec::new();
        };
        let layers = SlotLayers {
            skins: &inst.skins,
            textures: &inst.textures,
            colors: &inst.colors,
        };
        resolve_slots(&inst.data, &inst.pose, &layers)
    }

    pub fn current_skin(&self) -> Option<&str> {
        self.instance.as_ref()?.skins.current()
    }

    /// `(width, height)` recorded in the skeleton document.
    pub fn skeleton_size(&self) -> Option<(f32, f32)> {
        let inst = self.instance.as_ref()?;
        Some((inst.data.width(), inst.data.height()))
    }

    pub fn data(&self) -> Option<&Arc<SkeletonData>> {
        self.instance.as_ref().map(|inst| &inst.data)
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.instance.as_ref().map(|inst| &inst.pose)
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        self.instance.as_ref().map(|inst| inst.player.state())
    }

    /// Drain pending events. Each tick discards what the previous one exposed.
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.instance
            .as_mut()
            .map(|inst| inst.player.take_events())
            .unwrap_or_default()
    }

    // --- configuration ---

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Change the step size, keeping the current play time. Invalid values
    /// are rejected and `false` is returned.
    pub fn set_time_resolution(&mut self, seconds: f32) -> bool {
        if !is_valid_resolution(seconds) {
            log::warn!("rejecting time resolution {seconds}");
            return false;
        }
        let old = self.config.time_resolution;
        if let Some(inst) = self.instance.as_mut() {
            inst.player.rescale_frames(&inst.data, old, seconds);
        }
        self.config.time_resolution = seconds;
        true
    }

    pub fn set_playback_speed(&mut self, speed: f32) -> bool {
        if !speed.is_finite() {
            log::warn!("rejecting playback speed {speed}");
            return false;
        }
        self.config.playback_speed = speed;
        true
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.config.debug_mode = enabled;
    }
}
