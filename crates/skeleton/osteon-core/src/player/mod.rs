//! Animation player: the state machine that advances play time, applies the
//! current animation's timelines to a [`Pose`] and promotes queued entries.
//!
//! Methods:
//! - run / run_sequence (immediate or queued), stop
//! - jump_to_frame / step_frames (seek without touching queue or repeats)
//! - tick (clock → blend or playback → end-of-play-through handling)

pub mod clock;
pub mod queue;
pub mod state;

pub use clock::FrameClock;
pub use queue::{AnimationQueue, QueueEntry, Repeat};
pub use state::{IntroBlend, Playback, PlayerState, PlayerStateKind};

use crate::config::RuntimeConfig;
use crate::data::SkeletonData;
use crate::error::RuntimeError;
use crate::events::PlayerEvent;
use crate::pose::Pose;

fn ensure_known(data: &SkeletonData, name: &str) -> Result<(), RuntimeError> {
    if data.animation(name).is_some() {
        Ok(())
    } else {
        log::warn!("unknown animation '{name}'");
        Err(RuntimeError::UnknownAnimation {
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct AnimationPlayer {
    state: PlayerState,
    queue: AnimationQueue,
    clock: FrameClock,
    /// An animation pose has been evaluated since load or the last reset.
    has_pose: bool,
    events: Vec<PlayerEvent>,
    /// Events before this index were already visible after the previous tick.
    seen: usize,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn queue(&self) -> &AnimationQueue {
        &self.queue
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn current_frame(&self) -> Option<i64> {
        self.state.playback().map(|pb| pb.frame)
    }

    /// Events from the latest tick and from calls made since the tick before
    /// it. Each tick discards what the previous tick already exposed.
    pub fn events(&self) -> &[PlayerEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.seen = 0;
        std::mem::take(&mut self.events)
    }

    /// Forget the evaluated pose so the next run starts without an intro blend.
    pub fn invalidate_pose(&mut self) {
        self.has_pose = false;
    }

    /// Start `entry` now, or append it to the queue when `use_queue` is set and
    /// something is already running. Immediate runs drop pending entries.
    pub fn run(
        &mut self,
        data: &SkeletonData,
        pose: &mut Pose,
        entry: QueueEntry,
        use_queue: bool,
        cfg: &RuntimeConfig,
    ) -> Result<(), RuntimeError> {
        ensure_known(data, &entry.animation)?;
        if use_queue && self.state.is_running() {
            log::debug!(
                "queueing '{}' ({} pending)",
                entry.animation,
                self.queue.len()
            );
            self.queue.push(entry);
            return Ok(());
        }
        self.queue.clear();
        self.start(data, pose, entry, cfg);
        Ok(())
    }

    /// Run each entry in order. Unknown names reject the whole sequence.
    pub fn run_sequence(
        &mut self,
        data: &SkeletonData,
        pose: &mut Pose,
        entries: Vec<QueueEntry>,
        use_queue: bool,
        cfg: &RuntimeConfig,
    ) -> Result<(), RuntimeError> {
        for entry in &entries {
            ensure_known(data, &entry.animation)?;
        }
        let mut entries = entries.into_iter();
        if !(use_queue && self.state.is_running()) {
            self.queue.clear();
            match entries.next() {
                Some(first) => self.start(data, pose, first, cfg),
                None => return Ok(()),
            }
        }
        for entry in entries {
            self.queue.push(entry);
        }
        Ok(())
    }

    /// Halt playback and drop the queue. The pose stays as last evaluated.
    pub fn stop(&mut self) {
        self.queue.clear();
        let state = std::mem::take(&mut self.state);
        let animation = state.playback().map(|pb| pb.animation.clone());
        self.state = match state {
            PlayerState::Idle => PlayerState::Idle,
            PlayerState::Playing(pb)
            | PlayerState::Stopped(pb)
            | PlayerState::IntroBlending { playback: pb, .. } => PlayerState::Stopped(pb),
        };
        log::debug!("stopped {animation:?}");
        self.events.push(PlayerEvent::Stopped { animation });
    }

    /// Seek to `frame`, clamped to the animation's frame range, and evaluate
    /// immediately. An intro blend in progress is abandoned.
    pub fn jump_to_frame(
        &mut self,
        data: &SkeletonData,
        pose: &mut Pose,
        frame: i64,
        cfg: &RuntimeConfig,
    ) {
        let (mut pb, stopped) = match std::mem::take(&mut self.state) {
            PlayerState::Idle => return,
            PlayerState::Stopped(pb) => (pb, true),
            PlayerState::Playing(pb) | PlayerState::IntroBlending { playback: pb, .. } => {
                (pb, false)
            }
        };
        let Some(anim) = data.animation(&pb.animation) else {
            return;
        };
        let res = cfg.time_resolution;
        pb.frame = frame.clamp(0, anim.last_frame(res));
        pose.apply_animation(data, anim, anim.time_for_frame(pb.frame, res));
        pose.update_world_transforms();
        self.has_pose = true;
        self.state = if stopped {
            PlayerState::Stopped(pb)
        } else {
            PlayerState::Playing(pb)
        };
    }

    /// Seek relative to the current frame.
    pub fn step_frames(
        &mut self,
        data: &SkeletonData,
        pose: &mut Pose,
        delta: i64,
        cfg: &RuntimeConfig,
    ) {
        if let Some(frame) = self.current_frame() {
            self.jump_to_frame(data, pose, frame.saturating_add(delta), cfg);
        }
    }

    /// Keep the current play time, and the share of an intro blend already
    /// done, when the step size changes.
    pub fn rescale_frames(
        &mut self,
        data: &SkeletonData,
        old_resolution: f32,
        new_resolution: f32,
    ) {
        let ratio = old_resolution as f64 / new_resolution as f64;
        let rescale = |n: f64| (n * ratio).round();
        if let PlayerState::IntroBlending { blend, .. } = &mut self.state {
            blend.steps = rescale(blend.steps as f64).clamp(1.0, u32::MAX as f64) as u32;
            blend.elapsed = (rescale(blend.elapsed as f64) as u32).min(blend.steps);
        }
        if let Some(pb) = self.state.playback_mut() {
            let last = data
                .animation(&pb.animation)
                .map_or(0, |anim| anim.last_frame(new_resolution));
            pb.frame = (rescale(pb.frame as f64) as i64).clamp(0, last);
        }
    }

    /// Advance by `dt` host seconds. Returns the signed steps consumed.
    /// The caller refreshes world transforms afterwards.
    pub fn tick(
        &mut self,
        data: &SkeletonData,
        pose: &mut Pose,
        dt: f32,
        cfg: &RuntimeConfig,
    ) -> i64 {
        self.events.drain(..self.seen.min(self.events.len()));
        self.seen = 0;
        let steps = self.advance(data, pose, dt, cfg);
        self.seen = self.events.len();
        steps
    }

    fn advance(&mut self, data: &SkeletonData, pose: &mut Pose, dt: f32, cfg: &RuntimeConfig) -> i64 {
        if !self.state.is_running() {
            return 0;
        }
        let steps = self
            .clock
            .advance(dt * cfg.playback_speed, cfg.time_resolution);
        match self.state.kind() {
            PlayerStateKind::IntroBlending => self.advance_blend(data, pose, steps, cfg),
            PlayerStateKind::Playing => self.advance_playback(data, pose, steps, cfg),
            PlayerStateKind::Idle | PlayerStateKind::Stopped => {}
        }
        if cfg.debug_mode {
            log::info!(
                "tick dt={dt:.4} steps={steps} state={} frame={:?} queued={}",
                self.state.kind().name(),
                self.current_frame(),
                self.queue.len()
            );
        }
        steps
    }

    fn start(&mut self, data: &SkeletonData, pose: &mut Pose, entry: QueueEntry, cfg: &RuntimeConfig) {
        let Some(anim) = data.animation(&entry.animation) else {
            self.state = PlayerState::Idle;
            return;
        };
        let steps = entry.intro_steps(cfg.time_resolution);
        let from = if steps > 0 && self.has_pose {
            Some(pose.local_snapshot())
        } else {
            None
        };
        let res = cfg.time_resolution;
        let frame = if cfg.playback_speed < 0.0 {
            anim.last_frame(res)
        } else {
            0
        };
        let animation = entry.animation;
        let playback = Playback {
            animation: animation.clone(),
            frame,
            remaining: entry.repeat,
        };

        self.clock.reset();
        pose.apply_animation(data, anim, anim.time_for_frame(frame, res));
        self.has_pose = true;
        let blended = from.is_some();
        self.state = match from {
            Some(from) => {
                pose.blend_bones_from(&from, 0.0);
                PlayerState::IntroBlending {
                    playback,
                    blend: IntroBlend {
                        from,
                        elapsed: 0,
                        steps,
                    },
                }
            }
            None => PlayerState::Playing(playback),
        };
        log::debug!("started '{animation}' (blend steps: {})", if blended { steps } else { 0 });
        self.events.push(PlayerEvent::Started { animation, blended });
    }

    fn advance_blend(&mut self, data: &SkeletonData, pose: &mut Pose, steps: i64, cfg: &RuntimeConfig) {
        let PlayerState::IntroBlending { playback, mut blend } = std::mem::take(&mut self.state) else {
            return;
        };
        let Some(anim) = data.animation(&playback.animation) else {
            return;
        };
        let consumed = steps.unsigned_abs().min(u32::MAX as u64) as u32;
        blend.elapsed = blend.elapsed.saturating_add(consumed);
        if blend.elapsed >= blend.steps {
            let leftover = (blend.elapsed - blend.steps) as i64 * steps.signum();
            self.state = PlayerState::Playing(playback);
            self.advance_playback(data, pose, leftover, cfg);
            return;
        }
        pose.apply_animation(data, anim, anim.time_for_frame(playback.frame, cfg.time_resolution));
        pose.blend_bones_from(&blend.from, blend.alpha());
        self.state = PlayerState::IntroBlending { playback, blend };
    }

    fn advance_playback(&mut self, data: &SkeletonData, pose: &mut Pose, steps: i64, cfg: &RuntimeConfig) {
        let PlayerState::Playing(mut pb) = std::mem::take(&mut self.state) else {
            return;
        };
        let Some(anim) = data.animation(&pb.animation) else {
            return;
        };
        let res = cfg.time_resolution;
        let last = anim.last_frame(res);
        let span = last + 1;
        pb.frame = pb.frame.saturating_add(steps);

        if !(0..=last).contains(&pb.frame) {
            let forward = pb.frame > last;
            let laps = if forward {
                (pb.frame / span) as u64
            } else {
                ((-(pb.frame + 1)) / span + 1) as u64
            };
            let wrapped = pb.frame.rem_euclid(span);
            match pb.remaining {
                Repeat::Forever => {
                    self.events.push(PlayerEvent::PlaythroughEnded {
                        animation: pb.animation.clone(),
                        remaining: Some(Repeat::Forever),
                        laps,
                    });
                    pb.frame = wrapped;
                }
                Repeat::Times(n) => {
                    let mut left = Some(pb.remaining);
                    for _ in 0..laps.min(n as u64) {
                        left = left.and_then(Repeat::after_playthrough);
                        self.events.push(PlayerEvent::PlaythroughEnded {
                            animation: pb.animation.clone(),
                            remaining: left,
                            laps: 1,
                        });
                    }
                    match left {
                        Some(r) => {
                            pb.remaining = r;
                            pb.frame = wrapped;
                        }
                        None => {
                            pb.frame = if forward { last } else { 0 };
                            pose.apply_animation(data, anim, anim.time_for_frame(pb.frame, res));
                            self.has_pose = true;
                            log::debug!("finished '{}'", pb.animation);
                            self.events.push(PlayerEvent::Finished {
                                animation: pb.animation,
                            });
                            self.promote_next(data, pose, cfg);
                            return;
                        }
                    }
                }
            }
        }

        pose.apply_animation(data, anim, anim.time_for_frame(pb.frame, res));
        self.has_pose = true;
        self.state = PlayerState::Playing(pb);
    }

    fn promote_next(&mut self, data: &SkeletonData, pose: &mut Pose, cfg: &RuntimeConfig) {
        match self.queue.pop() {
            Some(entry) => self.start(data, pose, entry, cfg),
            None => {
                log::debug!("queue empty, player idle");
                self.state = PlayerState::Idle;
            }
        }
    }
}
