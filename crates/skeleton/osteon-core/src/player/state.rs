//! Player states.
//!
//! ```text
//! Idle ──run──▶ Playing ◀──blend done── IntroBlending
//!   ▲             │  ▲                       ▲
//!   │   repeats   │  └──────run(intro > 0)───┘
//!   └─exhausted───┘
//! any ──stop──▶ Stopped ──run──▶ Playing / IntroBlending
//! ```

use serde::{Deserialize, Serialize};

use crate::math::LocalTransform;
use crate::player::queue::Repeat;

/// The animation being advanced and where it is.
#[derive(Clone, Debug, PartialEq)]
pub struct Playback {
    pub animation: String,
    pub frame: i64,
    /// Play-throughs left including the current one.
    pub remaining: Repeat,
}

/// Bone pose captured at hand-off and progress toward the incoming animation.
#[derive(Clone, Debug, PartialEq)]
pub struct IntroBlend {
    pub from: Vec<LocalTransform>,
    pub elapsed: u32,
    pub steps: u32,
}

impl IntroBlend {
    /// Weight of the incoming pose in `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        if self.steps == 0 {
            1.0
        } else {
            (self.elapsed as f32 / self.steps as f32).min(1.0)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PlayerState {
    #[default]
    Idle,
    Playing(Playback),
    IntroBlending {
        playback: Playback,
        blend: IntroBlend,
    },
    /// Explicitly stopped; the pose stays as last evaluated.
    Stopped(Playback),
}

/// Data-free view of [`PlayerState`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStateKind {
    Idle,
    Playing,
    IntroBlending,
    Stopped,
}

impl PlayerStateKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::IntroBlending => "intro-blending",
            Self::Stopped => "stopped",
        }
    }
}

impl PlayerState {
    pub fn kind(&self) -> PlayerStateKind {
        match self {
            PlayerState::Idle => PlayerStateKind::Idle,
            PlayerState::Playing(_) => PlayerStateKind::Playing,
            PlayerState::IntroBlending { .. } => PlayerStateKind::IntroBlending,
            PlayerState::Stopped(_) => PlayerStateKind::Stopped,
        }
    }

    /// Playing or blending in.
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            PlayerState::Playing(_) | PlayerState::IntroBlending { .. }
        )
    }

    pub fn playback(&self) -> Option<&Playback> {
        match self {
            PlayerState::Idle => None,
            PlayerState::Playing(pb)
            | PlayerState::Stopped(pb)
            | PlayerState::IntroBlending { playback: pb, .. } => Some(pb),
        }
    }

    pub(crate) fn playback_mut(&mut self) -> Option<&mut Playback> {
        match self {
            PlayerState::Idle => None,
            PlayerState::Playing(pb)
            | PlayerState::Stopped(pb)
            | PlayerState::IntroBlending { playback: pb, .. } => Some(pb),
        }
    }
}
