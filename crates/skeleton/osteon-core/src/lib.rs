//! Osteon core: a 2D skeletal animation runtime (engine-agnostic).
//!
//! A [`SkeletonData`] is loaded once from a Spine-style JSON document and an
//! atlas, then shared by any number of [`SkeletonRuntime`]s. Each runtime owns
//! its pose, animation player and skin/texture/color layers, and is driven by
//! calling [`SkeletonRuntime::activate_animations`] once per host frame.

pub mod assets;
pub mod atlas;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod interp;
pub mod math;
pub mod overrides;
pub mod player;
pub mod pose;
pub mod resolve;
pub mod runtime;
pub mod sampling;
pub mod skin;
pub mod value;

// Re-exports for hosts
pub use assets::{AssetProvider, AtlasSource, MemoryAssets};
pub use atlas::{AtlasRegion, TextureAtlas};
pub use config::{RuntimeConfig, DEFAULT_TIME_RESOLUTION};
pub use data::{Animation, AttachmentData, BoneData, SkeletonData, SkinData, SlotData, DEFAULT_SKIN};
pub use error::{LoadError, RuntimeError};
pub use events::PlayerEvent;
pub use interp::Curve;
pub use math::{Affine2, LocalTransform};
pub use overrides::{ColorOverrides, SlotTint, TextureOverrides};
pub use player::{AnimationPlayer, PlayerState, PlayerStateKind, QueueEntry, Repeat};
pub use pose::{Bone, Pose};
pub use resolve::{resolve_slot, ResolvedAttachment, SlotLayers, SlotPose};
pub use runtime::SkeletonRuntime;
pub use skin::SkinResolver;
pub use value::Color;

pub type Result<T> = core::result::Result<T, RuntimeError>;
