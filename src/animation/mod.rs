//! Skeletal animation: keyframe tracks, clips, actions and the per-model mixer.

mod values;
pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod kind;
pub mod mixer;
pub mod tracks;

pub use action::{AnimationAction, LoopMode};
pub use binder::{Binder, normalize_bone_name};
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use kind::{AnimationKind, AnimationSet};
pub use mixer::{ActionHandle, AnimationMixer, MixerEvent};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
