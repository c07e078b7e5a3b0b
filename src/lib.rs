#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Interactive skinned-avatar viewer core.
//!
//! Loads a skinned character and a fixed set of motion clips, plays them on
//! demand and glides the camera between presets bound to each animation.
//! Rendering is delegated to a [`viewport::RenderSurface`]; everything else
//! (scene graph, skeletal animation, orbit controls) lives here.

pub mod animation;
pub mod assets;
pub mod choreographer;
pub mod config;
pub mod controls;
pub mod errors;
pub mod player;
pub mod scene;
pub mod stage;
pub mod utils;
pub mod viewport;

pub use animation::{AnimationClip, AnimationKind, AnimationMixer, AnimationSet, LoopMode};
#[cfg(not(target_arch = "wasm32"))]
pub use assets::FileAssetReader;
pub use assets::{AnimationLibrary, AssetReader, AvatarModel, LoadReport, MemoryAssetReader};
pub use choreographer::{CameraChoreographer, Transition, TransitionStep};
pub use config::{CameraPreset, CameraPresets, StageConfig};
pub use controls::{Input, OrbitControls, PointerButton};
pub use errors::{Result, StageError};
pub use player::{AnimationPlayer, PlayHandle, PlayOutcome, PlayerState};
pub use scene::{MaterialConfig, Node, PerspectiveCamera, Scene};
pub use stage::{AvatarStage, FrameOutcome, StageStatus};
pub use utils::time::Instant;
pub use viewport::{HeadlessHost, RenderSurface, SurfaceSize, Viewport, ViewportHost};
