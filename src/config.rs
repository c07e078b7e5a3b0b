//! Static configuration tables.
//!
//! Every table has a default reproducing the stock avatar page, so an empty
//! JSON object is a complete configuration:
//!
//! ```rust,ignore
//! let config = StageConfig::from_json_str("{}")?;
//! assert_eq!(config.camera.fov, 45.0);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::AnimationKind;
use crate::errors::{Result, StageError};

/// Converts a `0xRRGGBB` color to RGB in `[0, 1]`.
#[must_use]
pub fn rgb(hex: u32) -> Vec3 {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}

// ============================================================================
// Camera presets
// ============================================================================

/// A named camera viewpoint: where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl CameraPreset {
    pub const REST: CameraPreset = CameraPreset::new([0.0, 1.5, 4.0], [0.0, 1.0, 0.0]);

    #[must_use]
    pub const fn new(position: [f32; 3], target: [f32; 3]) -> Self {
        Self { position, target }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }

    /// Orbit radius of this viewpoint.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position().distance(self.target())
    }
}

/// Camera preset per animation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraPresets(BTreeMap<AnimationKind, CameraPreset>);

impl Default for CameraPresets {
    fn default() -> Self {
        Self(BTreeMap::from([
            (AnimationKind::Rest, CameraPreset::REST),
            (AnimationKind::Climbing, CameraPreset::new([2.0, 4.0, -5.0], [0.0, 1.5, 0.0])),
            (AnimationKind::Frisbee, CameraPreset::new([-5.0, 1.0, 2.0], [0.0, 1.0, 0.0])),
            (AnimationKind::Gaming, CameraPreset::new([0.0, 3.0, 5.0], [0.0, 1.5, 0.0])),
            (AnimationKind::Typing, CameraPreset::new([0.0, 3.0, -4.0], [0.0, 0.8, 0.0])),
        ]))
    }
}

impl CameraPresets {
    #[must_use]
    pub fn get(&self, kind: AnimationKind) -> Option<&CameraPreset> {
        self.0.get(&kind)
    }

    pub fn insert(&mut self, kind: AnimationKind, preset: CameraPreset) {
        self.0.insert(kind, preset);
    }

    pub fn remove(&mut self, kind: AnimationKind) -> Option<CameraPreset> {
        self.0.remove(&kind)
    }

    /// Looks up a preset by name. Unknown names and kinds without a preset
    /// fall back to the rest preset; this never fails.
    #[must_use]
    pub fn resolve(&self, name: &str) -> CameraPreset {
        name.parse::<AnimationKind>()
            .ok()
            .and_then(|kind| self.get(kind))
            .or_else(|| self.get(AnimationKind::Rest))
            .copied()
            .unwrap_or(CameraPreset::REST)
    }
}

// ============================================================================
// Renderer / camera / lights
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.01,
            far: 1000.0,
            position: [0.0, 1.5, 4.0],
            target: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 2.0,
            max_distance: 10.0,
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub antialias: bool,
    /// Transparent canvas background.
    pub alpha: bool,
    pub shadows: bool,
    /// Upper bound applied to the device pixel ratio.
    pub max_pixel_ratio: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: true,
            shadows: true,
            max_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightConfig {
    pub color: u32,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: 0xff_ffff,
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub camera_near: f32,
    pub camera_far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 1024,
            camera_near: 0.1,
            camera_far: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: 0xff_ffff,
            intensity: 1.0,
            position: [5.0, 5.0, 5.0],
            cast_shadow: true,
            shadow: ShadowSettings::default(),
        }
    }
}

/// Specular response applied to every avatar material at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    pub specular: u32,
    pub shininess: f32,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            specular: 0x66_6666,
            shininess: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: u64,
    /// Point the camera orbits around while transitioning.
    pub pivot: [f32; 3],
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            pivot: [0.0, 1.0, 0.0],
        }
    }
}

impl TransitionConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    #[must_use]
    pub fn pivot(&self) -> Vec3 {
        Vec3::from_array(self.pivot)
    }
}

// ============================================================================
// Assets
// ============================================================================

/// Where the avatar model and each motion clip are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub avatar: String,
    pub clips: BTreeMap<AnimationKind, String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            avatar: "Avatar.glb".to_string(),
            clips: BTreeMap::from([
                (AnimationKind::Climbing, "Climbing Up Wall.glb".to_string()),
                (AnimationKind::Frisbee, "Frisbee Throw.glb".to_string()),
                (AnimationKind::Gaming, "Gaming.glb".to_string()),
                (AnimationKind::Typing, "Typing.glb".to_string()),
            ]),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StageConfig {
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub renderer: RendererConfig,
    pub ambient_light: AmbientLightConfig,
    pub directional_light: DirectionalLightConfig,
    pub background: Background,
    pub material: MaterialSettings,
    pub transition: TransitionConfig,
    pub presets: CameraPresets,
    pub assets: AssetManifest,
}

/// Scene clear color as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Background(pub u32);

impl Default for Background {
    fn default() -> Self {
        Self(0x66_6666)
    }
}

impl StageConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: StageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks the cross-table invariants: every kind has a camera preset,
    /// every playable kind has a clip source, and every viewpoint lies within
    /// the orbit distance range so controls never pull the camera off it.
    pub fn validate(&self) -> Result<()> {
        for kind in AnimationKind::ALL {
            if self.presets.get(kind).is_none() {
                return Err(StageError::Config(format!("no camera preset for '{kind}'")));
            }
        }
        for kind in AnimationKind::PLAYABLE {
            if !self.assets.clips.contains_key(&kind) {
                return Err(StageError::Config(format!("no clip source for '{kind}'")));
            }
        }
        if self.assets.clips.contains_key(&AnimationKind::Rest) {
            return Err(StageError::Config("'rest' cannot have a clip source".into()));
        }
        if self.renderer.max_pixel_ratio <= 0.0 {
            return Err(StageError::Config("max_pixel_ratio must be positive".into()));
        }
        if self.controls.min_distance > self.controls.max_distance {
            return Err(StageError::Config(
                "controls.min_distance exceeds controls.max_distance".into(),
            ));
        }
        let range = self.controls.min_distance..=self.controls.max_distance;
        let start = CameraPreset::new(self.camera.position, self.camera.target);
        let viewpoints = AnimationKind::ALL
            .into_iter()
            .filter_map(|kind| Some((kind.as_str(), *self.presets.get(kind)?)))
            .chain(std::iter::once(("camera", start)));
        for (name, preset) in viewpoints {
            let distance = preset.distance();
            if !range.contains(&distance) {
                return Err(StageError::Config(format!(
                    "'{name}' camera distance {distance} is outside controls range [{}, {}]",
                    self.controls.min_distance, self.controls.max_distance
                )));
            }
        }
        if self.camera.near <= 0.0 || self.camera.near >= self.camera.far {
            return Err(StageError::Config("camera clipping planes must satisfy 0 < near < far".into()));
        }
        if self.transition.duration_ms == 0 {
            return Err(StageError::Config("transition.duration_ms must be positive".into()));
        }
        Ok(())
    }
}
