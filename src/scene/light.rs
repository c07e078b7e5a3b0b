use glam::Vec3;

use crate::config::{AmbientLightConfig, DirectionalLightConfig};

/// Shadow map parameters for a directional light.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 1024,
            camera_near: 0.1,
            camera_far: 10.0,
            bias: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional {
        position: Vec3,
        target: Vec3,
        shadow: Option<ShadowConfig>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Ambient,
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional {
                position,
                target: Vec3::ZERO,
                shadow: None,
            },
        }
    }

    #[must_use]
    pub fn with_shadow(mut self, config: ShadowConfig) -> Self {
        if let LightKind::Directional { shadow, .. } = &mut self.kind {
            *shadow = Some(config);
        }
        self
    }

    #[must_use]
    pub fn casts_shadow(&self) -> bool {
        matches!(self.kind, LightKind::Directional { shadow: Some(_), .. })
    }
}

impl From<&AmbientLightConfig> for Light {
    fn from(config: &AmbientLightConfig) -> Self {
        Light::new_ambient(crate::config::rgb(config.color), config.intensity)
    }
}

impl From<&DirectionalLightConfig> for Light {
    fn from(config: &DirectionalLightConfig) -> Self {
        let light = Light::new_directional(
            crate::config::rgb(config.color),
            config.intensity,
            Vec3::from_array(config.position),
        );
        if config.cast_shadow {
            light.with_shadow(ShadowConfig {
                map_size: config.shadow.map_size,
                camera_near: config.shadow.camera_near,
                camera_far: config.shadow.camera_far,
                ..ShadowConfig::default()
            })
        } else {
            light
        }
    }
}
