use glam::{Vec3, Vec4};

use crate::config::MaterialSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    /// Metallic-roughness, as exported.
    Standard,
    /// Blinn-Phong with explicit specular color and shininess.
    Phong,
}

/// Reference to a texture of the source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    /// Index into the source document's texture list.
    pub index: usize,
    pub tex_coord: u32,
}

/// Statically typed material description consumed by the render surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialConfig {
    pub shading: ShadingModel,
    pub color: Vec4,
    pub map: Option<TextureRef>,
    pub specular: Vec3,
    pub shininess: f32,
    /// Vertices are deformed by the bound skeleton.
    pub skinning: bool,
    pub double_sided: bool,
}

impl MaterialConfig {
    #[must_use]
    pub fn standard(color: Vec4) -> Self {
        Self {
            shading: ShadingModel::Standard,
            color,
            map: None,
            specular: Vec3::ZERO,
            shininess: 0.0,
            skinning: false,
            double_sided: false,
        }
    }

    /// The load-time material step: keeps the source color map and color,
    /// switches to Phong with the configured specular response, and enables
    /// skinning when the mesh is bound to a skeleton.
    #[must_use]
    pub fn phong_from_source(source: &MaterialConfig, settings: &MaterialSettings, skinned: bool) -> Self {
        Self {
            shading: ShadingModel::Phong,
            color: source.color,
            map: source.map,
            specular: crate::config::rgb(settings.specular),
            shininess: settings.shininess,
            skinning: skinned,
            double_sided: source.double_sided,
        }
    }
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self::standard(Vec4::ONE)
    }
}
