use glam::{Vec2, Vec3, Vec4};

use crate::scene::SkeletonKey;
use crate::scene::material::MaterialConfig;

/// CPU-side vertex data of one primitive, handed to the render surface as-is.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<Vec4>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn has_skin_attributes(&self) -> bool {
        !self.joints.is_empty() && self.joints.len() == self.weights.len()
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialConfig,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Set for skinned meshes.
    pub skeleton: Option<SkeletonKey>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: Geometry, material: MaterialConfig) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
            skeleton: None,
        }
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.skeleton.is_some()
    }
}
