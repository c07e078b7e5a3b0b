//! Scene graph module
//!
//! The engine-side world the avatar lives in:
//! - [`Scene`]: node arena, hierarchy and component pools
//! - [`Node`] / [`Transform`]: hierarchy and TRS with cached matrices
//! - [`Mesh`] / [`Geometry`] / [`MaterialConfig`]: renderable data
//! - [`Skeleton`]: bones and bind pose
//! - [`PerspectiveCamera`], [`Light`]

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod skeleton;
pub mod transform;

pub use camera::PerspectiveCamera;
pub use light::{Light, LightKind, ShadowConfig};
pub use material::{MaterialConfig, ShadingModel, TextureRef};
pub use mesh::{Geometry, Mesh};
pub use node::Node;
pub use scene::Scene;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct LightKey;
    pub struct SkeletonKey;
}
