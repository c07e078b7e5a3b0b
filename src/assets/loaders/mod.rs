pub mod gltf;

pub use self::gltf::{GltfAsset, GltfLoader};
