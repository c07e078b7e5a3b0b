//! Asset loading: byte readers, the glTF loader and the animation library
//! that turns a model file plus motion files into a playable set.

pub mod io;
pub mod library;
pub mod loaders;

#[cfg(not(target_arch = "wasm32"))]
pub use io::FileAssetReader;
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use io::{AssetReader, MemoryAssetReader};
pub use library::{AnimationLibrary, AvatarModel, LoadReport};
pub use loaders::{GltfAsset, GltfLoader};
