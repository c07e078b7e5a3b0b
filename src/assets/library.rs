use futures::future::join_all;

use crate::animation::{AnimationClip, AnimationKind, AnimationSet};
use crate::assets::io::AssetReader;
use crate::assets::loaders::{GltfAsset, GltfLoader};
use crate::config::{AssetManifest, MaterialSettings};
use crate::errors::{Result, StageError};
use crate::scene::{NodeHandle, Scene};

/// The avatar as inserted into the scene.
#[derive(Debug, Clone)]
pub struct AvatarModel {
    /// Root node of the model; everything the model owns lives below it.
    pub root: NodeHandle,
    pub uri: String,
    pub mesh_count: usize,
    pub skinned_mesh_count: usize,
}

/// Outcome of [`AnimationLibrary::load_all`] once every load has settled.
#[derive(Debug)]
pub struct LoadReport {
    pub model: AvatarModel,
    pub clips: AnimationSet,
    /// One [`StageError::ClipLoad`] per motion file that failed.
    pub clip_errors: Vec<StageError>,
}

impl LoadReport {
    /// The model loaded and at least one clip (of any kind) loaded.
    ///
    /// This is a weak check: a specific kind may still be missing, see
    /// [`LoadReport::missing`].
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.clips.loaded_count() > 0
    }

    /// Playable kinds without clip data.
    #[must_use]
    pub fn missing(&self) -> Vec<AnimationKind> {
        AnimationKind::PLAYABLE
            .into_iter()
            .filter(|&kind| !self.clips.contains(kind))
            .collect()
    }
}

/// Loads the skinned avatar and its motion clips through an [`AssetReader`].
pub struct AnimationLibrary<R> {
    reader: R,
    material: MaterialSettings,
}

impl<R: AssetReader> AnimationLibrary<R> {
    pub fn new(reader: R, material: MaterialSettings) -> Self {
        Self { reader, material }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Loads the model at `uri` and inserts it into `scene` at the origin
    /// with unit scale and no rotation.
    ///
    /// Fails with [`StageError::AssetLoad`] if the file cannot be read or
    /// parsed.
    pub async fn load_avatar(&self, uri: &str, scene: &mut Scene) -> Result<AvatarModel> {
        log::info!("Loading avatar from '{uri}'");
        let asset = GltfAsset::read(&self.reader, uri).await?;
        let root = GltfLoader::instantiate(&asset, scene, &self.material, "avatar")?;

        let meshes = scene.meshes_under(root);
        let skinned_mesh_count = meshes
            .iter()
            .filter(|&&key| scene.meshes.get(key).is_some_and(|m| m.is_skinned()))
            .count();
        let model = AvatarModel {
            root,
            uri: uri.to_string(),
            mesh_count: meshes.len(),
            skinned_mesh_count,
        };
        log::info!(
            "Avatar loaded: {} meshes ({} skinned)",
            model.mesh_count,
            model.skinned_mesh_count
        );
        Ok(model)
    }

    /// Loads the first animation of the motion file at `uri`, named after
    /// `kind`. Every failure is tagged as [`StageError::ClipLoad`].
    pub async fn load_clip(&self, kind: AnimationKind, uri: &str) -> Result<AnimationClip> {
        let tag = |err: StageError| StageError::ClipLoad {
            kind,
            reason: err.to_string(),
        };

        log::debug!("Loading clip '{kind}' from '{uri}'");
        let asset = GltfAsset::read(&self.reader, uri).await.map_err(tag)?;
        GltfLoader::load_animations(&asset)
            .into_iter()
            .next()
            .map(|clip| clip.renamed(kind.as_str()))
            .ok_or_else(|| StageError::ClipLoad {
                kind,
                reason: format!("'{uri}' contains no animations"),
            })
    }

    /// Loads every clip of `manifest` concurrently and waits for all of them
    /// to settle. A failed load leaves its kind absent and is returned as an
    /// error entry; it never cancels the others.
    pub async fn load_clips(&self, manifest: &AssetManifest) -> (AnimationSet, Vec<StageError>) {
        let loads = manifest
            .clips
            .iter()
            .filter(|(kind, _)| !kind.is_rest())
            .map(|(&kind, uri)| async move { (kind, self.load_clip(kind, uri).await) });

        let mut clips = AnimationSet::new();
        let mut errors = Vec::new();
        for (kind, result) in join_all(loads).await {
            match result {
                Ok(clip) => {
                    log::info!("Clip '{kind}' loaded ({:.2}s)", clip.duration);
                    clips.insert(kind, clip);
                }
                Err(err) => {
                    log::warn!("{err}");
                    errors.push(err);
                }
            }
        }
        (clips, errors)
    }

    /// Loads the avatar into `scene`, then fans out over the motion clips.
    ///
    /// Only a failed model load is an error; clip failures are reported in
    /// [`LoadReport::clip_errors`].
    pub async fn load_all(&self, manifest: &AssetManifest, scene: &mut Scene) -> Result<LoadReport> {
        let model = self.load_avatar(&manifest.avatar, scene).await?;
        let (clips, clip_errors) = self.load_clips(manifest).await;
        Ok(LoadReport {
            model,
            clips,
            clip_errors,
        })
    }
}
