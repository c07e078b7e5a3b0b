use rustc_hash::FxHashMap;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` to a node under `root`.
    ///
    /// Motion files usually come from a different export than the avatar, so
    /// node names are compared after [`normalize_bone_name`]. Tracks whose
    /// node cannot be found are skipped.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut index: FxHashMap<String, NodeHandle> = FxHashMap::default();
        scene.traverse(root, |handle, node| {
            index.entry(normalize_bone_name(&node.name)).or_insert(handle);
        });

        let mut bindings = Vec::with_capacity(clip.tracks.len());
        let mut unbound = 0usize;

        for (track_index, track) in clip.tracks.iter().enumerate() {
            match index.get(&normalize_bone_name(&track.meta.node_name)) {
                Some(&node) => bindings.push(PropertyBinding {
                    track_index,
                    node,
                    target: track.meta.target,
                }),
                None => unbound += 1,
            }
        }

        if unbound > 0 {
            log::debug!(
                "Clip '{}': {unbound} of {} tracks have no matching node",
                clip.name,
                clip.tracks.len()
            );
        }

        bindings
    }
}

/// Strips rig namespaces (`mixamorig:Hips`, `Armature|Hips`) and separators,
/// and lowercases, so the same bone matches across exports.
#[must_use]
pub fn normalize_bone_name(name: &str) -> String {
    let bare = name.rsplit([':', '|']).next().unwrap_or(name);
    bare.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}
