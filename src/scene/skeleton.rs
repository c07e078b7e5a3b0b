use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// An ordered bone list plus the inverse bind matrices captured at export time.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    /// `bones[i]` is joint `i` in the skinned geometry.
    pub bones: Vec<NodeHandle>,

    /// Mesh space -> bone space, one per bone. Static after load.
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    pub(crate) root_bone_index: usize,

    bone_index: FxHashMap<NodeHandle, usize>,
}

impl Skeleton {
    /// Missing inverse bind matrices default to identity.
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        mut inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        inverse_bind_matrices.resize(bones.len(), Affine3A::IDENTITY);
        let bone_index = bones.iter().enumerate().map(|(i, &h)| (h, i)).collect();

        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
            bone_index,
        }
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Affine3A] {
        &self.inverse_bind_matrices
    }

    /// Moves every bone back to the bind pose.
    ///
    /// Bone world transforms are recovered from the inverse bind matrices and
    /// converted to local transforms relative to the parent: the parent bone's
    /// bind transform, or for a non-bone parent its current world matrix.
    /// Call after the scene's world matrices are up to date.
    pub fn pose(&self, nodes: &mut SlotMap<NodeHandle, Node>) {
        let bind_world: Vec<Affine3A> = self
            .inverse_bind_matrices
            .iter()
            .map(Affine3A::inverse)
            .collect();

        for (i, &bone) in self.bones.iter().enumerate() {
            let Some(parent) = nodes.get(bone).and_then(Node::parent) else {
                if let Some(node) = nodes.get_mut(bone) {
                    node.transform.apply_local_matrix(bind_world[i]);
                }
                continue;
            };

            let parent_world = match self.bone_index.get(&parent) {
                Some(&parent_index) => bind_world[parent_index],
                None => nodes
                    .get(parent)
                    .map_or(Affine3A::IDENTITY, |p| *p.world_matrix()),
            };

            if let Some(node) = nodes.get_mut(bone) {
                node.transform
                    .apply_local_matrix(parent_world.inverse() * bind_world[i]);
            }
        }
    }

    /// Per-joint skinning matrices for the current pose, in the space of the
    /// skinned mesh whose inverse world matrix is `mesh_world_inv`.
    #[must_use]
    pub fn joint_matrices(
        &self,
        nodes: &SlotMap<NodeHandle, Node>,
        mesh_world_inv: Affine3A,
    ) -> Vec<Mat4> {
        self.bones
            .iter()
            .zip(&self.inverse_bind_matrices)
            .map(|(&bone, ibm)| {
                nodes.get(bone).map_or(Mat4::IDENTITY, |node| {
                    (mesh_world_inv * *node.world_matrix() * *ibm).into()
                })
            })
            .collect()
    }
}
