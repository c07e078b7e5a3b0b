use glam::{Affine3A, Vec3};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::scene::light::Light;
use crate::scene::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::{LightKey, MeshKey, NodeHandle, SkeletonKey};

/// The 3D world graph: node hierarchy plus mesh, skeleton and light pools.
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Mesh>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,
    pub lights: SlotMap<LightKey, Light>,

    /// Linear RGB clear color.
    pub background: Option<Vec3>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            skeletons: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            background: None,
        }
    }

    // ========================================================================
    // Nodes & hierarchy
    // ========================================================================

    /// Adds a node at the top level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Re-parents `child` under `parent`, detaching it from its previous parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || !self.nodes.contains_key(parent) {
            return;
        }
        let Some(old_parent) = self.nodes.get(child).map(Node::parent) else {
            return;
        };

        match old_parent {
            Some(old) => {
                if let Some(node) = self.nodes.get_mut(old) {
                    node.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.transform.mark_dirty();
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Removes `root` and everything below it, including meshes and skeletons
    /// referenced from that subtree.
    pub fn remove_subtree(&mut self, root: NodeHandle) {
        let doomed = self.descendants(root);
        let doomed_set: FxHashSet<NodeHandle> = doomed.iter().copied().collect();

        if let Some(parent) = self.nodes.get(root).and_then(Node::parent) {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.retain(|&c| c != root);
            }
        } else {
            self.root_nodes.retain(|&r| r != root);
        }

        for handle in doomed {
            if let Some(node) = self.nodes.remove(handle)
                && let Some(mesh_key) = node.mesh
                && let Some(mesh) = self.meshes.remove(mesh_key)
                && let Some(skeleton) = mesh.skeleton
            {
                self.skeletons.remove(skeleton);
            }
        }

        self.skeletons
            .retain(|_, skeleton| !skeleton.bones.iter().any(|b| doomed_set.contains(b)));
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &SlotMap<NodeHandle, Node> {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth-first, pre-order visit of `root` and its descendants.
    pub fn traverse(&self, root: NodeHandle, mut visit: impl FnMut(NodeHandle, &Node)) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            visit(handle, node);
            stack.extend(node.children.iter().rev());
        }
    }

    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        self.traverse(root, |handle, _| out.push(handle));
        out
    }

    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut found = None;
        self.traverse(root, |handle, node| {
            if found.is_none() && node.name == name {
                found = Some(handle);
            }
        });
        found
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn set_mesh(&mut self, node: NodeHandle, mesh: Mesh) -> Option<MeshKey> {
        let target = self.nodes.get_mut(node)?;
        let key = self.meshes.insert(mesh);
        if let Some(old) = target.mesh.replace(key) {
            self.meshes.remove(old);
        }
        Some(key)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    pub fn add_light(&mut self, light: Light) -> LightKey {
        self.lights.insert(light)
    }

    /// Meshes attached to `root` or any of its descendants.
    #[must_use]
    pub fn meshes_under(&self, root: NodeHandle) -> Vec<MeshKey> {
        let mut out = Vec::new();
        self.traverse(root, |_, node| out.extend(node.mesh));
        out
    }

    // ========================================================================
    // Systems
    // ========================================================================

    /// Propagates local matrices down the hierarchy.
    pub fn update_matrix_world(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = self
            .root_nodes
            .iter()
            .rev()
            .map(|&h| (h, Affine3A::IDENTITY, false))
            .collect();

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            let local_changed = node.transform.update_local_matrix();
            let changed = local_changed || parent_changed;
            if changed {
                let world = parent_world * node.transform.local_matrix;
                node.transform.set_world_matrix(world);
            }
            let world = node.transform.world_matrix;
            stack.extend(node.children.iter().rev().map(|&c| (c, world, changed)));
        }
    }

    /// Returns every skeleton bound to a mesh under `root` to its bind pose.
    pub fn pose_skeletons_under(&mut self, root: NodeHandle) {
        self.update_matrix_world();

        let mut keys: Vec<SkeletonKey> = self
            .meshes_under(root)
            .into_iter()
            .filter_map(|mesh| self.meshes.get(mesh).and_then(|m| m.skeleton))
            .collect();
        keys.sort_unstable();
        keys.dedup();

        for key in keys {
            if let Some(skeleton) = self.skeletons.get(key) {
                skeleton.pose(&mut self.nodes);
            }
        }

        self.update_matrix_world();
    }
}
