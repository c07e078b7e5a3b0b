use base64::Engine as _;
use gltf::animation::util::ReadOutputs;
use glam::{Affine3A, Mat4, Quat, Vec2, Vec3, Vec4};
use rustc_hash::FxHashSet;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::assets::io::AssetReader;
use crate::config::MaterialSettings;
use crate::errors::{Result, StageError};
use crate::scene::{
    Geometry, MaterialConfig, Mesh, NodeHandle, Scene, Skeleton, SkeletonKey, TextureRef,
};

/// A parsed glTF/GLB document with all of its buffers resolved.
pub struct GltfAsset {
    uri: String,
    gltf: gltf::Gltf,
    buffers: Vec<Vec<u8>>,
}

impl GltfAsset {
    /// Reads and parses `uri`, then resolves every buffer from the GLB binary
    /// chunk, a base64 data URI, or a file next to the document.
    pub async fn read<R: AssetReader>(reader: &R, uri: &str) -> Result<Self> {
        let bytes = reader.read_bytes(uri).await?;
        Self::from_bytes(reader, uri, &bytes).await
    }

    pub async fn from_bytes<R: AssetReader>(reader: &R, uri: &str, bytes: &[u8]) -> Result<Self> {
        let gltf = gltf::Gltf::from_slice(bytes).map_err(|err| StageError::asset_load(uri, err))?;
        let buffers = load_buffers(&gltf, reader, uri).await?;
        Ok(Self {
            uri: uri.to_string(),
            gltf,
            buffers,
        })
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn document(&self) -> &gltf::Document {
        &self.gltf.document
    }

    #[must_use]
    pub fn animation_count(&self) -> usize {
        self.gltf.animations().len()
    }

    fn buffer(&self, buffer: &gltf::Buffer) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(Vec::as_slice)
    }
}

async fn load_buffers<R: AssetReader>(
    gltf: &gltf::Gltf,
    reader: &R,
    doc_uri: &str,
) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::with_capacity(gltf.buffers().len());
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| StageError::asset_load(doc_uri, "missing GLB binary chunk"))?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)
                .map_err(|err| StageError::asset_load(doc_uri, err))?,
            gltf::buffer::Source::Uri(uri) => {
                reader.read_bytes(&resolve_relative(doc_uri, uri)).await?
            }
        };
        if data.len() < buffer.length() {
            return Err(StageError::asset_load(
                doc_uri,
                format!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                ),
            ));
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let Some((_, payload)) = uri.split_once(";base64,") else {
        return Err(StageError::Gltf("only base64 data URIs are supported".into()));
    };
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Resolves `uri` against the directory of `base`.
fn resolve_relative(base: &str, uri: &str) -> String {
    match base.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{uri}"),
        None => uri.to_string(),
    }
}

/// Builds scene content from a [`GltfAsset`].
pub struct GltfLoader<'a> {
    asset: &'a GltfAsset,
    scene: &'a mut Scene,
    material: &'a MaterialSettings,
    /// glTF node index -> scene node
    node_mapping: Vec<NodeHandle>,
}

impl<'a> GltfLoader<'a> {
    /// Adds the document's node graph to `scene` under a new root node and
    /// returns that root. Every mesh casts and receives shadows and goes
    /// through the load-time material step.
    pub fn instantiate(
        asset: &'a GltfAsset,
        scene: &'a mut Scene,
        material: &'a MaterialSettings,
        root_name: &str,
    ) -> Result<NodeHandle> {
        if asset.gltf.meshes().len() == 0 {
            return Err(StageError::asset_load(&asset.uri, "document contains no meshes"));
        }

        let mut loader = Self {
            asset,
            scene,
            material,
            node_mapping: Vec::with_capacity(asset.gltf.nodes().len()),
        };

        let required: Vec<_> = asset.gltf.extensions_required().collect();
        if !required.is_empty() {
            log::warn!(
                "'{}' requires unsupported extensions {required:?}; display may be incorrect",
                asset.uri
            );
        }

        for node in asset.gltf.nodes() {
            let handle = loader.create_node_shallow(&node);
            loader.node_mapping.push(handle);
        }

        let root = loader.scene.create_node_with_name(root_name);

        for node in asset.gltf.nodes() {
            let parent = loader.node_mapping[node.index()];
            for child in node.children() {
                loader.scene.attach(loader.node_mapping[child.index()], parent);
            }
        }

        let mut top_level = Vec::new();
        if let Some(default_scene) = asset.gltf.default_scene().or_else(|| asset.gltf.scenes().next()) {
            top_level.extend(default_scene.nodes().map(|n| loader.node_mapping[n.index()]));
        }
        // Nodes outside the default scene still belong to the model.
        for &handle in &loader.node_mapping {
            let orphan = loader.scene.get_node(handle).is_some_and(|n| n.parent().is_none());
            if orphan && !top_level.contains(&handle) {
                top_level.push(handle);
            }
        }
        for handle in top_level {
            loader.scene.attach(handle, root);
        }

        let skeleton_keys = loader.load_skins();
        for node in asset.gltf.nodes() {
            loader.bind_node_mesh_and_skin(&node, &skeleton_keys);
        }

        loader.scene.update_matrix_world();
        Ok(root)
    }

    fn create_node_shallow(&mut self, node: &gltf::Node) -> NodeHandle {
        let name = node
            .name()
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
        let handle = self.scene.create_node_with_name(&name);

        if let Some(engine_node) = self.scene.get_node_mut(handle) {
            let (t, r, s) = node.transform().decomposed();
            engine_node.transform.position = Vec3::from_array(t);
            engine_node.transform.rotation = Quat::from_array(r);
            engine_node.transform.scale = Vec3::from_array(s);
        }
        handle
    }

    fn load_skins(&mut self) -> Vec<SkeletonKey> {
        let asset = self.asset;
        let mut skeleton_keys = Vec::new();

        for skin in asset.gltf.skins() {
            let name = skin.name().unwrap_or("Skeleton");

            let reader = skin.reader(|buffer| asset.buffer(&buffer));
            let ibms: Vec<Affine3A> = reader
                .read_inverse_bind_matrices()
                .map(|iter| {
                    iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                        .collect()
                })
                .unwrap_or_default();

            let joints: Vec<_> = skin.joints().collect();
            let bones: Vec<NodeHandle> = joints
                .iter()
                .map(|node| self.node_mapping[node.index()])
                .collect();

            let joint_indices: FxHashSet<usize> = joints.iter().map(gltf::Node::index).collect();
            let child_joint_indices: FxHashSet<usize> = joints
                .iter()
                .flat_map(gltf::Node::children)
                .map(|child| child.index())
                .filter(|index| joint_indices.contains(index))
                .collect();

            // Explicit skeleton root first, then the first joint without a parent joint.
            let root_bone_index = skin
                .skeleton()
                .and_then(|root| joints.iter().position(|n| n.index() == root.index()))
                .or_else(|| {
                    joints
                        .iter()
                        .position(|n| !child_joint_indices.contains(&n.index()))
                })
                .unwrap_or(0);

            let skeleton = Skeleton::new(name, bones, ibms, root_bone_index);
            skeleton_keys.push(self.scene.add_skeleton(skeleton));
        }

        skeleton_keys
    }

    fn bind_node_mesh_and_skin(&mut self, node: &gltf::Node, skeleton_keys: &[SkeletonKey]) {
        let Some(mesh) = node.mesh() else {
            return;
        };
        let node_handle = self.node_mapping[node.index()];
        let skeleton = node.skin().and_then(|skin| skeleton_keys.get(skin.index()).copied());
        let mesh_name = mesh.name().unwrap_or("Mesh");

        let primitives: Vec<_> = mesh.primitives().collect();
        match primitives.as_slice() {
            [] => {}
            [primitive] => {
                let engine_mesh = self.build_engine_mesh(mesh_name, primitive, skeleton);
                self.scene.set_mesh(node_handle, engine_mesh);
            }
            _ => {
                for (i, primitive) in primitives.iter().enumerate() {
                    let engine_mesh = self.build_engine_mesh(mesh_name, primitive, skeleton);
                    let sub_node = self.scene.create_node_with_name(&format!("{mesh_name}_{i}"));
                    self.scene.attach(sub_node, node_handle);
                    self.scene.set_mesh(sub_node, engine_mesh);
                }
            }
        }
    }

    fn build_engine_mesh(
        &self,
        name: &str,
        primitive: &gltf::Primitive,
        skeleton: Option<SkeletonKey>,
    ) -> Mesh {
        let geometry = self.load_primitive_geometry(primitive);
        let source = source_material(&primitive.material());
        let skinned = skeleton.is_some() && geometry.has_skin_attributes();
        let material = MaterialConfig::phong_from_source(&source, self.material, skinned);

        let mut mesh = Mesh::new(name, geometry, material);
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
        mesh.skeleton = skeleton;
        mesh
    }

    fn load_primitive_geometry(&self, primitive: &gltf::Primitive) -> Geometry {
        let asset = self.asset;
        let reader = primitive.reader(|buffer| asset.buffer(&buffer));

        let mut geometry = Geometry {
            positions: reader
                .read_positions()
                .map(|iter| iter.map(Vec3::from_array).collect())
                .unwrap_or_default(),
            ..Geometry::default()
        };
        if geometry.positions.is_empty() {
            return geometry;
        }

        if let Some(iter) = reader.read_normals() {
            geometry.normals = iter.map(Vec3::from_array).collect();
        }
        if let Some(iter) = reader.read_tex_coords(0) {
            geometry.uvs = iter.into_f32().map(Vec2::from_array).collect();
        }
        if let Some(iter) = reader.read_joints(0) {
            geometry.joints = iter.into_u16().collect();
        }
        if let Some(iter) = reader.read_weights(0) {
            geometry.weights = iter.into_f32().map(Vec4::from_array).collect();
        }
        if let Some(iter) = reader.read_indices() {
            geometry.indices = Some(iter.into_u32().collect());
        }

        geometry
    }

    /// Reads every animation in the document. Channels without readable
    /// keyframes and morph-target channels are skipped.
    #[must_use]
    pub fn load_animations(asset: &GltfAsset) -> Vec<AnimationClip> {
        asset
            .gltf
            .animations()
            .map(|anim| load_animation(asset, &anim))
            .collect()
    }
}

fn source_material(material: &gltf::Material) -> MaterialConfig {
    let pbr = material.pbr_metallic_roughness();
    MaterialConfig {
        map: pbr.base_color_texture().map(|info| TextureRef {
            index: info.texture().index(),
            tex_coord: info.tex_coord(),
        }),
        double_sided: material.double_sided(),
        ..MaterialConfig::standard(Vec4::from_array(pbr.base_color_factor()))
    }
}

fn load_animation(asset: &GltfAsset, anim: &gltf::Animation) -> AnimationClip {
    let mut tracks = Vec::new();

    for channel in anim.channels() {
        let reader = channel.reader(|buffer| asset.buffer(&buffer));
        let target = channel.target();
        let node = target.node();
        let node_name = node
            .name()
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string);

        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            log::debug!("Skipping unreadable channel on '{node_name}'");
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let (target_path, data) = match outputs {
            ReadOutputs::Translations(iter) => (
                TargetPath::Translation,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::Rotations(iter) => (
                TargetPath::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::Scales(iter) => (
                TargetPath::Scale,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::MorphTargetWeights(_) => continue,
        };

        tracks.push(Track {
            meta: TrackMeta {
                node_name,
                target: target_path,
            },
            data,
        });
    }

    AnimationClip::new(anim.name().unwrap_or("anim"), tracks)
}
