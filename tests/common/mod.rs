//! Shared fixtures: tiny glTF documents built in memory.
//!
//! The avatar is a two-bone rig (`mixamorig:Hips` -> `mixamorig:Spine`)
//! under an `Armature` node plus one skinned triangle. Motion files animate
//! the same bones, named the way a different export would name them.

#![allow(dead_code)]

use base64::Engine as _;
use glam::{Mat4, Quat, Vec3};
use serde_json::{Value, json};

use avatar_stage::AnimationKind;
use avatar_stage::assets::MemoryAssetReader;
use avatar_stage::config::AssetManifest;

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

pub const HIPS_BIND: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const SPINE_BIND: Vec3 = Vec3::new(0.0, 0.5, 0.0);

// ============================================================================
// Buffer packing
// ============================================================================

#[derive(Default)]
struct BufferBuilder {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferBuilder {
    fn align(&mut self) {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
    }

    fn push_view(&mut self, bytes: &[u8]) -> usize {
        self.align();
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));
        self.views.len() - 1
    }

    fn push_f32(&mut self, values: &[f32], kind: &str, components: usize, with_bounds: bool) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes);
        let count = values.len() / components;
        let mut accessor = json!({
            "bufferView": view,
            "componentType": 5126,
            "count": count,
            "type": kind,
        });
        if with_bounds {
            let mut min = vec![f32::MAX; components];
            let mut max = vec![f32::MIN; components];
            for chunk in values.chunks(components) {
                for (i, v) in chunk.iter().enumerate() {
                    min[i] = min[i].min(*v);
                    max[i] = max[i].max(*v);
                }
            }
            accessor["min"] = json!(min);
            accessor["max"] = json!(max);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    fn push_u16x4(&mut self, values: &[u16]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes);
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": 5123,
            "count": values.len() / 4,
            "type": "VEC4",
        }));
        self.accessors.len() - 1
    }

    fn finish(mut self) -> (Vec<Value>, Vec<Value>, Vec<u8>) {
        self.align();
        (self.views, self.accessors, self.data)
    }
}

/// Where the binary buffer of a fixture lives.
#[derive(Clone, Copy)]
pub enum BufferSource<'a> {
    /// Base64 data URI inside the JSON.
    Embedded,
    /// External file, resolved next to the document.
    External(&'a str),
    /// GLB binary chunk.
    Glb,
}

fn buffer_entry(source: BufferSource, data: &[u8]) -> Value {
    match source {
        BufferSource::Embedded => json!({
            "byteLength": data.len(),
            "uri": format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(data)
            ),
        }),
        BufferSource::External(uri) => json!({ "byteLength": data.len(), "uri": uri }),
        BufferSource::Glb => json!({ "byteLength": data.len() }),
    }
}

/// Packs a JSON document and its binary chunk into a GLB container.
pub fn to_glb(document: &Value, bin: &[u8]) -> Vec<u8> {
    let mut json_bytes = serde_json::to_vec(document).unwrap();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    out.extend_from_slice(&json_bytes);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
    out.extend_from_slice(&bin);
    out
}

// ============================================================================
// Avatar
// ============================================================================

/// JSON document plus binary buffer of the avatar.
pub fn avatar_document(source: BufferSource) -> (Value, Vec<u8>) {
    let mut b = BufferBuilder::default();

    let positions = b.push_f32(
        &[-0.5, 1.0, 0.0, 0.5, 1.0, 0.0, 0.0, 1.8, 0.0],
        "VEC3",
        3,
        true,
    );
    let normals = b.push_f32(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0], "VEC3", 3, false);
    let joints = b.push_u16x4(&[0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
    let weights = b.push_f32(
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        "VEC4",
        4,
        false,
    );
    let ibm: Vec<f32> = [HIPS_BIND, HIPS_BIND + SPINE_BIND]
        .iter()
        .flat_map(|&t| Mat4::from_translation(-t).to_cols_array())
        .collect();
    let ibms = b.push_f32(&ibm, "MAT4", 16, false);

    let (views, accessors, data) = b.finish();
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1, 3] },
            { "name": "mixamorig:Hips", "translation": HIPS_BIND.to_array(), "children": [2] },
            { "name": "mixamorig:Spine", "translation": SPINE_BIND.to_array() },
            { "name": "Body", "mesh": 0, "skin": 0 },
        ],
        "meshes": [{
            "name": "Body",
            "primitives": [{
                "attributes": {
                    "POSITION": positions,
                    "NORMAL": normals,
                    "JOINTS_0": joints,
                    "WEIGHTS_0": weights,
                },
                "material": 0,
            }],
        }],
        "materials": [{
            "name": "Skin",
            "pbrMetallicRoughness": { "baseColorFactor": [0.8, 0.6, 0.4, 1.0] },
        }],
        "skins": [{ "joints": [1, 2], "inverseBindMatrices": ibms, "skeleton": 1 }],
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [buffer_entry(source, &data)],
    });
    (document, data)
}

pub fn avatar_glb() -> Vec<u8> {
    let (document, data) = avatar_document(BufferSource::Glb);
    to_glb(&document, &data)
}

pub fn avatar_gltf_embedded() -> Vec<u8> {
    let (document, _) = avatar_document(BufferSource::Embedded);
    serde_json::to_vec(&document).unwrap()
}

// ============================================================================
// Motion files
// ============================================================================

/// Spine rotation the motion fixture reaches at its last keyframe.
pub fn motion_end_rotation() -> Quat {
    Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)
}

/// Hips translation the motion fixture reaches at its last keyframe.
pub const MOTION_END_HIPS: Vec3 = Vec3::new(0.0, 1.2, 0.0);

/// A motion file with one animation of `duration` seconds, named the way a
/// separate export names things (`Armature|mixamo.com|Layer0`, bare bone names).
pub fn motion_gltf(duration: f32) -> Vec<u8> {
    let mut b = BufferBuilder::default();
    let times = b.push_f32(&[0.0, duration], "SCALAR", 1, true);
    let end = motion_end_rotation();
    let rotations = b.push_f32(
        &[0.0, 0.0, 0.0, 1.0, end.x, end.y, end.z, end.w],
        "VEC4",
        4,
        false,
    );
    let translations = b.push_f32(
        &[
            HIPS_BIND.x,
            HIPS_BIND.y,
            HIPS_BIND.z,
            MOTION_END_HIPS.x,
            MOTION_END_HIPS.y,
            MOTION_END_HIPS.z,
        ],
        "VEC3",
        3,
        false,
    );

    let (views, accessors, data) = b.finish();
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Hips", "children": [1] },
            { "name": "Spine" },
        ],
        "animations": [
            {
                "name": "Armature|mixamo.com|Layer0",
                "samplers": [
                    { "input": times, "output": rotations, "interpolation": "LINEAR" },
                    { "input": times, "output": translations, "interpolation": "LINEAR" },
                ],
                "channels": [
                    { "sampler": 0, "target": { "node": 1, "path": "rotation" } },
                    { "sampler": 1, "target": { "node": 0, "path": "translation" } },
                ],
            },
            {
                "name": "Unused",
                "samplers": [{ "input": times, "output": rotations }],
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "rotation" } }],
            },
        ],
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [buffer_entry(BufferSource::Embedded, &data)],
    });
    serde_json::to_vec(&document).unwrap()
}

/// A valid document without any animation.
pub fn motion_without_animation() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "asset": { "version": "2.0" },
        "nodes": [{ "name": "Hips" }],
    }))
    .unwrap()
}

// ============================================================================
// Readers
// ============================================================================

/// Clip duration used for each kind in [`stage_reader`].
pub fn clip_duration(kind: AnimationKind) -> f32 {
    match kind {
        AnimationKind::Frisbee => 0.5,
        _ => 1.0,
    }
}

/// Reader holding the avatar and every motion file of the default manifest.
pub fn stage_reader() -> MemoryAssetReader {
    let manifest = AssetManifest::default();
    let mut reader = MemoryAssetReader::new().with(manifest.avatar.clone(), avatar_glb());
    for (kind, uri) in &manifest.clips {
        reader.insert(uri.clone(), motion_gltf(clip_duration(*kind)));
    }
    reader
}

pub fn clip_uri(kind: AnimationKind) -> String {
    AssetManifest::default().clips[&kind].clone()
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
