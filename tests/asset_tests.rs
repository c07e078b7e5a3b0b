//! Asset Loading Tests
//!
//! Tests for:
//! - Avatar loading from GLB, embedded glTF and glTF with an external buffer
//! - Load-time mesh and material setup (shadows, Phong, skinning)
//! - Motion clip loading: first animation only, renamed to its kind
//! - Concurrent clip loading where single failures stay isolated

mod common;

use glam::{Vec3, Vec4};

use avatar_stage::animation::Binder;
use avatar_stage::assets::{AnimationLibrary, AssetReader, FileAssetReader, GltfAsset, MemoryAssetReader};
use avatar_stage::config::{AssetManifest, MaterialSettings, rgb};
use avatar_stage::scene::{Scene, ShadingModel};
use avatar_stage::{AnimationKind, AnimationPlayer, StageError};

use common::{BufferSource, HIPS_BIND, SPINE_BIND, approx, approx_vec3, clip_uri};

fn library(reader: MemoryAssetReader) -> AnimationLibrary<MemoryAssetReader> {
    common::init_logger();
    AnimationLibrary::new(reader, MaterialSettings::default())
}

fn assert_avatar_loaded(reader: MemoryAssetReader, uri: &str) {
    let library = library(reader);
    let mut scene = Scene::new();
    let model = pollster::block_on(library.load_avatar(uri, &mut scene)).unwrap();

    assert_eq!(model.uri, uri);
    assert_eq!(model.mesh_count, 1);
    assert_eq!(model.skinned_mesh_count, 1);

    let root = scene.get_node(model.root).unwrap();
    assert_eq!(root.name, "avatar");
    assert!(root.parent().is_none());
    assert_eq!(root.transform.position, Vec3::ZERO);
    assert_eq!(root.transform.scale, Vec3::ONE);

    let hips = scene.find_node_by_name(model.root, "mixamorig:Hips").unwrap();
    let spine = scene.find_node_by_name(model.root, "mixamorig:Spine").unwrap();
    assert!(approx_vec3(
        scene.get_node(hips).unwrap().world_matrix().translation.into(),
        HIPS_BIND
    ));
    assert!(approx_vec3(
        scene.get_node(spine).unwrap().world_matrix().translation.into(),
        HIPS_BIND + SPINE_BIND
    ));
}

// ============================================================================
// Avatar
// ============================================================================

#[test]
fn avatar_loads_from_glb() {
    let reader = MemoryAssetReader::new().with("Avatar.glb", common::avatar_glb());
    assert_avatar_loaded(reader, "Avatar.glb");
}

#[test]
fn avatar_loads_from_embedded_gltf() {
    let reader = MemoryAssetReader::new().with("Avatar.gltf", common::avatar_gltf_embedded());
    assert_avatar_loaded(reader, "Avatar.gltf");
}

#[test]
fn avatar_loads_external_buffer_next_to_document() {
    let (document, data) = common::avatar_document(BufferSource::External("Avatar.bin"));
    let reader = MemoryAssetReader::new()
        .with("models/Avatar.gltf", serde_json::to_vec(&document).unwrap())
        .with("models/Avatar.bin", data);
    assert_avatar_loaded(reader, "models/Avatar.gltf");
}

#[test]
fn avatar_meshes_get_load_time_setup() {
    let library = library(MemoryAssetReader::new().with("Avatar.glb", common::avatar_glb()));
    let mut scene = Scene::new();
    let model = pollster::block_on(library.load_avatar("Avatar.glb", &mut scene)).unwrap();

    let keys = scene.meshes_under(model.root);
    assert_eq!(keys.len(), 1);
    let mesh = &scene.meshes[keys[0]];

    assert!(mesh.cast_shadow);
    assert!(mesh.receive_shadow);
    assert!(mesh.is_skinned());
    assert_eq!(mesh.geometry.vertex_count(), 3);
    assert_eq!(mesh.geometry.joints.len(), 3);

    let material = &mesh.material;
    assert_eq!(material.shading, ShadingModel::Phong);
    assert!(material.skinning);
    assert_eq!(material.specular, rgb(0x66_6666));
    assert!(approx(material.shininess, 20.0));
    assert!((material.color - Vec4::new(0.8, 0.6, 0.4, 1.0)).length() < 1e-4);

    let skeleton = &scene.skeletons[mesh.skeleton.unwrap()];
    assert_eq!(skeleton.bones.len(), 2);
    let root_bone = skeleton.root_bone().unwrap();
    assert_eq!(scene.get_node(root_bone).unwrap().name, "mixamorig:Hips");
}

#[test]
fn missing_avatar_is_an_asset_error() {
    let library = library(MemoryAssetReader::new());
    let mut scene = Scene::new();
    let err = pollster::block_on(library.load_avatar("Avatar.glb", &mut scene)).unwrap_err();
    assert!(matches!(err, StageError::AssetLoad { ref uri, .. } if uri == "Avatar.glb"));
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn corrupt_avatar_is_an_asset_error() {
    let library = library(MemoryAssetReader::new().with("Avatar.glb", b"not a model".to_vec()));
    let mut scene = Scene::new();
    let err = pollster::block_on(library.load_avatar("Avatar.glb", &mut scene)).unwrap_err();
    assert!(matches!(err, StageError::AssetLoad { .. }));
}

#[test]
fn missing_external_buffer_is_an_asset_error() {
    let (document, _) = common::avatar_document(BufferSource::External("Avatar.bin"));
    let library = library(
        MemoryAssetReader::new().with("Avatar.gltf", serde_json::to_vec(&document).unwrap()),
    );
    let mut scene = Scene::new();
    let err = pollster::block_on(library.load_avatar("Avatar.gltf", &mut scene)).unwrap_err();
    assert!(matches!(err, StageError::AssetLoad { ref uri, .. } if uri == "Avatar.bin"));
}

#[test]
fn model_without_meshes_is_rejected() {
    let library =
        library(MemoryAssetReader::new().with("Empty.gltf", common::motion_without_animation()));
    let mut scene = Scene::new();
    let err = pollster::block_on(library.load_avatar("Empty.gltf", &mut scene)).unwrap_err();
    assert!(matches!(err, StageError::AssetLoad { .. }));
}

// ============================================================================
// Motion clips
// ============================================================================

#[test]
fn clip_takes_first_animation_named_after_kind() {
    let library = library(MemoryAssetReader::new().with("Typing.glb", common::motion_gltf(1.5)));
    let clip = pollster::block_on(library.load_clip(AnimationKind::Typing, "Typing.glb")).unwrap();

    assert_eq!(clip.name, "typing");
    assert!(approx(clip.duration, 1.5));
    assert_eq!(clip.tracks.len(), 2);
    let mut nodes: Vec<_> = clip.tracks.iter().map(|t| t.meta.node_name.as_str()).collect();
    nodes.sort_unstable();
    assert_eq!(nodes, ["Hips", "Spine"]);

    let asset = pollster::block_on(GltfAsset::read(library.reader(), "Typing.glb")).unwrap();
    assert_eq!(asset.animation_count(), 2);
}

#[test]
fn clip_tracks_bind_to_differently_named_bones() {
    let reader = MemoryAssetReader::new()
        .with("Avatar.glb", common::avatar_glb())
        .with("Gaming.glb", common::motion_gltf(1.0));
    let library = library(reader);
    let mut scene = Scene::new();
    let model = pollster::block_on(library.load_avatar("Avatar.glb", &mut scene)).unwrap();
    let clip = pollster::block_on(library.load_clip(AnimationKind::Gaming, "Gaming.glb")).unwrap();

    let bindings = Binder::bind(&scene, model.root, &clip);
    assert_eq!(bindings.len(), 2);
}

#[test]
fn file_without_animation_is_a_clip_error() {
    let library =
        library(MemoryAssetReader::new().with("Gaming.glb", common::motion_without_animation()));
    let err = pollster::block_on(library.load_clip(AnimationKind::Gaming, "Gaming.glb")).unwrap_err();
    assert!(matches!(
        err,
        StageError::ClipLoad {
            kind: AnimationKind::Gaming,
            ..
        }
    ));
}

#[test]
fn unreadable_clip_is_tagged_with_its_kind() {
    let library = library(MemoryAssetReader::new());
    let err =
        pollster::block_on(library.load_clip(AnimationKind::Frisbee, "Frisbee Throw.glb")).unwrap_err();
    match err {
        StageError::ClipLoad { kind, reason } => {
            assert_eq!(kind, AnimationKind::Frisbee);
            assert!(reason.contains("Frisbee Throw.glb"), "reason: {reason}");
        }
        other => panic!("expected ClipLoad, got {other}"),
    }
}

// ============================================================================
// Full load
// ============================================================================

#[test]
fn load_all_fills_every_kind() {
    let library = library(common::stage_reader());
    let mut scene = Scene::new();
    let report =
        pollster::block_on(library.load_all(&AssetManifest::default(), &mut scene)).unwrap();

    assert!(report.is_ready());
    assert!(report.clip_errors.is_empty());
    assert!(report.missing().is_empty());
    assert_eq!(report.clips.loaded_count(), 4);
    assert!(!report.clips.contains(AnimationKind::Rest));
    for kind in AnimationKind::PLAYABLE {
        let clip = report.clips.get(kind).unwrap();
        assert_eq!(clip.name, kind.as_str());
        assert!(approx(clip.duration, common::clip_duration(kind)));
    }
}

#[test]
fn one_failed_clip_leaves_the_others_playable() {
    let mut reader = common::stage_reader();
    reader.fail(clip_uri(AnimationKind::Gaming), "connection reset");
    let library = library(reader);
    let mut scene = Scene::new();
    let report =
        pollster::block_on(library.load_all(&AssetManifest::default(), &mut scene)).unwrap();

    assert!(report.is_ready());
    assert_eq!(report.missing(), vec![AnimationKind::Gaming]);
    assert_eq!(report.clip_errors.len(), 1);
    assert!(matches!(
        report.clip_errors[0],
        StageError::ClipLoad {
            kind: AnimationKind::Gaming,
            ..
        }
    ));

    let mut player = AnimationPlayer::new();
    player.bind(report.model.root, report.clips);
    assert!(matches!(
        player.play(AnimationKind::Gaming, &mut scene),
        Err(StageError::ClipMissing(AnimationKind::Gaming))
    ));
    assert!(player.play(AnimationKind::Typing, &mut scene).is_ok());
}

#[test]
fn every_clip_failing_is_not_ready() {
    let mut reader = common::stage_reader();
    for kind in AnimationKind::PLAYABLE {
        reader.fail(clip_uri(kind), "offline");
    }
    let library = library(reader);
    let mut scene = Scene::new();
    let report =
        pollster::block_on(library.load_all(&AssetManifest::default(), &mut scene)).unwrap();

    assert!(!report.is_ready());
    assert_eq!(report.clip_errors.len(), 4);
    assert_eq!(report.missing().len(), 4);
}

#[test]
fn failed_avatar_fails_the_whole_load() {
    let mut reader = common::stage_reader();
    reader.fail("Avatar.glb", "forbidden");
    let library = library(reader);
    let mut scene = Scene::new();
    let err = pollster::block_on(library.load_all(&AssetManifest::default(), &mut scene)).unwrap_err();
    assert!(matches!(err, StageError::AssetLoad { .. }));
}

// ============================================================================
// File reader
// ============================================================================

#[tokio::test]
async fn file_reader_loads_assets_from_directory() {
    common::init_logger();
    let dir = std::env::temp_dir().join(format!("avatar-stage-assets-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let manifest = AssetManifest::default();
    let (document, bin) = common::avatar_document(BufferSource::External("Avatar.bin"));
    std::fs::write(dir.join("Avatar.gltf"), serde_json::to_vec(&document).unwrap()).unwrap();
    std::fs::write(dir.join("Avatar.bin"), &bin).unwrap();
    for (kind, uri) in &manifest.clips {
        std::fs::write(dir.join(uri), common::motion_gltf(common::clip_duration(*kind))).unwrap();
    }

    let reader = FileAssetReader::new(&dir);
    assert_eq!(reader.root_path(), dir.as_path());
    match reader.read_bytes("Nope.glb").await {
        Err(StageError::AssetLoad { uri, .. }) => assert_eq!(uri, "Nope.glb"),
        other => panic!("expected an asset error, got {other:?}"),
    }

    let manifest = AssetManifest {
        avatar: "Avatar.gltf".into(),
        ..manifest
    };
    let mut scene = Scene::new();
    let report = AnimationLibrary::new(reader, MaterialSettings::default())
        .load_all(&manifest, &mut scene)
        .await;
    std::fs::remove_dir_all(&dir).unwrap();

    let report = report.unwrap();
    assert!(report.is_ready());
    assert!(report.clip_errors.is_empty());
    assert!(report.missing().is_empty());
    assert!(scene.find_node_by_name(report.model.root, "mixamorig:Spine").is_some());
}
