//! Stage Integration Tests
//!
//! End-to-end runs of [`AvatarStage`] on a [`HeadlessHost`]:
//! - Lifecycle: initialize, load, teardown, re-initialize
//! - Play with camera choreography driven by explicit frame timestamps
//! - Status reporting for partial and total load failures
//! - Resize handling inside the frame loop

mod common;

use std::time::Duration;

use glam::Vec3;

use avatar_stage::assets::MemoryAssetReader;
use avatar_stage::choreographer::TransitionStep;
use avatar_stage::viewport::HeadlessSurface;
use avatar_stage::{
    AnimationKind, AvatarStage, CameraPreset, FrameOutcome, HeadlessHost, Instant, PlayOutcome,
    StageConfig, StageError,
};

use common::{approx, clip_uri};

type Stage = AvatarStage<MemoryAssetReader, HeadlessSurface>;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn stage_with(reader: MemoryAssetReader) -> Stage {
    common::init_logger();
    AvatarStage::new(StageConfig::default(), reader).unwrap()
}

/// Initialized and loaded on an 800x600 container.
fn ready_stage() -> (Stage, HeadlessHost) {
    let mut host = HeadlessHost::new(800, 600);
    let mut stage = stage_with(common::stage_reader());
    stage.initialize(&mut host).unwrap();
    pollster::block_on(stage.load()).unwrap();
    (stage, host)
}

/// Delivers the pending frame callback and runs one frame at `now`.
fn step(stage: &mut Stage, host: &mut HeadlessHost, now: Instant) -> FrameOutcome {
    host.fire_frames();
    stage.frame(host, now).unwrap()
}

fn camera_position(stage: &Stage) -> Vec3 {
    stage.viewport().unwrap().camera.position()
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn nothing_runs_before_initialize() {
    let mut host = HeadlessHost::new(800, 600);
    let mut stage = stage_with(common::stage_reader());

    assert!(stage.frame(&mut host, Instant::now()).is_none());
    assert!(!stage.move_camera("typing", Instant::now()));
    let err = pollster::block_on(stage.load()).unwrap_err();
    assert!(matches!(err, StageError::NotReady(_)));
    assert!(matches!(
        stage.play("typing", Instant::now()),
        Err(StageError::NotReady(_))
    ));
    assert!(stage.status().error.is_some());
    assert!(!stage.status().initialized);
}

#[test]
fn load_reports_ready_status() {
    let (stage, host) = ready_stage();
    let status = stage.status();

    assert!(status.initialized);
    assert!(status.ready);
    assert!(!status.loading);
    assert_eq!(status.error, None);
    assert!(status.clip_errors.is_empty());
    assert_eq!(status.current_animation, None);
    assert!(!status.camera_moving);

    let model = stage.model().unwrap();
    assert_eq!(model.mesh_count, 1);
    assert_eq!(stage.player().clips().loaded_count(), 4);
    assert_eq!(host.listener_count(), 1);
}

#[test]
fn initialize_twice_keeps_viewport() {
    let (mut stage, mut host) = ready_stage();
    stage.initialize(&mut host).unwrap();
    assert_eq!(host.listener_count(), 1);
    assert!(stage.is_ready());
}

#[test]
fn initialize_failure_is_recorded() {
    let mut host = HeadlessHost::without_container();
    let mut stage = stage_with(common::stage_reader());

    let err = stage.initialize(&mut host).unwrap_err();
    assert!(matches!(err, StageError::Initialization(_)));
    let status = stage.status();
    assert!(!status.initialized);
    assert!(status.error.unwrap().contains("container"));
}

#[test]
fn reloading_replaces_the_model() {
    let (mut stage, _host) = ready_stage();
    let nodes_before = stage.viewport().unwrap().scene.node_count();

    pollster::block_on(stage.load()).unwrap();
    assert_eq!(stage.viewport().unwrap().scene.node_count(), nodes_before);
    assert!(stage.is_ready());
}

// ============================================================================
// Playback + camera
// ============================================================================

#[test]
fn play_moves_camera_and_finishes() {
    let (mut stage, mut host) = ready_stage();
    let t0 = Instant::now();

    let mut handle = stage.play("typing", t0).unwrap();
    let status = stage.status();
    assert_eq!(status.current_animation, Some(AnimationKind::Typing));
    assert!(status.camera_moving);

    let first = step(&mut stage, &mut host, t0);
    assert_eq!(first.finished, None);
    assert_eq!(first.camera, TransitionStep::Moving);

    let mid = step(&mut stage, &mut host, t0 + ms(500));
    assert_eq!(mid.camera, TransitionStep::Moving);
    assert_eq!(handle.try_outcome(), None);

    let last = step(&mut stage, &mut host, t0 + ms(1000));
    assert_eq!(last.finished, Some(AnimationKind::Typing));
    assert_eq!(last.camera, TransitionStep::Arrived);
    assert_eq!(handle.try_outcome(), Some(PlayOutcome::Finished));

    let typing = Vec3::new(0.0, 3.0, -4.0);
    assert_eq!(camera_position(&stage), typing);
    assert_eq!(
        stage.viewport().unwrap().controls.target,
        Vec3::new(0.0, 0.8, 0.0)
    );
    assert_eq!(host.stats().last_camera_position, typing);
    let stats = host.stats();
    assert_eq!(stats.frames_rendered, 3);
    assert_eq!(stats.last_visible_meshes, 1);
    assert_eq!(stats.last_joint_matrices, 2);

    let status = stage.status();
    assert_eq!(status.current_animation, None);
    assert!(!status.camera_moving);
}

#[test]
fn later_play_wins() {
    let (mut stage, mut host) = ready_stage();
    let t0 = Instant::now();

    let mut climbing = stage.play("climbing", t0).unwrap();
    step(&mut stage, &mut host, t0);
    step(&mut stage, &mut host, t0 + ms(300));
    let mut frisbee = stage.play("frisbee", t0 + ms(300)).unwrap();
    assert_eq!(climbing.try_outcome(), Some(PlayOutcome::Superseded));

    let done = step(&mut stage, &mut host, t0 + ms(800));
    assert_eq!(done.finished, Some(AnimationKind::Frisbee));
    assert_eq!(frisbee.try_outcome(), Some(PlayOutcome::Finished));
    // Frisbee is shorter than the camera move.
    assert_eq!(done.camera, TransitionStep::Moving);

    let arrived = step(&mut stage, &mut host, t0 + ms(1300));
    assert_eq!(arrived.camera, TransitionStep::Arrived);
    assert_eq!(camera_position(&stage), Vec3::new(-5.0, 1.0, 2.0));
}

#[test]
fn reset_returns_camera_to_rest() {
    let (mut stage, mut host) = ready_stage();
    let t0 = Instant::now();

    let mut handle = stage.play("gaming", t0).unwrap();
    step(&mut stage, &mut host, t0);
    step(&mut stage, &mut host, t0 + ms(1000));

    stage.reset_to_rest(t0 + ms(1000)).unwrap();
    assert_eq!(handle.try_outcome(), Some(PlayOutcome::Finished));
    assert_eq!(stage.status().current_animation, None);
    assert!(stage.status().camera_moving);

    step(&mut stage, &mut host, t0 + ms(2000));
    assert_eq!(camera_position(&stage), CameraPreset::REST.position());
}

#[test]
fn unknown_animation_is_rejected_without_camera_move() {
    let (mut stage, _host) = ready_stage();
    let err = stage.play("dancing", Instant::now()).unwrap_err();

    assert!(matches!(err, StageError::UnknownAnimation(_)));
    assert!(!stage.status().camera_moving);
    assert!(stage.status().error.unwrap().contains("dancing"));
}

#[test]
fn move_camera_accepts_any_name() {
    let (mut stage, mut host) = ready_stage();
    let t0 = Instant::now();

    assert!(stage.move_camera("climbing", t0));
    step(&mut stage, &mut host, t0 + ms(1000));
    assert_eq!(camera_position(&stage), Vec3::new(2.0, 4.0, -5.0));

    assert!(stage.move_camera("nowhere", t0 + ms(1000)));
    step(&mut stage, &mut host, t0 + ms(2000));
    assert_eq!(camera_position(&stage), CameraPreset::REST.position());
}

// ============================================================================
// Partial failures
// ============================================================================

#[test]
fn failed_clip_is_reported_but_stage_is_ready() {
    let mut reader = common::stage_reader();
    reader.fail(clip_uri(AnimationKind::Gaming), "connection reset");
    let mut host = HeadlessHost::new(800, 600);
    let mut stage = stage_with(reader);
    stage.initialize(&mut host).unwrap();
    pollster::block_on(stage.load()).unwrap();

    let status = stage.status();
    assert!(status.ready);
    assert_eq!(status.clip_errors.len(), 1);
    assert!(status.clip_errors[0].contains("gaming"));
    assert!(status.error.is_some());

    let err = stage.play("gaming", Instant::now()).unwrap_err();
    assert!(matches!(err, StageError::ClipMissing(AnimationKind::Gaming)));
    assert!(!stage.status().camera_moving);

    assert!(stage.play("typing", Instant::now()).is_ok());
}

#[test]
fn no_clips_means_not_ready() {
    let mut reader = common::stage_reader();
    for kind in AnimationKind::PLAYABLE {
        reader.fail(clip_uri(kind), "offline");
    }
    let mut host = HeadlessHost::new(800, 600);
    let mut stage = stage_with(reader);
    stage.initialize(&mut host).unwrap();

    let err = pollster::block_on(stage.load()).unwrap_err();
    assert!(matches!(err, StageError::NotReady(_)));
    let status = stage.status();
    assert!(!status.ready);
    assert_eq!(status.clip_errors.len(), 4);
    assert!(stage.model().is_some());

    // The model is bound, so resetting still works.
    stage.reset_to_rest(Instant::now()).unwrap();
}

#[test]
fn failed_model_is_fatal() {
    let mut reader = common::stage_reader();
    reader.fail("Avatar.glb", "forbidden");
    let mut host = HeadlessHost::new(800, 600);
    let mut stage = stage_with(reader);
    stage.initialize(&mut host).unwrap();

    let err = pollster::block_on(stage.load()).unwrap_err();
    assert!(matches!(err, StageError::AssetLoad { .. }));
    let status = stage.status();
    assert!(!status.ready);
    assert!(!status.loading);
    assert!(status.error.unwrap().contains("forbidden"));
    assert!(matches!(
        stage.play("typing", Instant::now()),
        Err(StageError::NotReady(_))
    ));
}

// ============================================================================
// Resize & teardown
// ============================================================================

#[test]
fn frame_loop_applies_resizes() {
    let (mut stage, mut host) = ready_stage();
    let viewport = stage.viewport().unwrap();
    assert!(approx(viewport.camera.aspect, 800.0 / 600.0));

    host.resize(400, 300);
    step(&mut stage, &mut host, Instant::now());

    let viewport = stage.viewport().unwrap();
    assert!(approx(viewport.camera.aspect, 400.0 / 300.0));
    assert_eq!(host.stats().size.width, 400);
    assert_eq!(host.stats().size.height, 300);
}

#[test]
fn teardown_is_idempotent_and_final() {
    let (mut stage, mut host) = ready_stage();
    let t0 = Instant::now();
    let mut handle = stage.play("climbing", t0).unwrap();
    step(&mut stage, &mut host, t0);
    assert_eq!(host.pending_frame_count(), 1);

    stage.teardown(&mut host);
    stage.teardown(&mut host);

    assert_eq!(handle.try_outcome(), Some(PlayOutcome::Stopped));
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.pending_frame_count(), 0);
    let stats = host.stats();
    assert!(stats.disposed);
    assert!(stats.context_lost);

    let status = stage.status();
    assert!(!status.initialized);
    assert!(!status.ready);
    assert!(!status.camera_moving);
    assert!(stage.frame(&mut host, t0 + ms(100)).is_none());
}

#[test]
fn frames_ahead_of_the_host_keep_one_request() {
    let (mut stage, mut host) = ready_stage();
    let t0 = Instant::now();
    stage.frame(&mut host, t0).unwrap();
    stage.frame(&mut host, t0 + ms(16)).unwrap();
    assert_eq!(host.pending_frame_count(), 1);

    stage.teardown(&mut host);
    assert_eq!(host.pending_frame_count(), 0);
}

#[test]
fn stage_can_be_initialized_again_after_teardown() {
    let (mut stage, mut host) = ready_stage();
    stage.teardown(&mut host);

    stage.initialize(&mut host).unwrap();
    assert!(stage.status().initialized);
    assert!(!stage.is_ready());
    pollster::block_on(stage.load()).unwrap();
    assert!(stage.is_ready());
}
