//! Plays every animation of the stock avatar in turn on a headless viewport
//! and logs where the camera goes.
//!
//! ```text
//! stage_tour [ASSET_DIR] [CONFIG_JSON]
//! ```
//!
//! `ASSET_DIR` defaults to `assets` and must contain the files named by the
//! configuration's asset manifest.

use std::time::Duration;

use avatar_stage::viewport::HeadlessSurface;
use avatar_stage::{
    AnimationKind, AvatarStage, FileAssetReader, HeadlessHost, Instant, PlayOutcome, StageConfig,
    TransitionStep,
};

const FRAME: Duration = Duration::from_micros(16_667);
const LOG_EVERY: u64 = 15;
/// Upper bound for a single animation, in frames.
const MAX_FRAMES: u64 = 60 * 60;

type Stage = AvatarStage<FileAssetReader, HeadlessSurface>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let asset_dir = args.next().unwrap_or_else(|| "assets".to_string());
    let config = match args.next() {
        Some(path) => StageConfig::from_file(&path)?,
        None => StageConfig::default(),
    };

    let mut host = HeadlessHost::new(1280, 720).with_device_pixel_ratio(2.0);
    let reader = FileAssetReader::new(&asset_dir);
    log::info!("Reading assets from {}", reader.root_path().display());
    let mut stage: Stage = AvatarStage::new(config, reader)?;
    stage.initialize(&mut host)?;

    if let Err(err) = stage.load().await {
        log::error!("Load failed: {err}");
        stage.teardown(&mut host);
        return Err(err.into());
    }
    for message in &stage.status().clip_errors {
        log::warn!("{message}");
    }

    let mut now = Instant::now();
    for kind in AnimationKind::PLAYABLE {
        if !stage.player().clips().contains(kind) {
            log::warn!("Skipping '{kind}': clip missing");
            continue;
        }
        now = tour(&mut stage, &mut host, kind, now)?;
    }

    stage.reset_to_rest(now)?;
    now = settle_camera(&mut stage, &mut host, now);
    log_camera(&stage, "rest");

    stage.teardown(&mut host);
    let stats = host.stats();
    log::info!(
        "Done: {} frames rendered, context released: {}",
        stats.frames_rendered,
        stats.context_lost
    );
    Ok(())
}

/// Plays `kind` to completion starting at `now`; returns the time it ended.
fn tour(
    stage: &mut Stage,
    host: &mut HeadlessHost,
    kind: AnimationKind,
    mut now: Instant,
) -> anyhow::Result<Instant> {
    log::info!("=== {} ===", kind.label());
    let mut handle = stage.play_kind(kind, now)?;

    for frame in 0..MAX_FRAMES {
        host.fire_frames();
        let Some(outcome) = stage.frame(host, now) else {
            anyhow::bail!("viewport went away while playing '{kind}'");
        };
        if frame % LOG_EVERY == 0 {
            log_camera(stage, kind.as_str());
        }
        if outcome.camera == TransitionStep::Arrived {
            log_camera(stage, "arrived");
        }
        if let Some(result) = handle.try_outcome() {
            match result {
                PlayOutcome::Finished => log::info!("'{kind}' finished after {frame} frames"),
                other => log::warn!("'{kind}' ended early: {other:?}"),
            }
            return Ok(settle_camera(stage, host, now + FRAME));
        }
        now += FRAME;
    }
    anyhow::bail!("'{kind}' did not finish within {MAX_FRAMES} frames")
}

/// Runs frames until no camera transition is active.
fn settle_camera(stage: &mut Stage, host: &mut HeadlessHost, mut now: Instant) -> Instant {
    while stage.choreographer().is_moving() {
        host.fire_frames();
        if stage.frame(host, now).is_none() {
            break;
        }
        now += FRAME;
    }
    now
}

fn log_camera(stage: &Stage, label: &str) {
    if let Some(viewport) = stage.viewport() {
        let p = viewport.camera.position();
        let t = viewport.controls.target;
        log::info!(
            "[{label}] camera ({:.2}, {:.2}, {:.2}) -> target ({:.2}, {:.2}, {:.2})",
            p.x,
            p.y,
            p.z,
            t.x,
            t.y,
            t.z
        );
    }
}
