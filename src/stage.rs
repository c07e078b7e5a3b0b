//! The explicit context object tying viewport, asset loading, animation
//! playback and camera choreography together.
//!
//! ```rust,ignore
//! let mut host = HeadlessHost::new(800, 600);
//! let mut stage = AvatarStage::new(StageConfig::default(), FileAssetReader::new("assets"))?;
//! stage.initialize(&mut host)?;
//! stage.load().await?;
//! let done = stage.play("typing", Instant::now())?;
//! loop {
//!     stage.frame(&mut host, Instant::now());
//! }
//! ```

use crate::animation::AnimationKind;
use crate::assets::{AnimationLibrary, AssetReader, AvatarModel};
use crate::choreographer::{CameraChoreographer, TransitionStep};
use crate::config::StageConfig;
use crate::errors::{Result, StageError};
use crate::player::{AnimationPlayer, PlayHandle};
use crate::utils::time::{Clock, Instant};
use crate::viewport::{RenderSurface, Viewport, ViewportHost};

/// Observable state for the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStatus {
    pub initialized: bool,
    pub loading: bool,
    /// Most recent failure, readable.
    pub error: Option<String>,
    /// Per-clip load failures of the last load.
    pub clip_errors: Vec<String>,
    /// Model loaded and at least one clip available.
    pub ready: bool,
    pub current_animation: Option<AnimationKind>,
    /// Set while the player resets to rest.
    pub transitioning: bool,
    pub camera_moving: bool,
}

/// What one [`AvatarStage::frame`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Animation that finished during this frame.
    pub finished: Option<AnimationKind>,
    pub camera: TransitionStep,
}

pub struct AvatarStage<R: AssetReader, S: RenderSurface> {
    config: StageConfig,
    library: AnimationLibrary<R>,
    viewport: Option<Viewport<S>>,
    model: Option<AvatarModel>,
    player: AnimationPlayer,
    choreographer: CameraChoreographer,
    clock: Clock,
    loading: bool,
    error: Option<String>,
    clip_errors: Vec<String>,
}

impl<R: AssetReader, S: RenderSurface> AvatarStage<R, S> {
    /// Validates `config`; nothing is created until [`AvatarStage::initialize`].
    pub fn new(config: StageConfig, reader: R) -> Result<Self> {
        config.validate()?;
        let library = AnimationLibrary::new(reader, config.material.clone());
        let choreographer = CameraChoreographer::new(config.presets.clone(), &config.transition);
        Ok(Self {
            config,
            library,
            viewport: None,
            model: None,
            player: AnimationPlayer::new(),
            choreographer,
            clock: Clock::new(),
            loading: false,
            error: None,
            clip_errors: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Option<&Viewport<S>> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport<S>> {
        self.viewport.as_mut()
    }

    #[must_use]
    pub fn model(&self) -> Option<&AvatarModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    #[must_use]
    pub fn choreographer(&self) -> &CameraChoreographer {
        &self.choreographer
    }

    #[must_use]
    pub fn status(&self) -> StageStatus {
        StageStatus {
            initialized: self.viewport.as_ref().is_some_and(Viewport::is_active),
            loading: self.loading,
            error: self.error.clone(),
            clip_errors: self.clip_errors.clone(),
            ready: self.is_ready(),
            current_animation: self.player.current(),
            transitioning: self.player.is_transitioning(),
            camera_moving: self.choreographer.is_moving(),
        }
    }

    /// Model loaded, mixer bound and at least one clip available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.player.is_bound() && self.player.clips().loaded_count() > 0
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::error!("{err}");
            self.error = Some(err.to_string());
        }
        result
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Creates the viewport inside `host`'s container. Does nothing if an
    /// active viewport already exists.
    pub fn initialize<H>(&mut self, host: &mut H) -> Result<()>
    where
        H: ViewportHost<Surface = S>,
    {
        if self.viewport.as_ref().is_some_and(Viewport::is_active) {
            log::warn!("Viewport already initialized");
            return Ok(());
        }
        let result = Viewport::initialize(host, &self.config);
        let viewport = self.record(result)?;
        self.viewport = Some(viewport);
        self.model = None;
        self.player.unbind();
        self.clock.reset();
        self.error = None;
        Ok(())
    }

    /// Loads the avatar into the viewport's scene, then all motion clips
    /// concurrently.
    ///
    /// Fails with [`StageError::AssetLoad`] when the model cannot be loaded
    /// and with [`StageError::NotReady`] when no clip at all could be loaded;
    /// individual clip failures only show up in [`StageStatus::clip_errors`].
    pub async fn load(&mut self) -> Result<()> {
        let Some(viewport) = self.viewport.as_mut().filter(|v| v.is_active()) else {
            let err = StageError::NotReady("viewport not initialized");
            return self.record(Err(err));
        };

        self.loading = true;
        self.error = None;
        self.clip_errors.clear();
        self.choreographer.cancel();
        self.player.unbind();
        if let Some(previous) = self.model.take() {
            viewport.scene.remove_subtree(previous.root);
        }

        let result = self
            .library
            .load_all(&self.config.assets, &mut viewport.scene)
            .await;
        self.loading = false;

        let report = self.record(result)?;

        self.clip_errors = report.clip_errors.iter().map(ToString::to_string).collect();
        self.error = self.clip_errors.last().cloned();
        let ready = report.is_ready();
        self.player.bind(report.model.root, report.clips);
        self.model = Some(report.model);

        if !ready {
            return self.record(Err(StageError::NotReady("no animation clip could be loaded")));
        }
        log::info!("Stage ready");
        Ok(())
    }

    /// Moves the camera to `name`'s preset and starts that animation.
    ///
    /// Unknown names fail with [`StageError::UnknownAnimation`]; see
    /// [`AnimationPlayer::play`] for the other failures. The camera only
    /// moves when playback could start.
    pub fn play(&mut self, name: &str, now: Instant) -> Result<PlayHandle> {
        let result = name.parse::<AnimationKind>();
        let kind = self.record(result)?;
        self.play_kind(kind, now)
    }

    pub fn play_kind(&mut self, kind: AnimationKind, now: Instant) -> Result<PlayHandle> {
        let result = match self.viewport.as_mut() {
            Some(viewport) => self.player.play(kind, &mut viewport.scene),
            None => Err(StageError::NotReady("viewport not initialized")),
        };
        let handle = self.record(result)?;
        self.move_camera(kind.as_str(), now);
        Ok(handle)
    }

    /// Stops playback, restores the bind pose and moves the camera back to
    /// the rest preset.
    pub fn reset_to_rest(&mut self, now: Instant) -> Result<()> {
        let result = match self.viewport.as_mut() {
            Some(viewport) => self.player.reset_to_rest(&mut viewport.scene),
            None => Err(StageError::NotReady("viewport not initialized")),
        };
        self.record(result)?;
        self.move_camera(AnimationKind::Rest.as_str(), now);
        Ok(())
    }

    /// Starts a camera transition to the preset `name` (rest for unknown
    /// names). Returns `false` when there is no active viewport.
    pub fn move_camera(&mut self, name: &str, now: Instant) -> bool {
        let Some(viewport) = self.viewport.as_ref().filter(|v| v.is_active()) else {
            return false;
        };
        self.choreographer
            .move_to(name, &viewport.camera, &viewport.controls, now);
        true
    }

    pub fn handle_resize<H>(&mut self, host: &H)
    where
        H: ViewportHost<Surface = S>,
    {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.handle_resize(host);
        }
    }

    /// One frame: pending resize, mixer tick, camera transition step,
    /// controls update and redraw, then the next frame request.
    ///
    /// A no-op returning `None` before initialization or after teardown.
    pub fn frame<H>(&mut self, host: &mut H, now: Instant) -> Option<FrameOutcome>
    where
        H: ViewportHost<Surface = S>,
    {
        let viewport = self.viewport.as_mut().filter(|v| v.is_active())?;
        let dt = self.clock.tick(now).as_secs_f32();

        viewport.poll_resize(host);
        let finished = self.player.tick(dt, &mut viewport.scene);
        let camera = self
            .choreographer
            .update(now, &mut viewport.camera, &mut viewport.controls);
        viewport.render_frame(dt);
        viewport.request_frame(host);

        Some(FrameOutcome { finished, camera })
    }

    /// Cancels the camera transition and pending frame, stops playback,
    /// unsubscribes from resizes and releases the graphics context.
    /// Safe to call repeatedly.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: ViewportHost<Surface = S>,
    {
        self.choreographer.cancel();
        self.player.unbind();
        self.model = None;
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.teardown(host);
        }
    }
}
