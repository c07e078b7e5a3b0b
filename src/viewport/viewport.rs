use glam::Vec3;

use crate::config::{StageConfig, rgb};
use crate::controls::{Input, OrbitControls};
use crate::errors::{Result, StageError};
use crate::scene::{Light, LightKey, PerspectiveCamera, Scene};
use crate::viewport::host::{FrameRequestId, ListenerId, RenderSurface, SurfaceSize, ViewportHost};

/// Render surface, scene, camera and orbit controls of one container.
///
/// Created by [`Viewport::initialize`]; released by [`Viewport::teardown`].
/// Every operation on a torn-down viewport is a no-op.
pub struct Viewport<S: RenderSurface> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub input: Input,

    surface: Option<S>,
    size: SurfaceSize,
    pixel_ratio: f32,
    resize_listener: Option<ListenerId>,
    frame_request: Option<FrameRequestId>,
    sun: LightKey,
}

impl<S: RenderSurface> Viewport<S> {
    /// Creates the surface sized to the container, the camera, the controls,
    /// the lights and the background, and subscribes to container resizes.
    ///
    /// Fails with [`StageError::Initialization`] when the container is
    /// missing or has zero area, or when the host has no graphics context.
    pub fn initialize<H>(host: &mut H, config: &StageConfig) -> Result<Self>
    where
        H: ViewportHost<Surface = S>,
    {
        let size = host
            .container_size()
            .ok_or_else(|| StageError::Initialization("container element not found".into()))?;
        if size.is_empty() {
            return Err(StageError::Initialization(format!(
                "container has zero area ({}x{})",
                size.width, size.height
            )));
        }

        let mut surface = host.create_surface(&config.renderer, size)?;
        let pixel_ratio = host
            .device_pixel_ratio()
            .min(config.renderer.max_pixel_ratio)
            .max(f32::EPSILON);
        surface.set_pixel_ratio(pixel_ratio);
        surface.set_size(size);

        let mut scene = Scene::new();
        scene.background = Some(rgb(config.background.0));
        scene.add_light(Light::from(&config.ambient_light));
        let sun = scene.add_light(Light::from(&config.directional_light));

        let cam = &config.camera;
        let target = Vec3::from_array(cam.target);
        let mut camera = PerspectiveCamera::new(cam.fov, size.aspect(), cam.near, cam.far);
        camera.set_position(Vec3::from_array(cam.position));
        camera.look_at(target);

        let controls = OrbitControls::from_config(target, &config.controls);
        let mut input = Input::new();
        input.handle_resize(size.width, size.height);

        let resize_listener = Some(host.add_resize_listener());

        log::info!(
            "Viewport initialized: {}x{} @{pixel_ratio}x, fov {}",
            size.width,
            size.height,
            cam.fov
        );

        Ok(Self {
            scene,
            camera,
            controls,
            input,
            surface: Some(surface),
            size,
            pixel_ratio,
            resize_listener,
            frame_request: None,
            sun,
        })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// The shadow-casting directional light.
    #[must_use]
    pub fn sun(&self) -> Option<&Light> {
        self.scene.lights.get(self.sun)
    }

    /// Re-reads the container size and syncs camera aspect and surface size.
    /// A missing or zero-area container is ignored.
    pub fn handle_resize<H>(&mut self, host: &H)
    where
        H: ViewportHost<Surface = S>,
    {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let Some(size) = host.container_size().filter(|s| !s.is_empty()) else {
            log::debug!("Ignoring resize to an empty container");
            return;
        };
        if size == self.size {
            return;
        }

        self.size = size;
        self.camera.aspect = size.aspect();
        self.camera.update_projection_matrix();
        surface.set_size(size);
        self.input.handle_resize(size.width, size.height);
        log::debug!("Viewport resized to {}x{}", size.width, size.height);
    }

    /// Handles a resize notification if one arrived since the last poll.
    pub fn poll_resize<H>(&mut self, host: &mut H)
    where
        H: ViewportHost<Surface = S>,
    {
        if let Some(id) = self.resize_listener
            && host.take_resize(id)
        {
            self.handle_resize(host);
        }
    }

    /// Advances controls damping by `dt` seconds and draws one frame.
    pub fn render_frame(&mut self, dt: f32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.controls.update(&mut self.camera, &self.input, dt);
        self.input.end_frame();
        self.scene.update_matrix_world();
        surface.render(&self.scene, &self.camera);
    }

    /// Schedules the next frame callback, replacing the tracked request.
    pub fn request_frame<H>(&mut self, host: &mut H)
    where
        H: ViewportHost<Surface = S>,
    {
        if self.surface.is_none() {
            return;
        }
        if let Some(stale) = self.frame_request.take() {
            host.cancel_frame(stale);
        }
        self.frame_request = Some(host.request_frame());
    }

    /// Cancels the pending frame, unsubscribes from resizes and releases the
    /// graphics context. Safe to call more than once.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: ViewportHost<Surface = S>,
    {
        if let Some(id) = self.frame_request.take() {
            host.cancel_frame(id);
        }
        if let Some(id) = self.resize_listener.take() {
            host.remove_resize_listener(id);
        }
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
            surface.force_context_loss();
            log::info!("Viewport torn down");
        }
    }
}
