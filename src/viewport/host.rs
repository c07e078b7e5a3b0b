use crate::config::RendererConfig;
use crate::errors::Result;
use crate::scene::{PerspectiveCamera, Scene};

/// Container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Handle of a resize subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle of a pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Rendering backend bound to one container.
pub trait RenderSurface {
    fn set_size(&mut self, size: SurfaceSize);

    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Draws `scene` as seen from `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);

    /// Releases GPU resources.
    fn dispose(&mut self);

    /// Releases the graphics context itself.
    fn force_context_loss(&mut self);
}

/// The environment a viewport is embedded in.
pub trait ViewportHost {
    type Surface: RenderSurface;

    /// `None` when the container element does not exist.
    fn container_size(&self) -> Option<SurfaceSize>;

    fn device_pixel_ratio(&self) -> f32;

    /// Fails with [`StageError::Initialization`](crate::errors::StageError::Initialization)
    /// when no graphics context is available.
    fn create_surface(&mut self, config: &RendererConfig, size: SurfaceSize) -> Result<Self::Surface>;

    fn add_resize_listener(&mut self) -> ListenerId;

    fn remove_resize_listener(&mut self, id: ListenerId);

    /// Consumes a resize notification delivered to `id` since the last call.
    fn take_resize(&mut self, id: ListenerId) -> bool;

    /// Schedules the next frame callback.
    fn request_frame(&mut self) -> FrameRequestId;

    fn cancel_frame(&mut self, id: FrameRequestId);
}
