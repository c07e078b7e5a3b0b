use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;

use crate::config::RendererConfig;
use crate::errors::{Result, StageError};
use crate::scene::{PerspectiveCamera, Scene};
use crate::viewport::host::{FrameRequestId, ListenerId, RenderSurface, SurfaceSize, ViewportHost};

/// What a [`HeadlessSurface`] has been asked to do so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceStats {
    pub size: SurfaceSize,
    pub pixel_ratio: f32,
    pub shadows: bool,
    pub frames_rendered: u64,
    pub last_camera_position: Vec3,
    pub last_view_projection: Mat4,
    pub last_visible_meshes: usize,
    /// Joint matrices computed for skinned meshes in the last frame.
    pub last_joint_matrices: usize,
    pub disposed: bool,
    pub context_lost: bool,
}

/// Render surface that records draw calls instead of drawing.
#[derive(Debug)]
pub struct HeadlessSurface {
    stats: Rc<RefCell<SurfaceStats>>,
}

impl RenderSurface for HeadlessSurface {
    fn set_size(&mut self, size: SurfaceSize) {
        self.stats.borrow_mut().size = size;
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.stats.borrow_mut().pixel_ratio = ratio;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let mut visible = 0;
        let mut joints = 0;
        for node in scene.nodes().values().filter(|node| node.visible) {
            let Some(mesh) = node.mesh.and_then(|key| scene.meshes.get(key)) else {
                continue;
            };
            visible += 1;
            if let Some(skeleton) = mesh.skeleton.and_then(|key| scene.skeletons.get(key)) {
                joints += skeleton
                    .joint_matrices(scene.nodes(), node.world_matrix().inverse())
                    .len();
            }
        }

        let mut stats = self.stats.borrow_mut();
        stats.frames_rendered += 1;
        stats.last_camera_position = camera.position();
        stats.last_view_projection = camera.view_projection_matrix();
        stats.last_visible_meshes = visible;
        stats.last_joint_matrices = joints;
    }

    fn dispose(&mut self) {
        self.stats.borrow_mut().disposed = true;
    }

    fn force_context_loss(&mut self) {
        self.stats.borrow_mut().context_lost = true;
    }
}

/// A [`ViewportHost`] without a display.
///
/// The container size, pixel ratio and graphics-context availability are
/// set by the owner; resize events are queued per listener and consumed by
/// [`ViewportHost::take_resize`].
#[derive(Debug)]
pub struct HeadlessHost {
    container: Option<SurfaceSize>,
    pixel_ratio: f32,
    context_available: bool,
    next_id: u64,
    listeners: FxHashSet<ListenerId>,
    pending_resize: FxHashSet<ListenerId>,
    pending_frames: FxHashSet<FrameRequestId>,
    stats: Rc<RefCell<SurfaceStats>>,
}

impl HeadlessHost {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            container: Some(SurfaceSize::new(width, height)),
            pixel_ratio: 1.0,
            context_available: true,
            next_id: 0,
            listeners: FxHashSet::default(),
            pending_resize: FxHashSet::default(),
            pending_frames: FxHashSet::default(),
            stats: Rc::default(),
        }
    }

    /// A host whose container element is missing.
    #[must_use]
    pub fn without_container() -> Self {
        Self {
            container: None,
            ..Self::new(0, 0)
        }
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Makes surface creation fail as if no graphics context were available.
    #[must_use]
    pub fn without_graphics_context(mut self) -> Self {
        self.context_available = false;
        self
    }

    /// Changes the container size and notifies every resize listener.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.container = Some(SurfaceSize::new(width, height));
        self.pending_resize.extend(self.listeners.iter().copied());
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn pending_frame_count(&self) -> usize {
        self.pending_frames.len()
    }

    /// Marks every pending frame request as delivered.
    pub fn fire_frames(&mut self) -> usize {
        let fired = self.pending_frames.len();
        self.pending_frames.clear();
        fired
    }

    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        self.stats.borrow().clone()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ViewportHost for HeadlessHost {
    type Surface = HeadlessSurface;

    fn container_size(&self) -> Option<SurfaceSize> {
        self.container
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn create_surface(&mut self, config: &RendererConfig, size: SurfaceSize) -> Result<HeadlessSurface> {
        if !self.context_available {
            return Err(StageError::Initialization("graphics context unavailable".into()));
        }
        self.stats.replace(SurfaceStats {
            size,
            pixel_ratio: 1.0,
            shadows: config.shadows,
            ..SurfaceStats::default()
        });
        Ok(HeadlessSurface {
            stats: Rc::clone(&self.stats),
        })
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.insert(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
        self.pending_resize.remove(&id);
    }

    fn take_resize(&mut self, id: ListenerId) -> bool {
        self.pending_resize.remove(&id)
    }

    fn request_frame(&mut self) -> FrameRequestId {
        let id = FrameRequestId(self.next_id());
        self.pending_frames.insert(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.pending_frames.remove(&id);
    }
}
