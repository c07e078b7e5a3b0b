//! Viewport Manager
//!
//! Owns the render surface, the scene, the camera and the orbit controls.
//! Platform access goes through two seams:
//!
//! - [`ViewportHost`]: the page/window the viewport is embedded in (container
//!   size, pixel ratio, resize subscription, frame requests)
//! - [`RenderSurface`]: the rendering backend drawing the scene
//!
//! [`HeadlessHost`] implements both without a display, for tools and tests.

pub mod headless;
pub mod host;
#[allow(clippy::module_inception)]
pub mod viewport;

pub use headless::{HeadlessHost, HeadlessSurface, SurfaceStats};
pub use host::{FrameRequestId, ListenerId, RenderSurface, SurfaceSize, ViewportHost};
pub use viewport::Viewport;
