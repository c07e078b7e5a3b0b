//! Camera Choreographer
//!
//! Moves the camera to a named preset along an eased spherical path around a
//! fixed pivot while the look-at target slides linearly. At most one
//! transition exists; a new request replaces the running one.
//!
//! Transitions are polled by the frame loop with an explicit timestamp:
//!
//! ```rust,ignore
//! choreographer.move_to("typing", &viewport.camera, &viewport.controls, now);
//! // every frame:
//! choreographer.update(now, &mut viewport.camera, &mut viewport.controls);
//! ```

use glam::Vec3;

use crate::config::{CameraPreset, CameraPresets, TransitionConfig};
use crate::controls::OrbitControls;
use crate::scene::PerspectiveCamera;
use crate::utils::spherical::{Spherical, ease_in_out_quad, normalize_angles};
use crate::utils::time::{Duration, Instant};

/// One in-flight camera move.
#[derive(Debug, Clone)]
pub struct Transition {
    pub start_position: Vec3,
    pub start_target: Vec3,
    pub end_position: Vec3,
    pub end_target: Vec3,
    /// Start and end relative to the pivot, angles already normalized.
    pub start_spherical: Spherical,
    pub end_spherical: Spherical,
    pub started_at: Instant,
    pub duration: Duration,
}

impl Transition {
    fn new(
        camera_position: Vec3,
        controls_target: Vec3,
        preset: CameraPreset,
        pivot: Vec3,
        started_at: Instant,
        duration: Duration,
    ) -> Self {
        let mut start_spherical = Spherical::from_vec3(camera_position - pivot);
        let mut end_spherical = Spherical::from_vec3(preset.position() - pivot);
        normalize_angles(&mut start_spherical, &mut end_spherical);

        Self {
            start_position: camera_position,
            start_target: controls_target,
            end_position: preset.position(),
            end_target: preset.target(),
            start_spherical,
            end_spherical,
            started_at,
            duration,
        }
    }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Camera position and look-at target at eased parameter `t`.
    #[must_use]
    pub fn sample(&self, t: f32, pivot: Vec3) -> (Vec3, Vec3) {
        let spherical = self.start_spherical.lerp(self.end_spherical, t);
        let position = pivot + spherical.to_vec3();
        let target = self.start_target.lerp(self.end_target, t);
        (position, target)
    }
}

/// What a call to [`CameraChoreographer::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    /// No transition is active.
    Idle,
    /// An intermediate frame was applied.
    Moving,
    /// The final frame was applied; the camera sits exactly on the preset.
    Arrived,
}

pub struct CameraChoreographer {
    presets: CameraPresets,
    pivot: Vec3,
    duration: Duration,
    active: Option<Transition>,
    /// Bumped on every `move_to`; identifies the current transition.
    generation: u64,
}

impl CameraChoreographer {
    #[must_use]
    pub fn new(presets: CameraPresets, transition: &TransitionConfig) -> Self {
        Self {
            presets,
            pivot: transition.pivot(),
            duration: transition.duration(),
            active: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn presets(&self) -> &CameraPresets {
        &self.presets
    }

    #[must_use]
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn active(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a transition from the current camera state to the preset named
    /// `name`. Unknown names use the rest preset. Any running transition is
    /// canceled first.
    pub fn move_to(
        &mut self,
        name: &str,
        camera: &PerspectiveCamera,
        controls: &OrbitControls,
        now: Instant,
    ) -> &Transition {
        if self.active.take().is_some() {
            log::debug!("Camera transition superseded");
        }
        let preset = self.presets.resolve(name);
        self.generation += 1;
        log::debug!(
            "Camera transition to '{name}': {:?} -> {:?}",
            camera.position(),
            preset.position
        );
        self.active.insert(Transition::new(
            camera.position(),
            controls.target,
            preset,
            self.pivot,
            now,
            self.duration,
        ))
    }

    /// Cancels the running transition, leaving the camera where it is.
    pub fn cancel(&mut self) -> bool {
        let canceled = self.active.take().is_some();
        if canceled {
            log::debug!("Camera transition canceled");
        }
        canceled
    }

    /// Applies the frame for `now`: writes the camera position, points the
    /// camera and the controls at the interpolated target and marks the
    /// controls dirty. The final frame snaps both to the preset values
    /// exactly.
    pub fn update(
        &mut self,
        now: Instant,
        camera: &mut PerspectiveCamera,
        controls: &mut OrbitControls,
    ) -> TransitionStep {
        let Some(transition) = self.active.as_ref() else {
            return TransitionStep::Idle;
        };

        let progress = transition.progress(now);
        let (position, target, step) = if progress >= 1.0 {
            (transition.end_position, transition.end_target, TransitionStep::Arrived)
        } else {
            let (position, target) = transition.sample(ease_in_out_quad(progress), self.pivot);
            (position, target, TransitionStep::Moving)
        };

        camera.set_position(position);
        camera.look_at(target);
        controls.stop_motion();
        controls.set_target(target);

        if step == TransitionStep::Arrived {
            self.active = None;
            log::debug!("Camera arrived at {position:?}");
        }
        step
    }
}
