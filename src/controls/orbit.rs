use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::config::ControlsConfig;
use crate::controls::input::{Input, PointerButton};
use crate::scene::camera::PerspectiveCamera;
use crate::utils::spherical::Spherical;

const EPS: f32 = 0.000_001;

/// Orbits the camera around `target`.
///
/// The spherical state is re-derived from the camera position on every
/// update, so other writers (camera transitions) can move the camera and the
/// target freely between frames. The camera position is only rewritten when
/// input or clamping actually changed something.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    /// Pending (theta, phi) rotation not yet applied.
    rotate_delta: Vec2,
    pan_offset: Vec3,
    dirty: bool,
}

impl OrbitControls {
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            dirty: false,
        }
    }

    #[must_use]
    pub fn from_config(target: Vec3, config: &ControlsConfig) -> Self {
        Self {
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            damping_factor: config.damping_factor,
            enable_damping: config.enable_damping,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            ..Self::new(target)
        }
    }

    /// Moves the orbit target and requests a camera re-orientation on the
    /// next update.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Drops residual damped motion.
    pub fn stop_motion(&mut self) {
        self.rotate_delta = Vec2::ZERO;
        self.pan_offset = Vec3::ZERO;
    }

    /// Applies input and damping, clamps the distance to
    /// `[min_distance, max_distance]` and orients the camera towards the
    /// target. Returns whether the camera changed.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, input: &Input, dt: f32) -> bool {
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(PointerButton::Primary) {
            let rotate_per_pixel = 2.0 * PI / screen_height;
            self.rotate_delta -= input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        let offset = camera.position() - self.target;
        let mut spherical = Spherical::from_vec3(offset);
        let mut changed = false;

        let applied = if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.rotate_delta *= retention;
            if self.rotate_delta.length_squared() < EPS * EPS {
                self.rotate_delta = Vec2::ZERO;
            }
            applied
        } else {
            std::mem::take(&mut self.rotate_delta)
        };
        if applied != Vec2::ZERO {
            spherical.theta += applied.x;
            spherical.phi += applied.y;
            changed = true;
        }

        let min_polar = self.min_polar_angle.max(EPS);
        let max_polar = self.max_polar_angle.min(PI - EPS);
        let clamped_phi = spherical.phi.clamp(min_polar, max_polar);
        if clamped_phi != spherical.phi {
            spherical.phi = clamped_phi;
            changed = true;
        }

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                spherical.radius *= scale;
            } else {
                spherical.radius /= scale;
            }
            changed = true;
        }
        let clamped_radius = spherical.radius.clamp(self.min_distance, self.max_distance);
        if clamped_radius != spherical.radius {
            spherical.radius = clamped_radius;
            changed = true;
        }

        if input.is_button_pressed(PointerButton::Secondary) {
            let half_fov = camera.fov.to_radians() / 2.0;
            let world_height = 2.0 * spherical.radius * half_fov.tan();
            let pixels_to_world = world_height / screen_height;

            let forward = -spherical.to_vec3().normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();
            self.pan_offset += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world
                * self.pan_speed;
        }
        if self.pan_offset != Vec3::ZERO {
            if self.enable_damping {
                let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
                let applied = self.pan_offset * (1.0 - retention);
                self.pan_offset *= retention;
                if self.pan_offset.length_squared() < EPS * EPS {
                    self.pan_offset = Vec3::ZERO;
                }
                self.target += applied;
            } else {
                self.target += std::mem::take(&mut self.pan_offset);
            }
            changed = true;
        }

        if changed {
            camera.set_position(self.target + spherical.to_vec3());
        }
        if changed || self.dirty {
            camera.look_at(self.target);
        }
        self.dirty = false;
        changed
    }
}
