use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Spherical coordinates around an origin.
///
/// `phi` is the polar angle measured from +Y, `theta` the azimuth around Y
/// measured from +Z towards +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Default for Spherical {
    fn default() -> Self {
        Self {
            radius: 1.0,
            phi: 0.0,
            theta: 0.0,
        }
    }
}

impl Spherical {
    #[must_use]
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Decomposes an offset vector. The zero vector maps to zero angles.
    #[must_use]
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Component-wise interpolation of radius and both angles.
    #[must_use]
    pub fn lerp(self, end: Spherical, t: f32) -> Spherical {
        Spherical {
            radius: lerp(self.radius, end.radius, t),
            phi: lerp(self.phi, end.phi, t),
            theta: lerp(self.theta, end.theta, t),
        }
    }
}

/// Adjusts one endpoint of each angle by a full turn when the two endpoints
/// are more than half a turn apart, so interpolating between them takes the
/// shorter arc.
///
/// The endpoint with the smaller value is the one that gets shifted.
pub fn normalize_angles(start: &mut Spherical, end: &mut Spherical) {
    shortest_arc(&mut start.phi, &mut end.phi);
    shortest_arc(&mut start.theta, &mut end.theta);
}

fn shortest_arc(start: &mut f32, end: &mut f32) {
    if (*end - *start).abs() > PI {
        if *end > *start {
            *start += TAU;
        } else {
            *end += TAU;
        }
    }
}

/// Quadratic ease-in-out on `[0, 1]`.
#[inline]
#[must_use]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
