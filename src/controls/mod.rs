//! Orbit-style camera controls and the pointer input they consume.

pub mod input;
pub mod orbit;

pub use input::{Input, PointerButton};
pub use orbit::OrbitControls;
