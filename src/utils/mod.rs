//! Utility Module
//!
//! - [`spherical`]: spherical coordinates, angle normalization and easing used
//!   by camera transitions and orbit controls
//! - [`time`]: frame clock

pub mod spherical;
pub mod time;

pub use spherical::Spherical;
pub use time::{Clock, Instant};
