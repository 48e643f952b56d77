//! Core types for capture guidance.
//!
//! ## Type Categories
//!
//! ### Angles
//! - [`wrap_yaw`], [`clamp_pitch`], [`yaw_delta`]: domain helpers for yaw and pitch
//! - [`angular_distance`]: great-circle distance between two directions
//!
//! ### Device State
//! - [`Orientation`]: yaw/pitch/roll relative to the session reference heading
//! - [`AngularRate`]: unsmoothed rotation-rate magnitudes used for stability checks
//!
//! ### Sensor Input
//! - [`RawRotation`]: one sample from the device orientation stream
//! - [`RotationRate`]: raw per-axis rotation rates

mod angles;
mod orientation;

pub use angles::{angular_distance, clamp_pitch, round_to_step, wrap_yaw, yaw_delta};
pub use orientation::{AngularRate, Orientation, RawRotation, RotationRate};
