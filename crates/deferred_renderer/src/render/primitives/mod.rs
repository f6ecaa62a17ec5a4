//! Core primitive types for rendering
//!
//! Camera types shared by every pass.

pub mod camera;

pub use camera::{Camera, CameraContext};
