//! # Deferred Renderer
//!
//! Per-frame orchestration for a deferred rendering pipeline: shadow maps,
//! a multiple-render-target G-buffer, full-screen lighting, forward-shaded
//! transparency, post-processing, debug lines, composition and UI overlays.
//!
//! ## Features
//!
//! - **Fixed Pass Sequence**: begin/end pairing enforced by a pass state tracker
//! - **Binding Hazard Checks**: surfaces refuse to be read while being written
//! - **Lazy Provisioning**: targets, states and shadow maps are created on first use
//! - **Graceful Degradation**: a pass whose resources fail is skipped, the frame goes on
//! - **Backend Agnostic**: device and command-context traits, plus a headless recording backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deferred_renderer::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = RecordingDevice::new();
//!     let mut ctx = device.create_context(1280, 720)?;
//!
//!     let mut renderer = RenderingSystem::new(device, PipelineConfig::default())?;
//!     renderer.initialize(1280, 720)?;
//!
//!     let camera = Camera::default().context(1280, 720);
//!     let lighting = LightingEnvironment::outdoor_daylight();
//!     let stats = renderer.render_frame(&mut ctx, &FrameInput::new(&camera, 0.016, &[], &lighting))?;
//!     println!("{} draw calls", stats.draw_calls);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::{PassToggles, PipelineConfig},
        foundation::math::{Mat4, Vec3, Vec4},
        render::{
            backends::{RecordingContext, RecordingDevice},
            Camera, CameraContext, CommandContext, DebugLine, EntityId, FrameInput, FrameStats,
            GraphicsDevice, Light, LightingEnvironment, MeshHandle, RenderError, RenderLayer,
            RenderPass, RenderResult, RenderableComponent, RenderingSystem, SkipReason, Technique,
        },
    };
}
